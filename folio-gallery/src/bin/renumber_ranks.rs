//! Rank renumbering tool
//!
//! Rewrites painting ranks to the dense sequence N..=1 while keeping the
//! current display order. Stop folio-gallery (or at least make sure no admin
//! is uploading) before running it.
//!
//! Usage: renumber-ranks [--database <path>] [--dry-run]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use folio_common::config::{load_toml_config, CliOverrides, GalleryConfig, ENV_CONFIG_PATH};
use folio_common::db::init_database;
use folio_gallery::ranking::{RankChange, RankingService};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "renumber-ranks")]
#[command(about = "Renumber painting ranks densely, preserving display order")]
struct Args {
    /// Path to config.toml
    #[arg(short, long, env = ENV_CONFIG_PATH)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "FOLIO_DATABASE")]
    database: Option<PathBuf>,

    /// Print the planned changes without writing them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let toml = load_toml_config(args.config.as_deref()).context("Failed to load config file")?;
    let config = GalleryConfig::resolve(
        &CliOverrides {
            database_path: args.database,
            port: None,
        },
        &toml,
    );

    let pool = init_database(&config.database_path)
        .await
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;
    let service = RankingService::new(pool);

    let changes = if args.dry_run {
        service.plan_renumber().await?
    } else {
        service.renumber_dense().await?
    };

    if changes.is_empty() {
        info!("No paintings found");
        return Ok(());
    }

    report(&changes);

    if args.dry_run {
        info!("Dry run: no ranks were changed");
    } else {
        info!("Paintings are now ranked from 1 to {}", changes.len());
    }
    Ok(())
}

fn report(changes: &[RankChange]) {
    for change in changes {
        if change.is_noop() {
            info!("  {} (id {}): {} unchanged", change.name, change.id, change.old_rank);
        } else {
            info!(
                "  {} (id {}): {} → {}",
                change.name, change.id, change.old_rank, change.new_rank
            );
        }
    }
}
