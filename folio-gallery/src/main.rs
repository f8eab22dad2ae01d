//! folio-gallery - painting gallery backend
//!
//! Serves the painting collection (rank order and upload history) and the
//! admin insert endpoint over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use folio_common::config::{load_toml_config, CliOverrides, GalleryConfig, ENV_CONFIG_PATH};
use folio_common::db::{count_paintings, init_database};
use folio_gallery::storage::{ObjectStore, SupabaseStorage, UnconfiguredStorage};
use folio_gallery::{build_router, AccessTokens, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for folio-gallery
#[derive(Parser, Debug)]
#[command(name = "folio-gallery")]
#[command(about = "Painting gallery backend")]
#[command(version)]
struct Args {
    /// Path to config.toml
    #[arg(short, long, env = ENV_CONFIG_PATH)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "FOLIO_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "FOLIO_DATABASE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_gallery=info,folio_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting folio-gallery v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let toml = load_toml_config(args.config.as_deref()).context("Failed to load config file")?;
    let config = GalleryConfig::resolve(
        &CliOverrides {
            database_path: args.database,
            port: args.port,
        },
        &toml,
    );

    info!("Database path: {}", config.database_path.display());
    let pool = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready ({} paintings)", count_paintings(&pool).await?);

    let store: Arc<dyn ObjectStore> = match SupabaseStorage::from_config(&config.storage) {
        Ok(storage) => {
            info!("✓ Object storage bucket: {}", config.storage.bucket);
            Arc::new(storage)
        }
        Err(e) => {
            warn!("Object storage unavailable ({}); history uses database timestamps", e);
            Arc::new(UnconfiguredStorage)
        }
    };

    if config.admin_token.is_empty() {
        warn!("No admin token configured; painting uploads are disabled");
    }
    if config.cron_secret.is_empty() {
        warn!("No cron secret configured; keep-alive endpoint is disabled");
    }

    let state = AppState::new(
        pool,
        store,
        AccessTokens {
            admin_token: config.admin_token.clone(),
            cron_secret: config.cron_secret.clone(),
        },
        config.lookup_concurrency,
    );
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("folio-gallery listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
