//! Database initialization
//!
//! Opens (creating if needed) the gallery database, creates the `paintings`
//! table, and brings legacy tables up to date via [`run_migrations`].

use crate::db::migrations::run_migrations;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// How long a connection waits on a locked database before failing
pub const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // WAL lets the gallery readers proceed while an admin insert holds the writer
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    prepare_schema(&pool).await?;

    Ok(pool)
}

/// Create tables, run migrations, then create indexes (idempotent)
///
/// Indexes come last: a legacy `paintings` table may lack `rank` until
/// migrations have run.
pub async fn prepare_schema(pool: &SqlitePool) -> Result<()> {
    create_paintings_table(pool).await?;
    run_migrations(pool).await?;
    create_paintings_indexes(pool).await?;
    Ok(())
}

async fn create_paintings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS paintings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            href TEXT,
            imagesrc TEXT NOT NULL,
            name TEXT NOT NULL,
            worktype TEXT NOT NULL,
            year INTEGER NOT NULL,
            rank INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_paintings_indexes(pool: &SqlitePool) -> Result<()> {
    // Not UNIQUE: the rank shift updates rows one at a time and would trip
    // a unique index mid-statement
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_paintings_rank ON paintings(rank DESC)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Number of rows in `paintings`
pub async fn count_paintings(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM paintings")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
