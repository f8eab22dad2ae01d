//! Database schema migrations
//!
//! Versioned, idempotent migrations tracked in the `schema_version` table.
//! They upgrade `paintings` tables created before the rank and timestamp
//! columns existed.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - databases in the wild have already run them
//! 2. **Always add new migrations** - one function per schema change
//! 3. **Use ALTER TABLE** - preserve existing rows

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    Ok(())
}

async fn has_column(pool: &SqlitePool, table: &str, column: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?",
    )
    .bind(table)
    .bind(column)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Migration v1: add `rank` to paintings and seed it from `id`
///
/// Seeding `rank = id` keeps the pre-rank display order (newest id first).
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Add rank column to paintings");

    if !has_column(pool, "paintings", "rank").await? {
        sqlx::query("ALTER TABLE paintings ADD COLUMN rank INTEGER NOT NULL DEFAULT 0")
            .execute(pool)
            .await?;
        info!("  ✓ Added rank column to paintings table");
    }

    let seeded = sqlx::query("UPDATE paintings SET rank = id WHERE rank = 0 OR rank IS NULL")
        .execute(pool)
        .await?
        .rows_affected();

    if seeded > 0 {
        info!("  ✓ Seeded rank for {} existing paintings", seeded);
    }
    Ok(())
}

/// Migration v2: add `created_at` to paintings
///
/// SQLite cannot add a column with a non-constant default, so existing rows
/// keep `NULL` and new rows get `CURRENT_TIMESTAMP` from the insert statement.
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: Add created_at column to paintings");

    if has_column(pool, "paintings", "created_at").await? {
        info!("  created_at column already exists - skipping");
        return Ok(());
    }

    sqlx::query("ALTER TABLE paintings ADD COLUMN created_at TIMESTAMP")
        .execute(pool)
        .await?;

    info!("  ✓ Added created_at column to paintings table");
    Ok(())
}
