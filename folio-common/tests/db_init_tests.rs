//! Tests for database initialization and legacy-table migrations

use folio_common::db::{
    count_paintings, get_schema_version, init_database, prepare_schema, BUSY_TIMEOUT,
    CURRENT_SCHEMA_VERSION,
};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database")
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("folio.db");

    let pool = init_database(&db_path).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");

    let pool = pool.unwrap();
    assert_eq!(count_paintings(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("folio.db");

    let pool1 = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO paintings (imagesrc, name, worktype, year, rank) VALUES ('a.jpg', 'A', 'Oil', 2020, 1)")
        .execute(&pool1)
        .await
        .unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await.unwrap();
    assert_eq!(count_paintings(&pool2).await.unwrap(), 1);
    assert_eq!(get_schema_version(&pool2).await.unwrap(), CURRENT_SCHEMA_VERSION);
}

#[tokio::test]
async fn test_prepare_schema_is_idempotent() {
    let pool = memory_pool().await;
    prepare_schema(&pool).await.unwrap();
    prepare_schema(&pool).await.unwrap();

    assert_eq!(get_schema_version(&pool).await.unwrap(), CURRENT_SCHEMA_VERSION);
}

#[tokio::test]
async fn test_new_rows_get_created_at() {
    let pool = memory_pool().await;
    prepare_schema(&pool).await.unwrap();

    sqlx::query("INSERT INTO paintings (imagesrc, name, worktype, year, rank) VALUES ('a.jpg', 'A', 'Oil', 2020, 1)")
        .execute(&pool)
        .await
        .unwrap();

    let created_at: Option<String> = sqlx::query_scalar("SELECT created_at FROM paintings")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(created_at.is_some());
}

#[tokio::test]
async fn test_legacy_table_gets_rank_seeded_from_id() {
    let pool = memory_pool().await;

    // Table as it existed before ranks and timestamps
    sqlx::query(
        r#"
        CREATE TABLE paintings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            href TEXT,
            imagesrc TEXT NOT NULL,
            name TEXT NOT NULL,
            worktype TEXT NOT NULL,
            year INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    for name in ["First", "Second", "Third"] {
        sqlx::query("INSERT INTO paintings (imagesrc, name, worktype, year) VALUES (?, ?, 'Oil', 2019)")
            .bind(format!("https://cdn/{}.jpg", name.to_lowercase()))
            .bind(name)
            .execute(&pool)
            .await
            .unwrap();
    }

    prepare_schema(&pool).await.unwrap();

    let rows: Vec<(i64, i64, Option<String>)> =
        sqlx::query_as("SELECT id, rank, created_at FROM paintings ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();

    assert_eq!(rows.len(), 3);
    for (id, rank, created_at) in rows {
        assert_eq!(rank, id, "legacy rows keep id order as rank");
        assert!(created_at.is_none(), "legacy rows have no recorded timestamp");
    }
}

#[tokio::test]
async fn test_every_pooled_connection_gets_busy_timeout_and_wal() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("folio.db")).await.unwrap();

    // Hold both so the second is a distinct connection
    let mut first = pool.acquire().await.unwrap();
    let mut second = pool.acquire().await.unwrap();

    for conn in [&mut first, &mut second] {
        let timeout: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(timeout, BUSY_TIMEOUT.as_millis() as i64);

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }
}
