//! Curatorial rank ordering
//!
//! Paintings are displayed highest `rank` first. Inserting at rank `r`
//! shifts every painting with `rank >= r` up by one and then inserts the new
//! painting at `r`, inside one transaction, so readers never see duplicate
//! ranks or a shift without its insert.

use folio_common::db::{NewPainting, Painting, PAINTING_COLUMNS};
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use crate::error::{GalleryError, Result};

/// Highest rank a caller may request
///
/// Each insert raises the top rank by at most one, so stored ranks stay far
/// below `i64::MAX` and `rank + 1` never leaves SQLite's integer range.
pub const MAX_REQUESTED_RANK: i64 = 1_000_000_000;

/// One row's rank before and after a renumbering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankChange {
    pub id: i64,
    pub name: String,
    pub old_rank: i64,
    pub new_rank: i64,
}

impl RankChange {
    pub fn is_noop(&self) -> bool {
        self.old_rank == self.new_rank
    }
}

/// Rank-ordered access to the painting collection
#[derive(Clone)]
pub struct RankingService {
    pool: SqlitePool,
}

impl RankingService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a painting so that it displays at `requested_rank`
    ///
    /// Returns the stored row, including its new id. On any failure after the
    /// transaction begins, nothing is persisted.
    pub async fn insert_at_rank(
        &self,
        new: &NewPainting,
        requested_rank: i64,
    ) -> Result<Painting> {
        validate_new_painting(new, requested_rank)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(GalleryError::TransactionFailure)?;

        let (painting, shifted) = match shift_then_insert(&mut tx, new, requested_rank).await {
            Ok(done) => done,
            Err(e) => {
                rollback(tx).await;
                return Err(GalleryError::TransactionFailure(e));
            }
        };

        tx.commit().await.map_err(GalleryError::TransactionFailure)?;

        info!(
            painting_id = painting.id,
            rank = requested_rank,
            shifted,
            "Inserted painting"
        );

        Ok(painting)
    }

    /// All paintings, highest rank first, ties by ascending id
    pub async fn list_all_by_rank_descending(&self) -> Result<Vec<Painting>> {
        let sql = format!(
            "SELECT {} FROM paintings ORDER BY rank DESC, id ASC",
            PAINTING_COLUMNS
        );
        let paintings = sqlx::query_as::<_, Painting>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = paintings.len(), "Listed paintings by rank");
        Ok(paintings)
    }

    /// Rank changes `renumber_dense` would apply, without applying them
    pub async fn plan_renumber(&self) -> Result<Vec<RankChange>> {
        let order = self.list_all_by_rank_descending().await?;
        Ok(dense_ranks(&order))
    }

    /// Reassign ranks `N..=1` in current display order
    ///
    /// Operator maintenance only: must not run concurrently with inserts.
    /// Runs as one transaction and returns every row's old and new rank.
    pub async fn renumber_dense(&self) -> Result<Vec<RankChange>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(GalleryError::TransactionFailure)?;

        let changes = match apply_dense_ranks(&mut tx).await {
            Ok(changes) => changes,
            Err(e) => {
                rollback(tx).await;
                return Err(GalleryError::TransactionFailure(e));
            }
        };

        tx.commit().await.map_err(GalleryError::TransactionFailure)?;

        info!(
            total = changes.len(),
            updated = changes.iter().filter(|c| !c.is_noop()).count(),
            "Renumbered painting ranks"
        );

        Ok(changes)
    }
}

/// Shift ranks at or above `rank`, then insert the new row at `rank`
async fn shift_then_insert(
    tx: &mut Transaction<'_, Sqlite>,
    new: &NewPainting,
    rank: i64,
) -> std::result::Result<(Painting, u64), sqlx::Error> {
    let shifted = sqlx::query("UPDATE paintings SET rank = rank + 1 WHERE rank >= ?")
        .bind(rank)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    let insert_sql = format!(
        "INSERT INTO paintings (imagesrc, name, worktype, year, href, rank, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP) \
         RETURNING {}",
        PAINTING_COLUMNS
    );

    let painting = sqlx::query_as::<_, Painting>(&insert_sql)
        .bind(new.image_location.trim())
        .bind(new.name.trim())
        .bind(new.work_type.trim())
        .bind(new.year)
        .bind(new.href.as_deref().map(str::trim).filter(|h| !h.is_empty()))
        .bind(rank)
        .fetch_one(&mut **tx)
        .await?;

    Ok((painting, shifted))
}

/// Read the current display order and rewrite ranks to `N..=1`
async fn apply_dense_ranks(
    tx: &mut Transaction<'_, Sqlite>,
) -> std::result::Result<Vec<RankChange>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM paintings ORDER BY rank DESC, id ASC",
        PAINTING_COLUMNS
    );
    let order = sqlx::query_as::<_, Painting>(&sql)
        .fetch_all(&mut **tx)
        .await?;

    let changes = dense_ranks(&order);

    for change in changes.iter().filter(|c| !c.is_noop()) {
        sqlx::query("UPDATE paintings SET rank = ? WHERE id = ?")
            .bind(change.new_rank)
            .bind(change.id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(changes)
}

async fn rollback(tx: Transaction<'_, Sqlite>) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "Rollback failed; connection discards the transaction on release");
    }
}

/// Reject inserts that would write an incomplete or unplaceable painting
pub fn validate_new_painting(new: &NewPainting, requested_rank: i64) -> Result<()> {
    if !(1..=MAX_REQUESTED_RANK).contains(&requested_rank) {
        return Err(GalleryError::Validation(format!(
            "rank must be between 1 and {}, got {}",
            MAX_REQUESTED_RANK, requested_rank
        )));
    }

    let required = [
        ("name", &new.name),
        ("workType", &new.work_type),
        ("imageLocation", &new.image_location),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| *field)
        .collect();

    if !missing.is_empty() {
        return Err(GalleryError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    if new.year <= 0 {
        return Err(GalleryError::Validation(format!(
            "year must be positive, got {}",
            new.year
        )));
    }

    Ok(())
}

/// Dense ranks for a collection already in display order (highest first)
pub fn dense_ranks(order: &[Painting]) -> Vec<RankChange> {
    let total = order.len() as i64;
    order
        .iter()
        .enumerate()
        .map(|(index, painting)| RankChange {
            id: painting.id,
            name: painting.name.clone(),
            old_rank: painting.rank,
            new_rank: total - index as i64,
        })
        .collect()
}
