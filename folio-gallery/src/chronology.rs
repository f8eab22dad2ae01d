//! Chronological ordering of the painting collection
//!
//! Each painting gets one "uploaded at" instant, taken from the first source
//! that has one:
//! 1. the object's creation time reported by object storage
//! 2. the row's `created_at` column
//! 3. a synthesized instant, `id` seconds after 2021-01-01T00:00:00Z
//!
//! Storage lookups are best-effort and run concurrently. A failed lookup
//! only demotes that one painting to the next source.

use chrono::{DateTime, Utc};
use folio_common::db::{Painting, PAINTING_COLUMNS};
use folio_common::time::fallback_instant;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::{GalleryError, Result};
use crate::storage::ObjectStore;

/// Which source supplied a painting's resolved instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Storage,
    Database,
    Fallback,
}

/// A painting with its resolved upload instant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChronologicalEntry {
    #[serde(flatten)]
    pub painting: Painting,
    pub resolved_at: DateTime<Utc>,
    pub provenance: Provenance,
}

/// How many entries each source supplied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProvenanceCounts {
    pub total: usize,
    pub storage: usize,
    pub database: usize,
    pub fallback: usize,
}

impl ProvenanceCounts {
    fn record(&mut self, provenance: Provenance) {
        self.total += 1;
        match provenance {
            Provenance::Storage => self.storage += 1,
            Provenance::Database => self.database += 1,
            Provenance::Fallback => self.fallback += 1,
        }
    }
}

/// Entries sorted ascending by `(resolved_at, id)`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChronologicalOrder {
    pub entries: Vec<ChronologicalEntry>,
    pub counts: ProvenanceCounts,
}

/// What the chronological view receives
///
/// When the painting table cannot be read, `available` is false and the
/// view is empty rather than partial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    pub available: bool,
    pub paintings: Vec<ChronologicalEntry>,
    pub metadata: ProvenanceCounts,
}

impl HistoryView {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            paintings: Vec::new(),
            metadata: ProvenanceCounts::default(),
        }
    }
}

impl From<ChronologicalOrder> for HistoryView {
    fn from(order: ChronologicalOrder) -> Self {
        Self {
            available: true,
            paintings: order.entries,
            metadata: order.counts,
        }
    }
}

/// Resolves upload instants against an injected object store
#[derive(Clone)]
pub struct ChronologicalResolver {
    store: Arc<dyn ObjectStore>,
    concurrency: usize,
}

impl ChronologicalResolver {
    /// `concurrency` bounds the number of in-flight storage lookups
    pub fn new(store: Arc<dyn ObjectStore>, concurrency: usize) -> Self {
        Self {
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Resolve every record and sort ascending by resolved instant
    ///
    /// Waits for every lookup (or its failure) before sorting; never fails.
    pub async fn resolve_chronological_order(&self, records: Vec<Painting>) -> ChronologicalOrder {
        let lookups: Vec<_> = records
            .iter()
            .map(|painting| self.storage_observed_at(painting))
            .collect();
        let observed: Vec<Option<DateTime<Utc>>> = stream::iter(lookups)
            .buffered(self.concurrency)
            .collect()
            .await;

        let entries = records
            .into_iter()
            .zip(observed)
            .map(|(painting, storage_time)| resolve_entry(painting, storage_time))
            .collect();

        let order = order_entries(entries);

        info!(
            total = order.counts.total,
            storage = order.counts.storage,
            database = order.counts.database,
            fallback = order.counts.fallback,
            "Resolved chronological order"
        );

        order
    }

    /// Load the collection and resolve it for the chronological view
    pub async fn load_history(&self, pool: &SqlitePool) -> HistoryView {
        match fetch_base_records(pool).await {
            Ok(records) => self.resolve_chronological_order(records).await.into(),
            Err(e) => {
                error!(error = %e, "Cannot load paintings for chronological view");
                HistoryView::unavailable()
            }
        }
    }

    async fn storage_observed_at(&self, painting: &Painting) -> Option<DateTime<Utc>> {
        let Some(key) = painting.storage_key() else {
            debug!(painting_id = painting.id, "No storage key in image location");
            return None;
        };

        match self.store.find_object(key).await {
            Ok(Some(object)) => {
                if object.created_at.is_none() {
                    debug!(painting_id = painting.id, key, "Storage object has no creation time");
                }
                object.created_at
            }
            Ok(None) => {
                debug!(painting_id = painting.id, key, "No storage object for painting");
                None
            }
            Err(e) => {
                warn!(
                    painting_id = painting.id,
                    key,
                    error = %e,
                    "Storage metadata lookup failed"
                );
                None
            }
        }
    }
}

/// Base record list for the chronological view
pub async fn fetch_base_records(pool: &SqlitePool) -> Result<Vec<Painting>> {
    let sql = format!("SELECT {} FROM paintings ORDER BY id ASC", PAINTING_COLUMNS);
    sqlx::query_as::<_, Painting>(&sql)
        .fetch_all(pool)
        .await
        .map_err(GalleryError::ResolutionUnavailable)
}

/// Apply the source priority to one painting
pub fn resolve_entry(painting: Painting, storage_time: Option<DateTime<Utc>>) -> ChronologicalEntry {
    let (resolved_at, provenance) = match (storage_time, painting.recorded_at) {
        (Some(t), _) => (t, Provenance::Storage),
        (None, Some(t)) => (t, Provenance::Database),
        (None, None) => (fallback_instant(painting.id), Provenance::Fallback),
    };

    ChronologicalEntry {
        painting,
        resolved_at,
        provenance,
    }
}

/// Sort by `(resolved_at, id)` and tally provenance
pub fn order_entries(mut entries: Vec<ChronologicalEntry>) -> ChronologicalOrder {
    entries.sort_by(|a, b| {
        a.resolved_at
            .cmp(&b.resolved_at)
            .then_with(|| a.painting.id.cmp(&b.painting.id))
    });

    let mut counts = ProvenanceCounts::default();
    for entry in &entries {
        counts.record(entry.provenance);
    }

    ChronologicalOrder { entries, counts }
}
