//! Object storage access
//!
//! The gallery only reads from object storage: it looks up the upload time
//! of an image object by name, and pings the bucket to keep the service warm.
//! Callers receive an [`ObjectStore`] handle instead of reaching for a global
//! client, so tests substitute their own implementation.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use thiserror::Error;

pub mod supabase;

pub use supabase::SupabaseStorage;

/// Object storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Storage API returned error response
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse API response or object metadata
    #[error("Parse error: {0}")]
    Parse(String),

    /// No storage endpoint configured
    #[error("Object storage is not configured")]
    NotConfigured,
}

/// Metadata of one stored object
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub name: String,
    /// Physical upload time reported by the storage service
    pub created_at: Option<DateTime<Utc>>,
}

/// Read access to the image bucket
pub trait ObjectStore: Send + Sync {
    /// Look up an object by exact name
    ///
    /// `Ok(None)` means the bucket has no object with that name.
    fn find_object<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Option<StoredObject>, StorageError>>;

    /// Cheapest possible request that proves the bucket is reachable
    fn ping(&self) -> BoxFuture<'_, Result<(), StorageError>>;
}

/// Stand-in used when no storage endpoint is configured
///
/// Every lookup fails, so the chronological view degrades to database and
/// fallback timestamps.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredStorage;

impl ObjectStore for UnconfiguredStorage {
    fn find_object<'a>(
        &'a self,
        _name: &'a str,
    ) -> BoxFuture<'a, Result<Option<StoredObject>, StorageError>> {
        Box::pin(async { Err(StorageError::NotConfigured) })
    }

    fn ping(&self) -> BoxFuture<'_, Result<(), StorageError>> {
        Box::pin(async { Err(StorageError::NotConfigured) })
    }
}
