//! Supabase Storage client
//!
//! Talks to the Storage REST API of a Supabase project:
//! - `POST {base}/storage/v1/object/list/{bucket}` lists objects, optionally
//!   filtered by a name search
//! - public objects are served from `{base}/storage/v1/object/public/{bucket}/{name}`
//!
//! The listing's `created_at` is the physical upload time of the object.

use folio_common::config::StorageConfig;
use folio_common::time::parse_rfc3339;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ObjectStore, StorageError, StoredObject};

const USER_AGENT: &str = concat!("folio-gallery/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 15;
const SEARCH_LIMIT: u32 = 1000;

#[derive(Debug, Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: u32,
    offset: u32,
    search: &'a str,
}

/// One entry of a bucket listing
#[derive(Debug, Clone, Deserialize)]
pub struct ListedObject {
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Supabase Storage API client
pub struct SupabaseStorage {
    http_client: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseStorage {
    /// Create new client for one bucket
    pub fn new(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StorageError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            bucket: bucket.into(),
        })
    }

    /// Build client from resolved configuration
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let base_url = config.base_url.as_deref().ok_or(StorageError::NotConfigured)?;
        let service_key = config.service_key.as_deref().ok_or(StorageError::NotConfigured)?;
        Self::new(base_url, service_key, config.bucket.clone())
    }

    /// Public URL under which an object of this bucket is served
    pub fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, name
        )
    }

    async fn list(&self, search: &str, limit: u32) -> Result<Vec<ListedObject>, StorageError> {
        let url = format!("{}/storage/v1/object/list/{}", self.base_url, self.bucket);

        tracing::debug!(bucket = %self.bucket, search = %search, "Listing storage objects");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&ListRequest {
                prefix: "",
                limit,
                offset: 0,
                search,
            })
            .send()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StorageError::Api(status.as_u16(), error_text));
        }

        response
            .json::<Vec<ListedObject>>()
            .await
            .map_err(|e| StorageError::Parse(e.to_string()))
    }
}

/// Pick the entry named exactly `name` out of a search listing
///
/// A search matches by substring, so `sun.jpg` also returns `sunset.jpg`.
pub fn select_object(
    listing: &[ListedObject],
    name: &str,
) -> Result<Option<StoredObject>, StorageError> {
    let Some(entry) = listing.iter().find(|entry| entry.name == name) else {
        return Ok(None);
    };

    let created_at = match entry.created_at.as_deref() {
        Some(raw) => Some(parse_rfc3339(raw).ok_or_else(|| {
            StorageError::Parse(format!("invalid created_at for {}: {:?}", name, raw))
        })?),
        None => None,
    };

    Ok(Some(StoredObject {
        name: entry.name.clone(),
        created_at,
    }))
}

impl ObjectStore for SupabaseStorage {
    fn find_object<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Option<StoredObject>, StorageError>> {
        Box::pin(async move {
            let listing = self.list(name, SEARCH_LIMIT).await?;
            let found = select_object(&listing, name)?;
            if found.is_some() {
                tracing::debug!(url = %self.public_url(name), "Matched storage object");
            }
            Ok(found)
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<(), StorageError>> {
        Box::pin(async move {
            self.list("", 1).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listed(name: &str, created_at: Option<&str>) -> ListedObject {
        ListedObject {
            name: name.to_string(),
            created_at: created_at.map(str::to_string),
        }
    }

    #[test]
    fn test_select_exact_name_among_substring_matches() {
        let listing = vec![
            listed("sunset.jpg", Some("2023-01-01T00:00:00Z")),
            listed("sun.jpg", Some("2022-06-15T08:30:00.123Z")),
        ];

        let found = select_object(&listing, "sun.jpg").unwrap().unwrap();
        assert_eq!(found.name, "sun.jpg");
        assert_eq!(
            found.created_at.unwrap().to_rfc3339(),
            "2022-06-15T08:30:00.123+00:00"
        );
    }

    #[test]
    fn test_select_missing_name_is_none() {
        let listing = vec![listed("sunset.jpg", Some("2023-01-01T00:00:00Z"))];
        assert!(select_object(&listing, "sun.jpg").unwrap().is_none());
        assert!(select_object(&[], "sun.jpg").unwrap().is_none());
    }

    #[test]
    fn test_select_without_created_at() {
        let listing = vec![listed("sun.jpg", None)];
        let found = select_object(&listing, "sun.jpg").unwrap().unwrap();
        assert!(found.created_at.is_none());
    }

    #[test]
    fn test_select_malformed_created_at_is_parse_error() {
        let listing = vec![listed("sun.jpg", Some("last tuesday"))];
        assert!(matches!(
            select_object(&listing, "sun.jpg"),
            Err(StorageError::Parse(_))
        ));
    }

    #[test]
    fn test_listing_json_shape() {
        let json = r#"[
            {"name": "sun.jpg", "id": "b0c1", "created_at": "2022-06-15T08:30:00Z", "metadata": {"size": 1024}},
            {"name": "folder", "id": null}
        ]"#;
        let listing: Vec<ListedObject> = serde_json::from_str(json).unwrap();
        assert_eq!(listing.len(), 2);
        assert!(listing[1].created_at.is_none());
    }

    #[test]
    fn test_public_url_strips_trailing_slash() {
        let storage = SupabaseStorage::new("https://abc.supabase.co/", "key", "myart").unwrap();
        assert_eq!(
            storage.public_url("sun.jpg"),
            "https://abc.supabase.co/storage/v1/object/public/myart/sun.jpg"
        );
    }

    #[test]
    fn test_from_config_requires_url_and_key() {
        let config = StorageConfig {
            base_url: None,
            service_key: Some("key".to_string()),
            bucket: "myart".to_string(),
        };
        assert!(matches!(
            SupabaseStorage::from_config(&config),
            Err(StorageError::NotConfigured)
        ));
    }
}
