//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::time::parse_stored_timestamp;

/// Column list shared by every `SELECT` that materializes a [`Painting`]
///
/// `created_at` is read back as text and parsed per row: legacy rows may hold
/// timestamps in formats the driver can't decode.
pub const PAINTING_COLUMNS: &str =
    "id, href, imagesrc, name, worktype, year, rank, CAST(created_at AS TEXT) AS created_at";

/// A row of the `paintings` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Painting {
    pub id: i64,
    pub href: Option<String>,
    /// URL of the image object; its last path segment is the storage key
    pub image_location: String,
    pub name: String,
    pub work_type: String,
    pub year: i64,
    pub rank: i64,
    /// Set by the store at insert time; `None` for rows that predate the
    /// column or whose stored value doesn't parse as a timestamp
    pub recorded_at: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, SqliteRow> for Painting {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let created_at: Option<String> = row.try_get("created_at")?;
        let recorded_at = created_at.as_deref().and_then(|raw| {
            let parsed = parse_stored_timestamp(raw);
            if parsed.is_none() {
                tracing::debug!(created_at = raw, "Ignoring unparseable created_at");
            }
            parsed
        });

        Ok(Self {
            id: row.try_get("id")?,
            href: row.try_get("href")?,
            image_location: row.try_get("imagesrc")?,
            name: row.try_get("name")?,
            work_type: row.try_get("worktype")?,
            year: row.try_get("year")?,
            rank: row.try_get("rank")?,
            recorded_at,
        })
    }
}

impl Painting {
    /// Object storage key: the trailing path segment of the image URL
    pub fn storage_key(&self) -> Option<&str> {
        self.image_location
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
    }
}

/// Caller-supplied fields of a painting that does not exist yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPainting {
    pub name: String,
    pub work_type: String,
    pub year: i64,
    pub image_location: String,
    #[serde(default)]
    pub href: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painting(image_location: &str) -> Painting {
        Painting {
            id: 1,
            href: None,
            image_location: image_location.to_string(),
            name: "Harbour".to_string(),
            work_type: "Oil".to_string(),
            year: 2022,
            rank: 1,
            recorded_at: None,
        }
    }

    #[test]
    fn test_storage_key_is_trailing_segment() {
        let p = painting("https://cdn.example.com/storage/v1/object/public/myart/harbour.jpg");
        assert_eq!(p.storage_key(), Some("harbour.jpg"));
    }

    #[test]
    fn test_storage_key_without_slashes() {
        assert_eq!(painting("harbour.jpg").storage_key(), Some("harbour.jpg"));
    }

    #[test]
    fn test_storage_key_trailing_slash_is_none() {
        assert_eq!(painting("https://cdn.example.com/myart/").storage_key(), None);
        assert_eq!(painting("").storage_key(), None);
    }

    #[test]
    fn test_new_painting_json_field_names() {
        let json = r#"{"name":"Dune","workType":"Acrylic","year":2023,"imageLocation":"https://x/y/dune.png"}"#;
        let parsed: NewPainting = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.work_type, "Acrylic");
        assert_eq!(parsed.image_location, "https://x/y/dune.png");
        assert!(parsed.href.is_none());
    }
}
