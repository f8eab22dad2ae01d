//! Painting collection endpoints
//!
//! GET  /api/paintings  - every painting, highest rank first (public)
//! POST /api/paintings  - insert a painting at a rank (admin)

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use folio_common::db::{NewPainting, Painting};
use serde::Deserialize;

use crate::error::{GalleryError, Result};
use crate::AppState;

/// Body of POST /api/paintings
///
/// Fields are optional here so that a missing field is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaintingRequest {
    pub name: Option<String>,
    pub work_type: Option<String>,
    pub year: Option<i64>,
    pub image_location: Option<String>,
    pub href: Option<String>,
    pub rank: Option<i64>,
}

impl CreatePaintingRequest {
    /// Split into the painting fields and the requested rank
    pub fn into_parts(self) -> Result<(NewPainting, i64)> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.work_type.is_none() {
            missing.push("workType");
        }
        if self.year.is_none() {
            missing.push("year");
        }
        if self.image_location.is_none() {
            missing.push("imageLocation");
        }
        if self.rank.is_none() {
            missing.push("rank");
        }
        if !missing.is_empty() {
            return Err(GalleryError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let painting = NewPainting {
            name: self.name.unwrap_or_default(),
            work_type: self.work_type.unwrap_or_default(),
            year: self.year.unwrap_or_default(),
            image_location: self.image_location.unwrap_or_default(),
            href: self.href,
        };
        Ok((painting, self.rank.unwrap_or_default()))
    }
}

/// GET /api/paintings
pub async fn list_paintings(State(state): State<AppState>) -> Result<Json<Vec<Painting>>> {
    let paintings = state.ranking.list_all_by_rank_descending().await?;
    Ok(Json(paintings))
}

/// POST /api/paintings
///
/// Returns 201 with the stored painting.
pub async fn create_painting(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreatePaintingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Painting>)> {
    let Json(request) =
        body.map_err(|e| GalleryError::Validation(format!("Invalid request body: {}", e.body_text())))?;

    let (new_painting, rank) = request.into_parts()?;
    let painting = state.ranking.insert_at_rank(&new_painting, rank).await?;

    Ok((StatusCode::CREATED, Json(painting)))
}
