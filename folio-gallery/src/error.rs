//! Error types for folio-gallery

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Gallery operation errors
#[derive(Error, Debug)]
pub enum GalleryError {
    /// Missing or invalid field on insert; nothing was written
    #[error("Validation error: {0}")]
    Validation(String),

    /// A rank-changing transaction (insert or renumber) was rolled back
    #[error("Transaction failed: {0}")]
    TransactionFailure(#[source] sqlx::Error),

    /// Base painting list could not be read
    #[error("Chronological view unavailable: {0}")]
    ResolutionUnavailable(#[source] sqlx::Error),

    /// Database query error outside a write transaction
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience Result type using GalleryError
pub type Result<T> = std::result::Result<T, GalleryError>;

impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GalleryError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            GalleryError::TransactionFailure(e) => {
                error!(error = %e, "Rank transaction rolled back");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Rank update failed; no changes were saved".to_string(),
                )
            }
            GalleryError::ResolutionUnavailable(e) => {
                error!(error = %e, "Painting history unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Painting history unavailable".to_string(),
                )
            }
            GalleryError::Database(e) => {
                error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch paintings".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_transaction_failure_message_is_operation_neutral() {
        let response = GalleryError::TransactionFailure(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("no changes were saved"));
        assert!(!message.contains("create"));
    }

    #[tokio::test]
    async fn test_validation_is_bad_request_with_message() {
        let response = GalleryError::Validation("rank must be between 1 and 10".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "rank must be between 1 and 10");
    }
}
