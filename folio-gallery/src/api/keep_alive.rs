//! Keep-alive ping for the object storage project
//!
//! GET /api/cron/keep-alive, called by a scheduler with the cron secret.
//! Free-tier storage projects pause after a period without traffic; one
//! minimal listing request per day keeps the bucket reachable.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info};

use crate::api::auth::check_bearer;
use crate::AppState;

/// GET /api/cron/keep-alive
pub async fn keep_alive(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(e) = check_bearer(&headers, &state.tokens.cron_secret) {
        return e.into_response();
    }

    match state.store.ping().await {
        Ok(()) => {
            info!("Storage keep-alive ping succeeded");
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": "Storage pinged successfully",
                    "timestamp": folio_common::time::now().to_rfc3339(),
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Storage keep-alive ping failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "Failed to ping storage",
                })),
            )
                .into_response()
        }
    }
}
