//! Chronological painting history
//!
//! GET /api/paintings/history

use axum::{extract::State, http::StatusCode, Json};

use crate::chronology::HistoryView;
use crate::AppState;

/// GET /api/paintings/history
///
/// 200 with paintings oldest-upload first and per-source counts, or 503 with
/// `available: false` and no paintings when the collection can't be read.
pub async fn painting_history(State(state): State<AppState>) -> (StatusCode, Json<HistoryView>) {
    let view = state.resolver.load_history(&state.db).await;

    let status = if view.available {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(view))
}
