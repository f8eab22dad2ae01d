//! folio-gallery library - painting gallery backend
//!
//! Serves the painting collection in curatorial rank order and in
//! chronological upload order, and accepts new paintings from the admin.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod chronology;
pub mod error;
pub mod ranking;
pub mod storage;

use chronology::ChronologicalResolver;
use ranking::RankingService;
use storage::ObjectStore;

/// Bearer secrets guarding the write and maintenance endpoints
///
/// An empty secret disables its endpoint: every request is rejected.
#[derive(Debug, Clone, Default)]
pub struct AccessTokens {
    pub admin_token: String,
    pub cron_secret: String,
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub ranking: RankingService,
    pub resolver: ChronologicalResolver,
    pub store: Arc<dyn ObjectStore>,
    pub tokens: Arc<AccessTokens>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        db: SqlitePool,
        store: Arc<dyn ObjectStore>,
        tokens: AccessTokens,
        lookup_concurrency: usize,
    ) -> Self {
        Self {
            ranking: RankingService::new(db.clone()),
            resolver: ChronologicalResolver::new(store.clone(), lookup_concurrency),
            db,
            store,
            tokens: Arc::new(tokens),
        }
    }
}

/// Build application router
///
/// Reads are public; creating a painting requires the admin bearer token.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Creating a painting requires admin authentication; listing is public
    let create = post(api::create_painting).route_layer(middleware::from_fn_with_state(
        state.clone(),
        api::admin_auth_middleware,
    ));

    let paintings = Router::new()
        .route("/api/paintings", get(api::list_paintings).merge(create))
        .route("/api/paintings/history", get(api::painting_history));

    // Keep-alive checks its own bearer secret
    let maintenance = Router::new()
        .route("/api/cron/keep-alive", get(api::keep_alive))
        .merge(api::health_routes());

    Router::new()
        .merge(paintings)
        .merge(maintenance)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
