//! HTTP API handlers for folio-gallery

pub mod auth;
pub mod health;
pub mod history;
pub mod keep_alive;
pub mod paintings;

pub use auth::admin_auth_middleware;
pub use health::health_routes;
pub use history::painting_history;
pub use keep_alive::keep_alive;
pub use paintings::{create_painting, list_paintings};
