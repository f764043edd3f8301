//! HTTP API handlers and routing.

pub mod error;
mod health;
mod listing;
pub mod session;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use listing::TierStatus;

/// Create the router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints (no auth required)
        .merge(health::routes())
        .merge(listing::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
