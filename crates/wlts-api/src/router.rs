use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health_check))

        // Service
        .route("/wlts/", get(handlers::root))
        .route("/wlts/list_collections", get(handlers::list_collections))
        .route("/wlts/describe_collection", get(handlers::describe_collection))
        .route("/wlts/trajectory", get(handlers::get_trajectory))

        .with_state(state)
}
