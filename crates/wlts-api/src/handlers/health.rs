use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::{HealthResponse, RootResponse};
use crate::state::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.service.registry().len()))
}

pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse::new(state.version))
}
