use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use wlts_core::models::{TrajectoryParams, TrajectoryResponse};

use crate::error::ApiError;
use crate::roles::CallerRoles;
use crate::state::AppState;

pub async fn get_trajectory(
    State(state): State<Arc<AppState>>,
    CallerRoles(roles): CallerRoles,
    Query(params): Query<TrajectoryParams>,
) -> Result<Json<TrajectoryResponse>, ApiError> {
    let query = params.into_query()?;

    tracing::info!(
        longitude = query.longitude,
        latitude = query.latitude,
        collections = ?query.collections,
        "Trajectory request"
    );

    let response = state.service.get_trajectory(&query, &roles).await.map_err(|e| {
        tracing::error!(error = %e, "Trajectory request failed");
        ApiError::from(e)
    })?;

    tracing::info!(points = response.result.trajectory.len(), "Trajectory resolved");
    Ok(Json(response))
}
