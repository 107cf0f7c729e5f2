use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use wlts_core::models::CollectionDescription;

use crate::dto::{CollectionsResponse, DescribeParams};
use crate::error::ApiError;
use crate::roles::CallerRoles;
use crate::state::AppState;

pub async fn list_collections(
    State(state): State<Arc<AppState>>,
    CallerRoles(roles): CallerRoles,
) -> Json<CollectionsResponse> {
    let collections = state.service.list_collections(&roles);
    tracing::info!(count = collections.len(), "Listing collections");
    Json(CollectionsResponse { collections })
}

pub async fn describe_collection(
    State(state): State<Arc<AppState>>,
    CallerRoles(roles): CallerRoles,
    Query(params): Query<DescribeParams>,
) -> Result<Json<CollectionDescription>, ApiError> {
    let name = params
        .collection_id
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::bad_request("'collection_id' is a required property"))?;

    tracing::info!(collection = %name, "Describing collection");
    Ok(Json(state.service.describe_collection(name, &roles)?))
}
