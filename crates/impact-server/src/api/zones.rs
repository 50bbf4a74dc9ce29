//! Conflict zone administration.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use impact_core::ConflictZone;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::state::AppState;

/// Create or replace a zone. The path id wins over any id in the body.
pub async fn upsert_zone(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ConflictZone>, JsonRejection>,
) -> Result<Json<ConflictZone>, ApiError> {
    let Json(mut zone) = payload?;
    zone.id = id;

    let errors = zone.validate();
    if !errors.is_empty() {
        return Err(ApiError::bad_request("Invalid conflict zone").with_details(errors));
    }

    state.upsert_zone(zone.clone()).await?;
    tracing::info!("Stored conflict zone '{}' ({})", zone.name, zone.id);
    Ok(Json(zone))
}

pub async fn delete_zone(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.remove_zone(&id).await? {
        tracing::info!("Deleted conflict zone {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Conflict zone {} not found", id)))
    }
}
