//! Route comparison endpoint.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use impact_core::RouteComparison;
use serde::Deserialize;
use std::sync::Arc;

use crate::analysis;
use crate::api::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
}

/// `GET /v1/routes/compare?origin=FRA&destination=LHR`
pub async fn compare_query(
    State(state): State<Arc<AppState>>,
    Query(req): Query<CompareRequest>,
) -> Result<Json<RouteComparison>, ApiError> {
    compare(&state, req).await
}

/// `POST /v1/routes/compare` with `{"origin": ..., "destination": ...}`
pub async fn compare_body(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> Result<Json<RouteComparison>, ApiError> {
    let Json(req) = payload?;
    compare(&state, req).await
}

async fn compare(state: &AppState, req: CompareRequest) -> Result<Json<RouteComparison>, ApiError> {
    let origin = req.origin.unwrap_or_default();
    let destination = req.destination.unwrap_or_default();
    let comparison = analysis::compare_route(state, &origin, &destination).await?;
    Ok(Json(comparison))
}
