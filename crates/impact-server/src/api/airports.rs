//! Airport directory endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use impact_core::{Airport, AirportLookup};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::state::AppState;

pub async fn list_airports(State(state): State<Arc<AppState>>) -> Json<Vec<Airport>> {
    Json(state.get_airports())
}

pub async fn get_airport(
    State(state): State<Arc<AppState>>,
    Path(iata): Path<String>,
) -> Result<Json<Airport>, ApiError> {
    let code = iata.trim().to_ascii_uppercase();
    state
        .get_airport(&code)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Airport {} not found", code)))
}
