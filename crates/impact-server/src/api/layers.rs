//! Period-scoped map layers and summary statistics.

use axum::{
    extract::{Query, State},
    Json,
};
use impact_core::{
    heatmap_collection, zone_collection, FeatureCollection, HeatmapProperties, Period,
    StatsSummary, ZoneProperties,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::analysis;
use crate::api::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    #[serde(default)]
    pub period: Option<String>,
}

impl PeriodQuery {
    fn period(&self) -> Result<Period, ApiError> {
        Ok(Period::parse_or_default(self.period.as_deref())?)
    }
}

/// `GET /v1/stats?period=during`
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<StatsSummary>, ApiError> {
    let period = query.period()?;
    Ok(Json(analysis::period_summary(&state, period).await))
}

/// `GET /v1/heatmap?period=during`
pub async fn get_heatmap(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<FeatureCollection<HeatmapProperties>>, ApiError> {
    let period = query.period()?;
    let points = analysis::period_heatmap(&state, period).await;
    Ok(Json(heatmap_collection(&points)))
}

/// `GET /v1/conflicts?period=during`: zones active in the period.
pub async fn get_conflicts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<FeatureCollection<ZoneProperties>>, ApiError> {
    let period = query.period()?;
    let registry = state.zone_registry();
    let active = registry.list_active_zones(period);
    tracing::debug!("{} active conflict zones for {}", active.len(), period);
    Ok(Json(zone_collection(active)))
}
