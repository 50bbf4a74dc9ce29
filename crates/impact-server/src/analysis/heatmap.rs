//! Heatmap layer for a period.

use impact_core::{HeatmapPoint, HeatmapSynthesizer, Period};
use tracing::{info, warn};

use crate::persistence::heatmap;
use crate::state::AppState;

/// Stored cells for `period`, or a freshly generated set that is stored
/// on the way out.
pub async fn period_heatmap(state: &AppState, period: Period) -> Vec<HeatmapPoint> {
    if let Some(pool) = state.pool() {
        match heatmap::load_heatmap_points(pool, period).await {
            Ok(points) if !points.is_empty() => return points,
            Ok(_) => {}
            Err(err) => warn!("Heatmap cells unavailable for {}: {:#}", period, err),
        }
    }

    let points = {
        let registry = state.zone_registry();
        HeatmapSynthesizer::new(&registry, state.heatmap_config())
            .generate(period, &mut rand::rng())
    };

    if let Some(pool) = state.pool() {
        match heatmap::upsert_heatmap_points(pool, &points).await {
            Ok(()) => info!("Generated {} heatmap points for {}", points.len(), period),
            Err(err) => warn!("Failed to store heatmap cells for {}: {:#}", period, err),
        }
    }

    points
}
