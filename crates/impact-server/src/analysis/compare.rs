//! Origin/destination route comparison.

use impact_core::{ImpactError, Period, RouteComparison, RouteImpactEstimator, RouteImpactRecord};
use tracing::{debug, info, warn};

use crate::persistence::route_stats;
use crate::state::AppState;

/// Compare baseline and during figures for a route.
///
/// Curated reference figures win, then stored records for both periods,
/// then a fresh estimate which is stored before returning.
pub async fn compare_route(
    state: &AppState,
    origin: &str,
    destination: &str,
) -> Result<RouteComparison, ImpactError> {
    let (origin, destination) = normalize_pair(origin, destination)?;

    if let Some(reference) = state.reference().route(&origin, &destination) {
        debug!("Reference comparison for {} -> {}", origin, destination);
        return Ok(reference.clone());
    }

    if let Some((baseline, during)) = stored_pair(state, &origin, &destination).await {
        debug!("Stored comparison for {} -> {}", origin, destination);
        return Ok(RouteComparison::from_records(&baseline, &during));
    }

    let (baseline, during) = {
        let registry = state.zone_registry();
        let estimator = RouteImpactEstimator::new(&registry, state.impact_config());
        let mut rng = rand::rng();
        let baseline =
            estimator.estimate_by_code(state, &origin, &destination, Period::Baseline, &mut rng)?;
        let during =
            estimator.estimate_by_code(state, &origin, &destination, Period::During, &mut rng)?;
        (baseline, during)
    };

    if let Some(pool) = state.pool() {
        for record in [&baseline, &during] {
            if let Err(err) = route_stats::upsert_route_stat(pool, record).await {
                warn!("Failed to store route statistics for {} -> {}: {:#}", origin, destination, err);
            }
        }
    }

    info!(
        "Estimated {} -> {}: detour {} km",
        origin, destination, during.avg_detour_km
    );
    Ok(RouteComparison::from_records(&baseline, &during))
}

/// Trimmed, uppercased codes; blank input is rejected.
pub fn normalize_pair(origin: &str, destination: &str) -> Result<(String, String), ImpactError> {
    let origin = origin.trim().to_ascii_uppercase();
    let destination = destination.trim().to_ascii_uppercase();
    if origin.is_empty() || destination.is_empty() {
        return Err(ImpactError::InvalidInput(
            "Origin and destination are required".to_string(),
        ));
    }
    Ok((origin, destination))
}

async fn stored_pair(
    state: &AppState,
    origin: &str,
    destination: &str,
) -> Option<(RouteImpactRecord, RouteImpactRecord)> {
    let pool = state.pool()?;
    let baseline = route_stats::get_route_stat(pool, origin, destination, Period::Baseline).await;
    let during = route_stats::get_route_stat(pool, origin, destination, Period::During).await;
    match (baseline, during) {
        (Ok(Some(baseline)), Ok(Some(during))) => Some((baseline, during)),
        (Err(err), _) | (_, Err(err)) => {
            warn!("Route statistics unavailable for {} -> {}: {:#}", origin, destination, err);
            None
        }
        _ => None,
    }
}
