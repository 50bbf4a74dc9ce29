//! Fleet summary statistics for a period.

use impact_core::{generate_sample_fleet, Period, RouteImpactEstimator, SampleFleet, StatsSummary};
use tracing::{debug, info, warn};

use crate::persistence::{flight_tracks, route_stats};
use crate::state::AppState;

/// Summary for `period`. A cold store answers with the reference summary
/// and, when enabled, seeds sample flights for later requests.
pub async fn period_summary(state: &AppState, period: Period) -> StatsSummary {
    let pool = match state.require_pool() {
        Ok(pool) => pool,
        Err(err) => {
            debug!("{}, serving reference {} stats", err, period);
            return state.stats().fallback_summary(period);
        }
    };

    let tracks = flight_tracks::load_flight_tracks(pool, period)
        .await
        .unwrap_or_else(|err| {
            warn!("Flight tracks unavailable for {}: {:#}", period, err);
            Vec::new()
        });

    if tracks.is_empty() {
        debug!("No flight tracks for {}, serving reference stats", period);
        if state.config().generate_samples {
            seed_samples(state, period).await;
        }
        return state.stats().fallback_summary(period);
    }

    let routes = route_stats::load_route_stats(pool, period)
        .await
        .unwrap_or_else(|err| {
            warn!("Route statistics unavailable for {}: {:#}", period, err);
            Vec::new()
        });

    state.stats().summarize(&tracks, &routes, period)
}

/// Generate and store a sample fleet for `period` unless one is already
/// stored. Failures are logged.
pub async fn seed_samples(state: &AppState, period: Period) {
    let Some(pool) = state.pool() else {
        return;
    };

    let _guard = state.seed_lock().lock().await;
    match flight_tracks::count_flight_tracks(pool, period).await {
        Ok(0) => {}
        Ok(count) => {
            debug!("{} flights already stored for {}, skipping samples", count, period);
            return;
        }
        Err(err) => {
            warn!("Failed to count flights for {}: {:#}", period, err);
            return;
        }
    }

    let fleet: SampleFleet = {
        let registry = state.zone_registry();
        let estimator = RouteImpactEstimator::new(&registry, state.impact_config());
        generate_sample_fleet(
            &estimator,
            state,
            state.reference().sample_routes(),
            period,
            state.sample_config(),
            &mut rand::rng(),
        )
    };

    if let Err(err) = flight_tracks::insert_flight_tracks(pool, &fleet.flights).await {
        warn!("Failed to store sample flights for {}: {:#}", period, err);
        return;
    }
    for record in &fleet.routes {
        if let Err(err) = route_stats::upsert_route_stat(pool, record).await {
            warn!(
                "Failed to store route statistics for {} -> {}: {:#}",
                record.origin_iata, record.destination_iata, err
            );
        }
    }

    info!(
        "Seeded {} sample flights on {} routes for {}",
        fleet.flights.len(),
        fleet.routes.len(),
        period
    );
}
