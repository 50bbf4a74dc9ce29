//! Sample fleet generation for a cold store.

use rand::Rng;

use crate::error::ImpactError;
use crate::estimator::RouteImpactEstimator;
use crate::geo::corridor_midpoint;
use crate::models::{utc, AirportLookup, FlightTrack, Period, RouteImpactRecord};

/// Shape of the generated fleet.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    /// Flights per route drawn from `[min, max)`
    pub flights_per_route: (u32, u32),
    /// Max offset of the detour waypoint from the corridor midpoint
    pub waypoint_jitter_deg: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            flights_per_route: (10, 30),
            waypoint_jitter_deg: 2.5,
        }
    }
}

/// Flights plus the per-route aggregate for each sampled pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleFleet {
    pub flights: Vec<FlightTrack>,
    pub routes: Vec<RouteImpactRecord>,
}

/// Generate sample flights for each `(origin, destination)` pair.
///
/// Pairs whose airports cannot be resolved are skipped. Each flight is an
/// independent estimate; the route record averages them.
pub fn generate_sample_fleet<L, R>(
    estimator: &RouteImpactEstimator<'_>,
    airports: &L,
    pairs: &[(String, String)],
    period: Period,
    config: &SampleConfig,
    rng: &mut R,
) -> SampleFleet
where
    L: AirportLookup + ?Sized,
    R: Rng + ?Sized,
{
    let mut fleet = SampleFleet::default();

    for (origin, destination) in pairs {
        if let Ok((flights, record)) =
            sample_route(estimator, airports, origin, destination, period, config, rng)
        {
            fleet.flights.extend(flights);
            fleet.routes.push(record);
        }
    }

    fleet
}

fn sample_route<L, R>(
    estimator: &RouteImpactEstimator<'_>,
    airports: &L,
    origin: &str,
    destination: &str,
    period: Period,
    config: &SampleConfig,
    rng: &mut R,
) -> Result<(Vec<FlightTrack>, RouteImpactRecord), ImpactError>
where
    L: AirportLookup + ?Sized,
    R: Rng + ?Sized,
{
    let from = airports
        .get_airport(origin)
        .ok_or_else(|| ImpactError::NotFound(format!("Airport {}", origin)))?;
    let to = airports
        .get_airport(destination)
        .ok_or_else(|| ImpactError::NotFound(format!("Airport {}", destination)))?;
    let a = from.require_location()?;
    let b = to.require_location()?;

    let (min, max) = config.flights_per_route;
    let count = if max > min { rng.random_range(min..max) } else { min.max(1) };

    let departure_time = match period {
        Period::Baseline => utc(2021, 6, 15, 0, 0, 0),
        Period::During => utc(2022, 6, 15, 0, 0, 0),
    };

    let mut flights = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let estimate = estimator.estimate(&from, &to, period, rng)?;

        let mut route = vec![a.to_lon_lat()];
        if estimate.avg_detour_km > 0.0 {
            let mid = corridor_midpoint(a, b);
            let jitter = config.waypoint_jitter_deg;
            route.push([
                mid.lon + (rng.random::<f64>() - 0.5) * 2.0 * jitter,
                mid.lat + (rng.random::<f64>() - 0.5) * 2.0 * jitter,
            ]);
        }
        route.push(b.to_lon_lat());

        flights.push(FlightTrack {
            flight_number: format!("{}{:04}", origin, rng.random_range(0..10_000)),
            origin_iata: origin.to_string(),
            destination_iata: destination.to_string(),
            period,
            departure_time,
            route,
            distance_km: estimate.avg_distance_km,
            flight_time_minutes: estimate.avg_flight_time_minutes,
            detour_km: estimate.avg_detour_km,
            extra_fuel_liters: estimate.total_extra_fuel_liters,
            co2_impact_tons: estimate.total_co2_impact_tons,
        });
    }

    let n = flights.len() as f64;
    let record = RouteImpactRecord {
        origin_iata: origin.to_string(),
        destination_iata: destination.to_string(),
        period,
        avg_distance_km: flights.iter().map(|f| f.distance_km).sum::<f64>() / n,
        avg_flight_time_minutes: flights.iter().map(|f| f.flight_time_minutes).sum::<f64>() / n,
        avg_detour_km: flights.iter().map(|f| f.detour_km).sum::<f64>() / n,
        total_extra_fuel_liters: flights.iter().map(|f| f.extra_fuel_liters).sum(),
        total_co2_impact_tons: flights.iter().map(|f| f.co2_impact_tons).sum(),
        total_flights: count,
    };

    Ok((flights, record))
}
