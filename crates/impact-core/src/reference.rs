//! Built-in reference data.
//!
//! Seeds the airport directory and zone set of an empty store, supplies
//! curated route comparisons, and provides the fallback statistics served
//! while the store is cold or unreachable.

use std::collections::HashMap;

use crate::models::{
    utc, AffectedRoute, Airport, BoundingBox, ConflictZone, ImpactTier, Period, PeriodWindows,
    RouteComparison, StatsSummary,
};
use crate::zones::ZoneRegistry;

/// Ring substituted for a zone whose stored geometry cannot be parsed.
pub const FALLBACK_ZONE_RING: [[f64; 2]; 5] =
    [[30.0, 52.0], [35.0, 52.0], [35.0, 45.0], [30.0, 45.0], [30.0, 52.0]];

#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    airports: Vec<Airport>,
    zones: Vec<ConflictZone>,
    routes: HashMap<(String, String), RouteComparison>,
    baseline_stats: StatsSummary,
    during_stats: StatsSummary,
    sample_routes: Vec<(String, String)>,
    fallback_ring: Vec<[f64; 2]>,
}

impl ReferenceDataset {
    pub fn builtin() -> Self {
        let mut routes = HashMap::new();
        for (a, b, cmp) in reference_routes() {
            routes.insert((b.to_string(), a.to_string()), cmp.clone());
            routes.insert((a.to_string(), b.to_string()), cmp);
        }

        Self {
            airports: builtin_airports(),
            zones: builtin_zones(),
            routes,
            baseline_stats: StatsSummary {
                total_flights: 45_623,
                avg_detour: 0,
                total_extra_km: 0,
                avg_delay: 0,
                co2_impact: 0,
                affected_routes: 0,
                top_affected_routes: None,
            },
            during_stats: StatsSummary {
                total_flights: 41_289,
                avg_detour: 187,
                total_extra_km: 2_847_500,
                avg_delay: 23,
                co2_impact: 8_942,
                affected_routes: 78,
                top_affected_routes: Some(vec![
                    AffectedRoute::new("IST", "FRA", 309, ImpactTier::High),
                    AffectedRoute::new("VIE", "WAW", 245, ImpactTier::Medium),
                    AffectedRoute::new("LHR", "BUD", 198, ImpactTier::Medium),
                ]),
            },
            sample_routes: [
                ("IST", "FRA"),
                ("LHR", "CDG"),
                ("VIE", "WAW"),
                ("FRA", "BUD"),
                ("IST", "VIE"),
                ("LHR", "WAW"),
            ]
            .into_iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect(),
            fallback_ring: FALLBACK_ZONE_RING.to_vec(),
        }
    }

    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    pub fn zones(&self) -> &[ConflictZone] {
        &self.zones
    }

    pub fn zone_registry(&self, windows: PeriodWindows) -> ZoneRegistry {
        ZoneRegistry::new(self.zones.clone(), windows)
    }

    /// Curated comparison for the pair, if any.
    pub fn route(&self, origin: &str, destination: &str) -> Option<&RouteComparison> {
        self.routes
            .get(&(origin.to_string(), destination.to_string()))
    }

    /// Fallback summary for a cold store.
    pub fn stats(&self, period: Period) -> &StatsSummary {
        match period {
            Period::Baseline => &self.baseline_stats,
            Period::During => &self.during_stats,
        }
    }

    /// Airport pairs used to seed sample flights.
    pub fn sample_routes(&self) -> &[(String, String)] {
        &self.sample_routes
    }

    pub fn fallback_ring(&self) -> &[[f64; 2]] {
        &self.fallback_ring
    }
}

fn comparison(
    baseline_distance: u64,
    during_distance: u64,
    detour_km: u64,
    baseline_time: u64,
    during_time: u64,
    extra_fuel: u64,
    co2_impact: f64,
) -> RouteComparison {
    RouteComparison {
        baseline_distance,
        during_distance,
        detour_km,
        baseline_time,
        during_time,
        extra_fuel,
        co2_impact,
    }
}

fn reference_routes() -> Vec<(&'static str, &'static str, RouteComparison)> {
    vec![
        ("FRA", "LHR", comparison(658, 658, 0, 95, 95, 0, 0.0)),
        ("CDG", "WAW", comparison(1365, 1520, 155, 130, 148, 1085, 3.4)),
        ("VIE", "IST", comparison(1048, 1280, 232, 105, 128, 1624, 5.1)),
        ("PRG", "ATH", comparison(1245, 1580, 335, 125, 158, 2345, 7.4)),
    ]
}

fn builtin_airports() -> Vec<Airport> {
    vec![
        Airport::new("AMM", "Queen Alia International Airport", "Amman", "Jordan", 31.7226, 35.9932),
        Airport::new("AMS", "Amsterdam Airport Schiphol", "Amsterdam", "Netherlands", 52.3105, 4.7683),
        Airport::new("ATH", "Athens International Airport", "Athens", "Greece", 37.9364, 23.9445),
        Airport::new("BEG", "Belgrade Nikola Tesla Airport", "Belgrade", "Serbia", 44.8184, 20.3091),
        Airport::new("BUD", "Budapest Ferenc Liszt International Airport", "Budapest", "Hungary", 47.4298, 19.2611),
        Airport::new("CDG", "Paris Charles de Gaulle Airport", "Paris", "France", 49.0097, 2.5479),
        Airport::new("FRA", "Frankfurt Airport", "Frankfurt", "Germany", 50.0379, 8.5622),
        Airport::new("IST", "Istanbul Airport", "Istanbul", "Turkey", 41.2753, 28.7519),
        Airport::new("KBP", "Boryspil International Airport", "Kyiv", "Ukraine", 50.3450, 30.8947),
        Airport::new("LHR", "London Heathrow Airport", "London", "United Kingdom", 51.4700, -0.4543),
        Airport::new("MUC", "Munich Airport", "Munich", "Germany", 48.3537, 11.7750),
        Airport::new("OTP", "Henri Coanda International Airport", "Bucharest", "Romania", 44.5711, 26.0850),
        Airport::new("PRG", "Vaclav Havel Airport Prague", "Prague", "Czech Republic", 50.1008, 14.2600),
        Airport::new("SOF", "Sofia Airport", "Sofia", "Bulgaria", 42.6967, 23.4114),
        Airport::new("TLV", "Ben Gurion Airport", "Tel Aviv", "Israel", 32.0114, 34.8867),
        Airport::new("VIE", "Vienna International Airport", "Vienna", "Austria", 48.1103, 16.5697),
        Airport::new("WAW", "Warsaw Chopin Airport", "Warsaw", "Poland", 52.1657, 20.9671),
        Airport::new("ZAG", "Franjo Tudman Airport", "Zagreb", "Croatia", 45.7429, 16.0688),
    ]
}

fn builtin_zones() -> Vec<ConflictZone> {
    vec![
        ConflictZone {
            id: "1".to_string(),
            name: "Eastern Europe Conflict Zone".to_string(),
            severity: 3,
            start_time: utc(2022, 2, 24, 0, 0, 0),
            end_time: Some(utc(2024, 12, 31, 23, 59, 59)),
            polygon: vec![[22.0, 52.0], [35.0, 52.0], [35.0, 45.0], [22.0, 45.0], [22.0, 52.0]],
            bounding_box: Some(BoundingBox::new(45.0, 52.0, 25.0, 35.0)),
            description: "Major conflict affecting air traffic routing".to_string(),
        },
        ConflictZone {
            id: "2".to_string(),
            name: "Middle East Tension Zone".to_string(),
            severity: 2,
            start_time: utc(2023, 10, 1, 0, 0, 0),
            end_time: Some(utc(2024, 12, 31, 23, 59, 59)),
            polygon: vec![[30.0, 33.0], [40.0, 33.0], [40.0, 28.0], [30.0, 28.0], [30.0, 33.0]],
            bounding_box: Some(BoundingBox::new(31.0, 33.0, 34.0, 36.0)),
            description: "Regional tensions affecting flight routes".to_string(),
        },
    ]
}
