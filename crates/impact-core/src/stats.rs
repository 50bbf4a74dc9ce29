//! Fleet-level summary statistics.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::{
    round_non_negative, AffectedRoute, FlightTrack, ImpactTier, Period, RouteImpactRecord,
    StatsSummary,
};
use crate::reference::ReferenceDataset;

/// Anything that contributes detour figures to a summary.
pub trait DetourSample {
    fn detour_km(&self) -> f64;
    fn co2_tons(&self) -> f64;
    /// Flights represented by this sample.
    fn flights(&self) -> u64 {
        1
    }
}

impl DetourSample for FlightTrack {
    fn detour_km(&self) -> f64 {
        self.detour_km
    }

    fn co2_tons(&self) -> f64 {
        self.co2_impact_tons
    }
}

impl DetourSample for RouteImpactRecord {
    fn detour_km(&self) -> f64 {
        self.avg_detour_km
    }

    fn co2_tons(&self) -> f64 {
        self.total_co2_impact_tons
    }

    fn flights(&self) -> u64 {
        u64::from(self.total_flights)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Schedule delay minutes per detour kilometer
    pub delay_minutes_per_km: f64,
    /// Detours strictly above this are `High`
    pub high_impact_km: f64,
    /// Detours strictly above this are `Medium`
    pub medium_impact_km: f64,
    pub top_routes: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            delay_minutes_per_km: 0.12,
            high_impact_km: 250.0,
            medium_impact_km: 150.0,
            top_routes: 3,
        }
    }
}

impl StatsConfig {
    pub fn tier(&self, detour_km: f64) -> ImpactTier {
        if detour_km > self.high_impact_km {
            ImpactTier::High
        } else if detour_km > self.medium_impact_km {
            ImpactTier::Medium
        } else {
            ImpactTier::Low
        }
    }
}

pub struct StatsAggregator {
    config: StatsConfig,
    fallback: Arc<ReferenceDataset>,
}

impl StatsAggregator {
    pub fn new(config: StatsConfig, fallback: Arc<ReferenceDataset>) -> Self {
        Self { config, fallback }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Summarize `samples` for `period`; `route_stats` feeds the top-routes
    /// ranking. Empty samples yield the reference summary.
    pub fn summarize<S: DetourSample>(
        &self,
        samples: &[S],
        route_stats: &[RouteImpactRecord],
        period: Period,
    ) -> StatsSummary {
        if samples.is_empty() {
            return self.fallback_summary(period);
        }

        let total_flights: u64 = samples.iter().map(DetourSample::flights).sum();
        let total_detour: f64 = samples.iter().map(DetourSample::detour_km).sum();
        let total_co2: f64 = samples.iter().map(DetourSample::co2_tons).sum();
        let affected_routes = samples.iter().filter(|s| s.detour_km() > 0.0).count() as u64;

        let avg_detour = round_non_negative(total_detour / samples.len() as f64);
        let avg_delay = round_non_negative(avg_detour as f64 * self.config.delay_minutes_per_km);

        StatsSummary {
            total_flights,
            avg_detour,
            total_extra_km: round_non_negative(total_detour),
            avg_delay,
            co2_impact: round_non_negative(total_co2),
            affected_routes,
            top_affected_routes: match period {
                Period::During => Some(self.top_affected(route_stats)),
                Period::Baseline => None,
            },
        }
    }

    /// Routes with a detour, largest first, capped at `top_routes`.
    pub fn top_affected(&self, route_stats: &[RouteImpactRecord]) -> Vec<AffectedRoute> {
        let mut affected: Vec<&RouteImpactRecord> = route_stats
            .iter()
            .filter(|record| record.avg_detour_km > 0.0)
            .collect();
        affected.sort_by(|a, b| {
            b.avg_detour_km
                .partial_cmp(&a.avg_detour_km)
                .unwrap_or(Ordering::Equal)
        });

        affected
            .into_iter()
            .take(self.config.top_routes)
            .map(|record| {
                AffectedRoute::new(
                    &record.origin_iata,
                    &record.destination_iata,
                    round_non_negative(record.avg_detour_km),
                    self.config.tier(record.avg_detour_km),
                )
            })
            .collect()
    }

    pub fn fallback_summary(&self, period: Period) -> StatsSummary {
        self.fallback.stats(period).clone()
    }
}
