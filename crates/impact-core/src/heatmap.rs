//! Synthetic traffic density around known corridors.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{HeatmapPoint, Period};
use crate::zones::ZoneRegistry;

/// A named traffic hub the density grid is sampled around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorAnchor {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub baseline_intensity: f64,
    pub during_intensity: f64,
}

impl CorridorAnchor {
    pub fn new(name: &str, lat: f64, lng: f64, baseline_intensity: f64, during_intensity: f64) -> Self {
        Self {
            name: name.to_string(),
            lat,
            lng,
            baseline_intensity,
            during_intensity,
        }
    }

    pub fn intensity(&self, period: Period) -> f64 {
        match period {
            Period::Baseline => self.baseline_intensity,
            Period::During => self.during_intensity,
        }
    }
}

/// Traffic damping inside zones at or above a severity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneDamping {
    pub min_severity: u8,
    pub factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapConfig {
    pub anchors: Vec<CorridorAnchor>,
    pub samples_per_anchor: usize,
    /// Max offset either side of the anchor
    pub lat_jitter_deg: f64,
    pub lng_jitter_deg: f64,
    /// Max intensity noise either side of the damped base
    pub intensity_jitter: f64,
    pub min_intensity: f64,
    pub damping: Vec<ZoneDamping>,
    pub flights_per_intensity: f64,
    pub detour_km_per_intensity: f64,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            anchors: vec![
                CorridorAnchor::new("Frankfurt", 50.0, 8.5, 0.8, 0.8),
                CorridorAnchor::new("Paris", 48.8, 2.3, 0.7, 0.7),
                CorridorAnchor::new("London", 51.5, -0.1, 0.9, 0.9),
                CorridorAnchor::new("Warsaw", 52.2, 21.0, 0.6, 0.6),
                CorridorAnchor::new("Budapest", 47.5, 19.0, 0.5, 0.5),
                CorridorAnchor::new("Istanbul", 41.0, 29.0, 0.8, 0.8),
                // Southern reroutes pick up the traffic diverted from the east.
                CorridorAnchor::new("Zagreb", 45.8, 15.9, 0.3, 0.9),
                CorridorAnchor::new("Belgrade", 44.8, 20.4, 0.2, 0.7),
                CorridorAnchor::new("Sofia", 42.7, 23.3, 0.2, 0.6),
            ],
            samples_per_anchor: 30,
            lat_jitter_deg: 1.0,
            lng_jitter_deg: 2.0,
            intensity_jitter: 0.15,
            min_intensity: 0.1,
            damping: vec![
                ZoneDamping { min_severity: 3, factor: 0.1 },
                ZoneDamping { min_severity: 2, factor: 0.3 },
            ],
            flights_per_intensity: 100.0,
            detour_km_per_intensity: 200.0,
        }
    }
}

impl HeatmapConfig {
    /// Damping for a zone of `severity`; 1.0 when no rule applies.
    pub fn damping_for(&self, severity: u8) -> f64 {
        self.damping
            .iter()
            .filter(|rule| rule.min_severity <= severity)
            .max_by_key(|rule| rule.min_severity)
            .map_or(1.0, |rule| rule.factor)
    }
}

pub struct HeatmapSynthesizer<'a> {
    zones: &'a ZoneRegistry,
    config: &'a HeatmapConfig,
}

impl<'a> HeatmapSynthesizer<'a> {
    pub fn new(zones: &'a ZoneRegistry, config: &'a HeatmapConfig) -> Self {
        Self { zones, config }
    }

    /// Sample every anchor. Points are not deduplicated; callers that persist
    /// them key on [`HeatmapPoint::grid_cell`].
    pub fn generate<R: Rng + ?Sized>(&self, period: Period, rng: &mut R) -> Vec<HeatmapPoint> {
        let mut points =
            Vec::with_capacity(self.config.anchors.len() * self.config.samples_per_anchor);

        for anchor in &self.config.anchors {
            for _ in 0..self.config.samples_per_anchor {
                let lat = anchor.lat + symmetric(rng, self.config.lat_jitter_deg);
                let lng = anchor.lng + symmetric(rng, self.config.lng_jitter_deg);
                points.push(self.point_at(lat, lng, anchor.intensity(period), period, rng));
            }
        }

        points
    }

    fn point_at<R: Rng + ?Sized>(
        &self,
        lat: f64,
        lng: f64,
        base: f64,
        period: Period,
        rng: &mut R,
    ) -> HeatmapPoint {
        let damped = self
            .zones
            .zones_containing(lat, lng, period)
            .into_iter()
            .fold(base, |acc, zone| acc * self.config.damping_for(zone.severity));

        let intensity = (damped + symmetric(rng, self.config.intensity_jitter))
            .clamp(self.config.min_intensity, 1.0);

        let avg_detour_km = match period {
            Period::During => (intensity * self.config.detour_km_per_intensity).floor(),
            Period::Baseline => 0.0,
        };

        HeatmapPoint {
            lat,
            lng,
            period,
            intensity,
            flight_count: (intensity * self.config.flights_per_intensity).floor() as u32,
            avg_detour_km,
        }
    }
}

/// Uniform draw in `[-half_width, half_width)`.
fn symmetric<R: Rng + ?Sized>(rng: &mut R, half_width: f64) -> f64 {
    if half_width <= 0.0 {
        return 0.0;
    }
    (rng.random::<f64>() - 0.5) * 2.0 * half_width
}
