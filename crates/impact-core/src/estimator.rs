//! Per-route detour, fuel and CO2 estimation.
//!
//! Figures are synthetic: a route whose corridor midpoint falls inside an
//! active zone draws a detour from the band configured for the zone's
//! severity, anything else may still pick up a minor detour.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ImpactError;
use crate::geo::distance_between;
use crate::models::{Airport, AirportLookup, Period, RouteImpactRecord};
use crate::zones::ZoneRegistry;

/// Half-open integer detour range in kilometers: `[min_km, max_km)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetourBand {
    pub min_km: u32,
    pub max_km: u32,
}

impl DetourBand {
    pub const fn new(min_km: u32, max_km: u32) -> Self {
        Self { min_km, max_km }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max_km <= self.min_km {
            return self.min_km as f64;
        }
        rng.random_range(self.min_km..self.max_km) as f64
    }

    pub fn contains(&self, km: f64) -> bool {
        km >= self.min_km as f64 && km < self.max_km as f64
    }
}

/// Detour band applied to zones at or above a severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBand {
    pub min_severity: u8,
    pub band: DetourBand,
}

/// Constants driving the estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactConfig {
    pub cruise_speed_kmh: f64,
    /// Extra fuel burned per detour kilometer
    pub fuel_liters_per_km: f64,
    /// Tons of CO2 per liter of jet fuel
    pub co2_tons_per_liter: f64,
    pub severity_bands: Vec<SeverityBand>,
    /// Chance of a minor detour on routes clear of every zone
    pub minor_detour_probability: f64,
    pub minor_detour: DetourBand,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            cruise_speed_kmh: 800.0,
            fuel_liters_per_km: 7.0,
            co2_tons_per_liter: 0.00315,
            severity_bands: vec![
                SeverityBand { min_severity: 3, band: DetourBand::new(150, 350) },
                SeverityBand { min_severity: 2, band: DetourBand::new(50, 150) },
                SeverityBand { min_severity: 1, band: DetourBand::new(20, 70) },
            ],
            minor_detour_probability: 0.3,
            minor_detour: DetourBand::new(20, 70),
        }
    }
}

impl ImpactConfig {
    /// Band with the highest threshold not above `severity`.
    pub fn band_for_severity(&self, severity: u8) -> Option<DetourBand> {
        self.severity_bands
            .iter()
            .filter(|entry| entry.min_severity <= severity)
            .max_by_key(|entry| entry.min_severity)
            .map(|entry| entry.band)
    }

    /// Whole minutes at cruise speed.
    pub fn flight_minutes(&self, distance_km: f64) -> f64 {
        if self.cruise_speed_kmh <= 0.0 {
            return 0.0;
        }
        (distance_km / self.cruise_speed_kmh * 60.0).floor()
    }

    pub fn extra_fuel_liters(&self, detour_km: f64) -> f64 {
        detour_km * self.fuel_liters_per_km
    }

    pub fn co2_tons(&self, fuel_liters: f64) -> f64 {
        fuel_liters * self.co2_tons_per_liter
    }
}

pub struct RouteImpactEstimator<'a> {
    zones: &'a ZoneRegistry,
    config: &'a ImpactConfig,
}

impl<'a> RouteImpactEstimator<'a> {
    pub fn new(zones: &'a ZoneRegistry, config: &'a ImpactConfig) -> Self {
        Self { zones, config }
    }

    pub fn config(&self) -> &ImpactConfig {
        self.config
    }

    /// Estimate the impact record for one route and period.
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        origin: &Airport,
        destination: &Airport,
        period: Period,
        rng: &mut R,
    ) -> Result<RouteImpactRecord, ImpactError> {
        let from = origin.require_location()?;
        let to = destination.require_location()?;

        let base_distance = distance_between(from, to);
        let base_time = self.config.flight_minutes(base_distance);

        let detour_km = match period {
            Period::Baseline => 0.0,
            Period::During => self.draw_detour(from, to, rng),
        };

        let extra_time = self.config.flight_minutes(detour_km);
        let extra_fuel = self.config.extra_fuel_liters(detour_km);

        Ok(RouteImpactRecord {
            origin_iata: origin.iata.clone(),
            destination_iata: destination.iata.clone(),
            period,
            avg_distance_km: base_distance + detour_km,
            avg_flight_time_minutes: base_time + extra_time,
            avg_detour_km: detour_km,
            total_extra_fuel_liters: extra_fuel,
            total_co2_impact_tons: self.config.co2_tons(extra_fuel),
            total_flights: 1,
        })
    }

    /// Resolve both codes through `airports`, then estimate.
    pub fn estimate_by_code<L, R>(
        &self,
        airports: &L,
        origin: &str,
        destination: &str,
        period: Period,
        rng: &mut R,
    ) -> Result<RouteImpactRecord, ImpactError>
    where
        L: AirportLookup + ?Sized,
        R: Rng + ?Sized,
    {
        let origin = airports
            .get_airport(origin)
            .ok_or_else(|| ImpactError::NotFound(format!("Airport {}", origin)))?;
        let destination = airports
            .get_airport(destination)
            .ok_or_else(|| ImpactError::NotFound(format!("Airport {}", destination)))?;
        self.estimate(&origin, &destination, period, rng)
    }

    fn draw_detour<R: Rng + ?Sized>(
        &self,
        from: crate::geo::GeoPoint,
        to: crate::geo::GeoPoint,
        rng: &mut R,
    ) -> f64 {
        let zone_band = self
            .zones
            .zone_for_segment(from, to, Period::During)
            .and_then(|zone| self.config.band_for_severity(zone.severity));

        if let Some(band) = zone_band {
            return band.sample(rng);
        }

        if rng.random::<f64>() < self.config.minor_detour_probability {
            self.config.minor_detour.sample(rng)
        } else {
            0.0
        }
    }
}
