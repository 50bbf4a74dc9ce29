//! Conflict zone registry and corridor intersection heuristics.
//!
//! Zones are tested as axis-aligned routing boxes by default. The
//! containment rule sits behind [`ZoneShapeTest`] so exact polygon
//! containment can be swapped in without touching callers.

use std::sync::Arc;

use crate::error::ImpactError;
use crate::geo::{corridor_midpoint, GeoPoint};
use crate::models::{ConflictZone, Period, PeriodWindows};

/// Containment rule applied to a single zone.
pub trait ZoneShapeTest: Send + Sync {
    fn contains(&self, zone: &ConflictZone, lat: f64, lon: f64) -> bool;
}

/// Strict interior of the zone's routing box.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundingBoxTest;

impl ZoneShapeTest for BoundingBoxTest {
    fn contains(&self, zone: &ConflictZone, lat: f64, lon: f64) -> bool {
        zone.bounds().is_some_and(|bbox| bbox.contains(lat, lon))
    }
}

/// Ray casting against the polygon ring.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonTest;

impl ZoneShapeTest for PolygonTest {
    fn contains(&self, zone: &ConflictZone, lat: f64, lon: f64) -> bool {
        zone.polygon_contains(lat, lon)
    }
}

/// The set of declared zones plus the period windows used to judge activity.
#[derive(Clone)]
pub struct ZoneRegistry {
    zones: Vec<ConflictZone>,
    windows: PeriodWindows,
    shape: Arc<dyn ZoneShapeTest>,
}

impl std::fmt::Debug for ZoneRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneRegistry")
            .field("zones", &self.zones)
            .field("windows", &self.windows)
            .finish_non_exhaustive()
    }
}

impl ZoneRegistry {
    pub fn new(zones: Vec<ConflictZone>, windows: PeriodWindows) -> Self {
        Self {
            zones,
            windows,
            shape: Arc::new(BoundingBoxTest),
        }
    }

    /// Replace the containment rule.
    pub fn with_shape_test(mut self, shape: Arc<dyn ZoneShapeTest>) -> Self {
        self.shape = shape;
        self
    }

    pub fn zones(&self) -> &[ConflictZone] {
        &self.zones
    }

    pub fn windows(&self) -> &PeriodWindows {
        &self.windows
    }

    /// `zone.start <= P.end AND (zone.end IS NULL OR zone.end >= P.start)`
    pub fn is_zone_active(&self, zone: &ConflictZone, period: Period) -> bool {
        self.windows
            .window(period)
            .overlaps(zone.start_time, zone.end_time)
    }

    pub fn list_active_zones(&self, period: Period) -> Vec<&ConflictZone> {
        self.zones
            .iter()
            .filter(|zone| self.is_zone_active(zone, period))
            .collect()
    }

    /// Active zones containing the point.
    pub fn zones_containing(&self, lat: f64, lon: f64, period: Period) -> Vec<&ConflictZone> {
        self.zones
            .iter()
            .filter(|zone| self.is_zone_active(zone, period))
            .filter(|zone| self.shape.contains(zone, lat, lon))
            .collect()
    }

    /// Highest-severity active zone containing the corridor midpoint.
    pub fn zone_for_segment(&self, a: GeoPoint, b: GeoPoint, period: Period) -> Option<&ConflictZone> {
        let mid = corridor_midpoint(a, b);
        self.zones_containing(mid.lat, mid.lon, period)
            .into_iter()
            .max_by_key(|zone| zone.severity)
    }

    /// Approximation: only the corridor midpoint is tested.
    pub fn segment_intersects_active_zone(&self, a: GeoPoint, b: GeoPoint, period: Period) -> bool {
        self.zone_for_segment(a, b, period).is_some()
    }
}

/// Parse a stored zone boundary into a `[lon, lat]` ring.
///
/// Accepts WKT `POLYGON((lon lat, ...))`, a GeoJSON polygon coordinate
/// array (`[[[lon, lat], ...]]`) or a bare ring (`[[lon, lat], ...]`).
pub fn parse_polygon(raw: &str) -> Result<Vec<[f64; 2]>, ImpactError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ImpactError::Computation("empty zone geometry".to_string()));
    }

    let ring = if trimmed.to_ascii_uppercase().starts_with("POLYGON") {
        parse_wkt_polygon(trimmed)?
    } else if let Ok(rings) = serde_json::from_str::<Vec<Vec<[f64; 2]>>>(trimmed) {
        rings
            .into_iter()
            .next()
            .ok_or_else(|| ImpactError::Computation("polygon has no rings".to_string()))?
    } else {
        serde_json::from_str::<Vec<[f64; 2]>>(trimmed)
            .map_err(|err| ImpactError::Computation(format!("unparseable zone geometry: {}", err)))?
    };

    if ring.iter().flatten().any(|value| !value.is_finite()) {
        return Err(ImpactError::Computation("non-finite coordinate".to_string()));
    }
    if ring.len() < 4 {
        return Err(ImpactError::Computation(format!(
            "ring has {} points, need at least 4",
            ring.len()
        )));
    }
    Ok(ring)
}

fn parse_wkt_polygon(wkt: &str) -> Result<Vec<[f64; 2]>, ImpactError> {
    let open = wkt
        .find("((")
        .ok_or_else(|| ImpactError::Computation("WKT polygon missing '(('".to_string()))?;
    let body = &wkt[open + 2..];
    let close = body
        .find(')')
        .ok_or_else(|| ImpactError::Computation("WKT polygon missing ')'".to_string()))?;

    body[..close]
        .split(',')
        .map(|pair| {
            let mut parts = pair.split_whitespace().map(str::parse::<f64>);
            match (parts.next(), parts.next(), parts.next()) {
                (Some(Ok(lon)), Some(Ok(lat)), None) => Ok([lon, lat]),
                _ => Err(ImpactError::Computation(format!(
                    "bad WKT coordinate '{}'",
                    pair.trim()
                ))),
            }
        })
        .collect()
}
