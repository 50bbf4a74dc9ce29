//! Core data models for the impact engine.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ImpactError;
use crate::geo::GeoPoint;

// ========== REFERENCE DATA ==========

/// Airport directory entry. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub iata: String,
    pub name: String,
    pub city: String,
    pub country: String,
    /// Missing for records imported without coordinates
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

impl Airport {
    pub fn new(iata: &str, name: &str, city: &str, country: &str, lat: f64, lon: f64) -> Self {
        Self {
            iata: iata.to_string(),
            name: name.to_string(),
            city: city.to_string(),
            country: country.to_string(),
            location: Some(GeoPoint::new(lat, lon)),
        }
    }

    /// Location or `InvalidLocation` when the record has no coordinates.
    pub fn require_location(&self) -> Result<GeoPoint, ImpactError> {
        self.location
            .ok_or_else(|| ImpactError::InvalidLocation(self.iata.clone()))
    }
}

/// Lookup seam for the airport directory.
pub trait AirportLookup {
    fn get_airport(&self, iata: &str) -> Option<Airport>;
}

impl AirportLookup for std::collections::HashMap<String, Airport> {
    fn get_airport(&self, iata: &str) -> Option<Airport> {
        self.get(iata).cloned()
    }
}

impl AirportLookup for [Airport] {
    fn get_airport(&self, iata: &str) -> Option<Airport> {
        self.iter().find(|airport| airport.iata == iata).cloned()
    }
}

// ========== PERIODS ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Pre-conflict reference window
    Baseline,
    /// Active-conflict window
    During,
}

impl Period {
    pub const ALL: [Period; 2] = [Period::Baseline, Period::During];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Baseline => "baseline",
            Period::During => "during",
        }
    }

    /// Parse an optional query value; absent or blank means baseline.
    pub fn parse_or_default(value: Option<&str>) -> Result<Self, ImpactError> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => raw.parse(),
            None => Ok(Period::Baseline),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ImpactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baseline" => Ok(Period::Baseline),
            "during" => Ok(Period::During),
            other => Err(ImpactError::InvalidInput(format!(
                "Unknown period '{}' (expected 'baseline' or 'during')",
                other
            ))),
        }
    }
}

/// Evaluation window of a period. `end: None` means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl PeriodWindow {
    /// Interval intersection with a zone validity window.
    pub fn overlaps(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> bool {
        let starts_before_window_ends = self.end.map_or(true, |window_end| start <= window_end);
        let ends_after_window_starts = end.map_or(true, |zone_end| zone_end >= self.start);
        starts_before_window_ends && ends_after_window_starts
    }
}

/// Windows for both periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindows {
    pub baseline: PeriodWindow,
    pub during: PeriodWindow,
}

impl PeriodWindows {
    pub fn window(&self, period: Period) -> PeriodWindow {
        match period {
            Period::Baseline => self.baseline,
            Period::During => self.during,
        }
    }

    /// Cap the during window, e.g. to calendar year 2022 only.
    pub fn with_during_end(mut self, end: Option<DateTime<Utc>>) -> Self {
        self.during.end = end;
        self
    }
}

impl Default for PeriodWindows {
    fn default() -> Self {
        Self {
            baseline: PeriodWindow {
                start: utc(2021, 1, 1, 0, 0, 0),
                end: Some(utc(2021, 12, 31, 23, 59, 59)),
            },
            during: PeriodWindow {
                start: utc(2022, 1, 1, 0, 0, 0),
                end: None,
            },
        }
    }
}

pub(crate) fn utc(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .unwrap_or_default()
}

// ========== CONFLICT ZONES ==========

/// Axis-aligned lat/lon rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self { min_lat, max_lat, min_lon, max_lon }
    }

    /// Extents of a `[lon, lat]` ring. `None` for an empty ring.
    pub fn from_ring(ring: &[[f64; 2]]) -> Option<Self> {
        let first = ring.first()?;
        let mut bbox = BoundingBox::new(first[1], first[1], first[0], first[0]);
        for vertex in &ring[1..] {
            bbox.min_lon = bbox.min_lon.min(vertex[0]);
            bbox.max_lon = bbox.max_lon.max(vertex[0]);
            bbox.min_lat = bbox.min_lat.min(vertex[1]);
            bbox.max_lat = bbox.max_lat.max(vertex[1]);
        }
        Some(bbox)
    }

    /// Strict interior test; points on the edge are outside.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat > self.min_lat && lat < self.max_lat && lon > self.min_lon && lon < self.max_lon
    }
}

/// A declared conflict or tension zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictZone {
    pub id: String,
    pub name: String,
    /// 1 (lowest) to 3 (highest)
    pub severity: u8,
    pub start_time: DateTime<Utc>,
    /// `None` while the zone is still active
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Boundary ring as [lon, lat] pairs (closed ring - first == last)
    pub polygon: Vec<[f64; 2]>,
    /// Routing box used by the corridor heuristic; polygon extents when absent
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub description: String,
}

impl ConflictZone {
    /// Routing box: explicit box or polygon extents.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounding_box.or_else(|| BoundingBox::from_ring(&self.polygon))
    }

    /// Check if a point is inside this zone's polygon (ray casting).
    pub fn polygon_contains(&self, lat: f64, lon: f64) -> bool {
        let n = self.polygon.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let xi = self.polygon[i][0];
            let yi = self.polygon[i][1];
            let xj = self.polygon[j][0];
            let yj = self.polygon[j][1];

            if ((yi > lat) != (yj > lat)) && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi) {
                inside = !inside;
            }
            j = i;
        }

        inside
    }

    /// Validate zone configuration.
    /// Returns list of validation errors (empty = valid).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.id.trim().is_empty() {
            errors.push("Zone id must not be empty".to_string());
        }
        if !(1..=3).contains(&self.severity) {
            errors.push(format!("Severity {} outside 1-3", self.severity));
        }
        if let Some(end) = self.end_time {
            if end < self.start_time {
                errors.push("End time must not precede start time".to_string());
            }
        }
        if self.polygon.len() < 4 {
            errors.push("Polygon ring must have at least 4 points".to_string());
        } else if let (Some(first), Some(last)) = (self.polygon.first(), self.polygon.last()) {
            if (first[0] - last[0]).abs() > 1e-9 || (first[1] - last[1]).abs() > 1e-9 {
                errors.push("Polygon must be closed (first vertex must equal last)".to_string());
            }
        }
        if let Some(bbox) = self.bounding_box {
            if bbox.min_lat >= bbox.max_lat || bbox.min_lon >= bbox.max_lon {
                errors.push("Bounding box must have min < max on both axes".to_string());
            }
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ========== IMPACT RECORDS ==========

/// Per-route impact for one period. Keyed on (origin, destination, period).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteImpactRecord {
    pub origin_iata: String,
    pub destination_iata: String,
    pub period: Period,
    pub avg_distance_km: f64,
    pub avg_flight_time_minutes: f64,
    pub avg_detour_km: f64,
    pub total_extra_fuel_liters: f64,
    pub total_co2_impact_tons: f64,
    pub total_flights: u32,
}

impl RouteImpactRecord {
    pub fn key(&self) -> (&str, &str, Period) {
        (&self.origin_iata, &self.destination_iata, self.period)
    }
}

/// Route comparison payload returned to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteComparison {
    pub baseline_distance: u64,
    pub during_distance: u64,
    pub detour_km: u64,
    pub baseline_time: u64,
    pub during_time: u64,
    pub extra_fuel: u64,
    /// Tons, two decimals
    pub co2_impact: f64,
}

impl RouteComparison {
    /// Build from the two period records. Integers except CO2 (2 decimals).
    pub fn from_records(baseline: &RouteImpactRecord, during: &RouteImpactRecord) -> Self {
        Self {
            baseline_distance: round_non_negative(baseline.avg_distance_km),
            during_distance: round_non_negative(during.avg_distance_km),
            detour_km: round_non_negative(during.avg_detour_km),
            baseline_time: round_non_negative(baseline.avg_flight_time_minutes),
            during_time: round_non_negative(during.avg_flight_time_minutes),
            extra_fuel: round_non_negative(during.total_extra_fuel_liters),
            co2_impact: (during.total_co2_impact_tons * 100.0).round() / 100.0,
        }
    }
}

/// Rounded to the nearest integer; negatives and NaN become 0.
pub(crate) fn round_non_negative(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

/// A single recorded (or sampled) flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightTrack {
    pub flight_number: String,
    pub origin_iata: String,
    pub destination_iata: String,
    pub period: Period,
    pub departure_time: DateTime<Utc>,
    /// Flown line as [lon, lat] vertices
    pub route: Vec<[f64; 2]>,
    pub distance_km: f64,
    pub flight_time_minutes: f64,
    pub detour_km: f64,
    pub extra_fuel_liters: f64,
    pub co2_impact_tons: f64,
}

// ========== HEATMAP ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    pub lat: f64,
    pub lng: f64,
    pub period: Period,
    /// In (0, 1]
    pub intensity: f64,
    pub flight_count: u32,
    pub avg_detour_km: f64,
}

impl HeatmapPoint {
    /// Stable storage key: 0.1 degree grid cell.
    pub fn grid_cell(&self) -> String {
        grid_cell_key(self.lat, self.lng)
    }
}

pub fn grid_cell_key(lat: f64, lng: f64) -> String {
    format!("{}_{}", (lat * 10.0).floor() as i64, (lng * 10.0).floor() as i64)
}

// ========== STATISTICS ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactTier {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedRoute {
    /// "ORIG → DEST"
    pub route: String,
    pub detour: u64,
    pub impact: ImpactTier,
}

impl AffectedRoute {
    pub fn new(origin: &str, destination: &str, detour: u64, impact: ImpactTier) -> Self {
        Self {
            route: format!("{} → {}", origin, destination),
            detour,
            impact,
        }
    }
}

/// Fleet-level summary for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_flights: u64,
    pub avg_detour: u64,
    pub total_extra_km: u64,
    pub avg_delay: u64,
    pub co2_impact: u64,
    pub affected_routes: u64,
    /// Present for the during period only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_affected_routes: Option<Vec<AffectedRoute>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> ConflictZone {
        ConflictZone {
            id: "z".to_string(),
            name: "Zone".to_string(),
            severity: 2,
            start_time: start,
            end_time: end,
            polygon: vec![[22.0, 52.0], [35.0, 52.0], [35.0, 45.0], [22.0, 45.0], [22.0, 52.0]],
            bounding_box: None,
            description: String::new(),
        }
    }

    #[test]
    fn period_parsing() {
        assert_eq!("During".parse::<Period>().unwrap(), Period::During);
        assert_eq!(Period::parse_or_default(None).unwrap(), Period::Baseline);
        assert_eq!(Period::parse_or_default(Some("  ")).unwrap(), Period::Baseline);
        assert!(matches!(
            Period::parse_or_default(Some("2023")),
            Err(ImpactError::InvalidInput(_))
        ));
    }

    #[test]
    fn window_overlap_rules() {
        let windows = PeriodWindows::default();
        let baseline = windows.window(Period::Baseline);
        let during = windows.window(Period::During);

        let invasion = utc(2022, 2, 24, 0, 0, 0);
        assert!(!baseline.overlaps(invasion, None));
        assert!(during.overlaps(invasion, None));

        // Ended before the baseline window opened.
        assert!(!baseline.overlaps(utc(2019, 1, 1, 0, 0, 0), Some(utc(2020, 12, 31, 0, 0, 0))));
        // Touches the boundary exactly.
        assert!(baseline.overlaps(utc(2019, 1, 1, 0, 0, 0), Some(utc(2021, 1, 1, 0, 0, 0))));
        assert!(baseline.overlaps(utc(2021, 12, 31, 23, 59, 59), None));
    }

    #[test]
    fn capped_during_window_excludes_later_zones() {
        let windows = PeriodWindows::default().with_during_end(Some(utc(2022, 12, 31, 23, 59, 59)));
        assert!(!windows.during.overlaps(utc(2023, 10, 1, 0, 0, 0), None));
        assert!(PeriodWindows::default().during.overlaps(utc(2023, 10, 1, 0, 0, 0), None));
    }

    #[test]
    fn bounds_prefer_explicit_box() {
        let mut z = zone(utc(2022, 1, 1, 0, 0, 0), None);
        assert_eq!(z.bounds(), Some(BoundingBox::new(45.0, 52.0, 22.0, 35.0)));
        z.bounding_box = Some(BoundingBox::new(45.0, 52.0, 25.0, 35.0));
        assert_eq!(z.bounds(), Some(BoundingBox::new(45.0, 52.0, 25.0, 35.0)));
    }

    #[test]
    fn bounding_box_is_strict() {
        let bbox = BoundingBox::new(45.0, 52.0, 25.0, 35.0);
        assert!(bbox.contains(48.0, 30.0));
        assert!(!bbox.contains(45.0, 30.0));
        assert!(!bbox.contains(48.0, 35.0));
    }

    #[test]
    fn polygon_ray_casting() {
        let z = zone(utc(2022, 1, 1, 0, 0, 0), None);
        assert!(z.polygon_contains(48.0, 30.0));
        assert!(!z.polygon_contains(44.0, 30.0));
        assert!(!z.polygon_contains(48.0, 36.0));
    }

    #[test]
    fn validation_catches_bad_zones() {
        let good = zone(utc(2022, 1, 1, 0, 0, 0), Some(utc(2024, 1, 1, 0, 0, 0)));
        assert!(good.is_valid());

        let mut reversed = good.clone();
        reversed.end_time = Some(utc(2021, 1, 1, 0, 0, 0));
        assert_eq!(reversed.validate().len(), 1);

        let mut open = good.clone();
        open.polygon.pop();
        open.polygon.push([30.0, 30.0]);
        assert!(!open.is_valid());

        let mut short = good.clone();
        short.polygon.truncate(3);
        short.severity = 4;
        assert_eq!(short.validate().len(), 2);
    }

    #[test]
    fn comparison_rounding() {
        let base = RouteImpactRecord {
            origin_iata: "A".into(),
            destination_iata: "B".into(),
            period: Period::Baseline,
            avg_distance_km: 1047.6,
            avg_flight_time_minutes: 78.0,
            avg_detour_km: 0.0,
            total_extra_fuel_liters: 0.0,
            total_co2_impact_tons: 0.0,
            total_flights: 1,
        };
        let during = RouteImpactRecord {
            period: Period::During,
            avg_distance_km: 1279.6,
            avg_flight_time_minutes: 95.0,
            avg_detour_km: 232.0,
            total_extra_fuel_liters: 1624.0,
            total_co2_impact_tons: 5.1156,
            ..base.clone()
        };
        let cmp = RouteComparison::from_records(&base, &during);
        assert_eq!(cmp.baseline_distance, 1048);
        assert_eq!(cmp.during_distance, 1280);
        assert_eq!(cmp.co2_impact, 5.12);

        let json = serde_json::to_value(&cmp).unwrap();
        assert_eq!(json["baselineDistance"], serde_json::json!(1048));
        assert!(json["detourKm"].is_u64());
        assert_eq!(json["co2Impact"], 5.12);
    }

    #[test]
    fn grid_cell_floors_toward_negative() {
        assert_eq!(grid_cell_key(50.07, 8.55), "500_85");
        assert_eq!(grid_cell_key(51.49, -0.11), "514_-2");
    }

    #[test]
    fn summary_omits_top_routes_when_absent() {
        let summary = StatsSummary {
            total_flights: 1,
            avg_detour: 0,
            total_extra_km: 0,
            avg_delay: 0,
            co2_impact: 0,
            affected_routes: 0,
            top_affected_routes: None,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("topAffectedRoutes").is_none());
        assert_eq!(json["totalFlights"], 1);
    }
}
