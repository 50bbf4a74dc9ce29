//! Spherical distance helpers.

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// GeoJSON coordinate order.
    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// Great-circle distance in kilometers using the Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
///
/// The intermediate term is clamped to [0, 1] so rounding near antipodes
/// cannot push the inverse trig outside its domain.
pub fn great_circle_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Distance between two points in kilometers.
pub fn distance_between(a: GeoPoint, b: GeoPoint) -> f64 {
    great_circle_distance_km(a.lat, a.lon, b.lat, b.lon)
}

/// Midpoint used by the corridor heuristic: plain average of the
/// coordinates, not the spherical midpoint.
pub fn corridor_midpoint(a: GeoPoint, b: GeoPoint) -> GeoPoint {
    GeoPoint::new((a.lat + b.lat) / 2.0, (a.lon + b.lon) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_distance_same_point() {
        assert_eq!(great_circle_distance_km(50.0379, 8.5622, 50.0379, 8.5622), 0.0);
        assert_eq!(great_circle_distance_km(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            ((50.0379, 8.5622), (51.4700, -0.4543)),
            ((48.1103, 16.5697), (41.2753, 28.7519)),
            ((-33.9, 151.2), (40.6, -73.8)),
        ];
        for ((lat1, lon1), (lat2, lon2)) in pairs {
            let ab = great_circle_distance_km(lat1, lon1, lat2, lon2);
            let ba = great_circle_distance_km(lat2, lon2, lat1, lon1);
            assert!((ab - ba).abs() < 1e-9, "{ab} != {ba}");
        }
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let dist = great_circle_distance_km(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111.195).abs() < 0.01);
    }

    #[test]
    fn test_antipodal_points() {
        let expected = PI * EARTH_RADIUS_KM;
        let cases = [(0.0, 0.0, 0.0, 180.0), (90.0, 0.0, -90.0, 0.0), (45.0, 10.0, -45.0, -170.0)];
        for (lat1, lon1, lat2, lon2) in cases {
            let dist = great_circle_distance_km(lat1, lon1, lat2, lon2);
            assert!(dist.is_finite());
            assert!((dist - expected).abs() < 1e-2, "got {dist}");
        }
    }

    #[test]
    fn test_tiny_separation_is_finite() {
        let dist = great_circle_distance_km(10.0, 10.0, 10.0 + 1e-12, 10.0);
        assert!(dist.is_finite());
        assert!(dist >= 0.0 && dist < 1e-6);
    }

    #[test]
    fn test_frankfurt_heathrow() {
        let dist = distance_between(GeoPoint::new(50.0379, 8.5622), GeoPoint::new(51.4700, -0.4543));
        assert!((dist - 655.0).abs() < 5.0, "got {dist}");
    }

    #[test]
    fn corridor_midpoint_averages_coordinates() {
        let mid = corridor_midpoint(GeoPoint::new(44.0, 26.0), GeoPoint::new(50.0, 31.0));
        assert_eq!(mid, GeoPoint::new(47.0, 28.5));
    }
}
