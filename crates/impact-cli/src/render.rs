//! Plain-text rendering of API responses.

use impact_core::{
    Airport, FeatureCollection, Geometry, HeatmapProperties, Period, RouteComparison,
    StatsSummary, ZoneProperties,
};
use std::fmt::Write;

pub fn comparison(origin: &str, destination: &str, cmp: &RouteComparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} → {}", origin.to_uppercase(), destination.to_uppercase());
    let _ = writeln!(out, "  {:<10} {:>10} {:>10}", "", "baseline", "during");
    let _ = writeln!(
        out,
        "  {:<10} {:>7} km {:>7} km",
        "distance", cmp.baseline_distance, cmp.during_distance
    );
    let _ = writeln!(
        out,
        "  {:<10} {:>6} min {:>6} min",
        "time", cmp.baseline_time, cmp.during_time
    );
    if cmp.detour_km > 0 {
        let _ = writeln!(
            out,
            "  detour {} km, extra fuel {} l, CO2 {:.2} t",
            cmp.detour_km, cmp.extra_fuel, cmp.co2_impact
        );
    } else {
        let _ = writeln!(out, "  no detour");
    }
    out
}

pub fn stats(period: Period, summary: &StatsSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Statistics ({})", period);
    let _ = writeln!(out, "  flights:          {}", summary.total_flights);
    let _ = writeln!(out, "  avg detour:       {} km", summary.avg_detour);
    let _ = writeln!(out, "  total extra:      {} km", summary.total_extra_km);
    let _ = writeln!(out, "  avg delay:        {} min", summary.avg_delay);
    let _ = writeln!(out, "  CO2 impact:       {} t", summary.co2_impact);
    let _ = writeln!(out, "  affected routes:  {}", summary.affected_routes);
    if let Some(top) = &summary.top_affected_routes {
        let _ = writeln!(out, "  most affected:");
        for entry in top {
            let _ = writeln!(out, "    {:<12} {:>5} km  {:?}", entry.route, entry.detour, entry.impact);
        }
    }
    out
}

pub fn airports(airports: &[Airport]) -> String {
    let mut out = String::new();
    for airport in airports {
        let location = match airport.location {
            Some(p) => format!("{:>8.4} {:>9.4}", p.lat, p.lon),
            None => format!("{:>18}", "-"),
        };
        let _ = writeln!(
            out,
            "{}  {}  {}, {}  ({})",
            airport.iata, location, airport.city, airport.country, airport.name
        );
    }
    out
}

pub fn conflicts(period: Period, zones: &FeatureCollection<ZoneProperties>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} active zone(s) ({})", zones.features.len(), period);
    for feature in &zones.features {
        let zone = &feature.properties;
        let until = zone
            .end_time
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "ongoing".to_string());
        let _ = writeln!(
            out,
            "  [{}] {} severity {}  {} .. {}",
            zone.id,
            zone.name,
            zone.severity,
            zone.start_time.format("%Y-%m-%d"),
            until
        );
    }
    out
}

pub fn heatmap(period: Period, layer: &FeatureCollection<HeatmapProperties>) -> String {
    let mut out = String::new();
    let count = layer.features.len();
    let _ = writeln!(out, "{} heatmap point(s) ({})", count, period);
    if count == 0 {
        return out;
    }

    let mean = layer.features.iter().map(|f| f.properties.intensity).sum::<f64>() / count as f64;
    let flights: u64 = layer.features.iter().map(|f| u64::from(f.properties.flight_count)).sum();
    let _ = writeln!(out, "  mean intensity {:.2}, {} flights", mean, flights);

    let hottest = layer.features.iter().max_by(|a, b| {
        a.properties
            .intensity
            .partial_cmp(&b.properties.intensity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if let Some(feature) = hottest {
        if let Geometry::Point { coordinates } = feature.geometry {
            let _ = writeln!(
                out,
                "  hottest at {:.2}, {:.2} (intensity {:.2})",
                coordinates[1], coordinates[0], feature.properties.intensity
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use impact_core::{heatmap_collection, zone_collection, HeatmapPoint, ReferenceDataset};

    #[test]
    fn comparison_mentions_detour_only_when_present() {
        let data = ReferenceDataset::builtin();
        let clear = comparison("fra", "lhr", data.route("FRA", "LHR").unwrap());
        assert!(clear.starts_with("FRA → LHR"));
        assert!(clear.contains("no detour"));

        let detoured = comparison("VIE", "IST", data.route("VIE", "IST").unwrap());
        assert!(detoured.contains("detour 232 km, extra fuel 1624 l, CO2 5.10 t"));
    }

    #[test]
    fn stats_lists_top_routes_for_during() {
        let data = ReferenceDataset::builtin();
        let text = stats(Period::During, data.stats(Period::During));
        assert!(text.contains("flights:          41289"));
        assert!(text.contains("IST → FRA"));
        assert!(text.contains("High"));

        let baseline = stats(Period::Baseline, data.stats(Period::Baseline));
        assert!(!baseline.contains("most affected"));
    }

    #[test]
    fn conflicts_show_date_range() {
        let data = ReferenceDataset::builtin();
        let text = conflicts(Period::During, &zone_collection(data.zones()));
        assert!(text.starts_with("2 active zone(s) (during)"));
        assert!(text.contains("2022-02-24 .. 2024-12-31"));
    }

    #[test]
    fn heatmap_summary() {
        let points = vec![
            HeatmapPoint {
                lat: 50.0,
                lng: 8.5,
                period: Period::During,
                intensity: 0.8,
                flight_count: 80,
                avg_detour_km: 160.0,
            },
            HeatmapPoint {
                lat: 45.8,
                lng: 15.9,
                period: Period::During,
                intensity: 0.4,
                flight_count: 40,
                avg_detour_km: 80.0,
            },
        ];
        let text = heatmap(Period::During, &heatmap_collection(&points));
        assert!(text.contains("2 heatmap point(s)"));
        assert!(text.contains("mean intensity 0.60, 120 flights"));
        assert!(text.contains("hottest at 50.00, 8.50"));

        let empty = heatmap(Period::Baseline, &FeatureCollection::empty());
        assert_eq!(empty, "0 heatmap point(s) (baseline)\n");
    }

    #[test]
    fn airports_one_line_each() {
        let data = ReferenceDataset::builtin();
        let text = airports(data.airports());
        assert_eq!(text.lines().count(), 18);
        assert!(text.lines().any(|l| l.starts_with("FRA") && l.contains("Frankfurt, Germany")));
    }
}
