pub mod error;
pub mod estimator;
pub mod geo;
pub mod geojson;
pub mod heatmap;
pub mod models;
pub mod reference;
pub mod samples;
pub mod stats;
pub mod zones;

pub use error::{ImpactError, ImpactResult};
pub use estimator::{DetourBand, ImpactConfig, RouteImpactEstimator, SeverityBand};
pub use geo::{corridor_midpoint, distance_between, great_circle_distance_km, GeoPoint};
pub use geojson::{
    heatmap_collection, zone_collection, Feature, FeatureCollection, Geometry, HeatmapProperties,
    ZoneProperties,
};
pub use heatmap::{CorridorAnchor, HeatmapConfig, HeatmapSynthesizer, ZoneDamping};
pub use models::{
    grid_cell_key, AffectedRoute, Airport, AirportLookup, BoundingBox, ConflictZone, FlightTrack,
    HeatmapPoint, ImpactTier, Period, PeriodWindow, PeriodWindows, RouteComparison,
    RouteImpactRecord, StatsSummary,
};
pub use reference::{ReferenceDataset, FALLBACK_ZONE_RING};
pub use samples::{generate_sample_fleet, SampleConfig, SampleFleet};
pub use stats::{DetourSample, StatsAggregator, StatsConfig};
pub use zones::{parse_polygon, BoundingBoxTest, PolygonTest, ZoneRegistry, ZoneShapeTest};
