//! Minimal GeoJSON feature model for the map layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{round_non_negative, ConflictZone, HeatmapPoint};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionType {
    #[default]
    FeatureCollection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    #[default]
    Feature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// [lon, lat]
    Point { coordinates: [f64; 2] },
    /// Rings of [lon, lat]
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature<P> {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    pub properties: P,
    pub geometry: Geometry,
}

impl<P> Feature<P> {
    pub fn new(properties: P, geometry: Geometry) -> Self {
        Self {
            kind: FeatureType::Feature,
            properties,
            geometry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection<P> {
    #[serde(rename = "type")]
    pub kind: CollectionType,
    pub features: Vec<Feature<P>>,
}

impl<P> FeatureCollection<P> {
    pub fn new(features: Vec<Feature<P>>) -> Self {
        Self {
            kind: CollectionType::FeatureCollection,
            features,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapProperties {
    pub intensity: f64,
    pub flight_count: u32,
    pub avg_detour: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneProperties {
    pub id: String,
    pub name: String,
    pub severity: u8,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: String,
}

pub fn heatmap_collection(points: &[HeatmapPoint]) -> FeatureCollection<HeatmapProperties> {
    FeatureCollection::new(
        points
            .iter()
            .map(|point| {
                Feature::new(
                    HeatmapProperties {
                        intensity: point.intensity,
                        flight_count: point.flight_count,
                        avg_detour: round_non_negative(point.avg_detour_km),
                    },
                    Geometry::Point {
                        coordinates: [point.lng, point.lat],
                    },
                )
            })
            .collect(),
    )
}

pub fn zone_collection<'a, I>(zones: I) -> FeatureCollection<ZoneProperties>
where
    I: IntoIterator<Item = &'a ConflictZone>,
{
    FeatureCollection::new(
        zones
            .into_iter()
            .map(|zone| {
                Feature::new(
                    ZoneProperties {
                        id: zone.id.clone(),
                        name: zone.name.clone(),
                        severity: zone.severity,
                        start_time: zone.start_time,
                        end_time: zone.end_time,
                        description: zone.description.clone(),
                    },
                    Geometry::Polygon {
                        coordinates: vec![zone.polygon.clone()],
                    },
                )
            })
            .collect(),
    )
}
