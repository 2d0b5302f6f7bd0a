//! Feature property schemas and GeoJSON feature builders.

use anyhow::{Result, bail};
use geojson::{Feature, Geometry, JsonObject, Value};
use serde::Serialize;

use crate::hourly::HourlyCurve;
use crate::stats::ConversionStats;

/// Features produced by one converter run, in input order, plus its tally.
#[derive(Debug)]
pub struct Conversion {
    pub features: Vec<Feature>,
    pub stats: ConversionStats,
}

impl Conversion {
    pub fn into_collection(self) -> (geojson::FeatureCollection, ConversionStats) {
        let collection = geojson::FeatureCollection {
            bbox: None,
            features: self.features,
            foreign_members: None,
        };
        (collection, self.stats)
    }
}

/// Transit mode written to the `MODE` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransitMode {
    #[serde(rename = "Bus")]
    Bus,
    #[serde(rename = "Commuter Rail")]
    CommuterRail,
    #[serde(rename = "TRAX")]
    LightRail,
}

impl TransitMode {
    /// Maps a rail table's `mode` column. Other modes are not rail stops we keep.
    pub fn from_rail_label(label: &str) -> Option<Self> {
        match label {
            "Commuter Rail" => Some(Self::CommuterRail),
            "Light Rail" => Some(Self::LightRail),
            _ => None,
        }
    }
}

/// Properties shared by bus and rail stop features.
#[derive(Debug, Clone, Serialize)]
pub struct StopProperties {
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "MODE")]
    pub mode: TransitMode,
    #[serde(rename = "LINE")]
    pub line: String,
    pub hourly_counts: HourlyCurve,
}

/// Properties of a road segment feature.
#[derive(Debug, Clone, Serialize)]
pub struct RoadProperties {
    #[serde(rename = "ROUTE_NAME")]
    pub route_name: String,
    #[serde(rename = "LOCATION")]
    pub location: String,
    pub hourly_counts: HourlyCurve,
}

fn to_properties(value: &impl Serialize) -> Result<JsonObject> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => bail!("feature properties must serialize to an object, got {other}"),
    }
}

fn feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Builds a Point feature at `[lng, lat]`.
pub fn point_feature(position: [f64; 2], properties: &impl Serialize) -> Result<Feature> {
    Ok(feature(Value::Point(position.to_vec()), to_properties(properties)?))
}

/// Builds a LineString feature from `[lng, lat]` pairs.
pub fn line_feature(coordinates: &[[f64; 2]], properties: &impl Serialize) -> Result<Feature> {
    let line = coordinates.iter().map(|c| c.to_vec()).collect();
    Ok(feature(Value::LineString(line), to_properties(properties)?))
}
