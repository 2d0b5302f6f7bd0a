use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::geometry::SyntheticArea;

/// Tunables for every converter.
///
/// Loaded from a JSON file where any field may be omitted:
/// ```json
/// {
///   "bus": { "max_features": 50 },
///   "synthetic_area": { "center_lng": -111.9, "center_lat": 40.7 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterSettings {
    pub bus: BusSettings,
    pub rail: RailSettings,
    pub road: RoadSettings,
    pub synthetic_area: SyntheticArea,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    pub amplitude: f64,
    pub default_avg_boardings: f64,
    pub max_features: usize,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            amplitude: 0.5,
            default_avg_boardings: 10.0,
            max_features: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailSettings {
    pub amplitude: f64,
    pub default_avg_boardings: f64,
    pub commuter_rail_quota: usize,
    pub light_rail_quota: usize,
    /// Conversion stops once this many rows have been admitted across modes.
    pub max_features: usize,
}

impl Default for RailSettings {
    fn default() -> Self {
        Self {
            amplitude: 0.7,
            default_avg_boardings: 25.0,
            commuter_rail_quota: 20,
            light_rail_quota: 30,
            max_features: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadSettings {
    pub amplitude: f64,
    pub max_features: usize,
}

impl Default for RoadSettings {
    fn default() -> Self {
        Self {
            amplitude: 0.6,
            max_features: 300,
        }
    }
}

impl ConverterSettings {
    /// Loads settings from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {path}"))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {path}"))?;
        Ok(settings)
    }

    /// Loads from `path` when given, otherwise returns the built-in defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
