//! CSV row parsing for ridership and traffic-count tables.
//!
//! Rows are deserialized by header name into loose string records, then
//! converted once into typed rows. Missing or malformed values become `None`
//! or empty strings here so converters never touch raw text.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::io::Read;

const MULTILINESTRING_PREFIX: &str = "MULTILINESTRING ((";
const MULTILINESTRING_SUFFIX: &str = "))";

#[derive(Debug, Default, Deserialize)]
struct StopRecord {
    #[serde(default)]
    stopname: Option<String>,
    #[serde(default)]
    routes: Option<String>,
    #[serde(default)]
    route: Option<String>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    avgboardings: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TrafficRecord {
    #[serde(default, rename = "AADT2013")]
    aadt: Option<String>,
    #[serde(default)]
    the_geom: Option<String>,
    #[serde(default, rename = "ROUTE_NAME")]
    route_name: Option<String>,
    #[serde(default, rename = "LOCATION")]
    location: Option<String>,
}

/// A bus or rail stop row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RidershipRow {
    pub stop_name: String,
    /// Comma-separated route list (bus tables).
    pub routes: String,
    /// Single route label (rail tables).
    pub route: String,
    pub mode: String,
    pub avg_boardings: Option<f64>,
}

impl RidershipRow {
    pub fn avg_boardings_or(&self, default: f64) -> f64 {
        self.avg_boardings.unwrap_or(default)
    }
}

impl From<StopRecord> for RidershipRow {
    fn from(record: StopRecord) -> Self {
        Self {
            stop_name: record.stopname.unwrap_or_default(),
            routes: record.routes.unwrap_or_default(),
            route: record.route.unwrap_or_default(),
            mode: record.mode.unwrap_or_default(),
            avg_boardings: record.avgboardings.as_deref().and_then(parse_count),
        }
    }
}

/// A traffic-count row with its embedded line geometry still as text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrafficRow {
    pub route_name: String,
    pub location: String,
    pub aadt: Option<i64>,
    pub geometry_text: String,
}

impl From<TrafficRecord> for TrafficRow {
    fn from(record: TrafficRecord) -> Self {
        Self {
            route_name: record.route_name.unwrap_or_default(),
            location: record.location.unwrap_or_default(),
            aadt: record.aadt.as_deref().and_then(parse_aadt),
            geometry_text: record.the_geom.unwrap_or_default(),
        }
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader)
}

/// Lazily reads stop rows from a header-driven CSV.
///
/// Records are only pulled as the caller advances, so a converter that stops
/// early never touches the rest of the file.
///
/// # Errors
///
/// Each item is an error if its record cannot be read (I/O or invalid UTF-8).
pub fn ridership_rows<R: Read>(reader: R) -> impl Iterator<Item = Result<RidershipRow>> {
    csv_reader(reader)
        .into_deserialize::<StopRecord>()
        .enumerate()
        .map(|(line, result)| {
            result
                .map(RidershipRow::from)
                .with_context(|| format!("Failed to read stop record {}", line + 1))
        })
}

/// Lazily reads traffic-count rows from a header-driven CSV.
///
/// # Errors
///
/// Each item is an error if its record cannot be read (I/O or invalid UTF-8).
pub fn traffic_rows<R: Read>(reader: R) -> impl Iterator<Item = Result<TrafficRow>> {
    csv_reader(reader)
        .into_deserialize::<TrafficRecord>()
        .enumerate()
        .map(|(line, result)| {
            result
                .map(TrafficRow::from)
                .with_context(|| format!("Failed to read traffic record {}", line + 1))
        })
}

/// Parses an average-ridership value. Non-numeric and non-finite text yields `None`.
pub fn parse_count(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses an AADT integer, ignoring thousands separators.
pub fn parse_aadt(raw: &str) -> Option<i64> {
    raw.replace(',', "").trim().parse().ok()
}

/// Extracts `[lng, lat]` pairs from `MULTILINESTRING ((lng lat, ...))` text.
///
/// Part boundaries are flattened into a single sequence. Tokens that do not
/// hold exactly two numbers are skipped.
pub fn parse_line_coordinates(geometry: &str) -> Vec<[f64; 2]> {
    let body = geometry
        .replace(MULTILINESTRING_PREFIX, "")
        .replace(MULTILINESTRING_SUFFIX, "");

    body.split(',')
        .map(|token| token.trim_matches(|c: char| c == ' ' || c == '(' || c == ')'))
        .filter_map(parse_coordinate)
        .collect()
}

fn parse_coordinate(token: &str) -> Option<[f64; 2]> {
    let mut parts = token.split_whitespace();
    let lng = parts.next()?.parse().ok()?;
    let lat = parts.next()?.parse().ok()?;

    if parts.next().is_some() {
        return None;
    }

    Some([lng, lat])
}
