//! File-to-file runs of each converter.
//!
//! Every run streams its CSV input through a converter, which stops reading
//! once its cap is hit, and writes one GeoJSON file.
//! Missing inputs and malformed top-level JSON are fatal.

use anyhow::{Context, Result};
use rand::Rng;
use std::fs::File;
use tracing::info;

use crate::config::ConverterSettings;
use crate::converters::{bus, combine, rail, road};
use crate::geometry::CityBoundary;
use crate::output::{read_feature_collection, write_feature_collection};
use crate::parser::{ridership_rows, traffic_rows};
use crate::stats::ConversionStats;

pub const BUS_INPUT: &str = "bus_stop_ridership_table.csv";
pub const BUS_OUTPUT: &str = "bus_ridership_hourly_sample.geojson";
pub const RAIL_INPUT: &str = "rail_stop_ridership_table.csv";
pub const RAIL_OUTPUT: &str = "rail_ridership_hourly_sample.geojson";
pub const ROAD_INPUT: &str = "2013_AADT_20251026.csv";
pub const BOUNDARY_INPUT: &str = "Salt_Lake_City_Boundary.geojson";
pub const ROAD_OUTPUT: &str = "traffic_hourly_slc_sample.geojson";
pub const COMBINED_OUTPUT: &str = "transit_combined_hourly.geojson";

fn open(path: &str) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open {path}"))
}

#[tracing::instrument(skip(settings, rng))]
pub fn run_bus<R: Rng + ?Sized>(
    input: &str,
    output: &str,
    settings: &ConverterSettings,
    rng: &mut R,
) -> Result<ConversionStats> {
    let rows = ridership_rows(open(input)?);
    let conversion = bus::convert_bus(rows, &settings.bus, &settings.synthetic_area, rng)?;
    let (collection, stats) = conversion.into_collection();

    write_feature_collection(output, &collection)?;
    Ok(stats.with_output(output))
}

#[tracing::instrument(skip(settings, rng))]
pub fn run_rail<R: Rng + ?Sized>(
    input: &str,
    output: &str,
    settings: &ConverterSettings,
    rng: &mut R,
) -> Result<ConversionStats> {
    let rows = ridership_rows(open(input)?);
    let conversion = rail::convert_rail(rows, &settings.rail, &settings.synthetic_area, rng)?;
    let (collection, stats) = conversion.into_collection();

    write_feature_collection(output, &collection)?;
    Ok(stats.with_output(output))
}

#[tracing::instrument(skip(settings))]
pub fn run_road(
    input: &str,
    boundary: &str,
    output: &str,
    settings: &ConverterSettings,
) -> Result<ConversionStats> {
    let boundary = CityBoundary::load(boundary)?;
    let rows = traffic_rows(open(input)?);
    let conversion = road::convert_road(rows, &boundary, &settings.road)?;
    let (collection, stats) = conversion.into_collection();

    write_feature_collection(output, &collection)?;
    Ok(stats.with_output(output))
}

/// Writes `first` then `second` into `output`. Returns the stats and the two input counts.
#[tracing::instrument]
pub fn run_combine(
    first: &str,
    second: &str,
    output: &str,
) -> Result<(ConversionStats, usize, usize)> {
    let first = read_feature_collection(first)?;
    let second = read_feature_collection(second)?;
    let (first_count, second_count) = (first.features.len(), second.features.len());

    let (combined, stats) = combine::combine_collections(first, second);
    write_feature_collection(output, &combined)?;

    info!(first_count, second_count, output, "Combined collection written");
    Ok((stats.with_output(output), first_count, second_count))
}
