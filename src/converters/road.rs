use anyhow::Result;
use geo::{Coord, LineString};
use tracing::info;

use crate::config::RoadSettings;
use crate::converters::types::{Conversion, RoadProperties, line_feature};
use crate::geometry::CityBoundary;
use crate::hourly::HourlyCurve;
use crate::parser::{TrafficRow, parse_line_coordinates};
use crate::stats::ConversionStats;

/// Converts traffic-count rows into LineString features inside `boundary`.
///
/// A row is dropped when its AADT does not parse, when no coordinate pair in
/// its geometry parses, or when the line's centroid is not strictly inside
/// the boundary. Scanning stops after `max_features` accepted rows.
#[tracing::instrument(skip_all, fields(max = settings.max_features))]
pub fn convert_road(
    rows: impl IntoIterator<Item = Result<TrafficRow>>,
    boundary: &CityBoundary,
    settings: &RoadSettings,
) -> Result<Conversion> {
    let mut stats = ConversionStats::new("road");
    let mut features = Vec::new();

    let mut rows = rows.into_iter();

    while features.len() < settings.max_features {
        let Some(row) = rows.next() else {
            break;
        };
        let row = row?;
        stats.rows_read += 1;

        let Some(aadt) = row.aadt else {
            stats.rows_skipped += 1;
            continue;
        };

        let coordinates = parse_line_coordinates(&row.geometry_text);
        if coordinates.is_empty() {
            stats.rows_skipped += 1;
            continue;
        }

        let line: LineString<f64> = coordinates
            .iter()
            .map(|&[x, y]| Coord { x, y })
            .collect();
        if !boundary.contains_centroid(&line) {
            stats.outside_boundary += 1;
            continue;
        }

        let properties = RoadProperties {
            route_name: row.route_name.clone(),
            location: row.location.clone(),
            hourly_counts: HourlyCurve::synthesize(aadt as f64, settings.amplitude),
        };

        stats.hourly_total += properties.hourly_counts.total();
        features.push(line_feature(&coordinates, &properties)?);
    }

    stats.features_written = features.len();
    info!(
        features = stats.features_written,
        hourly_total = stats.hourly_total,
        skipped = stats.rows_skipped,
        outside_boundary = stats.outside_boundary,
        "Road segments converted"
    );

    Ok(Conversion { features, stats })
}
