use anyhow::Result;
use rand::Rng;
use tracing::info;

use crate::config::BusSettings;
use crate::converters::types::{Conversion, StopProperties, TransitMode, point_feature};
use crate::geometry::SyntheticArea;
use crate::hourly::HourlyCurve;
use crate::parser::RidershipRow;
use crate::stats::ConversionStats;

/// `"Bus "` followed by the first entry of a comma-separated route list.
pub fn bus_line_label(routes: &str) -> String {
    let primary = routes.split(',').next().unwrap_or_default().trim();
    format!("Bus {primary}")
}

/// Converts the first `max_features` bus stop rows into Point features.
///
/// Rows are taken in order with no quality filter. Positions are synthetic.
#[tracing::instrument(skip_all, fields(max = settings.max_features))]
pub fn convert_bus<R: Rng + ?Sized>(
    rows: impl IntoIterator<Item = Result<RidershipRow>>,
    settings: &BusSettings,
    area: &SyntheticArea,
    rng: &mut R,
) -> Result<Conversion> {
    let mut stats = ConversionStats::new("bus");
    let mut features = Vec::new();
    let mut defaulted = 0usize;

    for row in rows.into_iter().take(settings.max_features) {
        let row = row?;
        stats.rows_read += 1;

        let position = area.sample(rng);

        if row.avg_boardings.is_none() {
            defaulted += 1;
        }
        let avg = row.avg_boardings_or(settings.default_avg_boardings);

        let properties = StopProperties {
            name: row.stop_name.clone(),
            mode: TransitMode::Bus,
            line: bus_line_label(&row.routes),
            hourly_counts: HourlyCurve::synthesize(avg, settings.amplitude),
        };

        stats.hourly_total += properties.hourly_counts.total();
        features.push(point_feature(position, &properties)?);
    }

    stats.features_written = features.len();
    info!(
        features = stats.features_written,
        defaulted_boardings = defaulted,
        hourly_total = stats.hourly_total,
        "Bus stops converted"
    );

    Ok(Conversion { features, stats })
}
