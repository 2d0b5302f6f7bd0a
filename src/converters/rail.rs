use anyhow::Result;
use rand::Rng;
use tracing::info;

use crate::config::RailSettings;
use crate::converters::types::{Conversion, StopProperties, TransitMode, point_feature};
use crate::geometry::SyntheticArea;
use crate::hourly::HourlyCurve;
use crate::parser::RidershipRow;
use crate::stats::ConversionStats;

/// Running per-mode admission counts for a single rail conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RailQuota {
    pub commuter_rail: usize,
    pub light_rail: usize,
}

impl RailQuota {
    pub fn total(&self) -> usize {
        self.commuter_rail + self.light_rail
    }

    /// Counts `mode` against its quota. Returns `false` when the row must be skipped.
    pub fn admit(&mut self, mode: TransitMode, settings: &RailSettings) -> bool {
        match mode {
            TransitMode::CommuterRail if self.commuter_rail < settings.commuter_rail_quota => {
                self.commuter_rail += 1;
                true
            }
            TransitMode::LightRail if self.light_rail < settings.light_rail_quota => {
                self.light_rail += 1;
                true
            }
            _ => false,
        }
    }

    pub fn is_full(&self, settings: &RailSettings) -> bool {
        self.total() >= settings.max_features
    }
}

/// Converts commuter and light rail stop rows into Point features.
///
/// Other modes are skipped. The row whose admission brings the combined
/// count to `max_features` is counted but not emitted, and nothing after it
/// is read, so at most `max_features - 1` features come out.
#[tracing::instrument(skip_all, fields(max = settings.max_features))]
pub fn convert_rail<R: Rng + ?Sized>(
    rows: impl IntoIterator<Item = Result<RidershipRow>>,
    settings: &RailSettings,
    area: &SyntheticArea,
    rng: &mut R,
) -> Result<Conversion> {
    let mut stats = ConversionStats::new("rail");
    let mut features = Vec::new();
    let mut quota = RailQuota::default();

    for row in rows {
        if quota.is_full(settings) {
            break;
        }
        let row = row?;
        stats.rows_read += 1;

        let Some(mode) = TransitMode::from_rail_label(&row.mode) else {
            stats.rows_skipped += 1;
            continue;
        };
        if !quota.admit(mode, settings) {
            stats.rows_skipped += 1;
            continue;
        }
        if quota.is_full(settings) {
            break;
        }

        let position = area.sample(rng);
        let avg = row.avg_boardings_or(settings.default_avg_boardings);

        let properties = StopProperties {
            name: row.stop_name.clone(),
            mode,
            line: row.route.clone(),
            hourly_counts: HourlyCurve::synthesize(avg, settings.amplitude),
        };

        stats.hourly_total += properties.hourly_counts.total();
        features.push(point_feature(position, &properties)?);
    }

    stats.features_written = features.len();
    stats.commuter_rail = quota.commuter_rail;
    stats.light_rail = quota.light_rail;

    info!(
        features = stats.features_written,
        commuter_rail = quota.commuter_rail,
        light_rail = quota.light_rail,
        skipped = stats.rows_skipped,
        hourly_total = stats.hourly_total,
        "Rail stops converted"
    );

    Ok(Conversion { features, stats })
}
