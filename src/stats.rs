use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-run summary for one converter or combine step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub timestamp: DateTime<Utc>,
    pub dataset: String,
    pub output_path: Option<String>,
    pub rows_read: usize,
    pub features_written: usize,
    /// Sum of every emitted feature's hourly counts.
    pub hourly_total: u64,

    // row-level drops
    pub rows_skipped: usize,
    pub outside_boundary: usize,

    // rail mode split
    pub commuter_rail: usize,
    pub light_rail: usize,
}

impl ConversionStats {
    pub fn new(dataset: &str) -> Self {
        ConversionStats {
            timestamp: Utc::now(),
            dataset: dataset.to_string(),
            ..Default::default()
        }
    }

    /// Set the file the features were written to
    pub fn with_output(mut self, path: &str) -> Self {
        self.output_path = Some(path.to_string());
        self
    }

    fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    /// Percentage of rows read that became features.
    pub fn kept_pct(&self) -> f64 {
        Self::pct(self.features_written, self.rows_read)
    }
}
