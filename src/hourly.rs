//! Synthetic hourly load curves.
//!
//! Source datasets only carry a daily average, so each feature gets a
//! 24-bucket curve derived from that average with a sinusoid shifted by a
//! fixed 7-hour phase offset, giving a morning-shifted demand shape.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const HOURS_PER_DAY: usize = 24;

/// Hour at which the sinusoid crosses zero on its way up.
pub const PHASE_OFFSET_HOURS: f64 = 7.0;

/// Twenty-four non-negative counts, one per hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HourlyCurve([u32; HOURS_PER_DAY]);

impl HourlyCurve {
    /// Redistributes `avg` over the day:
    ///
    /// `hour[h] = max(0, round(avg/24 + amplitude*avg*sin(2π(h-7)/24)))`
    pub fn synthesize(avg: f64, amplitude: f64) -> Self {
        let mut counts = [0u32; HOURS_PER_DAY];
        let base = avg / HOURS_PER_DAY as f64;

        for (hour, slot) in counts.iter_mut().enumerate() {
            let phase = 2.0 * PI * (hour as f64 - PHASE_OFFSET_HOURS) / HOURS_PER_DAY as f64;
            let value = (base + amplitude * avg * phase.sin()).round();
            // `as` saturates, NaN becomes 0
            *slot = value.max(0.0) as u32;
        }

        Self(counts)
    }

    pub fn counts(&self) -> &[u32; HOURS_PER_DAY] {
        &self.0
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|&c| u64::from(c)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_curve_without_amplitude() {
        let curve = HourlyCurve::synthesize(24.0, 0.0);
        assert_eq!(curve.counts(), &[1u32; 24]);
        assert_eq!(curve.total(), 24);
    }

    #[test]
    fn test_always_24_non_negative_values() {
        for avg in [0.0, 1.0, 10.0, 25.0, 333.3, 48_000.0] {
            for k in [0.1, 0.5, 0.6, 0.7, 2.0] {
                let curve = HourlyCurve::synthesize(avg, k);
                assert_eq!(curve.counts().len(), HOURS_PER_DAY);
            }
        }
    }

    #[test]
    fn test_known_values_for_bus_amplitude() {
        let curve = HourlyCurve::synthesize(100.0, 0.5);
        let counts = curve.counts();

        // sin peaks six hours after the offset
        assert_eq!(counts[13], 54);
        assert_eq!(counts.iter().max(), Some(&54));
        // trough clamps to zero
        assert_eq!(counts[1], 0);
        // zero crossing leaves only the base term
        assert_eq!(counts[7], 4);
        assert_eq!(counts[19], 4);
    }

    #[test]
    fn test_negative_average_clamps_to_zero() {
        let curve = HourlyCurve::synthesize(-50.0, 0.5);
        assert!(curve.counts()[13] == 0);
        // trough of a negative average flips positive
        assert!(curve.counts()[1] > 0);
    }

    #[test]
    fn test_nan_average_yields_zeros() {
        let curve = HourlyCurve::synthesize(f64::NAN, 0.5);
        assert_eq!(curve.total(), 0);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let curve = HourlyCurve::synthesize(24.0, 0.0);
        let json = serde_json::to_string(&curve).unwrap();
        assert!(json.starts_with("[1,1,"));
        assert!(json.ends_with(",1]"));
    }
}
