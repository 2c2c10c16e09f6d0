use rolling_stats::Stats;
use serde::Serialize;

use crate::signal_processing::median;

/// Summary of an externally recorded reference rate series
///
/// Only used for side-by-side reporting; it never feeds estimation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceSummary {
    pub count: usize,
    pub median: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl ReferenceSummary {
    /// Summarise the finite values of a series; `None` when there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let median = median(values)?;

        let mut stats: Stats<f64> = Stats::new();
        for &value in values.iter().filter(|v| v.is_finite()) {
            stats.update(value);
        }

        Some(Self {
            count: stats.count,
            median,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }

    /// Signed difference `estimate - median`.
    pub fn difference(&self, estimate: f64) -> f64 {
        estimate - self.median
    }
}
