//! Statistics computation
//!
//! Exact summary statistics over raw millisecond samples. Samples are kept in
//! full until a bucket is finalized, so percentiles are computed from the real
//! sorted data rather than from a histogram approximation.
//!
//! - **min / max**: exact integer extrema
//! - **mean**: arithmetic mean, two-decimal precision
//! - **p5 / p95**: linear interpolation between closest ranks, two-decimal precision
//!
//! # Example
//!
//! ```
//! use logpulse::stats::MetricSummary;
//!
//! let summary = MetricSummary::from_samples(vec![5, 1, 4, 2, 3]).unwrap();
//! assert_eq!(summary.min, 1);
//! assert_eq!(summary.max, 5);
//! assert_eq!(summary.mean, 3.0);
//! assert_eq!(summary.p5, 1.2);
//! assert_eq!(summary.p95, 4.8);
//! assert_eq!(summary.count, 5);
//! ```

pub mod aggregator;
pub mod bucket;

pub use crate::parser::MetricKind;
use serde::Serialize;

/// Lower percentile reported per metric
pub const P_LOW: f64 = 5.0;

/// Upper percentile reported per metric
pub const P_HIGH: f64 = 95.0;

/// Round to two decimal places, ties to even
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Arithmetic mean of the samples, `None` when empty
pub fn mean(samples: &[u64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let sum: u128 = samples.iter().map(|&v| v as u128).sum();
    Some(sum as f64 / samples.len() as f64)
}

/// Percentile of ascending-sorted samples using linear interpolation
///
/// The rank is `p/100 * (n - 1)`; a fractional rank interpolates between the
/// values at its floor and ceiling. Returns `None` for an empty slice.
///
/// ```
/// use logpulse::stats::percentile;
///
/// assert_eq!(percentile(&[10], 95.0), Some(10.0));
/// assert_eq!(percentile(&[1, 2, 3, 4, 5], 50.0), Some(3.0));
/// assert_eq!(percentile(&[0, 10], 25.0), Some(2.5));
/// ```
pub fn percentile(sorted: &[u64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;

    let rank = (p / 100.0 * last as f64).clamp(0.0, last as f64);
    let lo = rank.floor() as usize;
    let hi = (rank.ceil() as usize).min(last);

    let lo_value = sorted[lo] as f64;
    let hi_value = sorted[hi] as f64;
    Some(lo_value + (hi_value - lo_value) * (rank - lo as f64))
}

/// Summary statistics for one metric of one pool in one bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub p5: f64,
    pub p95: f64,
    pub count: usize,
}

impl MetricSummary {
    /// Compute the summary, consuming the raw samples
    ///
    /// Returns `None` for an empty sample set; an absent summary is never
    /// replaced with zeros.
    pub fn from_samples(mut samples: Vec<u64>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        // Stable ascending sort; insertion order does not affect the result
        samples.sort();

        let count = samples.len();
        let mean = mean(&samples)?;
        let p5 = percentile(&samples, P_LOW)?;
        let p95 = percentile(&samples, P_HIGH)?;

        Some(Self {
            min: samples[0],
            max: samples[count - 1],
            mean: round2(mean),
            p5: round2(p5),
            p95: round2(p95),
            count,
        })
    }
}

/// Summaries of every metric for one pool in one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PoolSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_time: Option<MetricSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_byte_time: Option<MetricSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<MetricSummary>,
}

impl PoolSummary {
    /// Summary for one metric, if it had samples
    pub fn get(&self, kind: MetricKind) -> Option<&MetricSummary> {
        match kind {
            MetricKind::ConnectTime => self.connect_time.as_ref(),
            MetricKind::FirstByteTime => self.first_byte_time.as_ref(),
            MetricKind::ResponseTime => self.response_time.as_ref(),
        }
    }

    pub fn set(&mut self, kind: MetricKind, summary: Option<MetricSummary>) {
        match kind {
            MetricKind::ConnectTime => self.connect_time = summary,
            MetricKind::FirstByteTime => self.first_byte_time = summary,
            MetricKind::ResponseTime => self.response_time = summary,
        }
    }

    /// Present summaries in reporting order
    pub fn iter(&self) -> impl Iterator<Item = (MetricKind, &MetricSummary)> + '_ {
        MetricKind::ALL
            .into_iter()
            .filter_map(move |kind| self.get(kind).map(|summary| (kind, summary)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}
