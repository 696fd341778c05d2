//! Time bucket accumulators
//!
//! A [`TimeBucket`] holds the raw samples of every pool for one half-open
//! window `[start, start + period)`. Raw samples are retained until
//! [`TimeBucket::finalize`] so that percentiles stay exact.

use super::{MetricKind, MetricSummary, PoolSummary};
use crate::parser::UpstreamMetrics;
use std::collections::BTreeMap;

/// Floor a timestamp to its epoch-aligned bucket start
///
/// Uses Euclidean remainder so timestamps before the epoch still floor
/// downwards.
///
/// ```
/// use logpulse::stats::bucket::bucket_start;
///
/// assert_eq!(bucket_start(1446249499322, 300_000), 1446249300000);
/// assert_eq!(bucket_start(-1, 1000), -1000);
/// ```
#[inline]
pub fn bucket_start(timestamp_ms: i64, period_ms: i64) -> i64 {
    timestamp_ms.saturating_sub(timestamp_ms.rem_euclid(period_ms))
}

/// Raw samples of one pool within one bucket
#[derive(Debug, Clone, Default)]
pub struct PoolSamples {
    connect_time: Vec<u64>,
    first_byte_time: Vec<u64>,
    response_time: Vec<u64>,
}

impl PoolSamples {
    fn samples_mut(&mut self, kind: MetricKind) -> &mut Vec<u64> {
        match kind {
            MetricKind::ConnectTime => &mut self.connect_time,
            MetricKind::FirstByteTime => &mut self.first_byte_time,
            MetricKind::ResponseTime => &mut self.response_time,
        }
    }

    /// Samples collected so far for one metric
    #[cfg(test)]
    pub(crate) fn samples(&self, kind: MetricKind) -> &[u64] {
        match kind {
            MetricKind::ConnectTime => &self.connect_time,
            MetricKind::FirstByteTime => &self.first_byte_time,
            MetricKind::ResponseTime => &self.response_time,
        }
    }

    /// Append every sample of one record's pool
    pub fn extend(&mut self, metrics: UpstreamMetrics) {
        let UpstreamMetrics {
            connect_time,
            first_byte_time,
            response_time,
        } = metrics;
        self.connect_time.extend(connect_time);
        self.first_byte_time.extend(first_byte_time);
        self.response_time.extend(response_time);
    }

    /// Compute the summaries, consuming the samples
    pub fn finalize(mut self) -> PoolSummary {
        let mut summary = PoolSummary::default();
        for kind in MetricKind::ALL {
            let samples = std::mem::take(self.samples_mut(kind));
            summary.set(kind, MetricSummary::from_samples(samples));
        }
        summary
    }
}

/// Accumulation state for one time window
#[derive(Debug, Clone)]
pub struct TimeBucket {
    start: i64,
    end: i64,
    pools: BTreeMap<String, PoolSamples>,
}

impl TimeBucket {
    /// Create an empty bucket covering `[start, start + period_ms)`
    pub fn new(start: i64, period_ms: i64) -> Self {
        Self {
            start,
            end: start.saturating_add(period_ms),
            pools: BTreeMap::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn start(&self) -> i64 {
        self.start
    }

    #[cfg(test)]
    pub(crate) fn end(&self) -> i64 {
        self.end
    }

    /// Whether a timestamp falls inside this bucket's window
    ///
    /// A window whose end saturated at `i64::MAX` is open above.
    pub(crate) fn contains(&self, timestamp_ms: i64) -> bool {
        timestamp_ms >= self.start && (timestamp_ms < self.end || self.end == i64::MAX)
    }

    /// Samples accumulated for a pool
    #[cfg(test)]
    pub(crate) fn pool(&self, name: &str) -> Option<&PoolSamples> {
        self.pools.get(name)
    }

    /// Fold one record's pools into this bucket
    pub fn add(&mut self, pool_metrics: BTreeMap<String, UpstreamMetrics>) {
        for (name, metrics) in pool_metrics {
            self.pools.entry(name).or_default().extend(metrics);
        }
    }

    /// Compute summaries for every pool, consuming the bucket
    ///
    /// Pools whose summaries are all absent are left out.
    pub fn finalize(self) -> (i64, i64, BTreeMap<String, PoolSummary>) {
        let pool_stats = self
            .pools
            .into_iter()
            .map(|(name, samples)| (name, samples.finalize()))
            .filter(|(_, summary)| !summary.is_empty())
            .collect();
        (self.start, self.end, pool_stats)
    }
}
