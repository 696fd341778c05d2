//! Error types for the aggregation core
//!
//! The extractor never fails (bad lines are skipped), so the only errors the
//! core can report are aggregator misconfiguration and misuse.

use thiserror::Error;

/// Errors reported by [`TimeAggregator`](crate::stats::aggregator::TimeAggregator)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// Bucketing period is zero, negative, or shorter than one millisecond
    #[error("Bucket period must be positive, got {period_ms}ms")]
    InvalidPeriod { period_ms: i64 },

    /// `finalize()` was already called; accumulators have been consumed
    #[error("Aggregator has already been finalized")]
    AlreadyFinalized,
}
