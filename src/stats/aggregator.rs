//! Time-bucketed aggregation
//!
//! Folds [`LogRecord`]s into epoch-aligned time buckets and, once the input is
//! exhausted, computes per-pool summary statistics for every bucket.
//!
//! # Features
//!
//! - **Epoch-aligned buckets**: bucket boundaries depend only on the period,
//!   never on the first record seen, so any input order gives the same output
//! - **Out-of-order input**: a late record simply extends an earlier bucket
//! - **Exact statistics**: raw samples are kept until finalization
//! - **Single use**: `finalize()` consumes the accumulators
//!
//! # Example
//!
//! ```
//! use logpulse::parser::extract::extract;
//! use logpulse::stats::aggregator::TimeAggregator;
//! use std::time::Duration;
//!
//! let mut aggregator = TimeAggregator::new(Duration::from_secs(5)).unwrap();
//!
//! for (ts, rt) in [(1000, 2.8), (2000, 5.5), (7000, 1.0)] {
//!     let line = format!(
//!         r#"{{"timestamp":{ts},"stream":{{"upstreams":{{"api":{{"peers":[{{"response_time":{rt}}}]}}}}}}}}"#
//!     );
//!     aggregator.ingest(extract(&line).unwrap());
//! }
//!
//! let buckets = aggregator.finalize().unwrap();
//! assert_eq!(buckets.len(), 2);
//! assert_eq!(buckets[0].bucket_start, 0);
//! assert_eq!(buckets[0].bucket_end, 5000);
//!
//! let rt = buckets[0].pool_stats["api"].response_time.unwrap();
//! assert_eq!((rt.min, rt.max, rt.count), (3, 6, 2));
//! ```

use super::bucket::{bucket_start, TimeBucket};
use super::PoolSummary;
use crate::error::AggregateError;
use crate::parser::LogRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Summary of one time bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedBucket {
    /// Inclusive window start, milliseconds since the epoch
    pub bucket_start: i64,
    /// Exclusive window end, milliseconds since the epoch
    pub bucket_end: i64,
    /// Pool name → per-metric summaries
    pub pool_stats: BTreeMap<String, PoolSummary>,
}

/// Time-bucketed statistics aggregator
///
/// # Usage
///
/// 1. Create with `new()` (validates the period)
/// 2. Feed records with `ingest()`
/// 3. Call `finalize()` once to get buckets sorted by start time
#[derive(Debug)]
pub struct TimeAggregator {
    period_ms: i64,

    /// Bucket start → accumulator
    buckets: BTreeMap<i64, TimeBucket>,

    records_ingested: u64,

    finalized: bool,
}

impl TimeAggregator {
    /// Create an aggregator with the given bucket period
    ///
    /// The period is truncated to whole milliseconds and must be at least 1ms.
    pub fn new(period: Duration) -> Result<Self, AggregateError> {
        let period_ms = i64::try_from(period.as_millis()).unwrap_or(i64::MAX);
        Self::with_period_ms(period_ms)
    }

    /// Create an aggregator from a signed millisecond period
    ///
    /// Zero and negative periods are rejected.
    pub fn with_period_ms(period_ms: i64) -> Result<Self, AggregateError> {
        if period_ms <= 0 {
            return Err(AggregateError::InvalidPeriod { period_ms });
        }

        Ok(Self {
            period_ms,
            buckets: BTreeMap::new(),
            records_ingested: 0,
            finalized: false,
        })
    }

    /// Bucket period in milliseconds
    pub fn period_ms(&self) -> i64 {
        self.period_ms
    }

    /// Number of buckets created so far
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of records folded in so far
    pub fn records_ingested(&self) -> u64 {
        self.records_ingested
    }

    /// Fold one record into its bucket
    pub fn ingest(&mut self, record: LogRecord) {
        if self.finalized {
            warn!(
                "Ignoring record at {} ingested after finalize",
                record.timestamp()
            );
            return;
        }

        let timestamp = record.timestamp();
        let start = bucket_start(timestamp, self.period_ms);
        let period_ms = self.period_ms;
        let bucket = self
            .buckets
            .entry(start)
            .or_insert_with(|| TimeBucket::new(start, period_ms));
        debug_assert!(
            bucket.contains(timestamp),
            "timestamp {} outside bucket starting at {}",
            timestamp,
            start
        );

        bucket.add(record.into_pool_metrics());
        self.records_ingested += 1;
    }

    /// Compute statistics for every bucket
    ///
    /// Buckets are returned in ascending `bucket_start` order. Can only be
    /// called once.
    pub fn finalize(&mut self) -> Result<Vec<AggregatedBucket>, AggregateError> {
        if self.finalized {
            return Err(AggregateError::AlreadyFinalized);
        }
        self.finalized = true;

        let buckets = std::mem::take(&mut self.buckets);
        debug!(
            "Finalizing {} buckets from {} records",
            buckets.len(),
            self.records_ingested
        );

        // BTreeMap iteration is already ascending by bucket start
        Ok(buckets
            .into_values()
            .map(TimeBucket::finalize)
            .filter(|(_, _, pool_stats)| !pool_stats.is_empty())
            .map(|(bucket_start, bucket_end, pool_stats)| AggregatedBucket {
                bucket_start,
                bucket_end,
                pool_stats,
            })
            .collect())
    }

    /// Fold all records and finalize in one step
    pub fn aggregate<I>(mut self, records: I) -> Result<Vec<AggregatedBucket>, AggregateError>
    where
        I: IntoIterator<Item = LogRecord>,
    {
        for record in records {
            self.ingest(record);
        }
        self.finalize()
    }
}
