//! JSON output formatting
//!
//! Pretty-printed array of buckets. Each bucket carries both the raw
//! millisecond bounds and their RFC 3339 rendering; metrics without samples
//! are omitted rather than written as zeros.

use crate::stats::aggregator::AggregatedBucket;
use crate::stats::PoolSummary;
use crate::util::time::format_timestamp_ms;
use crate::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// Serialized form of one bucket
#[derive(Debug, Clone, Serialize)]
pub struct JsonBucket<'a> {
    pub bucket_start: String,
    pub bucket_end: String,
    pub bucket_start_ms: i64,
    pub bucket_end_ms: i64,
    pub pools: &'a BTreeMap<String, PoolSummary>,
}

impl<'a> JsonBucket<'a> {
    pub fn from_bucket(bucket: &'a AggregatedBucket) -> Self {
        Self {
            bucket_start: format_timestamp_ms(bucket.bucket_start),
            bucket_end: format_timestamp_ms(bucket.bucket_end),
            bucket_start_ms: bucket.bucket_start,
            bucket_end_ms: bucket.bucket_end,
            pools: &bucket.pool_stats,
        }
    }
}

/// Write results as a JSON array
pub fn write_json<W: Write>(buckets: &[AggregatedBucket], mut out: W) -> Result<()> {
    let doc: Vec<JsonBucket<'_>> = buckets.iter().map(JsonBucket::from_bucket).collect();
    serde_json::to_writer_pretty(&mut out, &doc)?;
    writeln!(out)?;
    Ok(())
}
