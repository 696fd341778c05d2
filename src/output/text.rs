//! Human-readable grouped output
//!
//! Buckets are regrouped by pool so each upstream pool gets its own section,
//! with one block per time bucket underneath.

use crate::stats::aggregator::AggregatedBucket;
use crate::stats::{MetricSummary, PoolSummary};
use crate::util::time::format_timestamp_ms;
use crate::Result;
use std::collections::BTreeMap;
use std::io::Write;

const EMPTY_MESSAGE: &str = "No upstream timing data found in the log file.";

/// Write results in grouped text form
///
/// Sections:
/// - Report header
/// - One section per pool (name order)
/// - One block per bucket within a pool (time order), listing only the
///   metrics that had samples
pub fn write_grouped<W: Write>(buckets: &[AggregatedBucket], out: &mut W) -> Result<()> {
    if buckets.is_empty() {
        writeln!(out, "{}", EMPTY_MESSAGE)?;
        return Ok(());
    }

    writeln!(out, "NGINX Plus Upstream Timing Analysis")?;
    writeln!(out, "{}", "=".repeat(50))?;
    writeln!(out)?;

    for (pool_name, entries) in group_by_pool(buckets) {
        writeln!(out, "Upstream Pool: {}", pool_name)?;
        writeln!(out, "{}", "-".repeat(30))?;

        for (bucket, summary) in entries {
            writeln!(
                out,
                "Time Bucket: {} - {}",
                format_timestamp_ms(bucket.bucket_start),
                format_timestamp_ms(bucket.bucket_end)
            )?;

            for (kind, stats) in summary.iter() {
                writeln!(out, "  {}:", kind.label())?;
                write_summary(out, stats, "    ")?;
            }
            writeln!(out)?;
        }
        writeln!(out)?;
    }

    Ok(())
}

/// Render grouped output into a string
pub fn format_grouped(buckets: &[AggregatedBucket]) -> Result<String> {
    let mut buf = Vec::new();
    write_grouped(buckets, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Pool name → (bucket, summary) in ascending bucket order
fn group_by_pool(
    buckets: &[AggregatedBucket],
) -> BTreeMap<&str, Vec<(&AggregatedBucket, &PoolSummary)>> {
    let mut pools: BTreeMap<&str, Vec<_>> = BTreeMap::new();
    for bucket in buckets {
        for (name, summary) in &bucket.pool_stats {
            pools.entry(name.as_str()).or_default().push((bucket, summary));
        }
    }
    pools
}

fn write_summary<W: Write>(out: &mut W, stats: &MetricSummary, indent: &str) -> Result<()> {
    writeln!(out, "{}Min: {}ms", indent, stats.min)?;
    writeln!(out, "{}Max: {}ms", indent, stats.max)?;
    writeln!(out, "{}Avg: {:.2}ms", indent, stats.mean)?;
    writeln!(out, "{}P5:  {:.2}ms", indent, stats.p5)?;
    writeln!(out, "{}P95: {:.2}ms", indent, stats.p95)?;
    writeln!(out, "{}Count: {} samples", indent, stats.count)?;
    Ok(())
}
