//! CSV output formatting
//!
//! One row per (bucket, pool, metric) that had samples, suitable for loading
//! into a spreadsheet or pandas. Buckets are in time order, pools in name
//! order, metrics in `connect_time, first_byte_time, response_time` order.

use crate::stats::aggregator::AggregatedBucket;
use crate::util::time::format_timestamp_ms;
use crate::Result;
use std::io::Write;

/// Column header, written even when there are no rows
pub const CSV_HEADER: [&str; 10] = [
    "pool_name",
    "bucket_start",
    "bucket_end",
    "metric_type",
    "min_ms",
    "max_ms",
    "avg_ms",
    "p5_ms",
    "p95_ms",
    "count",
];

/// Write results as CSV
pub fn write_csv<W: Write>(buckets: &[AggregatedBucket], out: W) -> Result<()> {
    let mut writer = ::csv::Writer::from_writer(out);
    writer.write_record(CSV_HEADER)?;

    for bucket in buckets {
        let start = format_timestamp_ms(bucket.bucket_start);
        let end = format_timestamp_ms(bucket.bucket_end);

        for (pool_name, summary) in &bucket.pool_stats {
            for (kind, stats) in summary.iter() {
                let row = [
                    pool_name.clone(),
                    start.clone(),
                    end.clone(),
                    kind.field_name().to_string(),
                    stats.min.to_string(),
                    stats.max.to_string(),
                    format!("{:.2}", stats.mean),
                    format!("{:.2}", stats.p5),
                    format!("{:.2}", stats.p95),
                    stats.count.to_string(),
                ];
                writer.write_record(&row)?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// Render CSV output into a string
pub fn format_csv(buckets: &[AggregatedBucket]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(buckets, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}
