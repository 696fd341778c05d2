//! Report rendering
//!
//! Renderers consume finalized buckets and never touch aggregation state.

pub mod csv;
pub mod json;
pub mod text;

use crate::config::OutputFormat;
use crate::stats::aggregator::AggregatedBucket;
use crate::Result;
use std::io::Write;

/// Write buckets in the requested format
pub fn write_results<W: Write>(
    format: OutputFormat,
    buckets: &[AggregatedBucket],
    out: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Grouped => self::text::write_grouped(buckets, out),
        OutputFormat::Csv => self::csv::write_csv(buckets, out),
        OutputFormat::Json => self::json::write_json(buckets, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_empty() {
        let mut grouped = Vec::new();
        write_results(OutputFormat::Grouped, &[], &mut grouped).unwrap();
        assert!(String::from_utf8(grouped).unwrap().starts_with("No upstream timing data"));

        let mut csv = Vec::new();
        write_results(OutputFormat::Csv, &[], &mut csv).unwrap();
        assert!(String::from_utf8(csv).unwrap().starts_with("pool_name,"));

        let mut json = Vec::new();
        write_results(OutputFormat::Json, &[], &mut json).unwrap();
        assert_eq!(String::from_utf8(json).unwrap(), "[]\n");
    }
}
