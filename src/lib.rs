//! logpulse - upstream timing analysis for NGINX Plus JSON access logs
//!
//! Reads one JSON object per line, extracts per-peer connect, first-byte and
//! response times for every upstream pool, and summarizes them in
//! epoch-aligned time buckets.
//!
//! # Architecture
//!
//! - **parser**: tolerant line extraction and lazy file reading
//! - **stats**: bucketing, percentile and mean computation
//! - **output**: grouped text, CSV, and JSON renderers
//! - **config**: CLI, TOML config files, ISO 8601 periods, validation
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use std::time::Duration;
//!
//! let log = r#"{"timestamp":1446249499322,"stream":{"upstreams":{"api":{"peers":[{"response_time":3}]}}}}"#;
//! let (buckets, stats) = logpulse::analyze(Cursor::new(log), Duration::from_secs(300)).unwrap();
//!
//! assert_eq!(stats.parsed, 1);
//! assert_eq!(buckets[0].bucket_start, 1446249300000);
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod stats;
pub mod util;

use std::io::BufRead;
use std::time::Duration;

// Re-export commonly used types
pub use config::Config;
pub use error::AggregateError;
pub use parser::{LogParser, LogRecord, ParseStats};
pub use stats::aggregator::{AggregatedBucket, TimeAggregator};

/// Result type used throughout logpulse
pub type Result<T> = anyhow::Result<T>;

/// Parse a log stream and aggregate it into buckets of `period`
///
/// Lines are folded into the aggregator as they are read, so memory grows
/// with the number of samples rather than the size of the log.
pub fn analyze<R: BufRead>(
    reader: R,
    period: Duration,
) -> Result<(Vec<AggregatedBucket>, ParseStats)> {
    let mut aggregator = TimeAggregator::new(period)?;
    let mut parser = LogParser::new();

    for record in parser.parse_reader(reader) {
        aggregator.ingest(record?);
    }

    let stats = parser.stats();
    let buckets = aggregator.finalize()?;
    Ok((buckets, stats))
}
