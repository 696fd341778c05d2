//! Log parsing
//!
//! Turns NGINX Plus JSON access-log lines into [`LogRecord`]s.
//!
//! - [`extract`] handles one line and never fails
//! - [`LogParser`] reads a file or any `BufRead` lazily and keeps
//!   parsed/skipped/error counters for reporting
//!
//! Each record carries, per upstream pool, the connect, first-byte and response
//! times of every peer that reported them.

pub mod extract;

use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Upstream timing metric reported per peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    ConnectTime,
    FirstByteTime,
    ResponseTime,
}

impl MetricKind {
    /// All metric kinds, in reporting order
    pub const ALL: [MetricKind; 3] = [
        MetricKind::ConnectTime,
        MetricKind::FirstByteTime,
        MetricKind::ResponseTime,
    ];

    /// Field name in the peer object (also used as the CSV `metric_type`)
    pub fn field_name(self) -> &'static str {
        match self {
            MetricKind::ConnectTime => "connect_time",
            MetricKind::FirstByteTime => "first_byte_time",
            MetricKind::ResponseTime => "response_time",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            MetricKind::ConnectTime => "Connect Time",
            MetricKind::FirstByteTime => "First Byte Time",
            MetricKind::ResponseTime => "Response Time",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// Timing samples of one upstream pool within one record
///
/// Each vector holds one value per peer that reported a valid value for that
/// metric, in peer order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamMetrics {
    pub connect_time: Vec<u64>,
    pub first_byte_time: Vec<u64>,
    pub response_time: Vec<u64>,
}

impl UpstreamMetrics {
    /// Samples for one metric
    pub fn samples(&self, kind: MetricKind) -> &[u64] {
        match kind {
            MetricKind::ConnectTime => &self.connect_time,
            MetricKind::FirstByteTime => &self.first_byte_time,
            MetricKind::ResponseTime => &self.response_time,
        }
    }

    /// Add one sample
    pub fn push(&mut self, kind: MetricKind, ms: u64) {
        match kind {
            MetricKind::ConnectTime => self.connect_time.push(ms),
            MetricKind::FirstByteTime => self.first_byte_time.push(ms),
            MetricKind::ResponseTime => self.response_time.push(ms),
        }
    }

    /// True when no metric has any sample
    pub fn is_empty(&self) -> bool {
        MetricKind::ALL.iter().all(|&kind| self.samples(kind).is_empty())
    }
}

/// One accepted log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    timestamp: i64,
    pool_metrics: BTreeMap<String, UpstreamMetrics>,
}

impl LogRecord {
    /// Build a record; `None` when no pool carries any sample
    pub fn new(timestamp: i64, pool_metrics: BTreeMap<String, UpstreamMetrics>) -> Option<Self> {
        let pool_metrics: BTreeMap<_, _> = pool_metrics
            .into_iter()
            .filter(|(_, metrics)| !metrics.is_empty())
            .collect();

        if pool_metrics.is_empty() {
            None
        } else {
            Some(Self { timestamp, pool_metrics })
        }
    }

    /// Event time in milliseconds since the epoch
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Per-pool metrics
    pub fn pool_metrics(&self) -> &BTreeMap<String, UpstreamMetrics> {
        &self.pool_metrics
    }

    /// Consume the record, yielding its pools
    pub fn into_pool_metrics(self) -> BTreeMap<String, UpstreamMetrics> {
        self.pool_metrics
    }
}

/// Line accounting for one parsing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Lines that produced a record
    pub parsed: u64,
    /// Valid JSON without usable upstream timing data
    pub skipped: u64,
    /// Lines that were not valid JSON
    pub errors: u64,
}

impl ParseStats {
    /// Total non-blank lines seen
    pub fn total(&self) -> u64 {
        self.parsed + self.skipped + self.errors
    }
}

impl fmt::Display for ParseStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parsed {} entries, skipped {}, errors {}",
            self.parsed, self.skipped, self.errors
        )
    }
}

/// Reader for NGINX Plus JSON log files
///
/// # Example
///
/// ```
/// use logpulse::parser::LogParser;
///
/// let input = "{\"timestamp\":1,\"stream\":{\"upstreams\":{\"a\":{\"peers\":[{\"connect_time\":1}]}}}}\n\
///              garbage\n\
///              {\"timestamp\":2}\n";
///
/// let mut parser = LogParser::new();
/// let records: Vec<_> = parser
///     .parse_reader(input.as_bytes())
///     .collect::<logpulse::Result<_>>()
///     .unwrap();
///
/// assert_eq!(records.len(), 1);
/// assert_eq!(parser.stats().errors, 1);
/// assert_eq!(parser.stats().skipped, 1);
/// ```
#[derive(Debug, Default)]
pub struct LogParser {
    stats: ParseStats,
}

impl LogParser {
    /// Create a parser with zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a log file for lazy parsing
    pub fn open(path: &Path) -> Result<BufReader<File>> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                anyhow::anyhow!("Log file not found: {}", path.display())
            }
            _ => anyhow::Error::new(e)
                .context(format!("Error reading log file {}", path.display())),
        })?;
        Ok(BufReader::new(file))
    }

    /// Parse a whole file into memory
    pub fn parse_file(&mut self, path: &Path) -> Result<Vec<LogRecord>> {
        let reader = Self::open(path)?;
        self.parse_reader(reader)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Error reading log file {}", path.display()))
    }

    /// Lazily parse lines from a reader
    ///
    /// Yields one item per accepted record; bad lines are counted and skipped.
    /// Only read failures are yielded as errors.
    pub fn parse_reader<R: BufRead>(&mut self, reader: R) -> Records<'_, R> {
        Records {
            reader,
            buf: Vec::new(),
            line_num: 0,
            stats: &mut self.stats,
        }
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Reset counters to zero
    pub fn reset_stats(&mut self) {
        self.stats = ParseStats::default();
    }
}

/// Iterator returned by [`LogParser::parse_reader`]
pub struct Records<'a, R> {
    reader: R,
    buf: Vec<u8>,
    line_num: u64,
    stats: &'a mut ParseStats,
}

impl<R: BufRead> Iterator for Records<'_, R> {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Some(Err(anyhow::Error::new(e)
                        .context(format!("Failed to read line {}", self.line_num + 1))))
                }
            }
            self.line_num += 1;

            // Invalid UTF-8 counts as a bad line, like invalid JSON
            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    self.stats.errors += 1;
                    warn!("Error parsing line {}: invalid UTF-8: {}", self.line_num, e);
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            let value: serde_json::Value = match serde_json::from_str(line) {
                Ok(value) => value,
                Err(e) => {
                    self.stats.errors += 1;
                    warn!("Error parsing line {}: invalid JSON: {}", self.line_num, e);
                    continue;
                }
            };

            match extract::extract_value(&value) {
                Some(record) => {
                    self.stats.parsed += 1;
                    return Some(Ok(record));
                }
                None => {
                    self.stats.skipped += 1;
                    debug!("Skipping line {}: no upstream timing data", self.line_num);
                }
            }
        }
    }
}
