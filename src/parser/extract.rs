//! Record extraction
//!
//! Converts one raw JSON log line into at most one [`LogRecord`]. Extraction is
//! best-effort: a line that is not JSON, or lacks the `stream.upstreams`
//! structure, yields `None` instead of an error, and individual metric values
//! that are missing, mistyped or negative are dropped without affecting the
//! rest of the peer.
//!
//! # Example
//!
//! ```
//! use logpulse::parser::extract::extract;
//! use logpulse::parser::MetricKind;
//!
//! let line = r#"{"timestamp":1446249499322,"stream":{"upstreams":{"api":{"peers":[
//!     {"server":"10.0.0.2:80","connect_time":1,"response_time":2.8}]}}}}"#;
//!
//! let record = extract(line).unwrap();
//! assert_eq!(record.timestamp(), 1446249499322);
//! let api = &record.pool_metrics()["api"];
//! assert_eq!(api.samples(MetricKind::ResponseTime), &[3]);
//! assert!(api.samples(MetricKind::FirstByteTime).is_empty());
//! ```

use super::{LogRecord, MetricKind, UpstreamMetrics};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::trace;

/// Outcome of validating a single raw metric value
///
/// Only `Valid` contributes a sample. Every other variant means the sample is
/// dropped; none of them is ever turned into a default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricValue {
    /// Non-negative number, rounded to whole milliseconds
    Valid(u64),
    /// Field absent or `null`
    Missing,
    /// Field present but not a number
    WrongType,
    /// Number that is negative or not finite
    OutOfRange,
}

impl MetricValue {
    /// The sample value, if this outcome contributes one
    pub fn valid(self) -> Option<u64> {
        match self {
            MetricValue::Valid(ms) => Some(ms),
            _ => None,
        }
    }
}

/// Round a non-negative millisecond value to the nearest integer, ties to even
///
/// Truncation would bias every statistic downwards, so `2.8` must become `3`.
///
/// ```
/// use logpulse::parser::extract::round_half_even;
///
/// assert_eq!(round_half_even(2.8), 3);
/// assert_eq!(round_half_even(4.5), 4);
/// assert_eq!(round_half_even(5.5), 6);
/// ```
#[inline]
pub fn round_half_even(value: f64) -> u64 {
    // `as` saturates: values beyond u64::MAX clamp instead of wrapping
    value.round_ties_even() as u64
}

/// Validate one raw metric value taken from a peer object
pub fn classify_metric(value: Option<&Value>) -> MetricValue {
    match value {
        None | Some(Value::Null) => MetricValue::Missing,
        Some(Value::Number(n)) => {
            if let Some(ms) = n.as_u64() {
                return MetricValue::Valid(ms);
            }
            if n.is_i64() {
                // Only negative integers fail as_u64()
                return MetricValue::OutOfRange;
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f >= 0.0 => MetricValue::Valid(round_half_even(f)),
                _ => MetricValue::OutOfRange,
            }
        }
        Some(_) => MetricValue::WrongType,
    }
}

/// Extract a record from one raw log line
///
/// Returns `None` for invalid JSON, for structurally unusable lines, and for
/// lines in which no pool reported a single valid metric.
pub fn extract(raw_line: &str) -> Option<LogRecord> {
    match serde_json::from_str::<Value>(raw_line) {
        Ok(value) => extract_value(&value),
        Err(e) => {
            trace!("Skipping line: invalid JSON: {}", e);
            None
        }
    }
}

/// Extract a record from an already-parsed JSON document
pub fn extract_value(value: &Value) -> Option<LogRecord> {
    let Some(timestamp) = value.get("timestamp").and_then(Value::as_i64) else {
        trace!("Skipping entry: missing or non-integer timestamp");
        return None;
    };

    let Some(upstreams) = value
        .get("stream")
        .and_then(|stream| stream.get("upstreams"))
        .and_then(Value::as_object)
    else {
        trace!("Skipping entry at {}: no stream.upstreams object", timestamp);
        return None;
    };

    let mut pools = BTreeMap::new();
    for (pool_name, pool) in upstreams {
        let Some(peers) = pool.get("peers").and_then(Value::as_array) else {
            trace!("Pool '{}' has no peers array", pool_name);
            continue;
        };

        let metrics = extract_pool(peers);
        if !metrics.is_empty() {
            pools.insert(pool_name.clone(), metrics);
        }
    }

    LogRecord::new(timestamp, pools)
}

/// Collect the valid samples of every peer in one pool
fn extract_pool(peers: &[Value]) -> UpstreamMetrics {
    let mut metrics = UpstreamMetrics::default();

    for peer in peers.iter().filter_map(Value::as_object) {
        for kind in MetricKind::ALL {
            let raw = peer.get(kind.field_name());
            match classify_metric(raw) {
                MetricValue::Valid(ms) => metrics.push(kind, ms),
                MetricValue::Missing => {}
                dropped => trace!("Dropping {}: {:?} ({:?})", kind, dropped, raw),
            }
        }
    }

    metrics
}
