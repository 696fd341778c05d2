//! Time formatting utilities
//!
//! Rendering helpers for bucket boundaries and bucketing periods.

use chrono::{DateTime, SecondsFormat};
use std::time::Duration;

/// Format a millisecond epoch timestamp as RFC 3339 UTC
///
/// Sub-second digits are only printed when the timestamp has a millisecond
/// component. Timestamps outside chrono's range fall back to the raw number.
///
/// # Examples
///
/// ```
/// use logpulse::util::time::format_timestamp_ms;
///
/// assert_eq!(format_timestamp_ms(0), "1970-01-01T00:00:00Z");
/// assert_eq!(format_timestamp_ms(1446249300000), "2015-10-30T23:55:00Z");
/// assert_eq!(format_timestamp_ms(1446249499322), "2015-10-30T23:58:19.322Z");
/// ```
pub fn format_timestamp_ms(timestamp_ms: i64) -> String {
    match DateTime::from_timestamp_millis(timestamp_ms) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        None => timestamp_ms.to_string(),
    }
}

/// Format a bucketing period in short human-readable form
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use logpulse::util::time::format_period;
///
/// assert_eq!(format_period(Duration::from_millis(500)), "500ms");
/// assert_eq!(format_period(Duration::from_secs(30)), "30s");
/// assert_eq!(format_period(Duration::from_secs(300)), "5m");
/// assert_eq!(format_period(Duration::from_secs(5400)), "1.50h");
/// assert_eq!(format_period(Duration::from_secs(86400)), "1d");
/// ```
pub fn format_period(period: Duration) -> String {
    const SEC: u128 = 1_000;
    const MIN: u128 = 60 * SEC;
    const HOUR: u128 = 60 * MIN;
    const DAY: u128 = 24 * HOUR;

    let ms = period.as_millis();
    let (unit_ms, suffix) = if ms >= DAY {
        (DAY, "d")
    } else if ms >= HOUR {
        (HOUR, "h")
    } else if ms >= MIN {
        (MIN, "m")
    } else if ms >= SEC {
        (SEC, "s")
    } else {
        return format!("{}ms", ms);
    };

    if ms % unit_ms == 0 {
        format!("{}{}", ms / unit_ms, suffix)
    } else {
        format!("{:.2}{}", ms as f64 / unit_ms as f64, suffix)
    }
}
