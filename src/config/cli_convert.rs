//! CLI to Config conversion utilities

use crate::config::cli;
use crate::config::OutputFormat;
use anyhow::{anyhow, Result};
use std::time::Duration;

const SECS_PER_WEEK: f64 = 604_800.0;
const SECS_PER_DAY: f64 = 86_400.0;

/// Parse an ISO 8601 duration (e.g. "PT5M", "P1DT12H", "PT0.5S")
///
/// Accepts `P[nW][nD][T[nH][nM][n[.f]S]]`, case-insensitive, with `,` or `.`
/// as decimal separator. Year and month components are rejected because
/// they have no fixed length.
pub fn parse_iso8601_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let invalid = || {
        anyhow!(
            "Invalid ISO 8601 duration format: '{}'. Use formats like PT5M, PT1H, P1D",
            s
        )
    };

    if s.starts_with('-') {
        anyhow::bail!("Duration must be positive: '{}'", s);
    }

    let upper = s.to_ascii_uppercase();
    let rest = upper.strip_prefix('P').ok_or_else(invalid)?;

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    if time_part == Some("") || (date_part.is_empty() && time_part.is_none()) {
        return Err(invalid());
    }
    if date_part.contains('Y') || date_part.contains('M') {
        anyhow::bail!(
            "Year and month durations are not supported: '{}'. Use weeks or days instead",
            s
        );
    }

    let date_secs = sum_components(date_part, &[('W', SECS_PER_WEEK), ('D', SECS_PER_DAY)])
        .ok_or_else(invalid)?;
    let time_secs = match time_part {
        Some(time) => {
            sum_components(time, &[('H', 3600.0), ('M', 60.0), ('S', 1.0)]).ok_or_else(invalid)?
        }
        None => 0.0,
    };

    let total = date_secs + time_secs;
    if total <= 0.0 {
        anyhow::bail!("Duration must be positive: '{}'", s);
    }

    Duration::try_from_secs_f64(total).map_err(|_| invalid())
}

/// Sum `<number><designator>` pairs; designators must appear in `units` order
fn sum_components(part: &str, units: &[(char, f64)]) -> Option<f64> {
    let mut total = 0.0;
    let mut number = String::new();
    let mut next_unit = 0;

    for c in part.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            ',' => number.push('.'),
            _ => {
                let idx = units.iter().position(|(unit, _)| *unit == c)?;
                if idx < next_unit || number.is_empty() {
                    return None;
                }
                let value: f64 = number.parse().ok()?;
                total += value * units[idx].1;
                number.clear();
                next_unit = idx + 1;
            }
        }
    }

    // A trailing number without a designator is malformed
    if !number.is_empty() {
        return None;
    }
    Some(total)
}

/// Convert CLI format enum to config format enum
pub fn convert_format(cli_format: cli::FormatArg) -> OutputFormat {
    match cli_format {
        cli::FormatArg::Grouped => OutputFormat::Grouped,
        cli::FormatArg::Csv => OutputFormat::Csv,
        cli::FormatArg::Json => OutputFormat::Json,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_components() {
        assert_eq!(parse_iso8601_duration("PT30S").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_iso8601_duration("PT5M").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_iso8601_duration("PT1H").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_iso8601_duration("PT1H30M").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_iso8601_duration("PT10M").unwrap(), Duration::from_secs(600));
    }

    #[test]
    fn test_parse_date_components() {
        assert_eq!(parse_iso8601_duration("P1D").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_iso8601_duration("P1W").unwrap(), Duration::from_secs(604_800));
        assert_eq!(
            parse_iso8601_duration("P1DT12H").unwrap(),
            Duration::from_secs(86_400 + 12 * 3600)
        );
    }

    #[test]
    fn test_parse_fractional_and_case() {
        assert_eq!(parse_iso8601_duration("PT0.5S").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_iso8601_duration("PT1,5S").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_iso8601_duration("pt5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_iso8601_duration(" PT5M ").unwrap(), Duration::from_secs(300));
    }

    #[test]
    fn test_reject_negative() {
        let err = parse_iso8601_duration("-PT5M").unwrap_err();
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn test_reject_zero() {
        let err = parse_iso8601_duration("PT0S").unwrap_err();
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn test_reject_year_month() {
        assert!(parse_iso8601_duration("P1Y").is_err());
        assert!(parse_iso8601_duration("P2M").is_err());
        // minutes are fine once past the T separator
        assert!(parse_iso8601_duration("PT2M").is_ok());
    }

    #[test]
    fn test_reject_malformed() {
        for input in ["", "P", "PT", "P1DT", "5M", "PT5", "PTM", "PT5M1H", "PT5X", "P1.2.3D", "invalid"] {
            let err = parse_iso8601_duration(input).unwrap_err();
            assert!(
                err.to_string().contains("Invalid ISO 8601 duration"),
                "unexpected error for {:?}: {}",
                input,
                err
            );
        }
    }

    #[test]
    fn test_convert_format() {
        assert_eq!(convert_format(cli::FormatArg::Grouped), OutputFormat::Grouped);
        assert_eq!(convert_format(cli::FormatArg::Csv), OutputFormat::Csv);
        assert_eq!(convert_format(cli::FormatArg::Json), OutputFormat::Json);
    }
}
