//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! CLI values override values from a config file.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Complete analysis configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// NGINX Plus JSON log file to analyze
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Aggregation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Bucket period as an ISO 8601 duration (e.g. "PT5M")
    pub period: Option<String>,
}

/// Report format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable sections per pool
    #[default]
    Grouped,
    /// One row per bucket, pool and metric
    Csv,
    /// Pretty-printed JSON array of buckets
    Json,
}

/// Output settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Write the report here instead of stdout
    pub path: Option<PathBuf>,
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let log_file = self
            .log_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string());
        write!(f, "{} ({}, {})", log_file, self.analysis, self.output)
    }
}

impl fmt::Display for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.period {
            Some(ref period) => write!(f, "period={}", period),
            None => write!(f, "period=<unset>"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Grouped => write!(f, "grouped"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl fmt::Display for OutputConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path {
            Some(ref path) => write!(f, "{} output to {}", self.format, path.display()),
            None => write!(f, "{} output", self.format),
        }
    }
}

// Validation methods

impl Config {
    /// Validate required settings (no filesystem access)
    pub fn validate(&self) -> Result<(), String> {
        if self.log_file.is_none() {
            return Err("A log file path must be specified".to_string());
        }
        self.analysis.validate()?;
        Ok(())
    }
}

impl AnalysisConfig {
    /// Validate the analysis configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.period.is_none() {
            return Err("period must be specified (e.g. --period PT5M)".to_string());
        }
        Ok(())
    }

    /// Parse the configured period
    pub fn period_duration(&self) -> crate::Result<Duration> {
        let period = self
            .period
            .as_deref()
            .context("period must be specified (e.g. --period PT5M)")?;
        cli_convert::parse_iso8601_duration(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(log_file: Option<&str>, period: Option<&str>) -> Config {
        Config {
            log_file: log_file.map(PathBuf::from),
            analysis: AnalysisConfig {
                period: period.map(str::to_string),
            },
            output: OutputConfig::default(),
        }
    }

    #[test]
    fn test_validate_complete() {
        assert!(config(Some("access.log"), Some("PT5M")).validate().is_ok());
    }

    #[test]
    fn test_validate_missing_log_file() {
        let err = config(None, Some("PT5M")).validate().unwrap_err();
        assert!(err.contains("log file"));
    }

    #[test]
    fn test_validate_missing_period() {
        let err = config(Some("access.log"), None).validate().unwrap_err();
        assert!(err.contains("period"));
    }

    #[test]
    fn test_period_duration() {
        let cfg = config(Some("access.log"), Some("PT5M"));
        assert_eq!(cfg.analysis.period_duration().unwrap(), Duration::from_secs(300));
        assert!(config(None, None).analysis.period_duration().is_err());
    }

    #[test]
    fn test_display() {
        let mut cfg = config(Some("access.log"), Some("PT1H"));
        cfg.output.format = OutputFormat::Csv;
        assert_eq!(cfg.to_string(), "access.log (period=PT1H, csv output)");
    }

    #[test]
    fn test_default_format_is_grouped() {
        assert_eq!(OutputConfig::default().format, OutputFormat::Grouped);
    }
}
