//! Configuration validation

use super::*;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate().map_err(anyhow::Error::msg)?;
    validate_analysis(&config.analysis)?;
    if let Some(ref log_file) = config.log_file {
        validate_log_file(log_file)?;
    }
    validate_output(&config.output)?;

    Ok(())
}

/// Validate analysis configuration
pub fn validate_analysis(analysis: &AnalysisConfig) -> Result<()> {
    let period = analysis.period_duration()?;
    if period.as_millis() == 0 {
        anyhow::bail!(
            "period must be at least 1 millisecond, got {:?}",
            period
        );
    }
    Ok(())
}

/// Validate that the log file exists and can be read
pub fn validate_log_file(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Log file not found: {}", path.display());
    }
    if !path.is_file() {
        anyhow::bail!("Log file path is not a file: {}", path.display());
    }
    File::open(path).with_context(|| format!("Log file is not readable: {}", path.display()))?;
    Ok(())
}

/// Validate output configuration
pub fn validate_output(output: &OutputConfig) -> Result<()> {
    if let Some(ref path) = output.path {
        if path.is_dir() {
            anyhow::bail!("Output path is a directory: {}", path.display());
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                anyhow::bail!("Output directory does not exist: {}", parent.display());
            }
        }
    }
    Ok(())
}
