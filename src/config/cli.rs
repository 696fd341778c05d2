//! CLI argument parsing using clap

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Human-readable sections per upstream pool
    Grouped,
    /// Machine-readable CSV rows
    Csv,
    /// JSON array of buckets
    Json,
}

const AFTER_HELP: &str = "\
Examples:
  logpulse --period PT5M nginxplus_json_logs.txt
    Analyze logs with 5-minute time periods, output in grouped format

  logpulse --period PT1H --format csv access.log
    Analyze logs with 1-hour periods, output in CSV format

  logpulse --period PT30S /var/log/nginx/plus.json
    Analyze logs with 30-second periods from absolute path

ISO 8601 Duration Examples:
  PT30S    - 30 seconds
  PT5M     - 5 minutes
  PT1H     - 1 hour
  P1D      - 1 day
  P1DT12H  - 1 day and 12 hours";

/// logpulse - upstream timing analysis for NGINX Plus JSON logs
#[derive(Parser, Debug)]
#[command(name = "logpulse")]
#[command(version, about, long_about = None, after_help = AFTER_HELP)]
pub struct Cli {
    /// NGINX Plus JSON log file to analyze
    #[arg(value_name = "LOG_FILE_PATH")]
    pub log_file: Option<PathBuf>,

    /// Aggregation period as an ISO 8601 duration (e.g. PT5M, PT1H)
    #[arg(long, value_name = "DURATION", env = "LOGPULSE_PERIOD", allow_hyphen_values = true)]
    pub period: Option<String>,

    /// Output format [default: grouped]
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Write the report to a file instead of stdout
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// TOML configuration file (command-line values take precedence)
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Validate configuration and exit without processing the log
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations that clap cannot express
    ///
    /// The log file and period may come from a config file, so they are only
    /// required here when no config file is given.
    pub fn validate(&self) -> Result<()> {
        if self.config.is_none() {
            if self.log_file.is_none() {
                anyhow::bail!("LOG_FILE_PATH is required unless --config provides log_file");
            }
            if self.period.is_none() {
                anyhow::bail!("--period is required unless --config provides analysis.period");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("logpulse").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_basic_args() {
        let cli = parse(&["--period", "PT5M", "access.log"]);
        assert_eq!(cli.period.as_deref(), Some("PT5M"));
        assert_eq!(cli.log_file, Some(PathBuf::from("access.log")));
        assert_eq!(cli.format, None);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_format_values() {
        assert_eq!(parse(&["--format", "csv"]).format, Some(FormatArg::Csv));
        assert_eq!(parse(&["--format", "grouped"]).format, Some(FormatArg::Grouped));
        assert_eq!(parse(&["--format", "json"]).format, Some(FormatArg::Json));
        assert!(Cli::try_parse_from(["logpulse", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_negative_period_reaches_validation() {
        let cli = parse(&["--period", "-PT5M", "access.log"]);
        assert_eq!(cli.period.as_deref(), Some("-PT5M"));
    }

    #[test]
    fn test_verbosity_count() {
        assert_eq!(parse(&["-vv"]).verbose, 2);
        assert_eq!(parse(&[]).verbose, 0);
    }

    #[test]
    fn test_validate_requires_inputs_without_config() {
        assert!(parse(&["access.log"]).validate().is_err());
        assert!(parse(&["--period", "PT5M"]).validate().is_err());
        assert!(parse(&["--config", "logpulse.toml"]).validate().is_ok());
    }
}
