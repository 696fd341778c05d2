//! logpulse CLI entry point

use anyhow::{Context, Result};
use logpulse::config::{cli::Cli, toml::build_config, validator, Config};
use logpulse::output::write_results;
use logpulse::parser::LogParser;
use logpulse::util::{logging, time::format_period};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::{debug, info};

fn main() {
    let cli = Cli::parse_args();
    logging::init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    cli.validate()?;

    let config = build_config(cli)?;
    validator::validate_config(&config).context("Configuration validation failed")?;
    debug!("Configuration: {}", config);

    if cli.dry_run {
        info!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    analyze_and_report(&config)
}

fn analyze_and_report(config: &Config) -> Result<()> {
    let log_file = config
        .log_file
        .as_deref()
        .context("A log file path must be specified")?;
    let period = config.analysis.period_duration()?;

    info!(
        "Analyzing {} with {} time periods",
        log_file.display(),
        format_period(period)
    );

    info!("Parsing log file...");
    let reader = LogParser::open(log_file)?;
    let (buckets, stats) = logpulse::analyze(reader, period)
        .with_context(|| format!("Error reading log file {}", log_file.display()))?;
    info!("{}", stats);

    if stats.parsed == 0 {
        anyhow::bail!("No valid log entries found with upstream timing data.");
    }

    info!("Aggregating metrics...");
    if buckets.is_empty() {
        anyhow::bail!("No upstream timing data found after aggregation.");
    }
    info!("Generated {} time buckets", buckets.len());

    match config.output.path {
        Some(ref path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let mut out = BufWriter::new(file);
            write_results(config.output.format, &buckets, &mut out)?;
            out.flush()?;
            info!("Wrote {} report to {}", config.output.format, path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_results(config.output.format, &buckets, &mut out)?;
            out.flush()?;
        }
    }

    Ok(())
}
