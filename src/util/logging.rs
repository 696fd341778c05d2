//! Logging initialization
//!
//! Diagnostics go to stderr through `tracing`, leaving stdout for the
//! rendered report.

use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

/// Map `-v` occurrences to a filter directive
pub fn log_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Initialize the global subscriber
///
/// `RUST_LOG` takes precedence over the verbosity flag when it is set.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2) // Show target module for -vv and above
        .with_line_number(verbosity >= 3)
        .init();

    debug!("logpulse started with verbosity level: {}", verbosity);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}
