//! Logging init: timestamped lines on stdout.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber: one line per event on stdout, carrying
/// the timestamp, the severity level and the emitting module.
///
/// `RUST_LOG` overrides the default `info` filter.
///
/// Call this once, before anything logs.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stdout)
        .with_ansi(false)
        .init();
}
