//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. Logs go to stderr so stdout carries only
/// command output.
///
/// Respects `RUST_LOG`; falls back to `info`.
pub fn init(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    // try_init: a subscriber may already be installed in tests
    let _ = if json { builder.json().try_init() } else { builder.try_init() };
}
