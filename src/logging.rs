//! logging
//!
//! Diagnostic logging via `tracing`.
//!
//! Logs go to stderr without timestamps or targets. The filter comes from
//! `DEVKIT_LOG` (any `EnvFilter` directive string); without it the level is
//! `warn`, or `debug` when `--debug` is passed.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "DEVKIT_LOG";

/// Install the global subscriber. Later calls are ignored.
pub fn init(debug: bool) {
    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}
