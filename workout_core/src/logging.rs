//! Tracing setup for the workout binary and tests.
//!
//! Everything is written to stderr; stdout is reserved for plans and
//! blueprints so `--json` output can be piped.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the subscriber at INFO unless `RUST_LOG` says otherwise
pub fn init() {
    init_with_level("info")
}

/// Install the subscriber for the CLI; `verbose` turns on debug output for
/// the composer crates only, keeping HTTP internals quiet
pub fn init_for_cli(verbose: bool) {
    if verbose {
        init_with_level("warn,workout_core=debug,workout=debug")
    } else {
        init()
    }
}

/// Install the subscriber with `default_level` as the fallback directive
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second install (tests, embedding) is ignored.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("workout_core=debug"))
        .try_init();
}
