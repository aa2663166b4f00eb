//! Diagnostic tracing setup.
//!
//! Tracing output goes straight to the process stderr. It never passes through
//! the stream slots, so diagnostics are not copied into log files.

use tracing_subscriber::EnvFilter;

/// Default filter directive for a `-v` count.
pub fn filter_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global fmt subscriber. `RUST_LOG` overrides `verbosity`.
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_for(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
