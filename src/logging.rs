//! Logging init: `tracing` events to stderr, filtered by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Default filter for a given `-v` count, used when `RUST_LOG` is unset
fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn,vidgrab=info",
        1 => "info,vidgrab=debug",
        _ => "debug,vidgrab=trace",
    }
}

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
