//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "warn,stockdash=info";

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() {
    init_tracing_with_default(DEFAULT_FILTER);
}

/// Initialize tracing, falling back to `default_filter` when `RUST_LOG` is unset
///
/// Logs go to stderr so they never interleave with the rendered dashboard on stdout.
/// Calling this twice is harmless; the second subscriber is ignored.
pub fn init_tracing_with_default(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
