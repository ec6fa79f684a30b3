//! Tracing setup helper.
//!
//! The library itself only emits `tracing` events; subscriber installation
//! is left to the embedding application. This helper covers the common case
//! of binaries and examples that want env-filtered console or JSON output.

use tracing_subscriber::EnvFilter;

/// Install a global tracing subscriber.
///
/// `level` is used as the default directive when `RUST_LOG` is unset.
/// With `json` set, events are emitted as JSON lines. Calling this more
/// than once is a no-op.
pub fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}
