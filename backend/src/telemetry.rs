//! Process-wide tracing subscriber.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info";

/// Install the JSON subscriber filtered by `RUST_LOG` (default `info`).
///
/// A second call, or a subscriber installed elsewhere, is reported as a
/// warning and otherwise ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}
