//! Tracing bootstrap for host shells.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialise JSON log output filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls log a warning and keep the
/// first subscriber.
pub fn init() {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }
}
