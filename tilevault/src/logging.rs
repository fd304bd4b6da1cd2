//! Logging infrastructure for TileVault.
//!
//! Installs a console `tracing` subscriber configurable via the `RUST_LOG`
//! environment variable, defaulting to `info`.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Safe to call once per process; later calls are ignored so tests and
/// embedding applications that install their own subscriber keep working.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}
