//! Tracing setup
//!
//! The pipeline emits `tracing` events as a side channel; nothing in the
//! core changes behavior when no subscriber is installed.

use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a plain-text subscriber honoring `RUST_LOG`
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .try_init();
}

/// Install a JSON subscriber honoring `RUST_LOG`
pub fn init_tracing_json() {
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter())
        .try_init();
}
