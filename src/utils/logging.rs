//! Logging utilities
//!
//! This module provides a standard logger setup for binaries and tests.

/// Initialize `env_logger` with an info-level default filter
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .try_init();
}
