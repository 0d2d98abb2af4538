//! Public surface for fieldvisit.
//!
//! This crate re-exports the building blocks and provides a small
//! initialization helper to keep consumer setup consistent.

pub mod replay;

/// Re-export for convenience.
pub use fieldvisit_config as config;
pub use fieldvisit_core as core;
/// Re-export for convenience.
pub use fieldvisit_protocol as protocol;
pub use fieldvisit_store as store;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
