//! Configuration models and layered config loading.
//!
//! Settings come from `fieldvisit.json5` files: one in the user's home, one in
//! the nearest visit workspace above the working directory, and any explicit
//! overrides. Relative store paths are anchored to the layer that set them.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Layered config types and loader options.
pub use loader::{ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions};
/// Configuration schema models.
pub use model::*;
