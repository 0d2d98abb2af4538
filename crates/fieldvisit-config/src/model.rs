//! Configuration schema for fieldvisit.

use serde::{Deserialize, Serialize};

/// Root config for a fieldvisit installation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FieldVisitConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub signature: SignatureConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl FieldVisitConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> FieldVisitConfigBuilder {
        FieldVisitConfigBuilder::new()
    }
}

/// Builder for assembling a `FieldVisitConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct FieldVisitConfigBuilder {
    config: FieldVisitConfig,
}

impl FieldVisitConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: FieldVisitConfig::default(),
        }
    }

    /// Replace the record store configuration.
    pub fn store(mut self, store: StoreConfig) -> Self {
        self.config.store = store;
        self
    }

    /// Replace the business directory configuration.
    pub fn directory(mut self, directory: DirectoryConfig) -> Self {
        self.config.directory = directory;
        self
    }

    /// Replace the signature surface configuration.
    pub fn signature(mut self, signature: SignatureConfig) -> Self {
        self.config.signature = signature;
        self
    }

    /// Replace the session configuration.
    pub fn session(mut self, session: SessionConfig) -> Self {
        self.config.session = session;
        self
    }

    /// Finalize and return the built `FieldVisitConfig`.
    pub fn build(self) -> FieldVisitConfig {
        self.config
    }
}

/// Record store location.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Directory holding `visits.jsonl`; defaults to `.fieldvisit/visits`.
    #[serde(default)]
    pub path: Option<String>,
}

impl StoreConfig {
    /// Store path with the default applied.
    pub fn path_or_default(&self) -> String {
        self.path
            .clone()
            .unwrap_or_else(|| ".fieldvisit/visits".to_string())
    }
}

/// Business directory lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Simulated latency for each lookup, in milliseconds.
    #[serde(default = "default_lookup_delay_ms")]
    pub lookup_delay_ms: u64,
    /// Shortest business name that triggers autofill.
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,
    /// Seed for the synthetic record generator.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            lookup_delay_ms: default_lookup_delay_ms(),
            min_query_chars: default_min_query_chars(),
            seed: None,
        }
    }
}

fn default_lookup_delay_ms() -> u64 {
    2000
}

fn default_min_query_chars() -> usize {
    3
}

/// Signature surface geometry and pen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureConfig {
    #[serde(default = "default_signature_width")]
    pub width: u32,
    #[serde(default = "default_signature_height")]
    pub height: u32,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
    /// Stroke color as `#rrggbb`.
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            width: default_signature_width(),
            height: default_signature_height(),
            stroke_width: default_stroke_width(),
            stroke_color: default_stroke_color(),
        }
    }
}

impl SignatureConfig {
    /// Parse `stroke_color` into RGB components.
    pub fn stroke_rgb(&self) -> Option<[u8; 3]> {
        parse_hex_color(&self.stroke_color)
    }
}

fn default_signature_width() -> u32 {
    300
}

fn default_signature_height() -> u32 {
    150
}

fn default_stroke_width() -> f32 {
    2.0
}

fn default_stroke_color() -> String {
    "#ffffff".to_string()
}

/// Session collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Logged-in user label stamped on new visits.
    #[serde(default)]
    pub user: Option<String>,
}

/// Parse a `#rrggbb` color string.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}
