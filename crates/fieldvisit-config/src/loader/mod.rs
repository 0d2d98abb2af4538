//! Layered configuration loader.
//!
//! A visit workspace is any directory holding `.fieldvisit/fieldvisit.json5`;
//! the nearest one above the working directory is loaded over the user's
//! config, and explicit overrides are applied last. A relative `store.path` is
//! resolved against the layer it came from, and a workspace that leaves the
//! store unset keeps its records in `.fieldvisit/visits` beside its config.

mod schema;

#[cfg(test)]
mod tests;

use crate::{ConfigError, FieldVisitConfig};
use directories::UserDirs;
use log::{debug, info};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Config filename inside a `.fieldvisit` directory.
const DEFAULT_CONFIG_FILE: &str = "fieldvisit.json5";
/// Per-user and per-workspace config directory.
const DEFAULT_CONFIG_DIR: &str = ".fieldvisit";
/// Record store directory inside a workspace's config directory.
const WORKSPACE_STORE_DIR: &str = "visits";

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: FieldVisitConfig,
    /// Metadata for each layer loaded, lowest precedence first.
    pub layers: Vec<ConfigLayer>,
    /// Root of the visit workspace found above the working directory.
    pub workspace: Option<PathBuf>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// `~/.fieldvisit/fieldvisit.json5`.
    User,
    /// Nearest `.fieldvisit/fieldvisit.json5` above the working directory.
    Workspace,
    /// File named explicitly by the caller (highest precedence).
    Override,
}

impl ConfigLayerSource {
    fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Workspace => "workspace",
            Self::Override => "override",
        }
    }
}

/// Metadata about a loaded config layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    /// Config file on disk.
    pub path: PathBuf,
    /// Directory that relative store paths in this layer resolve against.
    pub base: PathBuf,
}

/// Options controlling layer discovery.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Directory the workspace search starts from.
    pub cwd: PathBuf,
    /// User config file; `None` skips the user layer.
    pub user_config_path: Option<PathBuf>,
    /// Override files, applied in order after every discovered layer.
    pub overrides: Vec<PathBuf>,
}

impl LayeredConfigOptions {
    /// Options with the user config under the home directory.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            user_config_path: UserDirs::new().map(|dirs| {
                dirs.home_dir()
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILE)
            }),
            overrides: Vec::new(),
        }
    }

    /// Add an override file; unlike discovered layers it must exist.
    pub fn with_override(mut self, path: impl AsRef<Path>) -> Self {
        self.overrides.push(path.as_ref().to_path_buf());
        self
    }
}

impl FieldVisitConfig {
    /// Load a single config file; a relative store path resolves against it.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading config from path: {}", path.display());
        let layer = read_layer(ConfigLayerSource::Override, path)?;
        config_from_value(Value::Object(layer.fields), "config")
    }

    /// Load a single config from JSON5 contents; store paths stay as written.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents).map_err(|source| ConfigError::Syntax {
            origin: "inline config".to_string(),
            source,
        })?;
        config_from_value(value, "config")
    }

    /// Load the user, workspace, and override layers for a working directory.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load layers from explicit locations.
    ///
    /// Precedence (low -> high): user, workspace, overrides.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let cwd = options
            .cwd
            .canonicalize()
            .map_err(|source| ConfigError::Read {
                path: options.cwd.clone(),
                source,
            })?;
        let workspace = find_workspace(&cwd);
        let user_path = options.user_config_path.filter(|path| path.is_file());

        let mut layers = Vec::new();
        if let Some(path) = &user_path {
            layers.push(read_layer(ConfigLayerSource::User, path)?);
        }
        match &workspace {
            Some(root) => {
                let path = root.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILE);
                if user_path.as_deref().is_some_and(|user| same_file(user, &path)) {
                    debug!("workspace config is the user config (path={})", path.display());
                } else {
                    layers.push(read_layer(ConfigLayerSource::Workspace, &path)?);
                }
            }
            None => debug!("no visit workspace above {}", cwd.display()),
        }
        for path in &options.overrides {
            layers.push(read_layer(ConfigLayerSource::Override, path)?);
        }

        let mut merged = Map::new();
        let mut meta = Vec::with_capacity(layers.len());
        for layer in layers {
            overlay_sections(&mut merged, layer.fields);
            meta.push(layer.meta);
        }
        let mut config = config_from_value(Value::Object(merged), "effective")?;
        if let Some(root) = workspace.as_ref().filter(|_| config.store.path.is_none()) {
            let store = root.join(DEFAULT_CONFIG_DIR).join(WORKSPACE_STORE_DIR);
            debug!("using workspace store (path={})", store.display());
            config.store.path = Some(store.to_string_lossy().into_owned());
        }
        info!(
            "layered config loaded (layers={}, workspace={})",
            meta.len(),
            workspace.is_some()
        );
        Ok(LayeredConfig {
            config,
            layers: meta,
            workspace,
        })
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signature.width == 0 || self.signature.height == 0 {
            return Err(schema::invalid_field(
                "effective",
                "signature",
                "surface width and height must be positive",
            ));
        }
        let stroke_width = self.signature.stroke_width;
        if stroke_width.is_nan() || stroke_width <= 0.0 {
            return Err(schema::invalid_field(
                "effective",
                "signature.stroke_width",
                "stroke width must be positive",
            ));
        }
        if self.signature.stroke_rgb().is_none() {
            return Err(schema::invalid_field(
                "effective",
                "signature.stroke_color",
                "expected #rrggbb color",
            ));
        }
        if self.directory.min_query_chars == 0 {
            return Err(schema::invalid_field(
                "effective",
                "directory.min_query_chars",
                "must be at least 1",
            ));
        }
        if self.store.path.as_deref().is_some_and(|path| path.trim().is_empty()) {
            return Err(schema::invalid_field(
                "effective",
                "store.path",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

/// One schema-checked file, with its store path already anchored.
struct LoadedLayer {
    meta: ConfigLayer,
    fields: Map<String, Value>,
}

fn read_layer(source: ConfigLayerSource, path: &Path) -> Result<LoadedLayer, ConfigError> {
    debug!(
        "loading config layer (source={}, path={})",
        source.label(),
        path.display()
    );
    let contents = fs::read_to_string(path).map_err(|err| ConfigError::Read {
        path: path.to_path_buf(),
        source: err,
    })?;
    let label = format!("{}({})", source.label(), path.display());
    let mut value: Value = json5::from_str(&contents).map_err(|err| ConfigError::Syntax {
        origin: label.clone(),
        source: err,
    })?;
    schema::validate_layer_schema(&value, &label)?;

    let base = layer_base(path);
    anchor_store_path(&mut value, &base);
    let Value::Object(fields) = value else {
        return Err(schema::invalid_field(&label, "", "expected object"));
    };
    Ok(LoadedLayer {
        meta: ConfigLayer {
            source,
            path: path.to_path_buf(),
            base,
        },
        fields,
    })
}

/// `<dir>/.fieldvisit/fieldvisit.json5` resolves against `<dir>`; any other
/// file resolves against its own directory.
fn layer_base(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new(""));
    match parent.file_name() {
        Some(name) if name == DEFAULT_CONFIG_DIR => {
            parent.parent().unwrap_or(parent).to_path_buf()
        }
        _ => parent.to_path_buf(),
    }
}

fn anchor_store_path(value: &mut Value, base: &Path) {
    let Some(Value::String(store)) = value.pointer_mut("/store/path") else {
        return;
    };
    if Path::new(store.as_str()).is_relative() {
        *store = base.join(store.as_str()).to_string_lossy().into_owned();
    }
}

/// Later layers replace individual settings; sections they omit survive.
fn overlay_sections(merged: &mut Map<String, Value>, layer: Map<String, Value>) {
    for (section, value) in layer {
        let Value::Object(settings) = value else {
            merged.insert(section, value);
            continue;
        };
        match merged.get_mut(&section) {
            Some(Value::Object(existing)) => existing.extend(settings),
            _ => {
                merged.insert(section, Value::Object(settings));
            }
        }
    }
}

fn find_workspace(cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .find(|dir| {
            dir.join(DEFAULT_CONFIG_DIR)
                .join(DEFAULT_CONFIG_FILE)
                .is_file()
        })
        .map(Path::to_path_buf)
}

fn same_file(left: &Path, right: &Path) -> bool {
    match (left.canonicalize(), right.canonicalize()) {
        (Ok(left), Ok(right)) => left == right,
        _ => left == right,
    }
}

fn config_from_value(value: Value, label: &str) -> Result<FieldVisitConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: FieldVisitConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}
