//! Tests for layered configuration loading.

use super::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write JSON5 contents to a path, creating parent directories if needed.
fn write_json5(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

/// Options that only see the user layer inside the temp root.
fn isolated_options(root: &Path, cwd: &Path) -> LayeredConfigOptions {
    LayeredConfigOptions {
        cwd: cwd.to_path_buf(),
        user_config_path: Some(root.join("user.json5")),
        overrides: Vec::new(),
    }
}

/// Create a visit workspace config under `root`.
fn write_workspace(root: &Path, contents: &str) {
    write_json5(
        &root.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILE),
        contents,
    );
}

/// Verify that a minimal config parses with defaults.
#[test]
fn parse_minimal_config() {
    let config = FieldVisitConfig::load_from_str("{}").expect("config");
    assert_eq!(config.directory.lookup_delay_ms, 2000);
    assert_eq!(config.directory.min_query_chars, 3);
    assert_eq!(config.signature.width, 300);
    assert_eq!(config.signature.height, 150);
    assert_eq!(config.signature.stroke_color, "#ffffff");
    assert_eq!(config.store.path_or_default(), ".fieldvisit/visits");
}

/// JSON5 comments and unquoted keys are accepted.
#[test]
fn parses_json5_syntax() {
    let json5 = r#"{
        // simulated registry latency
        directory: { lookup_delay_ms: 0, seed: 42 },
        session: { user: 'Thandi' },
    }"#;
    let config = FieldVisitConfig::load_from_str(json5).expect("config");
    assert_eq!(config.directory.lookup_delay_ms, 0);
    assert_eq!(config.directory.seed, Some(42));
    assert_eq!(config.session.user.as_deref(), Some("Thandi"));
}

/// Reject unexpected top-level config keys.
#[test]
fn rejects_unknown_top_level_key() {
    let err = FieldVisitConfig::load_from_str("{ unexpected: true }").unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("unknown key"));
    assert!(msg.contains("unexpected"));
}

/// Reject wrongly typed nested values with the offending path.
#[test]
fn rejects_wrong_type_with_path() {
    let err =
        FieldVisitConfig::load_from_str(r#"{ signature: { width: "wide" } }"#).unwrap_err();
    assert!(format!("{err}").contains("signature.width"));
}

/// Invariants not expressible in serde are enforced.
#[test]
fn rejects_invalid_signature_settings() {
    let err = FieldVisitConfig::load_from_str("{ signature: { height: 0 } }").unwrap_err();
    assert!(format!("{err}").contains("signature"));

    let err = FieldVisitConfig::load_from_str(r#"{ signature: { stroke_color: "white" } }"#)
        .unwrap_err();
    assert!(format!("{err}").contains("signature.stroke_color"));

    let err = FieldVisitConfig::load_from_str("{ signature: { stroke_width: 0 } }").unwrap_err();
    assert!(format!("{err}").contains("signature.stroke_width"));

    let err = FieldVisitConfig::load_from_str(r##"{ signature: { stroke_color: "#+f+f+f" } }"##)
        .unwrap_err();
    assert!(format!("{err}").contains("signature.stroke_color"));

    let err = FieldVisitConfig::load_from_str(r#"{ store: { path: " " } }"#).unwrap_err();
    assert!(format!("{err}").contains("store.path"));
}

/// Workspace settings override the user's; untouched settings survive.
#[test]
fn workspace_layer_overrides_user_settings() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let workspace = root.join("depot");
    let cwd = workspace.join("jobs").join("march");
    fs::create_dir_all(&cwd).expect("cwd");

    write_json5(
        &root.join("user.json5"),
        "{ directory: { lookup_delay_ms: 20, seed: 9 }, session: { user: \"Thandi\" } }",
    );
    write_workspace(
        &workspace,
        "{ directory: { lookup_delay_ms: 0 }, signature: { width: 400 } }",
    );

    let layered =
        FieldVisitConfig::load_layered_with_options(isolated_options(root, &cwd)).expect("config");
    let sources: Vec<ConfigLayerSource> = layered.layers.iter().map(|l| l.source).collect();

    assert_eq!(
        sources,
        vec![ConfigLayerSource::User, ConfigLayerSource::Workspace]
    );
    assert_eq!(
        layered.workspace,
        Some(workspace.canonicalize().expect("canonical"))
    );
    assert_eq!(layered.config.directory.lookup_delay_ms, 0);
    assert_eq!(layered.config.directory.seed, Some(9));
    assert_eq!(layered.config.signature.width, 400);
    assert_eq!(layered.config.session.user.as_deref(), Some("Thandi"));
}

/// A workspace without a store setting keeps records beside its config.
#[test]
fn workspace_defaults_store_beside_its_config() {
    let temp = TempDir::new().expect("tmp");
    let workspace = temp.path().join("depot");
    let cwd = workspace.join("site");
    fs::create_dir_all(&cwd).expect("cwd");
    write_workspace(&workspace, "{}");

    let layered = FieldVisitConfig::load_layered_with_options(isolated_options(temp.path(), &cwd))
        .expect("config");
    let expected = workspace
        .canonicalize()
        .expect("canonical")
        .join(DEFAULT_CONFIG_DIR)
        .join(WORKSPACE_STORE_DIR);
    assert_eq!(
        layered.config.store.path.map(PathBuf::from),
        Some(expected)
    );
}

/// Relative store paths resolve against the layer that set them.
#[test]
fn relative_store_paths_are_anchored_to_their_layer() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let workspace = root.join("depot");
    fs::create_dir_all(&workspace).expect("workspace");
    write_workspace(&workspace, "{ store: { path: \"records\" } }");

    let layered =
        FieldVisitConfig::load_layered_with_options(isolated_options(root, &workspace))
            .expect("config");
    assert_eq!(layered.layers[0].base, workspace.canonicalize().expect("canonical"));
    assert_eq!(
        layered.config.store.path.map(PathBuf::from),
        Some(workspace.canonicalize().expect("canonical").join("records"))
    );

    let overrides = root.join("overrides");
    write_json5(
        &overrides.join("van.json5"),
        "{ store: { path: \"van-records\" } }",
    );
    let options =
        isolated_options(root, &workspace).with_override(overrides.join("van.json5"));
    let layered = FieldVisitConfig::load_layered_with_options(options).expect("config");
    assert_eq!(layered.layers[1].source, ConfigLayerSource::Override);
    assert_eq!(
        layered.config.store.path.map(PathBuf::from),
        Some(overrides.join("van-records"))
    );

    let loaded = FieldVisitConfig::load_from_path(overrides.join("van.json5")).expect("config");
    assert_eq!(
        loaded.store.path.map(PathBuf::from),
        Some(overrides.join("van-records"))
    );
}

/// A home directory that is also the workspace is read once, as the user layer.
#[test]
fn user_config_is_not_reloaded_as_workspace() {
    let temp = TempDir::new().expect("tmp");
    let home = temp.path();
    let cwd = home.join("jobs");
    fs::create_dir_all(&cwd).expect("cwd");
    write_workspace(home, "{ session: { user: \"Sipho\" } }");

    let options = LayeredConfigOptions {
        cwd,
        user_config_path: Some(home.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILE)),
        overrides: Vec::new(),
    };
    let layered = FieldVisitConfig::load_layered_with_options(options).expect("config");
    assert_eq!(layered.layers.len(), 1);
    assert_eq!(layered.layers[0].source, ConfigLayerSource::User);
    assert_eq!(layered.config.session.user.as_deref(), Some("Sipho"));
}

/// A missing override is an error naming the file, unlike discovered layers.
#[test]
fn missing_override_fails_with_its_path() {
    let temp = TempDir::new().expect("tmp");
    let missing = temp.path().join("missing.json5");
    let options = isolated_options(temp.path(), temp.path()).with_override(&missing);
    let err = FieldVisitConfig::load_layered_with_options(options).unwrap_err();
    assert!(matches!(&err, ConfigError::Read { path, .. } if path == &missing));
}

/// Syntax errors name the layer they came from.
#[test]
fn syntax_errors_name_the_layer() {
    let temp = TempDir::new().expect("tmp");
    write_json5(&temp.path().join("user.json5"), "{ directory: ");
    let err = FieldVisitConfig::load_layered_with_options(isolated_options(
        temp.path(),
        temp.path(),
    ))
    .unwrap_err();
    assert!(matches!(&err, ConfigError::Syntax { origin, .. } if origin.starts_with("user(")));
}

/// Builder produces a config equivalent to the defaults plus overrides.
#[test]
fn builder_overrides_sections() {
    let config = FieldVisitConfig::builder()
        .directory(crate::DirectoryConfig {
            lookup_delay_ms: 5,
            min_query_chars: 3,
            seed: Some(7),
        })
        .build();
    assert_eq!(config.directory.seed, Some(7));
    config.validate().expect("valid");
}
