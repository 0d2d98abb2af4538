//! Schema validation helpers for fieldvisit JSON5 configuration.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    let allowed = ["$schema", "store", "directory", "signature", "session"];
    ensure_allowed_keys(map, &allowed, layer, "")?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("store") {
        validate_store(value, layer, "store")?;
    }
    if let Some(value) = map.get("directory") {
        validate_directory(value, layer, "directory")?;
    }
    if let Some(value) = map.get("signature") {
        validate_signature(value, layer, "signature")?;
    }
    if let Some(value) = map.get("session") {
        validate_session(value, layer, "session")?;
    }

    Ok(())
}

/// Validate the "store" block.
fn validate_store(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["path"], layer, path)?;

    if let Some(value) = map.get("path") {
        expect_string(value, layer, &join_path(path, "path"))?;
    }
    Ok(())
}

/// Validate the "directory" block.
fn validate_directory(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let allowed = ["lookup_delay_ms", "min_query_chars", "seed"];
    ensure_allowed_keys(map, &allowed, layer, path)?;

    if let Some(value) = map.get("lookup_delay_ms") {
        expect_u64(value, layer, &join_path(path, "lookup_delay_ms"))?;
    }
    if let Some(value) = map.get("min_query_chars") {
        expect_u64(value, layer, &join_path(path, "min_query_chars"))?;
    }
    if let Some(value) = map.get("seed") {
        expect_u64(value, layer, &join_path(path, "seed"))?;
    }
    Ok(())
}

/// Validate the "signature" block.
fn validate_signature(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let allowed = ["width", "height", "stroke_width", "stroke_color"];
    ensure_allowed_keys(map, &allowed, layer, path)?;

    if let Some(value) = map.get("width") {
        expect_u64(value, layer, &join_path(path, "width"))?;
    }
    if let Some(value) = map.get("height") {
        expect_u64(value, layer, &join_path(path, "height"))?;
    }
    if let Some(value) = map.get("stroke_width") {
        expect_f64(value, layer, &join_path(path, "stroke_width"))?;
    }
    if let Some(value) = map.get("stroke_color") {
        expect_string(value, layer, &join_path(path, "stroke_color"))?;
    }
    Ok(())
}

/// Validate the "session" block.
fn validate_session(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["user"], layer, path)?;

    if let Some(value) = map.get("user") {
        expect_string(value, layer, &join_path(path, "user"))?;
    }
    Ok(())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Expect a JSON string or return a typed error.
fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

/// Expect a non-negative JSON integer or return a typed error.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

/// Expect a JSON number or return a typed error.
fn expect_f64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_f64() || value.is_u64() || value.is_i64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected number"))
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
pub(super) fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
