//! Config loading failures, tagged with the file or layer they came from.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists (or was named explicitly) but could not be read.
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid JSON5.
    #[error("{origin} is not valid JSON5: {source}")]
    Syntax {
        origin: String,
        #[source]
        source: json5::Error,
    },
    /// The merged document passed the schema but did not decode.
    #[error("config does not decode into fieldvisit settings: {0}")]
    Decode(#[from] serde_json::Error),
    /// A value is missing, unknown, wrongly typed, or out of range.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
}
