//! Error types for record store operations.

use fieldvisit_protocol::{VisitId, VisitStatus};

/// Errors returned by record stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with the given id.
    #[error("visit not found: {0}")]
    NotFound(VisitId),
    /// Patch would move a record backwards in its lifecycle.
    #[error("visit {id} cannot move from {from} to {to}")]
    StatusRegression {
        id: VisitId,
        from: VisitStatus,
        to: VisitStatus,
    },
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
