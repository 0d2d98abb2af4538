//! Error types for visit lifecycle operations.

use fieldvisit_protocol::VisitId;
use fieldvisit_store::StoreError;
use thiserror::Error;

/// Work-detail fields that must be filled before a visit can close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkField {
    ScopeOfWork,
    WorkCompleted,
    OrderNumber,
    ServiceRequestNumber,
}

impl WorkField {
    /// Every required field, in form order.
    pub const ALL: [WorkField; 4] = [
        WorkField::ScopeOfWork,
        WorkField::WorkCompleted,
        WorkField::OrderNumber,
        WorkField::ServiceRequestNumber,
    ];

    /// Field name as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkField::ScopeOfWork => "scopeOfWork",
            WorkField::WorkCompleted => "workCompleted",
            WorkField::OrderNumber => "orderNumber",
            WorkField::ServiceRequestNumber => "serviceRequestNumber",
        }
    }
}

impl std::fmt::Display for WorkField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by lifecycle operations. All are recoverable by the caller.
#[derive(Debug, Error)]
pub enum VisitError {
    /// Input rejected before any state change.
    #[error("validation failed: {0}")]
    Validation(String),
    /// One or more required close fields are blank.
    #[error("missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<WorkField>),
    /// Close attempted without a captured signature.
    #[error("a captured signature is required before closing")]
    SignatureRequired,
    /// Operation called out of sequence.
    #[error("invalid action on visit {id}: {reason}")]
    InvalidState { id: VisitId, reason: String },
    /// No visit with the given id.
    #[error("visit not found: {0}")]
    NotFound(VisitId),
    /// Persistence failed; the operation did not take effect.
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl VisitError {
    /// Short notification title for this failure.
    pub fn title(&self) -> &'static str {
        match self {
            VisitError::Validation(_) | VisitError::MissingFields(_) => "Missing Information",
            VisitError::SignatureRequired => "Signature Required",
            VisitError::InvalidState { .. } => "Invalid Action",
            VisitError::NotFound(_) => "Not Found",
            VisitError::Store(_) => "Storage Error",
        }
    }

    pub(crate) fn invalid_state(id: VisitId, reason: impl Into<String>) -> Self {
        VisitError::InvalidState {
            id,
            reason: reason.into(),
        }
    }
}

impl From<StoreError> for VisitError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => VisitError::NotFound(id),
            StoreError::StatusRegression { id, from, to } => {
                VisitError::invalid_state(id, format!("cannot move from {from} to {to}"))
            }
            other => VisitError::Store(other),
        }
    }
}

fn join_fields(fields: &[WorkField]) -> String {
    fields
        .iter()
        .map(WorkField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::{VisitError, WorkField};
    use fieldvisit_store::StoreError;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    #[test]
    fn missing_fields_message_lists_every_field() {
        let err = VisitError::MissingFields(vec![WorkField::ScopeOfWork, WorkField::OrderNumber]);
        assert_eq!(
            err.to_string(),
            "missing required fields: scopeOfWork, orderNumber"
        );
        assert_eq!(err.title(), "Missing Information");
    }

    #[test]
    fn store_not_found_maps_to_not_found() {
        let id = Uuid::new_v4();
        let err = VisitError::from(StoreError::NotFound(id));
        assert!(matches!(err, VisitError::NotFound(found) if found == id));
    }
}
