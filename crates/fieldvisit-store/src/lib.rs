//! Durable keyed storage for visit records.

pub mod error;
mod record;
pub mod jsonl;
pub mod memory;
pub mod search;

/// Store error type.
pub use error::StoreError;
/// Durable JSONL-backed store.
pub use jsonl::JsonlRecordStore;
/// Volatile store for tests and embedding.
pub use memory::InMemoryRecordStore;
/// History search helpers.
pub use search::matches_search;

use fieldvisit_protocol::{VisitDraft, VisitId, VisitPatch, VisitRecord};

/// Keyed collection of visit records; the single source of truth.
///
/// Implementations assign `id`/`created_at` on create, replace whole records
/// on update (last writer wins), and keep `list()` in creation order. Durable
/// implementations persist the full collection before returning from a
/// successful `create` or `update`.
pub trait RecordStore: Send + Sync {
    /// Create an open record from a draft.
    fn create(&self, draft: VisitDraft) -> Result<VisitRecord, StoreError>;
    /// Fetch a record by id.
    fn get(&self, id: VisitId) -> Result<VisitRecord, StoreError>;
    /// Merge a patch into a stored record and replace it.
    fn update(&self, id: VisitId, patch: VisitPatch) -> Result<VisitRecord, StoreError>;
    /// All records in creation order.
    fn list(&self) -> Result<Vec<VisitRecord>, StoreError>;

    /// Records matching a history search term, in creation order.
    fn search(&self, term: &str) -> Result<Vec<VisitRecord>, StoreError> {
        let mut records = self.list()?;
        records.retain(|record| matches_search(record, term));
        Ok(records)
    }
}
