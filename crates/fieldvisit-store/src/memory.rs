//! Volatile in-process record store.

use crate::record::{merge_patch, new_record};
use crate::{RecordStore, StoreError};
use fieldvisit_protocol::{VisitDraft, VisitId, VisitPatch, VisitRecord};
use log::debug;
use parking_lot::RwLock;

/// Record store that keeps everything in memory.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<Vec<VisitRecord>>,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn create(&self, draft: VisitDraft) -> Result<VisitRecord, StoreError> {
        let record = new_record(draft);
        self.records.write().push(record.clone());
        debug!("created visit in memory (id={})", record.id);
        Ok(record)
    }

    fn get(&self, id: VisitId) -> Result<VisitRecord, StoreError> {
        self.records
            .read()
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn update(&self, id: VisitId, patch: VisitPatch) -> Result<VisitRecord, StoreError> {
        let mut records = self.records.write();
        let slot = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let next = merge_patch(slot, &patch)?;
        *slot = next.clone();
        Ok(next)
    }

    fn list(&self) -> Result<Vec<VisitRecord>, StoreError> {
        Ok(self.records.read().clone())
    }
}
