use fieldvisit_protocol::{VisitDraft, VisitId, VisitPatch, VisitRecord};
use fieldvisit_store::{InMemoryRecordStore, RecordStore, StoreError};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory store whose writes can be switched to fail.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: InMemoryRecordStore,
    fail_writes: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io(io::Error::other("disk full")));
        }
        Ok(())
    }
}

impl RecordStore for FailingStore {
    fn create(&self, draft: VisitDraft) -> Result<VisitRecord, StoreError> {
        self.check_write()?;
        self.inner.create(draft)
    }

    fn get(&self, id: VisitId) -> Result<VisitRecord, StoreError> {
        self.inner.get(id)
    }

    fn update(&self, id: VisitId, patch: VisitPatch) -> Result<VisitRecord, StoreError> {
        self.check_write()?;
        self.inner.update(id, patch)
    }

    fn list(&self) -> Result<Vec<VisitRecord>, StoreError> {
        self.inner.list()
    }
}
