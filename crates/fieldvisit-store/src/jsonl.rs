//! JSONL-backed record store persisting the whole collection on every write.

use crate::record::{merge_patch, new_record};
use crate::{RecordStore, StoreError};
use fieldvisit_protocol::{VisitDraft, VisitId, VisitPatch, VisitRecord};
use log::{debug, info};
use parking_lot::RwLock;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

const RECORDS_FILENAME: &str = "visits.jsonl";

/// Durable record store: one JSON record per line, in creation order.
#[derive(Debug)]
pub struct JsonlRecordStore {
    /// Path to the records file.
    path: PathBuf,
    /// Cached collection; replaced only after a successful write.
    records: RwLock<Vec<VisitRecord>>,
}

impl JsonlRecordStore {
    /// Open (or create) a store under the given root directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        let path = root.join(RECORDS_FILENAME);
        let records = load_records(&path)?;
        info!(
            "initialized JSONL record store (path={}, records={})",
            path.display(),
            records.len()
        );
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Location of the records file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path to the temporary file used for atomic rewrites.
    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("jsonl.tmp")
    }

    /// Rewrite the full collection atomically.
    fn write_records(&self, records: &[VisitRecord]) -> Result<(), StoreError> {
        let temp_path = self.temp_path();
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            for record in records {
                let line = serde_json::to_string(record)?;
                writeln!(file, "{line}")?;
            }
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        debug!(
            "persisted visit records (path={}, count={})",
            self.path.display(),
            records.len()
        );
        Ok(())
    }
}

impl RecordStore for JsonlRecordStore {
    fn create(&self, draft: VisitDraft) -> Result<VisitRecord, StoreError> {
        let mut records = self.records.write();
        let record = new_record(draft);
        let mut next = records.clone();
        next.push(record.clone());
        self.write_records(&next)?;
        *records = next;
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
        let index = records
            .iter()
            .position(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let updated = merge_patch(&records[index], &patch)?;
        let mut next = records.clone();
        next[index] = updated.clone();
        self.write_records(&next)?;
        *records = next;
        Ok(updated)
    }

    fn list(&self) -> Result<Vec<VisitRecord>, StoreError> {
        Ok(self.records.read().clone())
    }
}

/// Load all records from disk, skipping blank lines.
fn load_records(path: &Path) -> Result<Vec<VisitRecord>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = OpenOptions::new().read(true).open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: VisitRecord = serde_json::from_str(&line)?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::{JsonlRecordStore, RECORDS_FILENAME};
    use crate::{RecordStore, StoreError};
    use fieldvisit_protocol::{VisitDraft, VisitPatch, VisitStatus};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn draft(name: &str) -> VisitDraft {
        VisitDraft {
            business_name: name.to_string(),
            address: "123 Main Road, Cape Town, Western Cape, 8001".to_string(),
            contact: "+27 21 658 1000".to_string(),
            distance_km: 15.2,
            recorded_by: Some("tech".to_string()),
        }
    }

    #[test]
    fn records_survive_reopen_in_creation_order() {
        let temp = tempdir().expect("tempdir");
        let store = JsonlRecordStore::new(temp.path()).expect("store");
        let first = store.create(draft("Pick n Pay")).expect("create first");
        let second = store.create(draft("Shoprite")).expect("create second");
        store
            .update(
                first.id,
                VisitPatch {
                    order_number: Some("PO-1".to_string()),
                    ..VisitPatch::default()
                },
            )
            .expect("update");

        let reopened = JsonlRecordStore::new(temp.path()).expect("reopen");
        let records = reopened.list().expect("list");
        let ids: Vec<_> = records.iter().map(|record| record.id).collect();

        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(records[0].order_number, "PO-1");
        assert_eq!(records[1].status, VisitStatus::Open);
    }

    #[test]
    fn skips_blank_lines_and_rejects_garbage() {
        let temp = tempdir().expect("tempdir");
        let store = JsonlRecordStore::new(temp.path()).expect("store");
        store.create(draft("Woolworths")).expect("create");
        let path = temp.path().join(RECORDS_FILENAME);

        let contents = std::fs::read_to_string(&path).expect("read");
        std::fs::write(&path, format!("\n{contents}\n\n")).expect("write blanks");
        let reopened = JsonlRecordStore::new(temp.path()).expect("reopen with blanks");
        assert_eq!(reopened.list().expect("list").len(), 1);

        std::fs::write(&path, "not-json\n").expect("write garbage");
        let err = JsonlRecordStore::new(temp.path()).unwrap_err();
        assert!(matches!(err, StoreError::Serde(_)));
    }

    #[test]
    fn update_of_missing_record_leaves_file_untouched() {
        let temp = tempdir().expect("tempdir");
        let store = JsonlRecordStore::new(temp.path()).expect("store");
        store.create(draft("Checkers")).expect("create");
        let before = std::fs::read_to_string(store.path()).expect("read");

        let err = store
            .update(uuid::Uuid::new_v4(), VisitPatch::default())
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(std::fs::read_to_string(store.path()).expect("read"), before);
    }
}
