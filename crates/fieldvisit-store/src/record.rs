//! Record construction and patch merging shared by store implementations.

use crate::StoreError;
use chrono::Utc;
use fieldvisit_protocol::{VisitDraft, VisitPatch, VisitRecord, VisitStatus};
use uuid::Uuid;

/// Build a fresh open record from a draft.
pub(crate) fn new_record(draft: VisitDraft) -> VisitRecord {
    VisitRecord {
        id: Uuid::new_v4(),
        business_name: draft.business_name,
        address: draft.address,
        contact: draft.contact,
        distance_km: draft.distance_km,
        status: VisitStatus::Open,
        created_at: Utc::now(),
        recorded_by: draft.recorded_by,
        scheduled_date: None,
        scheduled_time: None,
        started_at: None,
        ended_at: None,
        kilometers: None,
        scope_of_work: String::new(),
        work_completed: String::new(),
        order_number: String::new(),
        service_request_number: String::new(),
        signature: None,
        closed_at: None,
    }
}

/// Merge a patch onto a stored record, rejecting Closed -> Open.
pub(crate) fn merge_patch(
    existing: &VisitRecord,
    patch: &VisitPatch,
) -> Result<VisitRecord, StoreError> {
    if existing.status == VisitStatus::Closed && patch.status == Some(VisitStatus::Open) {
        return Err(StoreError::StatusRegression {
            id: existing.id,
            from: VisitStatus::Closed,
            to: VisitStatus::Open,
        });
    }
    Ok(patch.apply(existing))
}
