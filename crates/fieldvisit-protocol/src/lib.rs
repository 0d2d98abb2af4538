//! Shared data types for field-service visits, notifications, and input events.

mod notification;
mod pointer;
mod session;

pub use notification::{Notification, NotificationKind, NotificationSink};
pub use pointer::{PointerEvent, PointerPhase, PointerSource, TouchPoint};
pub use session::{GeoFix, SessionInfo};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a visit record.
pub type VisitId = Uuid;

/// Lifecycle status of a persisted visit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    /// Visit opened and awaiting sign-off.
    #[default]
    Open,
    /// Visit signed off; terminal.
    Closed,
}

impl VisitStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::Open => "open",
            VisitStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client details resolved for a business name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
    /// Physical address.
    pub address: String,
    /// Contact phone number.
    pub contact: String,
    /// Distance to the client in kilometres.
    pub distance_km: f64,
}

/// Persisted visit record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    /// Record identifier, assigned by the store.
    pub id: VisitId,
    pub business_name: String,
    pub address: String,
    pub contact: String,
    pub distance_km: f64,
    pub status: VisitStatus,
    /// Creation timestamp, assigned by the store.
    pub created_at: DateTime<Utc>,
    /// User label of the session that opened the visit.
    #[serde(default)]
    pub recorded_by: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    #[serde(default)]
    pub scheduled_time: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub kilometers: Option<f64>,
    #[serde(default)]
    pub scope_of_work: String,
    #[serde(default)]
    pub work_completed: String,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub service_request_number: String,
    /// Encoded signature image (`data:image/png;base64,...`).
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

/// Caller-supplied fields for a new record; the store assigns the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitDraft {
    pub business_name: String,
    pub address: String,
    pub contact: String,
    pub distance_km: f64,
    pub recorded_by: Option<String>,
}

/// Partial update merged into a stored record in a single replace.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitPatch {
    pub status: Option<VisitStatus>,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub kilometers: Option<f64>,
    pub scope_of_work: Option<String>,
    pub work_completed: Option<String>,
    pub order_number: Option<String>,
    pub service_request_number: Option<String>,
    pub signature: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl VisitPatch {
    /// Merge this patch onto a record, returning the replacement value.
    pub fn apply(&self, record: &VisitRecord) -> VisitRecord {
        let mut next = record.clone();
        if let Some(status) = self.status {
            next.status = status;
        }
        if self.scheduled_date.is_some() {
            next.scheduled_date = self.scheduled_date.clone();
        }
        if self.scheduled_time.is_some() {
            next.scheduled_time = self.scheduled_time.clone();
        }
        if self.started_at.is_some() {
            next.started_at = self.started_at;
        }
        if self.ended_at.is_some() {
            next.ended_at = self.ended_at;
        }
        if self.kilometers.is_some() {
            next.kilometers = self.kilometers;
        }
        if let Some(value) = &self.scope_of_work {
            next.scope_of_work = value.clone();
        }
        if let Some(value) = &self.work_completed {
            next.work_completed = value.clone();
        }
        if let Some(value) = &self.order_number {
            next.order_number = value.clone();
        }
        if let Some(value) = &self.service_request_number {
            next.service_request_number = value.clone();
        }
        if self.signature.is_some() {
            next.signature = self.signature.clone();
        }
        if self.closed_at.is_some() {
            next.closed_at = self.closed_at;
        }
        next
    }

    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn open_record() -> VisitRecord {
        VisitRecord {
            id: Uuid::new_v4(),
            business_name: "Shoprite".to_string(),
            address: "456 Church Street, Johannesburg, Gauteng, 2000".to_string(),
            contact: "+27 11 517 4000".to_string(),
            distance_km: 8.7,
            status: VisitStatus::Open,
            created_at: Utc::now(),
            recorded_by: None,
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

    #[test]
    fn patch_only_touches_supplied_fields() {
        let record = open_record();
        let patch = VisitPatch {
            order_number: Some("PO-100".to_string()),
            ..VisitPatch::default()
        };
        let next = patch.apply(&record);

        assert_eq!(next.order_number, "PO-100");
        assert_eq!(next.business_name, record.business_name);
        assert_eq!(next.status, VisitStatus::Open);
        assert!(VisitPatch::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn record_serializes_with_camel_case_fields() {
        let record = open_record();
        let value = serde_json::to_value(&record).expect("serialize");

        assert_eq!(value["businessName"], "Shoprite");
        assert_eq!(value["distanceKm"], 8.7);
        assert_eq!(value["status"], "open");
        assert!(value.get("serviceRequestNumber").is_some());

        let decoded: VisitRecord = serde_json::from_value(value).expect("deserialize");
        assert_eq!(decoded, record);
    }
}
