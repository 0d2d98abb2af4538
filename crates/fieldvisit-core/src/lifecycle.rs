//! Open, time, and close a visit record.

use crate::clock::{Clock, SystemClock};
use crate::directory::BusinessDirectory;
use crate::error::{VisitError, WorkField};
use crate::signature::Signature;
use fieldvisit_protocol::{
    BusinessInfo, Notification, NotificationSink, SessionInfo, VisitDraft, VisitId, VisitPatch,
    VisitRecord, VisitStatus,
};
use fieldvisit_store::{RecordStore, StoreError};
use chrono::NaiveDate;
use log::{info, warn};
use std::sync::Arc;

/// Request to open a visit. Omitted client details are resolved by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenVisit {
    pub business_name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub distance_km: Option<f64>,
}

impl OpenVisit {
    /// Open by name only, resolving every detail.
    pub fn named(business_name: impl Into<String>) -> Self {
        Self {
            business_name: business_name.into(),
            ..Self::default()
        }
    }

    fn needs_lookup(&self) -> bool {
        self.address.is_none() || self.contact.is_none() || self.distance_km.is_none()
    }
}

/// Work details captured at sign-off.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloseFields {
    pub scope_of_work: String,
    pub work_completed: String,
    pub order_number: String,
    pub service_request_number: String,
    /// Defaults to the current date (`YYYY-MM-DD`).
    pub scheduled_date: Option<String>,
    /// Defaults to the current time (`HH:MM`).
    pub scheduled_time: Option<String>,
    /// Defaults to the record's distance.
    pub kilometers: Option<f64>,
}

impl CloseFields {
    /// Required fields that are blank after trimming, in form order.
    pub fn missing(&self) -> Vec<WorkField> {
        WorkField::ALL
            .into_iter()
            .filter(|field| self.value(*field).trim().is_empty())
            .collect()
    }

    fn value(&self, field: WorkField) -> &str {
        match field {
            WorkField::ScopeOfWork => &self.scope_of_work,
            WorkField::WorkCompleted => &self.work_completed,
            WorkField::OrderNumber => &self.order_number,
            WorkField::ServiceRequestNumber => &self.service_request_number,
        }
    }
}

/// Record counts for the history overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitSummary {
    pub total: usize,
    pub closed: usize,
    pub open: usize,
    /// Visits created on the clock's current UTC date.
    pub today: usize,
}

impl VisitSummary {
    fn tally(records: &[VisitRecord], today: NaiveDate) -> Self {
        records.iter().fold(Self::default(), |mut summary, record| {
            summary.total += 1;
            match record.status {
                VisitStatus::Open => summary.open += 1,
                VisitStatus::Closed => summary.closed += 1,
            }
            if record.created_at.date_naive() == today {
                summary.today += 1;
            }
            summary
        })
    }
}

/// Orchestrates visit state transitions over an injected store.
///
/// Every failure is returned to the caller and also raised as an error
/// notification; successful transitions raise an info notification.
pub struct VisitLifecycle {
    store: Arc<dyn RecordStore>,
    directory: Arc<dyn BusinessDirectory>,
    clock: Arc<dyn Clock>,
    notifier: Option<Arc<dyn NotificationSink>>,
    session: SessionInfo,
}

impl VisitLifecycle {
    pub fn new(store: Arc<dyn RecordStore>, directory: Arc<dyn BusinessDirectory>) -> Self {
        Self {
            store,
            directory,
            clock: Arc::new(SystemClock),
            notifier: None,
            session: SessionInfo::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_session(mut self, session: SessionInfo) -> Self {
        if session.location_available() {
            info!("session location available");
        }
        self.session = session;
        self
    }

    pub fn session(&self) -> &SessionInfo {
        &self.session
    }

    /// Create an open visit, resolving any client details not supplied.
    pub async fn open(&self, request: OpenVisit) -> Result<VisitRecord, VisitError> {
        let result = self.open_visit(request).await;
        self.report("open", result, |record| {
            Notification::info(
                "Entry Created",
                format!("Visit opened for {}", record.business_name),
            )
        })
    }

    /// Stamp `started_at` on an open visit.
    pub fn start_work(&self, id: VisitId) -> Result<VisitRecord, VisitError> {
        let result = self.start(id);
        self.report("start", result, |record| {
            let at = record.started_at.unwrap_or_else(|| self.clock.now());
            Notification::info("Job Started", format!("Job started at {}", at.format("%H:%M")))
        })
    }

    /// Stamp `ended_at` on a started visit.
    pub fn end_work(&self, id: VisitId) -> Result<VisitRecord, VisitError> {
        let result = self.end(id);
        self.report("end", result, |record| {
            let at = record.ended_at.unwrap_or_else(|| self.clock.now());
            Notification::info("Job Completed", format!("Job ended at {}", at.format("%H:%M")))
        })
    }

    /// Sign off a visit with its work details in a single update.
    pub fn close(
        &self,
        id: VisitId,
        fields: CloseFields,
        signature: Option<&Signature>,
    ) -> Result<VisitRecord, VisitError> {
        let result = self.close_visit(id, fields, signature);
        self.report("close", result, |_| {
            Notification::info("Job Completed!", "Job details saved successfully.")
        })
    }

    /// Fetch a visit by id.
    pub fn find(&self, id: VisitId) -> Result<VisitRecord, VisitError> {
        let result = self.store.get(id).map_err(VisitError::from);
        self.report_failure("find", result)
    }

    /// Visits matching a search term, in creation order.
    pub fn history(&self, term: &str) -> Result<Vec<VisitRecord>, VisitError> {
        let result = self.store.search(term).map_err(VisitError::from);
        self.report_failure("history", result)
    }

    /// Count visits by status and those created today.
    pub fn summary(&self) -> Result<VisitSummary, VisitError> {
        let result = self
            .store
            .list()
            .map_err(VisitError::from)
            .map(|records| VisitSummary::tally(&records, self.clock.now().date_naive()));
        self.report_failure("summary", result)
    }

    async fn open_visit(&self, request: OpenVisit) -> Result<VisitRecord, VisitError> {
        let name = request.business_name.trim();
        if name.is_empty() {
            return Err(VisitError::Validation(
                "business name must not be empty".to_string(),
            ));
        }
        if request.distance_km.is_some_and(|km| !km.is_finite()) {
            return Err(VisitError::Validation(
                "distance must be a finite number".to_string(),
            ));
        }
        let resolved: Option<BusinessInfo> = if request.needs_lookup() {
            let resolution = self.directory.resolve(name).await;
            if resolution.is_none() {
                warn!("directory lookup returned nothing (business={name})");
            }
            resolution.map(|resolution| resolution.info)
        } else {
            None
        };

        let draft = VisitDraft {
            business_name: name.to_string(),
            address: request
                .address
                .or_else(|| resolved.as_ref().map(|info| info.address.clone()))
                .unwrap_or_default(),
            contact: request
                .contact
                .or_else(|| resolved.as_ref().map(|info| info.contact.clone()))
                .unwrap_or_default(),
            distance_km: request
                .distance_km
                .or_else(|| resolved.as_ref().map(|info| info.distance_km))
                .unwrap_or_default(),
            recorded_by: self.session.user.clone(),
        };
        let record = self.store.create(draft)?;
        info!(
            "opened visit (id={}, business={})",
            record.id, record.business_name
        );
        Ok(record)
    }

    fn start(&self, id: VisitId) -> Result<VisitRecord, VisitError> {
        let record = self.existing(id)?;
        if record.status == VisitStatus::Closed {
            return Err(VisitError::invalid_state(id, "visit is already closed"));
        }
        if record.started_at.is_some() {
            return Err(VisitError::invalid_state(id, "work has already started"));
        }
        let record = self.store.update(
            id,
            VisitPatch {
                started_at: Some(self.clock.now()),
                ..VisitPatch::default()
            },
        )?;
        info!("started work (id={id})");
        Ok(record)
    }

    fn end(&self, id: VisitId) -> Result<VisitRecord, VisitError> {
        let record = self.existing(id)?;
        if record.status == VisitStatus::Closed {
            return Err(VisitError::invalid_state(id, "visit is already closed"));
        }
        let Some(started_at) = record.started_at else {
            return Err(VisitError::invalid_state(id, "work has not started"));
        };
        if record.ended_at.is_some() {
            return Err(VisitError::invalid_state(id, "work has already ended"));
        }
        // A clock that steps backwards must not produce an end before the start.
        let ended_at = self.clock.now().max(started_at);
        let record = self.store.update(
            id,
            VisitPatch {
                ended_at: Some(ended_at),
                ..VisitPatch::default()
            },
        )?;
        info!("ended work (id={id})");
        Ok(record)
    }

    fn close_visit(
        &self,
        id: VisitId,
        fields: CloseFields,
        signature: Option<&Signature>,
    ) -> Result<VisitRecord, VisitError> {
        let record = self.store.get(id)?;
        if record.status == VisitStatus::Closed {
            return Err(VisitError::invalid_state(id, "visit is already closed"));
        }
        let signature = signature.ok_or(VisitError::SignatureRequired)?;
        let missing = fields.missing();
        if !missing.is_empty() {
            return Err(VisitError::MissingFields(missing));
        }
        if fields.kilometers.is_some_and(|km| !km.is_finite()) {
            return Err(VisitError::Validation(
                "kilometers must be a finite number".to_string(),
            ));
        }

        let now = self.clock.now();
        let non_blank = |value: Option<String>| value.filter(|value| !value.trim().is_empty());
        let patch = VisitPatch {
            status: Some(VisitStatus::Closed),
            closed_at: Some(now),
            scheduled_date: Some(
                non_blank(fields.scheduled_date)
                    .unwrap_or_else(|| now.format("%Y-%m-%d").to_string()),
            ),
            scheduled_time: Some(
                non_blank(fields.scheduled_time).unwrap_or_else(|| now.format("%H:%M").to_string()),
            ),
            kilometers: Some(fields.kilometers.unwrap_or(record.distance_km)),
            scope_of_work: Some(fields.scope_of_work.trim().to_string()),
            work_completed: Some(fields.work_completed.trim().to_string()),
            order_number: Some(fields.order_number.trim().to_string()),
            service_request_number: Some(fields.service_request_number.trim().to_string()),
            signature: Some(signature.as_data_url().to_string()),
            ..VisitPatch::default()
        };
        let record = self.store.update(id, patch)?;
        info!(
            "closed visit (id={id}, order_number={})",
            record.order_number
        );
        Ok(record)
    }

    /// Load a record for a timing transition; a missing record is out of sequence.
    fn existing(&self, id: VisitId) -> Result<VisitRecord, VisitError> {
        match self.store.get(id) {
            Ok(record) => Ok(record),
            Err(StoreError::NotFound(_)) => {
                Err(VisitError::invalid_state(id, "visit does not exist"))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn report<T>(
        &self,
        operation: &str,
        result: Result<T, VisitError>,
        on_success: impl FnOnce(&T) -> Notification,
    ) -> Result<T, VisitError> {
        if let Ok(value) = &result {
            self.notify(on_success(value));
        }
        self.report_failure(operation, result)
    }

    fn report_failure<T>(
        &self,
        operation: &str,
        result: Result<T, VisitError>,
    ) -> Result<T, VisitError> {
        if let Err(err) = &result {
            warn!("visit operation failed (operation={operation}, error={err})");
            self.notify(Notification::error(err.title(), err.to_string()));
        }
        result
    }

    fn notify(&self, notification: Notification) {
        if let Some(notifier) = &self.notifier {
            notifier.notify(notification);
        }
    }
}
