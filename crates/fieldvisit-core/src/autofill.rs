//! Client-details form with debounced directory autofill.
//!
//! Every lookup is tagged with a ticket from [`LookupTracker`]. A result is
//! applied only while its ticket is still the latest issued for its field, so
//! a slow response can never overwrite input typed after it was requested.

use crate::directory::{BusinessDirectory, Resolution, ResolutionSource};
use crate::error::VisitError;
use crate::lifecycle::{OpenVisit, VisitLifecycle};
use fieldvisit_protocol::{Notification, NotificationSink, VisitRecord};
use log::{debug, warn};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Form field populated by an asynchronous lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupField {
    BusinessName,
}

/// Sequence-tagged handle for one lookup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTicket {
    pub field: LookupField,
    pub sequence: u64,
}

/// Issues monotonically increasing lookup tickets per field.
#[derive(Debug, Default)]
pub struct LookupTracker {
    latest: Mutex<HashMap<LookupField, u64>>,
}

impl LookupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket, superseding every earlier one for the field.
    pub fn issue(&self, field: LookupField) -> LookupTicket {
        let mut latest = self.latest.lock();
        let sequence = latest.entry(field).or_insert(0);
        *sequence += 1;
        LookupTicket {
            field,
            sequence: *sequence,
        }
    }

    /// Supersede outstanding tickets without issuing a new one.
    pub fn invalidate(&self, field: LookupField) {
        *self.latest.lock().entry(field).or_insert(0) += 1;
    }

    /// Whether the ticket is still the latest for its field.
    pub fn is_current(&self, ticket: &LookupTicket) -> bool {
        self.latest.lock().get(&ticket.field).copied() == Some(ticket.sequence)
    }
}

/// Manually editable client fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Address,
    Contact,
    DistanceKm,
}

/// Client details as typed or autofilled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientForm {
    pub business_name: String,
    pub address: String,
    pub contact: String,
    /// Distance as entered; parsed on submit.
    pub distance_km: String,
}

impl ClientForm {
    /// All four fields are non-empty after trimming.
    pub fn is_complete(&self) -> bool {
        [
            &self.business_name,
            &self.address,
            &self.contact,
            &self.distance_km,
        ]
        .iter()
        .all(|value| !value.trim().is_empty())
    }
}

struct AutofillState {
    tracker: LookupTracker,
    form: Mutex<ClientForm>,
    notifier: RwLock<Option<Arc<dyn NotificationSink>>>,
}

impl AutofillState {
    fn apply(&self, ticket: LookupTicket, resolution: Resolution) -> bool {
        let mut form = self.form.lock();
        if !self.tracker.is_current(&ticket) {
            warn!(
                "discarded stale lookup (field={:?}, sequence={})",
                ticket.field, ticket.sequence
            );
            return false;
        }
        form.address = resolution.info.address;
        form.contact = resolution.info.contact;
        form.distance_km = resolution.info.distance_km.to_string();
        let notification = match resolution.source {
            ResolutionSource::Directory(name) => {
                Notification::info("Business Found!", format!("Auto-populated details for {name}"))
            }
            ResolutionSource::Synthesized => {
                Notification::info("Business Located", "Auto-populated estimated details")
            }
        };
        drop(form);
        debug!("applied lookup (sequence={})", ticket.sequence);
        self.notify(notification);
        true
    }

    fn notify(&self, notification: Notification) {
        let notifier = self.notifier.read().clone();
        if let Some(notifier) = notifier {
            notifier.notify(notification);
        }
    }
}

/// Drives a [`ClientForm`] from business-name input.
///
/// Lookups run as tokio tasks, so input must be fed from within a runtime.
/// Dropping the autofill cancels any pending lookup.
pub struct Autofill {
    directory: Arc<dyn BusinessDirectory>,
    state: Arc<AutofillState>,
    min_query_chars: usize,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Autofill {
    pub fn new(directory: Arc<dyn BusinessDirectory>, min_query_chars: usize) -> Self {
        Self {
            directory,
            state: Arc::new(AutofillState {
                tracker: LookupTracker::new(),
                form: Mutex::new(ClientForm::default()),
                notifier: RwLock::new(None),
            }),
            min_query_chars,
            pending: Mutex::new(None),
        }
    }

    /// Attach a notification sink for lookup and submit events.
    pub fn with_notifier(self, notifier: Arc<dyn NotificationSink>) -> Self {
        *self.state.notifier.write() = Some(notifier);
        self
    }

    /// Snapshot of the form.
    pub fn form(&self) -> ClientForm {
        self.state.form.lock().clone()
    }

    /// Record a business-name edit and start a lookup when it is long enough.
    ///
    /// Any earlier lookup is cancelled and its result will not be applied.
    /// Returns the ticket of the lookup started, if any.
    pub fn on_business_name_input(&self, value: &str) -> Option<LookupTicket> {
        let ticket = {
            let mut form = self.state.form.lock();
            form.business_name = value.to_string();
            if value.trim().chars().count() < self.min_query_chars {
                self.state.tracker.invalidate(LookupField::BusinessName);
                None
            } else {
                Some(self.state.tracker.issue(LookupField::BusinessName))
            }
        };
        self.abort_pending();
        let ticket = ticket?;

        let directory = Arc::clone(&self.directory);
        let state = Arc::clone(&self.state);
        let query = value.trim().to_string();
        debug!(
            "started lookup (query={}, sequence={})",
            query, ticket.sequence
        );
        let handle = tokio::spawn(async move {
            if let Some(resolution) = directory.resolve(&query).await {
                state.apply(ticket, resolution);
            }
        });
        *self.pending.lock() = Some(handle);
        Some(ticket)
    }

    /// Edit a non-lookup field by hand.
    pub fn set_field(&self, field: FormField, value: &str) {
        let mut form = self.state.form.lock();
        let slot = match field {
            FormField::Address => &mut form.address,
            FormField::Contact => &mut form.contact,
            FormField::DistanceKm => &mut form.distance_km,
        };
        *slot = value.to_string();
    }

    /// Apply a lookup result if its ticket is still current.
    pub fn apply_resolution(&self, ticket: LookupTicket, resolution: Resolution) -> bool {
        self.state.apply(ticket, resolution)
    }

    /// Wait for the in-flight lookup, if any, to finish or be cancelled.
    pub async fn settle(&self) {
        let handle = self.pending.lock().take();
        if let Some(handle) = handle {
            // A cancelled lookup reports a JoinError; nothing to apply either way.
            let _ = handle.await;
        }
    }

    /// Cancel pending lookups; late results are ignored.
    pub fn discard(&self) {
        self.state.tracker.invalidate(LookupField::BusinessName);
        self.abort_pending();
    }

    /// Open a visit from the form once every field is filled.
    pub async fn submit(&self, lifecycle: &VisitLifecycle) -> Result<VisitRecord, VisitError> {
        let form = self.form();
        if !form.is_complete() {
            return Err(self.incomplete("please fill in all client details"));
        }
        let distance_km = form
            .distance_km
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| self.incomplete("distance must be a number"))?;
        self.discard();
        lifecycle
            .open(OpenVisit {
                business_name: form.business_name,
                address: Some(form.address),
                contact: Some(form.contact),
                distance_km: Some(distance_km),
            })
            .await
    }

    fn incomplete(&self, message: &str) -> VisitError {
        warn!("rejected client form ({message})");
        self.state
            .notify(Notification::error("Incomplete Form", message));
        VisitError::Validation(message.to_string())
    }

    fn abort_pending(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for Autofill {
    fn drop(&mut self) {
        self.discard();
    }
}
