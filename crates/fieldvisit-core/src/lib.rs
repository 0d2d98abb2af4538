//! Visit lifecycle orchestration and its supporting primitives.
//!
//! This crate owns the business-directory lookup with its stale-result guard,
//! handwritten signature capture, and the open/time/close state machine that
//! persists visits through an injected `RecordStore`.

pub mod autofill;
pub mod clock;
pub mod directory;
pub mod error;
pub mod lifecycle;
pub mod signature;

pub use autofill::{Autofill, ClientForm, FormField, LookupField, LookupTicket, LookupTracker};
pub use clock::{Clock, SystemClock};
pub use directory::{
    BusinessDirectory, DirectoryEntry, DirectoryLookup, Resolution, ResolutionSource,
};
pub use error::{VisitError, WorkField};
pub use lifecycle::{CloseFields, OpenVisit, VisitLifecycle, VisitSummary};
pub use signature::{CaptureState, Signature, SignatureCapture, SignatureError};
