//! Session collaborator data supplied by the identity and geolocation layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One-time location fix granted at session start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    pub captured_at: DateTime<Utc>,
}

/// Logged-in session context. Credentials are never validated here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionInfo {
    /// Display label for the logged-in user.
    pub user: Option<String>,
    /// Location fix, `None` when permission was denied.
    pub location: Option<GeoFix>,
}

impl SessionInfo {
    /// Session for a named user without a location fix.
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            location: None,
        }
    }

    /// Attach a granted location fix.
    pub fn with_location(mut self, location: GeoFix) -> Self {
        self.location = Some(location);
        self
    }

    /// Whether the geolocation collaborator granted access.
    pub fn location_available(&self) -> bool {
        self.location.is_some()
    }
}
