//! Response DTOs for the cache facade API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::facade::{AddedEntry, Lookup};
use crate::keys::{Fingerprint, StoredValue};

/// Response body for `check_cache`
#[derive(Debug, Clone, Serialize)]
pub struct CheckCacheResponse {
    pub found: bool,
    pub value: Option<StoredValue>,
}

impl From<Lookup> for CheckCacheResponse {
    fn from(lookup: Lookup) -> Self {
        Self {
            found: lookup.found,
            value: lookup.value,
        }
    }
}

/// Response body for `get_value`
#[derive(Debug, Clone, Serialize)]
pub struct GetValueResponse {
    /// The requested fingerprint
    pub key: Fingerprint,
    /// The stored value, `null` when absent
    pub value: Option<StoredValue>,
}

/// Response body for `add_entry`
#[derive(Debug, Clone, Serialize)]
pub struct AddEntryResponse {
    pub fingerprint: Fingerprint,
    pub written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<StoredValue>,
}

impl From<AddedEntry> for AddEntryResponse {
    fn from(added: AddedEntry) -> Self {
        Self {
            fingerprint: added.fingerprint,
            written: added.written,
            previous: added.previous,
        }
    }
}

/// Response body for `remove_entry` and `update_entry`
#[derive(Debug, Clone, Serialize)]
pub struct EntryAddressResponse {
    pub fingerprint: Fingerprint,
}

/// One element of the `get_entries` listing
#[derive(Debug, Clone, Serialize)]
pub struct EntryResponse {
    pub fingerprint: Fingerprint,
    pub value: StoredValue,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
