//! Cache Entry Module
//!
//! A stored value together with its absolute expiry deadline.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::store::WriteOptions;

// == Cache Entry ==
/// A single stored value.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Raw value bytes
    pub value: Vec<u8>,
    /// Expiry deadline (Unix milliseconds), None = never expires
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    pub fn new(value: Vec<u8>, expires_at: Option<u64>) -> Self {
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// An entry is expired once `now` reaches its deadline.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    // == Time To Live ==
    /// Remaining lifetime in milliseconds, `Some(0)` once expired, `None`
    /// when the entry never expires.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        let now = current_timestamp_ms();
        self.expires_at.map(|deadline| deadline.saturating_sub(now))
    }
}

// == Deadline ==
/// Computes the expiry deadline a write with `options` gives an entry.
///
/// `previous` is the deadline of the entry being replaced, used by
/// `keepttl`. A write with no expiry option clears any previous deadline.
pub fn expiry_deadline(options: &WriteOptions, now: u64, previous: Option<u64>) -> Option<u64> {
    if let Some(seconds) = options.expire_after_seconds {
        Some(now.saturating_add(seconds.saturating_mul(1000)))
    } else if let Some(millis) = options.expire_after_millis {
        Some(now.saturating_add(millis))
    } else if let Some(seconds) = options.expire_at_unix_seconds {
        Some(seconds.saturating_mul(1000))
    } else if let Some(millis) = options.expire_at_unix_millis {
        Some(millis)
    } else if options.retain_existing_ttl {
        previous
    } else {
        None
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
