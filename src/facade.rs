//! Cache Facade Module
//!
//! Addresses entries by the fingerprint of their canonical key and issues
//! the matching store commands.
//!
//! The facade holds no state of its own beyond the backend handle. Multi
//! step operations (`update_entry`, `get_entries`) are not atomic: a
//! concurrent writer can interleave with them, and a timeout between the
//! delete and the set of `update_entry` leaves the entry absent.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{CacheError, Result};
use crate::keys::{
    canonicalize, encode_value, try_canonicalize, try_encode_value, Fingerprint, Payload,
    StoredValue,
};
use crate::store::{CacheBackend, WriteOptions};

// == Results ==
/// Result of looking a key up.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub found: bool,
    pub value: Option<StoredValue>,
}

/// Result of adding an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedEntry {
    /// Address of the entry, usable with the fingerprint-based operations
    pub fingerprint: Fingerprint,
    /// False when an `nx` / `xx` condition prevented the write
    pub written: bool,
    /// The replaced value, when `get` was requested
    pub previous: Option<StoredValue>,
}

// == Cache Facade ==
/// Key-canonicalizing front for a [`CacheBackend`].
#[derive(Clone)]
pub struct CacheFacade {
    backend: Arc<dyn CacheBackend>,
    strict: bool,
    timeout: Option<Duration>,
}

impl CacheFacade {
    // == Constructor ==
    /// Creates a facade with the lossy `"null"` fallback and no timeout.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            strict: false,
            timeout: None,
        }
    }

    /// Rejects keys and values with no canonical form instead of mapping
    /// them to `"null"`.
    pub fn with_strict_keys(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Bounds every store round-trip; an elapsed bound fails the operation
    /// with [`CacheError::StoreCancelled`].
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    // == Address ==
    /// Fingerprint of the canonical form of `key`.
    pub fn address(&self, key: &Payload) -> Result<Fingerprint> {
        let canonical = if self.strict {
            try_canonicalize(key).map_err(|e| CacheError::Encoding(e.to_string()))?
        } else {
            canonicalize(key)
        };
        Ok(Fingerprint::of_canonical(&canonical))
    }

    fn value_bytes(&self, value: &Payload) -> Result<Vec<u8>> {
        if self.strict {
            try_encode_value(value).map_err(|e| CacheError::Encoding(e.to_string()))
        } else {
            Ok(encode_value(value))
        }
    }

    async fn round_trip<T>(&self, op: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                warn!(op, ?limit, "store round-trip timed out");
                CacheError::StoreCancelled(format!("{} did not complete within {:?}", op, limit))
            })?,
            None => call.await,
        }
    }

    // == Check Cache ==
    /// Looks `key` up by its fingerprint.
    pub async fn check_cache(&self, key: &Payload) -> Result<Lookup> {
        let address = self.address(key)?;
        let value = self
            .round_trip("GET", self.backend.get(address.as_str()))
            .await?
            .map(StoredValue::new);

        debug!(%address, hit = value.is_some(), "check_cache");
        Ok(Lookup {
            found: value.is_some(),
            value,
        })
    }

    // == Get Value ==
    /// Reads the entry at a fingerprint handed out earlier.
    pub async fn get_value(&self, address: &Fingerprint) -> Result<Option<StoredValue>> {
        let value = self
            .round_trip("GET", self.backend.get(address.as_str()))
            .await?;
        debug!(%address, hit = value.is_some(), "get_value");
        Ok(value.map(StoredValue::new))
    }

    // == Add Entry ==
    /// Stores `value` under the fingerprint of `key`, applying `options`
    /// as given.
    pub async fn add_entry(
        &self,
        key: &Payload,
        value: &Payload,
        options: Option<WriteOptions>,
    ) -> Result<AddedEntry> {
        let options = options.unwrap_or_default();
        options.validate()?;

        let address = self.address(key)?;
        let bytes = self.value_bytes(value)?;
        let reply = self
            .round_trip("SET", self.backend.set(address.as_str(), bytes, &options))
            .await?;

        debug!(%address, written = reply.written, shape = key.shape(), "add_entry");
        Ok(AddedEntry {
            fingerprint: address,
            written: reply.written,
            previous: reply.previous.map(StoredValue::new),
        })
    }

    // == Remove Entry ==
    /// Deletes the entry for `key`. Missing entries are not an error.
    pub async fn remove_entry(&self, key: &Payload) -> Result<Fingerprint> {
        let address = self.address(key)?;
        self.round_trip("DEL", self.backend.delete(address.as_str()))
            .await?;
        debug!(%address, "remove_entry");
        Ok(address)
    }

    // == Update Entry ==
    /// Replaces the entry at `address` with `value`, dropping any expiry or
    /// condition the entry was written with.
    pub async fn update_entry(&self, address: &Fingerprint, value: &Payload) -> Result<()> {
        let bytes = self.value_bytes(value)?;

        self.round_trip("DEL", self.backend.delete(address.as_str()))
            .await?;
        self.round_trip(
            "SET",
            self.backend
                .set(address.as_str(), bytes, &WriteOptions::new()),
        )
        .await?;

        debug!(%address, "update_entry");
        Ok(())
    }

    // == Get Entries ==
    /// Reads every entry in the store, one `GET` per address.
    ///
    /// Entries removed between the listing and their read are skipped.
    pub async fn get_entries(&self) -> Result<Vec<(Fingerprint, StoredValue)>> {
        let addresses = self.round_trip("KEYS", self.backend.keys()).await?;
        let mut entries = Vec::with_capacity(addresses.len());

        for address in addresses {
            if let Some(value) = self
                .round_trip("GET", self.backend.get(&address))
                .await?
            {
                entries.push((Fingerprint::from_address(address), StoredValue::new(value)));
            }
        }

        debug!(count = entries.len(), "get_entries");
        Ok(entries)
    }

    // == Get Keys ==
    /// Lists every address in the store.
    pub async fn get_keys(&self) -> Result<Vec<Fingerprint>> {
        let addresses = self.round_trip("KEYS", self.backend.keys()).await?;
        Ok(addresses
            .into_iter()
            .map(Fingerprint::from_address)
            .collect())
    }
}
