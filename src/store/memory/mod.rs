//! Memory Backend Module
//!
//! In-process store with the same write semantics as the Redis backend:
//! conditional writes, relative and absolute expiry, `KEEPTTL` and `GET`.
//! Expired entries are dropped lazily on access and by the sweep task in
//! [`crate::tasks`]; LRU eviction keeps the map under `max_entries`.

mod entry;
mod lru;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::store::{CacheBackend, SetReply, WriteOptions};

pub use entry::{current_timestamp_ms, expiry_deadline, CacheEntry};
pub use lru::LruTracker;

// == Memory Store ==
/// Map of address to entry, with LRU tracking.
#[derive(Debug)]
pub struct MemoryStore {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    max_entries: usize,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            max_entries: max_entries.max(1),
        }
    }

    // == Get ==
    /// Returns the live value at `key`, dropping it if it has expired.
    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let now = current_timestamp_ms();
        self.purge_if_expired(key, now);

        let value = self.entries.get(key).map(|entry| entry.value.clone())?;
        self.lru.touch(key);
        Some(value)
    }

    // == Set ==
    /// Applies one write with the given options.
    pub fn set(&mut self, key: &str, value: Vec<u8>, options: &WriteOptions) -> SetReply {
        let now = current_timestamp_ms();
        self.purge_if_expired(key, now);

        let existing = self.entries.get(key);
        let previous = if options.return_previous_value {
            existing.map(|entry| entry.value.clone())
        } else {
            None
        };

        if !options.permits(existing.is_some()) {
            return SetReply {
                written: false,
                previous,
            };
        }

        let expires_at = expiry_deadline(options, now, existing.and_then(|e| e.expires_at));

        if existing.is_none() && self.entries.len() >= self.max_entries {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                debug!(address = %evicted, "evicted least recently used entry");
            }
        }

        self.entries
            .insert(key.to_string(), CacheEntry::new(value, expires_at));
        self.lru.touch(key);

        SetReply {
            written: true,
            previous,
        }
    }

    // == Delete ==
    /// Removes `key`, returning whether a live entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let now = current_timestamp_ms();
        self.lru.remove(key);
        self.entries
            .remove(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    // == Keys ==
    /// Lists the addresses of all live entries.
    pub fn keys(&self) -> Vec<String> {
        let now = current_timestamp_ms();
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Time To Live ==
    /// Remaining lifetime of a live entry: `None` when absent,
    /// `Some(None)` when it never expires.
    pub fn ttl_ms(&self, key: &str) -> Option<Option<u64>> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(CacheEntry::ttl_remaining_ms)
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn purge_if_expired(&mut self, key: &str, now: u64) {
        if self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired_at(now))
        {
            self.entries.remove(key);
            self.lru.remove(key);
        }
    }
}

// == Memory Backend ==
/// Shared handle to a [`MemoryStore`], usable as a [`CacheBackend`].
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryBackend {
    pub fn new(max_entries: usize) -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::new(max_entries))),
        }
    }

    /// The shared store, for the background sweep task.
    pub fn shared(&self) -> Arc<RwLock<MemoryStore>> {
        self.store.clone()
    }

    /// Remaining lifetime of the entry at `key`; see [`MemoryStore::ttl_ms`].
    pub async fn ttl_ms(&self, key: &str) -> Option<Option<u64>> {
        self.store.read().await.ttl_ms(key)
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        // Write lock: reads update recency and may drop an expired entry
        Ok(self.store.write().await.get(key))
    }

    async fn set(&self, key: &str, value: Vec<u8>, options: &WriteOptions) -> Result<SetReply> {
        Ok(self.store.write().await.set(key, value, options))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.store.write().await.delete(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.store.read().await.keys())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn set(store: &mut MemoryStore, key: &str, value: &str, options: &WriteOptions) -> SetReply {
        store.set(key, value.as_bytes().to_vec(), options)
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = MemoryStore::new(100);
        let reply = set(&mut store, "k", "v", &WriteOptions::new());

        assert_eq!(reply, SetReply::stored());
        assert_eq!(store.get("k"), Some(b"v".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_missing() {
        let mut store = MemoryStore::new(100);
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_store_delete_is_idempotent() {
        let mut store = MemoryStore::new(100);
        set(&mut store, "k", "v", &WriteOptions::new());

        assert!(store.delete("k"));
        assert!(!store.delete("k"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_nx() {
        let mut store = MemoryStore::new(100);
        let nx = WriteOptions::new().only_if_absent();

        assert!(set(&mut store, "k", "first", &nx).written);
        assert!(!set(&mut store, "k", "second", &nx).written);
        assert_eq!(store.get("k"), Some(b"first".to_vec()));
    }

    #[test]
    fn test_store_xx() {
        let mut store = MemoryStore::new(100);
        let xx = WriteOptions::new().only_if_present();

        assert!(!set(&mut store, "k", "first", &xx).written);
        assert_eq!(store.get("k"), None);

        set(&mut store, "k", "first", &WriteOptions::new());
        assert!(set(&mut store, "k", "second", &xx).written);
        assert_eq!(store.get("k"), Some(b"second".to_vec()));
    }

    #[test]
    fn test_store_get_returns_previous() {
        let mut store = MemoryStore::new(100);
        let get = WriteOptions::new().return_previous_value();

        let reply = set(&mut store, "k", "first", &get);
        assert_eq!(reply.previous, None);

        let reply = set(&mut store, "k", "second", &get);
        assert!(reply.written);
        assert_eq!(reply.previous, Some(b"first".to_vec()));
    }

    #[test]
    fn test_store_nx_with_get_reports_existing_value() {
        let mut store = MemoryStore::new(100);
        set(&mut store, "k", "first", &WriteOptions::new());

        let options = WriteOptions::new().only_if_absent().return_previous_value();
        let reply = set(&mut store, "k", "second", &options);
        assert!(!reply.written);
        assert_eq!(reply.previous, Some(b"first".to_vec()));
    }

    #[test]
    fn test_store_px_expiration() {
        let mut store = MemoryStore::new(100);
        let px = WriteOptions::new().with_expire_after_millis(50);
        set(&mut store, "k", "v", &px);

        assert!(store.get("k").is_some());
        sleep(Duration::from_millis(80));
        assert_eq!(store.get("k"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_absolute_expiry_in_past() {
        let mut store = MemoryStore::new(100);
        let pxat = WriteOptions::new().with_expire_at_unix_millis(1);
        assert!(set(&mut store, "k", "v", &pxat).written);
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_store_plain_set_clears_ttl() {
        let mut store = MemoryStore::new(100);
        set(&mut store, "k", "v", &WriteOptions::new().with_expire_after_seconds(60));
        assert!(matches!(store.ttl_ms("k"), Some(Some(_))));

        set(&mut store, "k", "v2", &WriteOptions::new());
        assert_eq!(store.ttl_ms("k"), Some(None));
    }

    #[test]
    fn test_store_keepttl_preserves_deadline() {
        let mut store = MemoryStore::new(100);
        set(&mut store, "k", "v", &WriteOptions::new().with_expire_after_seconds(60));

        set(&mut store, "k", "v2", &WriteOptions::new().retain_existing_ttl());
        let ttl = store.ttl_ms("k").flatten().unwrap();
        assert!(ttl > 50_000);
        assert_eq!(store.get("k"), Some(b"v2".to_vec()));
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = MemoryStore::new(3);
        for key in ["k1", "k2", "k3"] {
            set(&mut store, key, "v", &WriteOptions::new());
        }
        store.get("k1");
        set(&mut store, "k4", "v", &WriteOptions::new());

        assert_eq!(store.len(), 3);
        assert!(store.get("k2").is_none());
        assert!(store.get("k1").is_some());
        assert!(store.get("k4").is_some());
    }

    #[test]
    fn test_store_keys_skip_expired() {
        let mut store = MemoryStore::new(100);
        set(&mut store, "live", "v", &WriteOptions::new());
        set(&mut store, "dead", "v", &WriteOptions::new().with_expire_at_unix_millis(1));

        assert_eq!(store.keys(), vec!["live".to_string()]);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = MemoryStore::new(100);
        set(&mut store, "live", "v", &WriteOptions::new().with_expire_after_seconds(10));
        set(&mut store, "dead", "v", &WriteOptions::new().with_expire_at_unix_millis(1));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_backend_round_trip() {
        let backend = MemoryBackend::new(10);
        backend
            .set("addr", b"value".to_vec(), &WriteOptions::new())
            .await
            .unwrap();

        assert_eq!(backend.get("addr").await.unwrap(), Some(b"value".to_vec()));
        assert_eq!(backend.keys().await.unwrap(), vec!["addr".to_string()]);

        backend.delete("addr").await.unwrap();
        backend.delete("addr").await.unwrap();
        assert_eq!(backend.get("addr").await.unwrap(), None);
        assert_eq!(backend.len().await, 0);
    }
}
