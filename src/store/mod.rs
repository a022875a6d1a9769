//! Store Module
//!
//! The capability interface the facade needs from a key-value backend, and
//! the backends that provide it.
//!
//! # Backends
//! - [`RedisBackend`] - a Redis server reached through a managed connection
//! - [`MemoryBackend`] - an in-process map with TTLs and LRU eviction

mod memory;
mod options;
mod redis_backend;

use async_trait::async_trait;

use crate::error::Result;

// Re-export public types
pub use self::memory::{CacheEntry, LruTracker, MemoryBackend, MemoryStore};
pub use self::options::{WriteOptions, UNSET_SENTINEL};
pub use self::redis_backend::RedisBackend;

// == Set Reply ==
/// Outcome of a single `SET`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetReply {
    /// Whether the value was stored (false when an `nx`/`xx` condition failed)
    pub written: bool,
    /// The replaced value; only filled in when `get` was requested
    pub previous: Option<Vec<u8>>,
}

impl SetReply {
    /// Reply of an unconditional write without `get`.
    pub fn stored() -> Self {
        Self {
            written: true,
            previous: None,
        }
    }
}

// == Cache Backend ==
/// Addressable store with single-key `GET`, `SET`, `DELETE` and `KEYS`.
///
/// Each call is expected to be atomic on its own; nothing is promised
/// across calls.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the raw value stored at `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` at `key` under the given options.
    async fn set(&self, key: &str, value: Vec<u8>, options: &WriteOptions) -> Result<SetReply>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Lists every key currently stored.
    async fn keys(&self) -> Result<Vec<String>>;
}
