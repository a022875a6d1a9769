//! Redis Facade - a content-addressed cache front end
//!
//! Turns arbitrary structured keys into SHA-256 fingerprints of their
//! canonical text and stores values under those fingerprints in Redis
//! (or an in-process store with the same semantics).

pub mod api;
pub mod config;
pub mod error;
pub mod facade;
pub mod keys;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::{BackendKind, Config};
pub use error::{CacheError, Result};
pub use facade::CacheFacade;
pub use tasks::spawn_cleanup_task;
