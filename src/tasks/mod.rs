//! Background Tasks Module
//!
//! # Tasks
//! - TTL Cleanup: sweeps expired entries out of the in-memory backend

mod cleanup;

pub use cleanup::spawn_cleanup_task;
