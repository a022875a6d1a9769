//! API Module
//!
//! HTTP handlers and routing for the cache facade.
//!
//! # Endpoints
//! - `/cmd/check_cache`, `/cmd/get_value` - lookups
//! - `/cmd/add_entry`, `/cmd/update_entry`, `/cmd/remove_entry` - writes
//! - `/cmd/get_entries`, `/cmd/get_keys` - listings
//! - `GET /`, `GET /health` - liveness

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
