//! Request and Response models for the cache facade API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP query strings and bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    AddEntryRequest, CheckCacheQuery, GetValueQuery, KeyRequest, RemoveEntryQuery,
    UpdateEntryRequest,
};
pub use responses::{
    AddEntryResponse, CheckCacheResponse, EntryAddressResponse, EntryResponse, ErrorResponse,
    GetValueResponse, HealthResponse,
};
