//! API Handlers
//!
//! HTTP request handlers binding each facade operation to an endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::Result;
use crate::facade::CacheFacade;
use crate::keys::{Fingerprint, Payload};
use crate::models::{
    AddEntryRequest, AddEntryResponse, CheckCacheQuery, CheckCacheResponse,
    EntryAddressResponse, EntryResponse, GetValueQuery, GetValueResponse, HealthResponse,
    KeyRequest, RemoveEntryQuery, UpdateEntryRequest,
};
use crate::store::CacheBackend;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub facade: CacheFacade,
}

impl AppState {
    /// Creates a new AppState around an existing facade.
    pub fn new(facade: CacheFacade) -> Self {
        Self { facade }
    }

    /// Creates a new AppState with a default facade over `backend`.
    pub fn from_backend(backend: Arc<dyn CacheBackend>) -> Self {
        Self::new(CacheFacade::new(backend))
    }
}

/// Handler for GET /cmd/check_cache?value=
pub async fn check_cache_handler(
    State(state): State<AppState>,
    Query(query): Query<CheckCacheQuery>,
) -> Result<Json<CheckCacheResponse>> {
    let lookup = state.facade.check_cache(&Payload::Text(query.value)).await?;
    Ok(Json(lookup.into()))
}

/// Handler for POST /cmd/check_cache
pub async fn check_cache_json_handler(
    State(state): State<AppState>,
    Json(req): Json<KeyRequest>,
) -> Result<Json<CheckCacheResponse>> {
    let lookup = state.facade.check_cache(&req.key).await?;
    Ok(Json(lookup.into()))
}

/// Handler for GET /cmd/get_value?key=
pub async fn get_value_handler(
    State(state): State<AppState>,
    Query(query): Query<GetValueQuery>,
) -> Result<Json<GetValueResponse>> {
    let key = query.fingerprint()?;
    let value = state.facade.get_value(&key).await?;
    Ok(Json(GetValueResponse { key, value }))
}

/// Handler for POST /cmd/add_entry
pub async fn add_entry_handler(
    State(state): State<AppState>,
    Json(req): Json<AddEntryRequest>,
) -> Result<Json<AddEntryResponse>> {
    let options = req.write_options()?;
    let added = state
        .facade
        .add_entry(&req.key, &req.value, options)
        .await?;
    Ok(Json(added.into()))
}

/// Handler for DELETE /cmd/remove_entry?key=
pub async fn remove_entry_handler(
    State(state): State<AppState>,
    Query(query): Query<RemoveEntryQuery>,
) -> Result<Json<EntryAddressResponse>> {
    let fingerprint = state
        .facade
        .remove_entry(&Payload::Text(query.key))
        .await?;
    Ok(Json(EntryAddressResponse { fingerprint }))
}

/// Handler for POST /cmd/remove_entry
pub async fn remove_entry_json_handler(
    State(state): State<AppState>,
    Json(req): Json<KeyRequest>,
) -> Result<Json<EntryAddressResponse>> {
    let fingerprint = state.facade.remove_entry(&req.key).await?;
    Ok(Json(EntryAddressResponse { fingerprint }))
}

/// Handler for PUT /cmd/update_entry
pub async fn update_entry_handler(
    State(state): State<AppState>,
    Json(req): Json<UpdateEntryRequest>,
) -> Result<Json<EntryAddressResponse>> {
    let fingerprint = req.fingerprint()?;
    state.facade.update_entry(&fingerprint, &req.value).await?;
    Ok(Json(EntryAddressResponse { fingerprint }))
}

/// Handler for GET /cmd/get_entries
pub async fn get_entries_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<EntryResponse>>> {
    let entries = state
        .facade
        .get_entries()
        .await?
        .into_iter()
        .map(|(fingerprint, value)| EntryResponse { fingerprint, value })
        .collect();
    Ok(Json(entries))
}

/// Handler for GET /cmd/get_keys
pub async fn get_keys_handler(State(state): State<AppState>) -> Result<Json<Vec<Fingerprint>>> {
    Ok(Json(state.facade.get_keys().await?))
}

/// Handler for GET /
///
/// Liveness probe answering a bare `true`.
pub async fn root_handler() -> Json<bool> {
    Json(true)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
