//! API Routes
//!
//! Configures the Axum router with all facade endpoints.

use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use super::handlers::{
    add_entry_handler, check_cache_handler, check_cache_json_handler, get_entries_handler,
    get_keys_handler, get_value_handler, health_handler, remove_entry_handler,
    remove_entry_json_handler, root_handler, update_entry_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /cmd/check_cache?value=` / `POST /cmd/check_cache` - look a key up
/// - `GET /cmd/get_value?key=` - read by fingerprint
/// - `POST /cmd/add_entry` - store a value under a key
/// - `DELETE /cmd/remove_entry?key=` / `POST /cmd/remove_entry` - delete a key
/// - `PUT /cmd/update_entry` - overwrite by fingerprint
/// - `GET /cmd/get_entries` - list fingerprints with values
/// - `GET /cmd/get_keys` - list fingerprints
/// - `GET /` and `GET /health` - liveness
///
/// # Middleware
/// - CORS: allows `origin` (`*` for any)
/// - Tracing: logs all requests
pub fn create_router(state: AppState, origin: &str) -> Router {
    let cmd = Router::new()
        .route(
            "/check_cache",
            get(check_cache_handler).post(check_cache_json_handler),
        )
        .route("/get_value", get(get_value_handler))
        .route("/add_entry", post(add_entry_handler))
        .route(
            "/remove_entry",
            post(remove_entry_json_handler).delete(remove_entry_handler),
        )
        .route("/update_entry", put(update_entry_handler))
        .route("/get_entries", get(get_entries_handler))
        .route("/get_keys", get(get_keys_handler));

    Router::new()
        .nest("/cmd", cmd)
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .layer(cors_layer(origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = if origin == "*" {
        AllowOrigin::from(Any)
    } else {
        match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!("Ignoring invalid ORIGIN '{}', allowing any origin", origin);
                AllowOrigin::from(Any)
            }
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
