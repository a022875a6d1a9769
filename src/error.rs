//! Error types for the cache facade
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache facade.
///
/// Absence of an entry is never an error; it is reported as a normal
/// "not found" result by the facade operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Malformed request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Contradictory or malformed write options
    #[error("Invalid write options: {0}")]
    InvalidWriteOptions(String),

    /// Key or value has no canonical form (strict mode only)
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// The external store could not be reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The external store rejected the command or its arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The store round-trip did not finish within the configured timeout
    #[error("Store operation cancelled: {0}")]
    StoreCancelled(String),
}

// == Redis Error Conversion ==
impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_dropped()
            || err.is_connection_refusal()
            || err.is_timeout()
        {
            CacheError::StoreUnavailable(err.to_string())
        } else {
            CacheError::InvalidArgument(err.to_string())
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidRequest(_)
            | CacheError::InvalidWriteOptions(_)
            | CacheError::Encoding(_)
            | CacheError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CacheError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::StoreCancelled(_) => StatusCode::GATEWAY_TIMEOUT,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache facade.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (CacheError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (CacheError::InvalidWriteOptions("x".into()), StatusCode::BAD_REQUEST),
            (CacheError::StoreUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (CacheError::StoreCancelled("x".into()), StatusCode::GATEWAY_TIMEOUT),
            (CacheError::Encoding("x".into()), StatusCode::BAD_REQUEST),
            (CacheError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_redis_io_error_is_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: CacheError = redis::RedisError::from(io).into();
        assert!(matches!(err, CacheError::StoreUnavailable(_)));
    }

    #[test]
    fn test_redis_response_error_is_invalid_argument() {
        let raw = redis::RedisError::from((
            redis::ErrorKind::ResponseError,
            "invalid expire time in 'set' command",
        ));
        let err: CacheError = raw.into();
        assert!(matches!(err, CacheError::InvalidArgument(_)));
    }
}
