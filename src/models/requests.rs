//! Request DTOs for the cache facade API
//!
//! Defines the structure of incoming query strings and request bodies.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{CacheError, Result};
use crate::keys::{Fingerprint, Payload};
use crate::store::WriteOptions;

/// Query for `GET /cmd/check_cache`; the key is taken as text.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckCacheQuery {
    pub value: String,
}

/// Query for `GET /cmd/get_value`: a fingerprint handed out earlier.
#[derive(Debug, Clone, Deserialize)]
pub struct GetValueQuery {
    pub key: String,
}

impl GetValueQuery {
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        require_address(&self.key)
    }
}

/// Query for `DELETE /cmd/remove_entry`; the key is taken as text.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveEntryQuery {
    pub key: String,
}

/// Body carrying a structured key, for the `POST` forms of
/// `check_cache` and `remove_entry`.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyRequest {
    pub key: Payload,
}

/// Body of `POST /cmd/add_entry`.
///
/// `config` is the raw option map; see [`WriteOptions::normalize`].
#[derive(Debug, Clone, Deserialize)]
pub struct AddEntryRequest {
    pub key: Payload,
    pub value: Payload,
    #[serde(default)]
    pub config: Option<Map<String, Value>>,
}

impl AddEntryRequest {
    /// Normalized write options, `None` when no config was sent.
    pub fn write_options(&self) -> Result<Option<WriteOptions>> {
        self.config
            .as_ref()
            .map(WriteOptions::normalize)
            .transpose()
    }
}

/// Body of `PUT /cmd/update_entry`; `key` is a fingerprint.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEntryRequest {
    pub key: String,
    pub value: Payload,
}

impl UpdateEntryRequest {
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        require_address(&self.key)
    }
}

fn require_address(key: &str) -> Result<Fingerprint> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest(
            "Fingerprint cannot be empty".to_string(),
        ));
    }
    Ok(Fingerprint::from_address(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_entry_request_deserialize() {
        let json = r#"{"key": {"user": "alice", "id": 1}, "value": "hello"}"#;
        let req: AddEntryRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key.shape(), "mapping");
        assert_eq!(req.value, Payload::Text("hello".into()));
        assert!(req.config.is_none());
        assert_eq!(req.write_options().unwrap(), None);
    }

    #[test]
    fn test_add_entry_request_with_config() {
        let json = r#"{"key": "k", "value": "v", "config": {"ex": "30", "px": "0", "nx": true}}"#;
        let req: AddEntryRequest = serde_json::from_str(json).unwrap();
        let options = req.write_options().unwrap().unwrap();
        assert_eq!(options.expire_after_seconds, Some(30));
        assert_eq!(options.expire_after_millis, None);
        assert!(options.only_if_absent);
    }

    #[test]
    fn test_add_entry_request_bad_config() {
        let json = r#"{"key": "k", "value": "v", "config": {"nx": true, "xx": true}}"#;
        let req: AddEntryRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(
            req.write_options(),
            Err(CacheError::InvalidWriteOptions(_))
        ));
    }

    #[test]
    fn test_key_request_with_tagged_bytes() {
        let json = r#"{"key": {"$bytes": "aGk="}}"#;
        let req: KeyRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, Payload::Bytes(b"hi".to_vec()));
    }

    #[test]
    fn test_update_entry_empty_key_rejected() {
        let req = UpdateEntryRequest {
            key: "".to_string(),
            value: Payload::Null,
        };
        assert!(matches!(
            req.fingerprint(),
            Err(CacheError::InvalidRequest(_))
        ));
    }
}
