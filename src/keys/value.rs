//! Stored Value Module
//!
//! How payloads are written to the store and how raw store bytes are
//! handed back to callers.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::keys::{canonicalize, try_canonicalize, CanonicalizeError, Payload, BYTES_TAG};

// == Encode ==
/// Bytes written to the store for `value`.
///
/// Byte payloads are stored verbatim; every other shape is stored as its
/// canonical text, so text values round-trip exactly.
pub fn encode_value(value: &Payload) -> Vec<u8> {
    match value {
        Payload::Bytes(bytes) => bytes.clone(),
        other => canonicalize(other).into_bytes(),
    }
}

/// Like [`encode_value`], but fails instead of storing `"null"` for a
/// payload with no canonical form.
pub fn try_encode_value(value: &Payload) -> Result<Vec<u8>, CanonicalizeError> {
    match value {
        Payload::Bytes(bytes) => Ok(bytes.clone()),
        other => try_canonicalize(other).map(String::into_bytes),
    }
}

// == Stored Value ==
/// Raw bytes read back from the store.
///
/// Serializes as a JSON string when the bytes are UTF-8, otherwise as
/// `{"$bytes": "<base64>"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue(Vec<u8>);

impl StoredValue {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The value as text, when it is valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for StoredValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for StoredValue {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl Serialize for StoredValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_text() {
            Some(text) => serializer.serialize_str(text),
            None => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(BYTES_TAG, &STANDARD.encode(&self.0))?;
                map.end()
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_value_stored_verbatim() {
        assert_eq!(encode_value(&"hello".into()), b"hello".to_vec());
    }

    #[test]
    fn test_bytes_value_stored_raw() {
        let raw = vec![0xff, 0x00, 0x7f];
        assert_eq!(encode_value(&raw.clone().into()), raw);
    }

    #[test]
    fn test_structured_value_stored_as_canonical_text() {
        let value: Payload = serde_json::from_value(json!({"b": 1, "a": [true]})).unwrap();
        assert_eq!(encode_value(&value), br#"{"a": [true], "b": 1}"#.to_vec());
    }

    #[test]
    fn test_try_encode_rejects_unencodable() {
        let value = Payload::Sequence(vec![Payload::Bytes(vec![1])]);
        assert!(try_encode_value(&value).is_err());
        assert_eq!(encode_value(&value), b"null".to_vec());
    }

    #[test]
    fn test_stored_value_serializes_text() {
        let json = serde_json::to_value(StoredValue::from("hello")).unwrap();
        assert_eq!(json, json!("hello"));
    }

    #[test]
    fn test_stored_value_serializes_binary_as_tagged_base64() {
        let json = serde_json::to_value(StoredValue::new(vec![0xff, 0xfe])).unwrap();
        assert_eq!(json, json!({ "$bytes": "//4=" }));
    }
}
