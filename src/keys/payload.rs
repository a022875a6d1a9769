//! Payload Module
//!
//! The closed set of shapes a caller may submit as a key or a value, and
//! their decoding from the JSON wire form.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// Wire tag marking a base64-encoded byte sequence.
pub const BYTES_TAG: &str = "$bytes";

/// Wire tag marking an unordered set.
pub const SET_TAG: &str = "$set";

// == Payload ==
/// A structured key or value.
///
/// Mapping keys are kept in a `BTreeMap`, so a mapping always iterates in
/// sorted key order no matter how the caller ordered its members.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum Payload {
    Text(String),
    Integer(i128),
    Float(f64),
    Boolean(bool),
    Bytes(Vec<u8>),
    Sequence(Vec<Payload>),
    Set(Vec<Payload>),
    Mapping(BTreeMap<String, Payload>),
    Null,
}

impl Payload {
    /// Short shape name used in log lines and error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Payload::Text(_) => "text",
            Payload::Integer(_) => "integer",
            Payload::Float(_) => "float",
            Payload::Boolean(_) => "boolean",
            Payload::Bytes(_) => "bytes",
            Payload::Sequence(_) => "sequence",
            Payload::Set(_) => "set",
            Payload::Mapping(_) => "mapping",
            Payload::Null => "null",
        }
    }
}

// == Conversions ==
impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::Text(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Text(value)
    }
}

impl From<i64> for Payload {
    fn from(value: i64) -> Self {
        Payload::Integer(value.into())
    }
}

impl From<f64> for Payload {
    fn from(value: f64) -> Self {
        Payload::Float(value)
    }
}

impl From<bool> for Payload {
    fn from(value: bool) -> Self {
        Payload::Boolean(value)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(value: Vec<u8>) -> Self {
        Payload::Bytes(value)
    }
}

impl TryFrom<Value> for Payload {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Payload::Null),
            Value::Bool(b) => Ok(Payload::Boolean(b)),
            Value::String(s) => Ok(Payload::Text(s)),
            Value::Number(n) => number_to_payload(&n),
            Value::Array(items) => items
                .into_iter()
                .map(Payload::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Payload::Sequence),
            Value::Object(map) => object_to_payload(map),
        }
    }
}

/// Integers are told apart from floats by their wire text, so `1` and
/// `1.0` stay distinct and integers past 64 bits stay exact.
fn number_to_payload(n: &Number) -> Result<Payload, String> {
    let text = n.to_string();
    if text.contains(['.', 'e', 'E']) {
        return text
            .parse::<f64>()
            .map(Payload::Float)
            .map_err(|e| format!("invalid number {}: {}", text, e));
    }
    text.parse::<i128>()
        .map(Payload::Integer)
        .map_err(|_| format!("integer {} is out of range", text))
}

fn object_to_payload(mut map: Map<String, Value>) -> Result<Payload, String> {
    if map.len() == 1 {
        if let Some(tagged) = map.remove(BYTES_TAG) {
            let Value::String(encoded) = tagged else {
                return Err(format!("`{}` must hold a base64 string", BYTES_TAG));
            };
            return STANDARD
                .decode(encoded.as_bytes())
                .map(Payload::Bytes)
                .map_err(|e| format!("`{}` is not valid base64: {}", BYTES_TAG, e));
        }
        if let Some(tagged) = map.remove(SET_TAG) {
            let Value::Array(items) = tagged else {
                return Err(format!("`{}` must hold an array", SET_TAG));
            };
            return items
                .into_iter()
                .map(Payload::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Payload::Set);
        }
    }

    map.into_iter()
        .map(|(k, v)| Payload::try_from(v).map(|p| (k, p)))
        .collect::<Result<BTreeMap<_, _>, _>>()
        .map(Payload::Mapping)
}
