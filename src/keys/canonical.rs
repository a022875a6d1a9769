//! Canonical Form Module
//!
//! Turns a [`Payload`] into the deterministic text that gets hashed into a
//! fingerprint and written to the store as a value.
//!
//! Rules, first match wins:
//! 1. text is returned unchanged
//! 2. mappings become a JSON object, members in sorted key order
//! 3. sequences become a JSON array, order preserved
//! 4. sets become a JSON array of their distinct elements, sorted by the
//!    elements' own JSON text
//! 5. integers and floats become their decimal text (`42`, `42.0`)
//! 6. booleans become `True` / `False`
//! 7. bytes become standard padded base64
//! 8. anything else is JSON-encoded (`null`)
//!
//! The JSON text uses `", "` and `": "` separators, escapes DEL and every
//! non-ASCII character as `\uXXXX`, prints floats with a signed two-digit
//! exponent and writes non-finite floats as `NaN` / `Infinity` /
//! `-Infinity`, so fingerprints stay compatible with entries written by earlier
//! deployments of the service.

use std::cell::Cell;
use std::io;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::ser::Formatter;
use thiserror::Error;
use tracing::warn;

use crate::keys::Payload;

/// Canonical text produced when a payload has no JSON form.
pub const FALLBACK: &str = "null";

// == Canonicalize Error ==
/// A payload that cannot be expressed as canonical JSON text.
#[derive(Error, Debug)]
#[error("{shape} payload has no canonical form: {reason}")]
pub struct CanonicalizeError {
    pub shape: &'static str,
    pub reason: String,
}

// == Canonicalize ==
/// Returns the canonical text of `payload`, never failing.
///
/// A payload that cannot be encoded maps to `"null"`. Unrelated
/// un-encodable payloads therefore share one fingerprint; each fallback is
/// logged at warn level. Use [`try_canonicalize`] to reject them instead.
pub fn canonicalize(payload: &Payload) -> String {
    match try_canonicalize(payload) {
        Ok(text) => text,
        Err(err) => {
            warn!(shape = payload.shape(), error = %err, "canonical form fell back to null");
            FALLBACK.to_string()
        }
    }
}

/// Returns the canonical text of `payload`, or why it has none.
pub fn try_canonicalize(payload: &Payload) -> Result<String, CanonicalizeError> {
    let fail = |err: serde_json::Error| CanonicalizeError {
        shape: payload.shape(),
        reason: err.to_string(),
    };

    match payload {
        Payload::Text(text) => Ok(text.clone()),
        Payload::Mapping(_) | Payload::Sequence(_) => encode_json(payload).map_err(fail),
        Payload::Set(items) => encode_set(items).map_err(fail),
        Payload::Integer(i) => Ok(i.to_string()),
        Payload::Float(f) => Ok(format_float(*f)),
        Payload::Boolean(true) => Ok("True".to_string()),
        Payload::Boolean(false) => Ok("False".to_string()),
        Payload::Bytes(bytes) => Ok(STANDARD.encode(bytes)),
        Payload::Null => encode_json(payload).map_err(fail),
    }
}

// == Float Text ==
/// Shortest round-trip decimal text of a float.
///
/// Plain notation between `1e-4` and `1e16` (always with a fractional part),
/// exponent notation outside it as `1e+16` / `1.5e-07`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let text = format!("{:?}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}

fn encode_set(items: &[Payload]) -> Result<String, serde_json::Error> {
    let mut encoded = items
        .iter()
        .map(encode_json)
        .collect::<Result<Vec<_>, _>>()?;
    encoded.sort();
    encoded.dedup();
    Ok(format!("[{}]", encoded.join(", ")))
}

fn encode_json(payload: &Payload) -> Result<String, serde_json::Error> {
    let pending = Cell::new(None);
    let mut out = Vec::new();
    let formatter = CanonicalFormatter { pending: &pending };
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    JsonForm {
        payload,
        pending: &pending,
    }
    .serialize(&mut serializer)?;
    String::from_utf8(out).map_err(serde_json::Error::custom)
}

/// JSON literal written for a non-finite float.
fn non_finite_literal(value: f64) -> &'static str {
    if value.is_nan() {
        "NaN"
    } else if value > 0.0 {
        "Infinity"
    } else {
        "-Infinity"
    }
}

// == JSON Form ==
/// Serializes a payload as nested JSON, where bytes and sets are not
/// representable.
struct JsonForm<'a> {
    payload: &'a Payload,
    /// Shared with the formatter; see [`CanonicalFormatter::write_null`].
    pending: &'a Cell<Option<&'static str>>,
}

impl<'a> JsonForm<'a> {
    fn nested(&self, payload: &'a Payload) -> Self {
        Self {
            payload,
            pending: self.pending,
        }
    }
}

impl Serialize for JsonForm<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.payload {
            Payload::Text(text) => serializer.serialize_str(text),
            Payload::Integer(i) => serializer.serialize_i128(*i),
            Payload::Float(f) => {
                // serde_json routes NaN and infinities to `write_null`
                if !f.is_finite() {
                    self.pending.set(Some(non_finite_literal(*f)));
                }
                serializer.serialize_f64(*f)
            }
            Payload::Boolean(b) => serializer.serialize_bool(*b),
            Payload::Bytes(_) => Err(S::Error::custom("bytes are not JSON serializable")),
            Payload::Set(_) => Err(S::Error::custom("a nested set is not JSON serializable")),
            Payload::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&self.nested(item))?;
                }
                seq.end()
            }
            Payload::Mapping(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (key, value) in members {
                    map.serialize_entry(key, &self.nested(value))?;
                }
                map.end()
            }
            Payload::Null => serializer.serialize_unit(),
        }
    }
}

// == Canonical Formatter ==
/// JSON layout used for canonical text.
///
/// Non-finite floats reach the formatter as a null; `pending` carries the
/// literal to write in its place.
struct CanonicalFormatter<'a> {
    pending: &'a Cell<Option<&'static str>>,
}

impl Formatter for CanonicalFormatter<'_> {
    fn write_null<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        let literal = self.pending.take().unwrap_or("null");
        writer.write_all(literal.as_bytes())
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(format_float(value).as_bytes())
    }

    fn write_string_fragment<W: ?Sized + io::Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        if fragment.bytes().all(is_plain_ascii) {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() && ch != '\u{7f}' {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// ASCII written as-is; DEL is escaped like every non-ASCII character.
fn is_plain_ascii(byte: u8) -> bool {
    byte.is_ascii() && byte != 0x7f
}
