//! Keys Module
//!
//! Payload shapes, their canonical text, the fingerprints used as store
//! addresses, and the byte form values take in the store.

mod canonical;
mod fingerprint;
mod payload;
mod value;


// Re-export public types
pub use canonical::{canonicalize, format_float, try_canonicalize, CanonicalizeError, FALLBACK};
pub use fingerprint::{fingerprint, Fingerprint, FINGERPRINT_LEN};
pub use payload::{Payload, BYTES_TAG, SET_TAG};
pub use value::{encode_value, try_encode_value, StoredValue};
