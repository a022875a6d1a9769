//! Fingerprint Module
//!
//! SHA-256 addresses for canonical text.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::keys::{canonicalize, Payload};

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 64;

// == Fingerprint ==
/// Lowercase hex SHA-256 digest used as the store address of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hashes the UTF-8 bytes of a canonical string.
    pub fn of_canonical(canonical: &str) -> Self {
        let digest = Sha256::digest(canonical.as_bytes());
        Self(hex::encode(digest))
    }

    /// Canonicalizes `payload` and hashes the result.
    pub fn of_payload(payload: &Payload) -> Self {
        Self::of_canonical(&canonicalize(payload))
    }

    /// Wraps an address that was handed out earlier, as-is.
    ///
    /// The store is addressed directly, so no format check is applied.
    pub fn from_address(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Convenience wrapper returning the hex digest of `canonical`.
pub fn fingerprint(canonical: &str) -> Fingerprint {
    Fingerprint::of_canonical(canonical)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digests() {
        assert_eq!(
            fingerprint("").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            fingerprint("hello").as_str(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_length_and_case() {
        let fp = fingerprint("anything at all");
        assert_eq!(fp.as_str().len(), FINGERPRINT_LEN);
        assert!(fp
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_payload_fingerprint_hashes_canonical_text() {
        let payload = Payload::Integer(42);
        assert_eq!(Fingerprint::of_payload(&payload), fingerprint("42"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let fp = fingerprint("hello");
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{}\"", fp));
    }
}
