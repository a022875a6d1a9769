//! Write Options Module
//!
//! Conditional and expiry semantics applied to a single store write.

use serde_json::{Map, Value};

use crate::error::{CacheError, Result};

/// Placeholder the transport submits for an omitted field.
pub const UNSET_SENTINEL: &str = "0";

// == Field Names ==
/// Native option name and its long alias, in store order.
const FIELDS: [(&str, &str); 8] = [
    ("ex", "expire_after_seconds"),
    ("px", "expire_after_millis"),
    ("nx", "only_if_absent"),
    ("xx", "only_if_present"),
    ("keepttl", "retain_existing_ttl"),
    ("get", "return_previous_value"),
    ("exat", "expire_at_unix_seconds"),
    ("pxat", "expire_at_unix_millis"),
];

// == Write Options ==
/// Options for one `SET`, mapped 1:1 onto the store's native flags.
///
/// `None` / `false` means the option was not requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// `EX`: relative expiry in seconds
    pub expire_after_seconds: Option<u64>,
    /// `PX`: relative expiry in milliseconds
    pub expire_after_millis: Option<u64>,
    /// `NX`: write only when no entry exists
    pub only_if_absent: bool,
    /// `XX`: write only when an entry exists
    pub only_if_present: bool,
    /// `KEEPTTL`: keep the expiry of the entry being overwritten
    pub retain_existing_ttl: bool,
    /// `GET`: reply with the value being replaced
    pub return_previous_value: bool,
    /// `EXAT`: absolute expiry as a Unix timestamp in seconds
    pub expire_at_unix_seconds: Option<u64>,
    /// `PXAT`: absolute expiry as a Unix timestamp in milliseconds
    pub expire_at_unix_millis: Option<u64>,
}

impl WriteOptions {
    // == Constructor ==
    /// Options that request nothing: a plain overwrite with no expiry.
    pub fn new() -> Self {
        Self::default()
    }

    // == Normalize ==
    /// Builds options from a raw field map as submitted by a client.
    ///
    /// The sentinel `"0"` and JSON `null` mean "field omitted". Field names
    /// may be the store's native names (`ex`, `nx`, ...) or their long
    /// aliases. The result is validated before it is returned.
    pub fn normalize(raw: &Map<String, Value>) -> Result<Self> {
        let mut options = Self::default();

        for (name, value) in raw {
            if is_unset(value) {
                continue;
            }

            let native = FIELDS
                .iter()
                .find(|(short, long)| name == short || name == long)
                .map(|(short, _)| *short);

            match native {
                Some("ex") => options.expire_after_seconds = Some(parse_number(name, value)?),
                Some("px") => options.expire_after_millis = Some(parse_number(name, value)?),
                Some("exat") => options.expire_at_unix_seconds = Some(parse_number(name, value)?),
                Some("pxat") => options.expire_at_unix_millis = Some(parse_number(name, value)?),
                Some("nx") => options.only_if_absent = parse_flag(name, value)?,
                Some("xx") => options.only_if_present = parse_flag(name, value)?,
                Some("keepttl") => options.retain_existing_ttl = parse_flag(name, value)?,
                Some("get") => options.return_previous_value = parse_flag(name, value)?,
                _ => {
                    return Err(CacheError::InvalidWriteOptions(format!(
                        "unknown option '{}'",
                        name
                    )))
                }
            }
        }

        options.validate()?;
        Ok(options)
    }

    // == Validate ==
    /// Rejects combinations the store would refuse.
    pub fn validate(&self) -> Result<()> {
        if self.only_if_absent && self.only_if_present {
            return Err(CacheError::InvalidWriteOptions(
                "'nx' and 'xx' are mutually exclusive".to_string(),
            ));
        }

        let expiries = [
            ("ex", self.expire_after_seconds),
            ("px", self.expire_after_millis),
            ("exat", self.expire_at_unix_seconds),
            ("pxat", self.expire_at_unix_millis),
        ];

        if let Some((name, _)) = expiries.iter().find(|(_, v)| *v == Some(0)) {
            return Err(CacheError::InvalidWriteOptions(format!(
                "'{}' must be greater than zero",
                name
            )));
        }

        let requested = expiries.iter().filter(|(_, v)| v.is_some()).count()
            + usize::from(self.retain_existing_ttl);
        if requested > 1 {
            return Err(CacheError::InvalidWriteOptions(
                "at most one of 'ex', 'px', 'exat', 'pxat', 'keepttl' may be set".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether the write should happen given the current presence of the entry.
    pub fn permits(&self, exists: bool) -> bool {
        !(self.only_if_absent && exists || self.only_if_present && !exists)
    }

    // == Builders ==
    pub fn with_expire_after_seconds(mut self, seconds: u64) -> Self {
        self.expire_after_seconds = Some(seconds);
        self
    }

    pub fn with_expire_after_millis(mut self, millis: u64) -> Self {
        self.expire_after_millis = Some(millis);
        self
    }

    pub fn with_expire_at_unix_seconds(mut self, timestamp: u64) -> Self {
        self.expire_at_unix_seconds = Some(timestamp);
        self
    }

    pub fn with_expire_at_unix_millis(mut self, timestamp: u64) -> Self {
        self.expire_at_unix_millis = Some(timestamp);
        self
    }

    pub fn only_if_absent(mut self) -> Self {
        self.only_if_absent = true;
        self
    }

    pub fn only_if_present(mut self) -> Self {
        self.only_if_present = true;
        self
    }

    pub fn retain_existing_ttl(mut self) -> Self {
        self.retain_existing_ttl = true;
        self
    }

    pub fn return_previous_value(mut self) -> Self {
        self.return_previous_value = true;
        self
    }
}

fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s == UNSET_SENTINEL,
        _ => false,
    }
}

fn parse_number(name: &str, value: &Value) -> Result<u64> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| {
        CacheError::InvalidWriteOptions(format!(
            "'{}' must be a non-negative integer, got {}",
            name, value
        ))
    })
}

fn parse_flag(name: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") || s == "1" => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(CacheError::InvalidWriteOptions(format!(
            "'{}' must be a boolean, got {}",
            name, value
        ))),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_default_requests_nothing() {
        let options = WriteOptions::new();
        assert_eq!(options.expire_after_seconds, None);
        assert!(options.permits(true));
        assert!(options.permits(false));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_sentinel_is_absent() {
        let options = WriteOptions::normalize(&raw(json!({ "ex": "0" }))).unwrap();
        assert_eq!(options.expire_after_seconds, None);
    }

    #[test]
    fn test_non_zero_passes_through() {
        let options = WriteOptions::normalize(&raw(json!({ "ex": "30" }))).unwrap();
        assert_eq!(options.expire_after_seconds, Some(30));
    }

    #[test]
    fn test_placeholder_form_is_all_unset() {
        let options = WriteOptions::normalize(&raw(json!({
            "ex": "0", "px": "0", "nx": "0", "xx": "0",
            "keepttl": "0", "get": "0", "exat": "0", "pxat": "0"
        })))
        .unwrap();
        assert_eq!(options, WriteOptions::default());
    }

    #[test]
    fn test_null_is_absent() {
        let options = WriteOptions::normalize(&raw(json!({ "px": null }))).unwrap();
        assert_eq!(options.expire_after_millis, None);
    }

    #[test]
    fn test_long_aliases() {
        let options = WriteOptions::normalize(&raw(json!({
            "expire_after_millis": 1500,
            "only_if_absent": true,
            "return_previous_value": "true"
        })))
        .unwrap();
        assert_eq!(options.expire_after_millis, Some(1500));
        assert!(options.only_if_absent);
        assert!(options.return_previous_value);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = WriteOptions::normalize(&raw(json!({ "ttl": 5 })));
        assert!(matches!(result, Err(CacheError::InvalidWriteOptions(_))));
    }

    #[test]
    fn test_malformed_number_rejected() {
        for bad in [json!("soon"), json!(-5), json!(1.5), json!(true)] {
            let result = WriteOptions::normalize(&raw(json!({ "ex": bad })));
            assert!(matches!(result, Err(CacheError::InvalidWriteOptions(_))));
        }
    }

    #[test]
    fn test_malformed_flag_rejected() {
        let result = WriteOptions::normalize(&raw(json!({ "nx": "maybe" })));
        assert!(matches!(result, Err(CacheError::InvalidWriteOptions(_))));
    }

    #[test]
    fn test_explicit_typed_zero_rejected() {
        let result = WriteOptions::normalize(&raw(json!({ "ex": 0 })));
        assert!(matches!(result, Err(CacheError::InvalidWriteOptions(_))));
    }

    #[test]
    fn test_nx_and_xx_rejected() {
        let options = WriteOptions::new().only_if_absent().only_if_present();
        assert!(matches!(
            options.validate(),
            Err(CacheError::InvalidWriteOptions(_))
        ));
    }

    #[test]
    fn test_multiple_expiries_rejected() {
        let options = WriteOptions::new()
            .with_expire_after_seconds(10)
            .with_expire_at_unix_millis(1_000);
        assert!(options.validate().is_err());

        let options = WriteOptions::new()
            .with_expire_after_millis(10)
            .retain_existing_ttl();
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_permits() {
        let nx = WriteOptions::new().only_if_absent();
        assert!(nx.permits(false));
        assert!(!nx.permits(true));

        let xx = WriteOptions::new().only_if_present();
        assert!(xx.permits(true));
        assert!(!xx.permits(false));

        let plain = WriteOptions::new();
        assert!(plain.permits(true) && plain.permits(false));
    }
}
