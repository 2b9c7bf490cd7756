//! Identifiers used across the catalog.
//!
//! Two kinds of identity exist side by side:
//! - [`BusinessKey`]: the human-assigned key (`cid`, `scid`, ...) every lookup,
//!   update and delete matches on.
//! - [`InternalId`]: the store-generated document id, reported back on create
//!   and never used as a filter.

use core::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("key pattern is a valid regex"));

/// Returns `true` when `raw` is non-empty and made only of `[A-Za-z0-9]`.
pub fn is_key_syntax(raw: &str) -> bool {
    KEY_PATTERN.is_match(raw)
}

/// Business key of a catalog entity.
///
/// Construction goes through the identifier guard, so a `BusinessKey` value is
/// always safe to place in a store filter. Length bounds (4..=10) are a field
/// validation rule applied to payloads, not part of the guard: a short lookup
/// key is simply not found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BusinessKey(String);

impl BusinessKey {
    /// Identifier guard: accept `raw` only if it matches the key syntax.
    pub fn guard(raw: impl Into<String>) -> Result<Self, KeySyntaxError> {
        let raw = raw.into();
        if is_key_syntax(&raw) {
            Ok(Self(raw))
        } else {
            Err(KeySyntaxError(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for BusinessKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BusinessKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BusinessKey {
    type Error = KeySyntaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::guard(value)
    }
}

impl From<BusinessKey> for String {
    fn from(value: BusinessKey) -> Self {
        value.0
    }
}

impl FromStr for BusinessKey {
    type Err = KeySyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::guard(s)
    }
}

/// Rejected key: empty or containing characters outside `[A-Za-z0-9]`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("key {0:?} is not alphanumeric")]
pub struct KeySyntaxError(pub String);

/// Store-generated identifier of a persisted document.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternalId(Uuid);

impl InternalId {
    /// Time-ordered (UUIDv7) identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for InternalId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for InternalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn guard_accepts_plain_alphanumerics() {
        assert!(BusinessKey::guard("C001").is_ok());
        assert!(BusinessKey::guard("abc").is_ok());
        assert!(BusinessKey::guard("Z").is_ok());
    }

    #[test]
    fn guard_rejects_empty_and_symbols() {
        assert!(BusinessKey::guard("").is_err());
        assert!(BusinessKey::guard("C-01").is_err());
        assert!(BusinessKey::guard("C01 ").is_err());
        assert!(BusinessKey::guard("{\"$ne\":1}").is_err());
        assert!(BusinessKey::guard("Ä123").is_err());
        assert!(BusinessKey::guard("12\n34").is_err());
    }

    #[test]
    fn key_deserialization_goes_through_guard() {
        let ok: Result<BusinessKey, _> = serde_json::from_str("\"B0001\"");
        assert_eq!(ok.unwrap().as_str(), "B0001");

        let bad: Result<BusinessKey, _> = serde_json::from_str("\"B 0001\"");
        assert!(bad.is_err());
    }

    #[test]
    fn internal_ids_are_unique_and_time_ordered() {
        let first = InternalId::new();
        let second = InternalId::new();
        assert_ne!(first, second);
        assert_eq!(first.as_uuid().get_version_num(), 7);
        assert_eq!(InternalId::from_uuid(*first.as_uuid()), first);
        assert_eq!(first.to_string(), first.as_uuid().to_string());
    }

    proptest! {
        #[test]
        fn any_alphanumeric_string_passes(raw in "[A-Za-z0-9]{1,32}") {
            prop_assert!(BusinessKey::guard(raw.clone()).is_ok());
        }

        #[test]
        fn any_string_with_a_symbol_fails(
            prefix in "[A-Za-z0-9]{0,8}",
            symbol in "[^A-Za-z0-9]",
            suffix in "[A-Za-z0-9]{0,8}",
        ) {
            let raw = format!("{prefix}{symbol}{suffix}");
            prop_assert!(BusinessKey::guard(raw).is_err());
        }
    }
}
