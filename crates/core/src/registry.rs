//! Namespaced registry keys.
//!
//! Dimensions, teleport contexts and mirage books are all addressed by keys of
//! the form `namespace:path` (e.g., `mirage:caveland`). Keys are validated on
//! parse and ordered lexically so tables keyed by them iterate the same way on
//! every run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Namespace assumed when a key omits one.
pub const DEFAULT_NAMESPACE: &str = "mirage";

/// Error returned when parsing an invalid [`RegistryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryKeyError {
    /// The input was empty or whitespace.
    #[error("registry key cannot be empty")]
    Empty,
    /// Namespace segment failed validation.
    #[error("invalid registry key namespace `{0}` (allowed: a-z0-9_.-, max 64)")]
    Namespace(String),
    /// Path segment failed validation.
    #[error("invalid registry key path `{0}` (allowed: a-z0-9_./-, max 128)")]
    Path(String),
}

/// A namespaced key of the form `namespace:path`.
///
/// Serialized as its `namespace:path` string so persisted records and TOML
/// configs stay human readable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistryKey {
    namespace: String,
    path: String,
}

impl RegistryKey {
    /// Parse a registry key, using [`DEFAULT_NAMESPACE`] when none is given.
    pub fn parse(input: &str) -> Result<Self, RegistryKeyError> {
        Self::parse_with_default_namespace(input, DEFAULT_NAMESPACE)
    }

    /// Parse a registry key using a caller-provided default namespace.
    pub fn parse_with_default_namespace(
        input: &str,
        default_namespace: &str,
    ) -> Result<Self, RegistryKeyError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RegistryKeyError::Empty);
        }

        let (namespace, path) = input
            .split_once(':')
            .unwrap_or((default_namespace, input));
        Self::new(namespace.trim(), path.trim())
    }

    /// Build a key from already separated parts.
    pub fn new(namespace: &str, path: &str) -> Result<Self, RegistryKeyError> {
        if !valid_segment(namespace, 64, false) {
            return Err(RegistryKeyError::Namespace(namespace.to_string()));
        }
        if !valid_segment(path, 128, true) {
            return Err(RegistryKeyError::Path(path.to_string()));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Build a key from literals known to be valid.
    pub(crate) fn from_static(namespace: &'static str, path: &'static str) -> Self {
        debug_assert!(valid_segment(namespace, 64, false) && valid_segment(path, 128, true));
        Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        }
    }

    /// Registry key namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Registry key path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn valid_segment(segment: &str, max_len: usize, allow_slash: bool) -> bool {
    !segment.is_empty()
        && segment.len() <= max_len
        && segment.chars().all(|c| {
            matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.') || (allow_slash && c == '/')
        })
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for RegistryKey {
    type Err = RegistryKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RegistryKey {
    type Error = RegistryKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RegistryKey> for String {
    fn from(key: RegistryKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced_key() {
        let key = RegistryKey::parse("cavern:caveland").unwrap();
        assert_eq!(key.namespace(), "cavern");
        assert_eq!(key.path(), "caveland");
        assert_eq!(key.to_string(), "cavern:caveland");
    }

    #[test]
    fn parses_with_default_namespace() {
        let key = RegistryKey::parse("mirage_worlds").unwrap();
        assert_eq!(key.to_string(), "mirage:mirage_worlds");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(RegistryKey::parse(""), Err(RegistryKeyError::Empty));
        assert_eq!(RegistryKey::parse("   "), Err(RegistryKeyError::Empty));
    }

    #[test]
    fn rejects_invalid_chars() {
        assert!(RegistryKey::parse("mirage:Caveland").is_err());
        assert!(RegistryKey::parse("MIRAGE:caveland").is_err());
        assert!(RegistryKey::parse("mirage:cave land").is_err());
        assert!(RegistryKey::parse("mirage:").is_err());
        assert!(RegistryKey::parse(":caveland").is_err());
        assert!(RegistryKey::parse("mi/rage:caveland").is_err());
    }

    #[test]
    fn serializes_as_string() {
        let key = RegistryKey::parse("mirage:the_void").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"mirage:the_void\"");
        let back: RegistryKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<RegistryKey>("\"Bad Key\"").is_err());
    }
}
