//! Dimension and teleport-context identifiers.
//!
//! Both are thin wrappers around [`RegistryKey`]: the host decides which
//! dimensions exist, and the teleport core only compares them for equality
//! and uses them as map keys. The derived ordering exists so maps keyed by
//! these ids iterate deterministically; it carries no gameplay meaning.

use crate::registry::{RegistryKey, RegistryKeyError, DEFAULT_NAMESPACE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier for a world dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionId(RegistryKey);

impl DimensionId {
    /// Wrap an existing key.
    pub fn new(key: RegistryKey) -> Self {
        Self(key)
    }

    /// Parse a dimension id from its `namespace:path` form.
    pub fn parse(input: &str) -> Result<Self, RegistryKeyError> {
        RegistryKey::parse(input).map(Self)
    }

    /// The host's default surface dimension (`mirage:overworld`).
    pub fn overworld() -> Self {
        Self(RegistryKey::from_static(DEFAULT_NAMESPACE, "overworld"))
    }

    /// Underlying registry key.
    pub fn key(&self) -> &RegistryKey {
        &self.0
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DimensionId {
    type Err = RegistryKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Identifies a logical teleport network whose cached positions are shared.
///
/// Stable across sessions: the key string is what gets persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeleportContext(RegistryKey);

impl TeleportContext {
    /// Wrap an existing key.
    pub fn new(key: RegistryKey) -> Self {
        Self(key)
    }

    /// Parse a context from its `namespace:path` form.
    pub fn parse(input: &str) -> Result<Self, RegistryKeyError> {
        RegistryKey::parse(input).map(Self)
    }

    /// The network used by mirage books (`mirage:mirage_worlds`).
    pub fn mirage_worlds() -> Self {
        Self(RegistryKey::from_static(DEFAULT_NAMESPACE, "mirage_worlds"))
    }

    /// Underlying registry key.
    pub fn key(&self) -> &RegistryKey {
        &self.0
    }
}

impl fmt::Display for TeleportContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_ids_are_stable() {
        assert_eq!(DimensionId::overworld().to_string(), "mirage:overworld");
        assert_eq!(
            TeleportContext::mirage_worlds().to_string(),
            "mirage:mirage_worlds"
        );
    }

    #[test]
    fn dimension_ids_compare_by_key() {
        let a = DimensionId::parse("mirage:caveland").unwrap();
        let b: DimensionId = "caveland".parse().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, DimensionId::overworld());
    }

    #[test]
    fn dimension_id_serializes_transparently() {
        let id = DimensionId::parse("mirage:cavenia").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"mirage:cavenia\"");
        assert_eq!(serde_json::from_str::<DimensionId>(&json).unwrap(), id);
    }
}
