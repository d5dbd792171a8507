//! Property keys, kinds and entries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The value stored against a property key.
///
/// Properties carry arbitrary payloads (strings, numbers, structured
/// values), so the store uses a JSON value as its closed tagged union.
pub type PropertyValue = serde_json::Value;

/// A property key: a (name, namespace) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyKey {
    /// The property name.
    pub name: String,
    /// The property namespace. Empty for unqualified properties.
    pub namespace: String,
}

impl PropertyKey {
    /// Creates a new property key.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Creates a key with an empty namespace.
    #[must_use]
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }

    /// Returns true if the key has no namespace.
    #[must_use]
    pub fn is_unqualified(&self) -> bool {
        self.namespace.is_empty()
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}#{}", self.namespace, self.name)
        }
    }
}

/// How a property was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// Plainly written.
    #[default]
    Written,
    /// Promoted for routing.
    Promoted,
    /// Recorded for filter evaluation.
    Predicate,
}

impl PropertyKind {
    /// Returns the kind as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::Promoted => "promoted",
            Self::Predicate => "predicate",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyEntry {
    /// The property key.
    pub key: PropertyKey,
    /// The stored value.
    pub value: PropertyValue,
    /// How the value was recorded.
    pub kind: PropertyKind,
}

impl PropertyEntry {
    /// Creates a new entry.
    #[must_use]
    pub const fn new(key: PropertyKey, value: PropertyValue, kind: PropertyKind) -> Self {
        Self { key, value, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        assert_eq!(PropertyKey::new("Name", "urn:ns").to_string(), "urn:ns#Name");
        assert_eq!(PropertyKey::unqualified("Name").to_string(), "Name");
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&PropertyKind::Promoted).unwrap();
        assert_eq!(json, "\"promoted\"");
    }
}
