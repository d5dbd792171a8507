//! Ordered property store shared by message contexts and property bags.

use super::{PropertyEntry, PropertyKey, PropertyKind, PropertyValue};
use crate::errors::{IndexOutOfRangeError, PropertyNotFoundError};
use std::collections::HashMap;

/// An ordered map of (name, namespace) keys to values and kinds.
///
/// Keys are unique. Insertion order is kept for positional access; writing
/// an existing key replaces its value and kind in place. Permissive reads
/// return `None` for absent keys, while kind queries fail with
/// [`PropertyNotFoundError`].
///
/// Cloning copies every entry; a clone never shares its key set with the
/// original.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyStore {
    entries: Vec<PropertyEntry>,
    index: HashMap<PropertyKey, usize>,
}

impl PropertyStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a property value, or `None` if the key was never written.
    #[must_use]
    pub fn read(&self, name: &str, namespace: &str) -> Option<&PropertyValue> {
        self.entry(name, namespace).map(|e| &e.value)
    }

    /// Reads the property at `index` in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRangeError` if `index >= count()`.
    pub fn read_at(&self, index: usize) -> Result<(&str, &str, &PropertyValue), IndexOutOfRangeError> {
        let entry = self.entry_at(index)?;
        Ok((&entry.key.name, &entry.key.namespace, &entry.value))
    }

    /// Returns the full entry at `index` in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRangeError` if `index >= count()`.
    pub fn entry_at(&self, index: usize) -> Result<&PropertyEntry, IndexOutOfRangeError> {
        self.entries
            .get(index)
            .ok_or_else(|| IndexOutOfRangeError::new(index, self.entries.len(), "properties"))
    }

    /// Returns the entry for a key, if present.
    #[must_use]
    pub fn entry(&self, name: &str, namespace: &str) -> Option<&PropertyEntry> {
        self.index
            .get(&PropertyKey::new(name, namespace))
            .and_then(|&i| self.entries.get(i))
    }

    /// Writes a property.
    pub fn write(&mut self, name: impl Into<String>, namespace: impl Into<String>, value: PropertyValue) {
        self.upsert(PropertyKey::new(name, namespace), value, PropertyKind::Written);
    }

    /// Writes and promotes a property.
    pub fn promote(&mut self, name: impl Into<String>, namespace: impl Into<String>, value: PropertyValue) {
        self.upsert(PropertyKey::new(name, namespace), value, PropertyKind::Promoted);
    }

    /// Records a predicate property.
    pub fn add_predicate(
        &mut self,
        name: impl Into<String>,
        namespace: impl Into<String>,
        value: PropertyValue,
    ) {
        self.upsert(PropertyKey::new(name, namespace), value, PropertyKind::Predicate);
    }

    /// Returns the kind of a stored property.
    ///
    /// # Errors
    ///
    /// Returns `PropertyNotFoundError` if the key was never written.
    pub fn property_kind(&self, name: &str, namespace: &str) -> Result<PropertyKind, PropertyNotFoundError> {
        self.entry(name, namespace)
            .map(|e| e.kind)
            .ok_or_else(|| PropertyNotFoundError::new(name, namespace))
    }

    /// Returns true if the property is promoted.
    ///
    /// # Errors
    ///
    /// Returns `PropertyNotFoundError` if the key was never written.
    pub fn is_promoted(&self, name: &str, namespace: &str) -> Result<bool, PropertyNotFoundError> {
        Ok(self.property_kind(name, namespace)? == PropertyKind::Promoted)
    }

    /// Reads a property stored without a namespace.
    ///
    /// Component configuration bags address their settings by name only.
    #[must_use]
    pub fn read_unqualified(&self, name: &str) -> Option<&PropertyValue> {
        self.read(name, "")
    }

    /// Writes a property without a namespace.
    pub fn write_unqualified(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.upsert(PropertyKey::unqualified(name), value, PropertyKind::Written);
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the key has been written.
    #[must_use]
    pub fn contains(&self, name: &str, namespace: &str) -> bool {
        self.index.contains_key(&PropertyKey::new(name, namespace))
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PropertyEntry> {
        self.entries.iter()
    }

    fn upsert(&mut self, key: PropertyKey, value: PropertyValue, kind: PropertyKind) {
        if let Some(&i) = self.index.get(&key) {
            if let Some(entry) = self.entries.get_mut(i) {
                entry.value = value;
                entry.kind = kind;
                return;
            }
        }

        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(PropertyEntry::new(key, value, kind));
    }
}

impl<'a> IntoIterator for &'a PropertyStore {
    type Item = &'a PropertyEntry;
    type IntoIter = std::slice::Iter<'a, PropertyEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NS: &str = "http://schemas.example.org/system-properties";

    #[test]
    fn test_write_and_read() {
        let mut store = PropertyStore::new();
        store.write("ReceivedFileName", NS, json!("in.xml"));

        assert_eq!(store.read("ReceivedFileName", NS), Some(&json!("in.xml")));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_read_missing_is_none() {
        let store = PropertyStore::new();
        assert_eq!(store.read("Missing", NS), None);
    }

    #[test]
    fn test_namespace_is_part_of_key() {
        let mut store = PropertyStore::new();
        store.write("Name", "urn:a", json!(1));
        store.write("Name", "urn:b", json!(2));

        assert_eq!(store.count(), 2);
        assert_eq!(store.read("Name", "urn:a"), Some(&json!(1)));
        assert_eq!(store.read("Name", "urn:b"), Some(&json!(2)));
    }

    #[test]
    fn test_promote_and_is_promoted() {
        let mut store = PropertyStore::new();
        store.promote("MessageType", NS, json!("urn:orders#Order"));
        store.write("InboundTransportType", NS, json!("FILE"));

        assert!(store.is_promoted("MessageType", NS).unwrap());
        assert!(!store.is_promoted("InboundTransportType", NS).unwrap());
    }

    #[test]
    fn test_is_promoted_missing_key_fails() {
        let store = PropertyStore::new();
        let err = store.is_promoted("Missing", NS).unwrap_err();
        assert_eq!(err.name, "Missing");
        assert_eq!(err.namespace, NS);
    }

    #[test]
    fn test_rewrite_replaces_value_and_kind_in_place() {
        let mut store = PropertyStore::new();
        store.write("a", NS, json!(1));
        store.promote("b", NS, json!(2));
        store.add_predicate("a", NS, json!(3));

        assert_eq!(store.count(), 2);
        assert_eq!(store.property_kind("a", NS).unwrap(), PropertyKind::Predicate);

        let (name, _, value) = store.read_at(0).unwrap();
        assert_eq!(name, "a");
        assert_eq!(value, &json!(3));
    }

    #[test]
    fn test_read_at_order_and_bounds() {
        let mut store = PropertyStore::new();
        store.write("first", NS, json!(1));
        store.write("second", NS, json!(2));

        assert_eq!(store.read_at(1).unwrap().0, "second");

        let err = store.read_at(2).unwrap_err();
        assert_eq!(err.index, 2);
        assert_eq!(err.len, 2);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = PropertyStore::new();
        original.write("a", NS, json!("x"));
        original.promote("b", NS, json!("y"));

        let mut clone = original.clone();
        assert_eq!(clone.count(), 2);
        assert_eq!(clone.property_kind("b", NS).unwrap(), PropertyKind::Promoted);

        clone.write("a", NS, json!("changed"));
        clone.write("b", NS, json!("y"));
        clone.write("c", NS, json!("new"));

        assert_eq!(original.count(), 2);
        assert_eq!(original.read("a", NS), Some(&json!("x")));
        assert!(original.is_promoted("b", NS).unwrap());
    }

    #[test]
    fn test_unqualified_properties() {
        let mut bag = PropertyStore::new();
        bag.write_unqualified("Enabled", json!(true));

        assert_eq!(bag.read_unqualified("Enabled"), Some(&json!(true)));
        assert_eq!(bag.read("Enabled", ""), Some(&json!(true)));
        assert!(bag.entry_at(0).unwrap().key.is_unqualified());
    }
}
