//! Assertion primitives for custom checks and direct assertions on messages.

use crate::document::{Message, PropertyKind, PropertyStore, PropertyValue};
use std::fmt::Debug;

/// Fails with a descriptive error unless `expected == actual`.
///
/// Intended for custom validator checks, which return `anyhow::Result<()>`.
///
/// # Errors
///
/// Returns an error naming `what` with both values when they differ.
pub fn ensure_eq<T, U>(expected: &T, actual: &U, what: &str) -> anyhow::Result<()>
where
    T: Debug + PartialEq<U> + ?Sized,
    U: Debug + ?Sized,
{
    if expected == actual {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{what} mismatch. Expected: <{expected:?}>. Actual: <{actual:?}>."
        ))
    }
}

/// Fails unconditionally.
///
/// # Errors
///
/// Always returns an error carrying `message`.
pub fn fail(message: impl Into<String>) -> anyhow::Result<()> {
    Err(anyhow::anyhow!(message.into()))
}

/// Asserts that a store holds `expected` under `(name, namespace)`.
pub fn assert_property_eq(
    store: &PropertyStore,
    name: &str,
    namespace: &str,
    expected: &PropertyValue,
) {
    let actual = store.read(name, namespace);
    assert_eq!(
        actual,
        Some(expected),
        "Expected property {namespace}#{name} to be {expected}, got {actual:?}"
    );
}

/// Asserts that a store holds `(name, namespace)` with the given kind.
pub fn assert_property_kind(store: &PropertyStore, name: &str, namespace: &str, kind: PropertyKind) {
    match store.property_kind(name, namespace) {
        Ok(actual) => assert_eq!(
            actual, kind,
            "Expected property {namespace}#{name} to be {}, got {}",
            kind.as_str(),
            actual.as_str()
        ),
        Err(e) => panic!("{e}"),
    }
}

/// Asserts that a store holds nothing under `(name, namespace)`.
pub fn assert_property_absent(store: &PropertyStore, name: &str, namespace: &str) {
    assert!(
        !store.contains(name, namespace),
        "Expected property {namespace}#{name} to be absent, got {:?}",
        store.read(name, namespace)
    );
}

/// Asserts the message's part names in enumeration order.
pub fn assert_part_names(message: &Message, expected: &[&str]) {
    assert_eq!(
        message.part_names(),
        expected,
        "Unexpected part names for message {}",
        message.id()
    );
}

/// Asserts which part is designated as the body.
pub fn assert_body_part(message: &Message, expected: &str) {
    assert_eq!(
        message.body_part_name(),
        Some(expected),
        "Unexpected body part for message {}",
        message.id()
    );
}

/// Asserts that a part decodes to `expected`, leaving its stream rewound.
pub fn assert_part_text(message: &mut Message, part_name: &str, expected: &str) {
    let Some(part) = message.get_part_mut(part_name) else {
        panic!("Expected part {part_name} to exist");
    };
    match part.read_text() {
        Ok(Some(actual)) => assert_eq!(actual, expected, "Stream content of part {part_name}"),
        Ok(None) => panic!("Part {part_name} has no data stream"),
        Err(e) => panic!("Part {part_name} could not be read: {e}"),
    }
}

/// Asserts that the message carries captured error info.
pub fn assert_has_error_info(message: &Message) {
    assert!(
        message.error_info().is_some(),
        "Expected message {} to carry error info",
        message.id()
    );
}
