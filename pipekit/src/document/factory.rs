//! Message factory.

use super::{Message, Part, PropertyStore};

/// Constructs empty messages, parts and property stores.
///
/// Every call returns an independent instance; the factory holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFactory;

impl MessageFactory {
    /// Creates a new factory.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Creates a message with a fresh identity and an empty context.
    #[must_use]
    pub fn create_message(&self) -> Message {
        Message::new()
    }

    /// Creates an empty part with a fresh identity.
    #[must_use]
    pub fn create_message_part(&self) -> Part {
        Part::new()
    }

    /// Creates an empty property bag.
    #[must_use]
    pub fn create_property_bag(&self) -> PropertyStore {
        PropertyStore::new()
    }

    /// Creates an empty message context.
    #[must_use]
    pub fn create_message_context(&self) -> PropertyStore {
        PropertyStore::new()
    }
}
