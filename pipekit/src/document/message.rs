//! The message: ordered named parts, a context, and captured error info.

use super::{Disposable, MessageSnapshot, Part, PropertyStore};
use crate::errors::{DuplicatePartError, IndexOutOfRangeError};
use tracing::debug;
use uuid::Uuid;

/// Normalizes a part name for comparison.
///
/// Every surface that matches part names (message lookups, uniqueness,
/// validator registration) goes through this function.
#[must_use]
pub fn normalize_part_name(name: &str) -> String {
    name.to_lowercase()
}

/// A message flowing through a pipeline component.
///
/// # Invariants
///
/// - Part names are unique under [`normalize_part_name`]
/// - At most one part name is designated as the body
/// - `part_count()` equals the number of stored parts
///
/// The message owns its parts and context. Disposing the message disposes
/// every part exactly once.
#[derive(Debug)]
pub struct Message {
    id: Uuid,
    parts: Vec<(String, Part)>,
    body_part: Option<String>,
    context: PropertyStore,
    error_info: Option<anyhow::Error>,
    disposed: bool,
}

impl Message {
    /// Creates an empty message with a fresh identity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Creates an empty message with the given identity.
    #[must_use]
    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            parts: Vec::new(),
            body_part: None,
            context: PropertyStore::new(),
            error_info: None,
            disposed: false,
        }
    }

    /// Returns the message identity.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Adds a named part.
    ///
    /// If `is_body` is true the part becomes the body, superseding any
    /// previous body designation. The previous body part stays in the
    /// message.
    ///
    /// # Errors
    ///
    /// Returns `DuplicatePartError` if a part with the same name exists.
    pub fn add_part(
        &mut self,
        name: impl Into<String>,
        part: Part,
        is_body: bool,
    ) -> Result<(), DuplicatePartError> {
        let name = name.into();
        if self.position(&name).is_some() {
            return Err(DuplicatePartError::new(name));
        }

        if is_body {
            self.body_part = Some(name.clone());
        }
        self.parts.push((name, part));
        Ok(())
    }

    /// Returns the named part, if present.
    #[must_use]
    pub fn get_part(&self, name: &str) -> Option<&Part> {
        self.position(name)
            .and_then(|i| self.parts.get(i))
            .map(|(_, part)| part)
    }

    /// Returns the named part for mutation, if present.
    pub fn get_part_mut(&mut self, name: &str) -> Option<&mut Part> {
        let i = self.position(name)?;
        self.parts.get_mut(i).map(|(_, part)| part)
    }

    /// Returns the part at `index` along with its name.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRangeError` if `index >= part_count()`.
    pub fn part_by_index(&self, index: usize) -> Result<(&Part, &str), IndexOutOfRangeError> {
        self.parts
            .get(index)
            .map(|(name, part)| (part, name.as_str()))
            .ok_or_else(|| IndexOutOfRangeError::new(index, self.parts.len(), "message parts"))
    }

    /// Returns the part at `index` for mutation along with its name.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRangeError` if `index >= part_count()`.
    pub fn part_by_index_mut(&mut self, index: usize) -> Result<(&mut Part, &str), IndexOutOfRangeError> {
        let len = self.parts.len();
        self.parts
            .get_mut(index)
            .map(|(name, part)| (part, name.as_str()))
            .ok_or_else(|| IndexOutOfRangeError::new(index, len, "message parts"))
    }

    /// Removes the named part and returns it. Does nothing if absent.
    ///
    /// Removing the body part clears the body designation.
    pub fn remove_part(&mut self, name: &str) -> Option<Part> {
        let i = self.position(name)?;
        let (removed_name, part) = self.parts.remove(i);

        let key = normalize_part_name(&removed_name);
        if self
            .body_part
            .as_deref()
            .is_some_and(|body| normalize_part_name(body) == key)
        {
            self.body_part = None;
        }
        Some(part)
    }

    /// Returns the number of parts.
    #[must_use]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Iterates parts in insertion order.
    pub fn parts(&self) -> impl Iterator<Item = (&str, &Part)> {
        self.parts.iter().map(|(name, part)| (name.as_str(), part))
    }

    /// Iterates parts mutably in insertion order.
    pub fn parts_mut(&mut self) -> impl Iterator<Item = (&str, &mut Part)> {
        self.parts.iter_mut().map(|(name, part)| (name.as_str(), part))
    }

    /// Returns the part names in insertion order.
    #[must_use]
    pub fn part_names(&self) -> Vec<&str> {
        self.parts.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Returns the body part name.
    #[must_use]
    pub fn body_part_name(&self) -> Option<&str> {
        self.body_part.as_deref()
    }

    /// Returns the body part.
    #[must_use]
    pub fn body_part(&self) -> Option<&Part> {
        self.body_part.as_deref().and_then(|name| self.get_part(name))
    }

    /// Returns the body part for mutation.
    pub fn body_part_mut(&mut self) -> Option<&mut Part> {
        let name = self.body_part.clone()?;
        self.get_part_mut(&name)
    }

    /// Returns the message context.
    #[must_use]
    pub const fn context(&self) -> &PropertyStore {
        &self.context
    }

    /// Returns the message context for mutation.
    pub fn context_mut(&mut self) -> &mut PropertyStore {
        &mut self.context
    }

    /// Replaces the message context.
    pub fn set_context(&mut self, context: PropertyStore) {
        self.context = context;
    }

    /// Captures an error on the message.
    pub fn set_error_info(&mut self, error: impl Into<anyhow::Error>) {
        self.error_info = Some(error.into());
    }

    /// Returns the captured error, if any.
    #[must_use]
    pub const fn error_info(&self) -> Option<&anyhow::Error> {
        self.error_info.as_ref()
    }

    /// Removes and returns the captured error.
    pub fn take_error_info(&mut self) -> Option<anyhow::Error> {
        self.error_info.take()
    }

    /// Captures a serializable view of the message.
    ///
    /// # Errors
    ///
    /// Returns an IO error if a part stream cannot be read.
    pub fn snapshot(&mut self) -> std::io::Result<MessageSnapshot> {
        MessageSnapshot::capture(self)
    }

    /// Returns true once the message has been disposed.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = normalize_part_name(name);
        self.parts
            .iter()
            .position(|(existing, _)| normalize_part_name(existing) == key)
    }
}

impl Disposable for Message {
    fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        for (_, part) in &mut self.parts {
            part.dispose();
        }
        self.disposed = true;
        debug!(message_id = %self.id, parts = self.parts.len(), "Disposed message");
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}
