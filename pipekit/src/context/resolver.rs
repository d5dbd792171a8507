//! Document-spec resolution for the pipeline context.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Describes a document schema known to the pipeline runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentSpec {
    /// Message type, usually `namespace#root`.
    pub doc_type: String,
    /// Fully qualified schema name.
    pub doc_spec_name: String,
}

impl DocumentSpec {
    /// Creates a new document spec.
    #[must_use]
    pub fn new(doc_type: impl Into<String>, doc_spec_name: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
            doc_spec_name: doc_spec_name.into(),
        }
    }
}

/// Resolves document specs by message type or by schema name.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentSpecResolver: Send + Sync {
    /// Looks up a spec by message type.
    fn by_type(&self, doc_type: &str) -> Option<DocumentSpec>;

    /// Looks up a spec by schema name.
    fn by_name(&self, doc_spec_name: &str) -> Option<DocumentSpec>;
}

/// A resolver that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpResolver;

impl DocumentSpecResolver for NoOpResolver {
    fn by_type(&self, _doc_type: &str) -> Option<DocumentSpec> {
        None
    }

    fn by_name(&self, _doc_spec_name: &str) -> Option<DocumentSpec> {
        None
    }
}

/// A resolver backed by a fixed set of registered specs.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    by_type: HashMap<String, DocumentSpec>,
    by_name: HashMap<String, DocumentSpec>,
}

impl StaticResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a spec under both its message type and its schema name.
    ///
    /// A later registration for the same type or name replaces the earlier one.
    #[must_use]
    pub fn with_spec(mut self, spec: DocumentSpec) -> Self {
        self.register(spec);
        self
    }

    /// Registers a spec in place.
    pub fn register(&mut self, spec: DocumentSpec) {
        self.by_type.insert(spec.doc_type.clone(), spec.clone());
        self.by_name.insert(spec.doc_spec_name.clone(), spec);
    }

    /// Returns the number of distinct message types registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl DocumentSpecResolver for StaticResolver {
    fn by_type(&self, doc_type: &str) -> Option<DocumentSpec> {
        self.by_type.get(doc_type).cloned()
    }

    fn by_name(&self, doc_spec_name: &str) -> Option<DocumentSpec> {
        self.by_name.get(doc_spec_name).cloned()
    }
}
