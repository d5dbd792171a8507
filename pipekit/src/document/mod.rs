//! In-memory document model.
//!
//! This module provides:
//! - Ordered property stores with written/promoted/predicate kinds
//! - Message parts owning a data stream and their own properties
//! - Messages holding ordered named parts and a context
//! - A factory for fresh instances and serializable snapshots

mod factory;
mod message;
mod part;
mod property;
mod snapshot;
mod store;

pub use factory::MessageFactory;
pub use message::{normalize_part_name, Message};
pub(crate) use part::decode_text;
pub use part::{DataStream, Part, PartSize};
pub use property::{PropertyEntry, PropertyKey, PropertyKind, PropertyValue};
pub use snapshot::{MessageSnapshot, PartSnapshot};
pub use store::PropertyStore;

/// A resource that releases what it owns when disposed.
///
/// Disposal must be idempotent: calling `dispose` again does nothing.
pub trait Disposable: Send {
    /// Releases owned resources.
    fn dispose(&mut self);
}
