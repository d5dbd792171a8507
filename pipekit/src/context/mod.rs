//! Pipeline context double.
//!
//! This module provides:
//! - The context passed to components under test
//! - Injectable document-spec resolution
//! - A resource tracker for bulk disposal

mod pipeline;
mod resolver;
mod tracker;

pub use pipeline::PipelineContext;
#[cfg(test)]
pub use resolver::MockDocumentSpecResolver;
pub use resolver::{DocumentSpec, DocumentSpecResolver, NoOpResolver, StaticResolver};
pub use tracker::ResourceTracker;
