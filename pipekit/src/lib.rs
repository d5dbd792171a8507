//! # Pipekit
//!
//! In-memory test doubles for message pipeline components.
//!
//! Pipekit provides everything needed to unit test a pipeline component
//! without a messaging runtime:
//!
//! - **Document model**: messages with ordered named parts, property stores
//!   with written/promoted/predicate semantics, owned data streams
//! - **Pipeline context**: identity, document-spec resolution, event stream,
//!   resource tracking
//! - **Result validation**: a fluent validator for the shape of an output message
//! - **Transport doubles**: batches and proxies that record every call
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pipekit::prelude::*;
//!
//! let input = MessageBuilder::new()
//!     .part("body", "text/xml", b"<Order/>".to_vec(), true)
//!     .build();
//!
//! let mut output = ComponentHarness::new().run(&my_component, input)?;
//!
//! PipelineResultValidator::new()
//!     .assert_part_count(1)
//!     .assert_part_content_type("body", "text/xml")?
//!     .assert_part_stream("body", "<Order/>")?
//!     .assert_unexpected_parts()
//!     .validate(&mut output)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod components;
pub mod config;
pub mod context;
pub mod document;
pub mod errors;
pub mod events;
pub mod observability;
pub mod testing;
pub mod transport;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::components::{FnComponent, PipelineComponent};
    pub use crate::config::{LogFormat, LoggingConfig, ValidatorConfig};
    pub use crate::context::{
        DocumentSpec, DocumentSpecResolver, NoOpResolver, PipelineContext, ResourceTracker,
        StaticResolver,
    };
    pub use crate::document::{
        Disposable, Message, MessageFactory, Part, PropertyKind, PropertyStore, PropertyValue,
    };
    pub use crate::errors::{
        ConfigurationError, DuplicatePartError, IndexOutOfRangeError, PipekitError,
        PropertyNotFoundError, ValidationAspect, ValidationFailure,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::testing::{
        ensure_eq, fail, ComponentHarness, MessageBuilder, PipelineResultValidator,
    };
    pub use crate::transport::{BatchCallback, CallLog, TransportBatch, TransportConfig, TransportProxy};
}
