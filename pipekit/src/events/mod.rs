//! Event sinks backing the pipeline context's event stream.
//!
//! Sinks are injected per context with `PipelineContext::with_event_sink`;
//! a context without one discards its events.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
