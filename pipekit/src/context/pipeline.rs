//! The pipeline context handed to components under test.

use super::{DocumentSpec, DocumentSpecResolver, NoOpResolver, ResourceTracker};
use crate::document::MessageFactory;
use crate::events::{EventSink, NoOpEventSink};
use std::sync::Arc;
use uuid::Uuid;

/// Execution context for a pipeline component.
///
/// Identity fields default to fresh values. Collaborators are shared
/// references so a component receiving `&PipelineContext` can still register
/// resources and emit events.
pub struct PipelineContext {
    pipeline_id: Uuid,
    pipeline_name: String,
    stage_id: Uuid,
    stage_index: usize,
    component_index: usize,
    group_signing_certificate: Option<String>,
    event_sink: Arc<dyn EventSink>,
    resolver: Arc<dyn DocumentSpecResolver>,
    resource_tracker: Arc<ResourceTracker>,
    message_factory: MessageFactory,
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineContext {
    /// Creates a context with fresh identity, the process-wide event sink and
    /// a resolver that finds nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pipeline_id: Uuid::new_v4(),
            pipeline_name: Uuid::new_v4().to_string(),
            stage_id: Uuid::new_v4(),
            stage_index: 0,
            component_index: 0,
            group_signing_certificate: None,
            event_sink: Arc::new(NoOpEventSink),
            resolver: Arc::new(NoOpResolver),
            resource_tracker: Arc::new(ResourceTracker::new()),
            message_factory: MessageFactory::new(),
        }
    }

    /// Sets the pipeline id.
    #[must_use]
    pub const fn with_pipeline_id(mut self, id: Uuid) -> Self {
        self.pipeline_id = id;
        self
    }

    /// Sets the pipeline name.
    #[must_use]
    pub fn with_pipeline_name(mut self, name: impl Into<String>) -> Self {
        self.pipeline_name = name.into();
        self
    }

    /// Sets the stage id.
    #[must_use]
    pub const fn with_stage_id(mut self, id: Uuid) -> Self {
        self.stage_id = id;
        self
    }

    /// Sets the stage index.
    #[must_use]
    pub const fn with_stage_index(mut self, index: usize) -> Self {
        self.stage_index = index;
        self
    }

    /// Sets the component index within the stage.
    #[must_use]
    pub const fn with_component_index(mut self, index: usize) -> Self {
        self.component_index = index;
        self
    }

    /// Sets the group signing certificate thumbprint.
    #[must_use]
    pub fn with_group_signing_certificate(mut self, certificate: impl Into<String>) -> Self {
        self.group_signing_certificate = Some(certificate.into());
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Sets the document-spec resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn DocumentSpecResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Shares an existing resource tracker.
    #[must_use]
    pub fn with_resource_tracker(mut self, tracker: Arc<ResourceTracker>) -> Self {
        self.resource_tracker = tracker;
        self
    }

    /// Sets the message factory.
    #[must_use]
    pub const fn with_message_factory(mut self, factory: MessageFactory) -> Self {
        self.message_factory = factory;
        self
    }

    /// Returns the pipeline id.
    #[must_use]
    pub const fn pipeline_id(&self) -> Uuid {
        self.pipeline_id
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn pipeline_name(&self) -> &str {
        &self.pipeline_name
    }

    /// Returns the stage id.
    #[must_use]
    pub const fn stage_id(&self) -> Uuid {
        self.stage_id
    }

    /// Returns the stage index.
    #[must_use]
    pub const fn stage_index(&self) -> usize {
        self.stage_index
    }

    /// Returns the component index within the stage.
    #[must_use]
    pub const fn component_index(&self) -> usize {
        self.component_index
    }

    /// Returns the group signing certificate, if configured.
    #[must_use]
    pub fn group_signing_certificate(&self) -> Option<&str> {
        self.group_signing_certificate.as_deref()
    }

    /// Resolves a document spec by message type.
    #[must_use]
    pub fn document_spec_by_type(&self, doc_type: &str) -> Option<DocumentSpec> {
        self.resolver.by_type(doc_type)
    }

    /// Resolves a document spec by schema name.
    #[must_use]
    pub fn document_spec_by_name(&self, doc_spec_name: &str) -> Option<DocumentSpec> {
        self.resolver.by_name(doc_spec_name)
    }

    /// Returns the event stream.
    #[must_use]
    pub fn event_stream(&self) -> &Arc<dyn EventSink> {
        &self.event_sink
    }

    /// Emits an event enriched with the pipeline and stage identity.
    pub fn emit_event(&self, event_type: &str, data: Option<serde_json::Value>) {
        let mut enriched = data.unwrap_or_else(|| serde_json::json!({}));

        if let serde_json::Value::Object(ref mut map) = enriched {
            map.insert(
                "pipeline_id".to_string(),
                serde_json::json!(self.pipeline_id.to_string()),
            );
            map.insert(
                "pipeline_name".to_string(),
                serde_json::json!(&self.pipeline_name),
            );
            map.insert("stage_index".to_string(), serde_json::json!(self.stage_index));
            map.insert(
                "component_index".to_string(),
                serde_json::json!(self.component_index),
            );
        }

        self.event_sink.emit(event_type, Some(enriched));
    }

    /// Returns the resource tracker.
    #[must_use]
    pub fn resource_tracker(&self) -> &Arc<ResourceTracker> {
        &self.resource_tracker
    }

    /// Returns the message factory.
    #[must_use]
    pub const fn message_factory(&self) -> &MessageFactory {
        &self.message_factory
    }
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("pipeline_id", &self.pipeline_id)
            .field("pipeline_name", &self.pipeline_name)
            .field("stage_id", &self.stage_id)
            .field("stage_index", &self.stage_index)
            .field("component_index", &self.component_index)
            .field("resource_tracker", &self.resource_tracker)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{MockDocumentSpecResolver, StaticResolver};
    use crate::events::CollectingEventSink;
    use mockall::predicate::eq;

    #[test]
    fn test_defaults() {
        let ctx = PipelineContext::new();

        assert!(Uuid::parse_str(ctx.pipeline_name()).is_ok());
        assert_ne!(ctx.pipeline_id(), ctx.stage_id());
        assert_eq!(ctx.stage_index(), 0);
        assert_eq!(ctx.component_index(), 0);
        assert!(ctx.group_signing_certificate().is_none());
        assert!(ctx.document_spec_by_type("any").is_none());
        assert_eq!(ctx.resource_tracker().pending_count(), 0);
    }

    #[test]
    fn test_builders() {
        let id = Uuid::new_v4();
        let ctx = PipelineContext::new()
            .with_pipeline_id(id)
            .with_pipeline_name("ReceiveOrders")
            .with_stage_index(2)
            .with_component_index(1)
            .with_group_signing_certificate("AB12");

        assert_eq!(ctx.pipeline_id(), id);
        assert_eq!(ctx.pipeline_name(), "ReceiveOrders");
        assert_eq!(ctx.stage_index(), 2);
        assert_eq!(ctx.component_index(), 1);
        assert_eq!(ctx.group_signing_certificate(), Some("AB12"));
    }

    #[test]
    fn test_static_resolver() {
        let ctx = PipelineContext::new().with_resolver(Arc::new(
            StaticResolver::new().with_spec(DocumentSpec::new("urn:a#Root", "A.Root")),
        ));

        assert_eq!(
            ctx.document_spec_by_name("A.Root").map(|s| s.doc_type),
            Some("urn:a#Root".to_string())
        );
    }

    #[test]
    fn test_mocked_resolver() {
        let mut resolver = MockDocumentSpecResolver::new();
        resolver
            .expect_by_type()
            .with(eq("urn:b#Root"))
            .times(1)
            .returning(|t| Some(DocumentSpec::new(t, "B.Root")));

        let ctx = PipelineContext::new().with_resolver(Arc::new(resolver));
        let spec = ctx.document_spec_by_type("urn:b#Root");

        assert_eq!(spec.map(|s| s.doc_spec_name), Some("B.Root".to_string()));
    }

    #[test]
    fn test_emit_event_enriches_with_identity() {
        let sink = Arc::new(CollectingEventSink::new());
        let ctx = PipelineContext::new()
            .with_pipeline_name("P")
            .with_stage_index(3)
            .with_event_sink(sink.clone());

        ctx.emit_event("order.received", Some(serde_json::json!({"id": 7})));

        let events = sink.events();
        assert_eq!(events.len(), 1);
        let data = events[0].1.as_ref().unwrap();
        assert_eq!(data["id"], 7);
        assert_eq!(data["pipeline_name"], "P");
        assert_eq!(data["stage_index"], 3);
    }

    #[test]
    fn test_shared_tracker() {
        let tracker = Arc::new(ResourceTracker::new());
        let ctx = PipelineContext::new().with_resource_tracker(tracker.clone());

        ctx.resource_tracker().add_resource(42_u32);
        assert_eq!(tracker.pending_count(), 1);
    }

    #[test]
    fn test_events_stay_with_their_context() {
        let sink = Arc::new(CollectingEventSink::new());
        let observed = PipelineContext::new().with_event_sink(sink.clone());
        let unrelated = PipelineContext::new();
        let sharing = PipelineContext::new().with_event_sink(sink.clone());

        unrelated.emit_event("unrelated.event", None);
        observed.emit_event("observed.event", None);
        sharing.emit_event("shared.event", None);

        assert!(sink.events_of_type("unrelated.event").is_empty());
        assert_eq!(sink.events_of_type("observed.event").len(), 1);
        assert_eq!(sink.events_of_type("shared.event").len(), 1);
    }
}
