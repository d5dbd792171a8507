//! End-to-end tests: components run through the harness, checked by the
//! validator, handed to the transport doubles.

#[cfg(test)]
mod tests {
    use crate::components::{FnComponent, MockPipelineComponent, PipelineComponent};
    use crate::context::{DocumentSpec, MockDocumentSpecResolver, PipelineContext};
    use crate::document::{Disposable, Message, Part, PropertyKind};
    use crate::errors::ValidationAspect;
    use crate::events::CollectingEventSink;
    use crate::testing::{
        assert_property_kind, ComponentHarness, MessageBuilder, PassThroughComponent,
        PipelineResultValidator, RecordingComponent,
    };
    use crate::transport::{BatchCallback, TransportProxy};
    use mockall::predicate::eq;
    use serde_json::json;
    use std::sync::Arc;

    const SYS: &str = "http://schemas.example.org/system-properties";

    /// Resolves the body's root element to a schema and promotes the message type.
    fn schema_stamping_component() -> impl PipelineComponent {
        FnComponent::new("stamp-schema", |ctx: &PipelineContext, mut msg: Message| {
            let text = msg
                .body_part_mut()
                .ok_or_else(|| anyhow::anyhow!("message has no body"))?
                .read_text()?
                .unwrap_or_default();
            let root = if text.starts_with("<Order") { "Order" } else { "Unknown" };
            let doc_type = format!("urn:acme#{root}");

            let spec = ctx
                .document_spec_by_type(&doc_type)
                .ok_or_else(|| anyhow::anyhow!("no schema for {doc_type}"))?;
            msg.context_mut().promote("MessageType", SYS, json!(spec.doc_type));
            msg.context_mut().write("SchemaStrongName", SYS, json!(spec.doc_spec_name));
            ctx.emit_event("schema.resolved", Some(json!({"doc_type": doc_type})));
            Ok(msg)
        })
    }

    #[test]
    fn test_component_output_passes_validation() {
        let mut resolver = MockDocumentSpecResolver::new();
        resolver
            .expect_by_type()
            .with(eq("urn:acme#Order"))
            .times(1)
            .returning(|t| Some(DocumentSpec::new(t, "Acme.Schemas.Order")));
        let sink = Arc::new(CollectingEventSink::new());
        let harness = ComponentHarness::with_context(
            PipelineContext::new()
                .with_resolver(Arc::new(resolver))
                .with_event_sink(sink.clone()),
        );

        let input = MessageBuilder::new()
            .part("body", "text/xml", b"<Order id=\"1\"/>".to_vec(), true)
            .build();
        let validator = PipelineResultValidator::new()
            .assert_part_count(1)
            .assert_part_content_type("body", "text/xml")
            .unwrap()
            .assert_part_stream("body", "<Order id=\"1\"/>")
            .unwrap()
            .assert_property("MessageType", SYS, json!("urn:acme#Order"))
            .unwrap()
            .assert_property("SchemaStrongName", SYS, json!("Acme.Schemas.Order"))
            .unwrap()
            .assert_unexpected_parts();

        let output = harness
            .run_and_validate(&schema_stamping_component(), input, &validator)
            .unwrap();

        assert_property_kind(output.context(), "MessageType", SYS, PropertyKind::Promoted);
        assert_property_kind(output.context(), "SchemaStrongName", SYS, PropertyKind::Written);
        assert_eq!(sink.events_of_type("schema.resolved").len(), 1);
    }

    #[test]
    fn test_unresolved_schema_surfaces_component_error() {
        let mut resolver = MockDocumentSpecResolver::new();
        resolver.expect_by_type().returning(|_| None);
        let harness =
            ComponentHarness::with_context(PipelineContext::new().with_resolver(Arc::new(resolver)));

        let input = MessageBuilder::new().body("body", "<Invoice/>").build();
        let err = harness.run(&schema_stamping_component(), input).unwrap_err();

        assert_eq!(err.to_string(), "no schema for urn:acme#Unknown");
    }

    #[test]
    fn test_mocked_component_output_fails_validation() {
        let mut component = MockPipelineComponent::new();
        component.expect_name().return_const("splitter".to_string());
        component.expect_execute().times(1).returning(|_ctx, mut msg| {
            msg.add_part("trailer", Part::new().with_text("end"), false)?;
            Ok(msg)
        });

        let harness = ComponentHarness::new();
        let input = MessageBuilder::new().body("body", "payload").build();
        let validator = PipelineResultValidator::new()
            .assert_part_stream("body", "payload")
            .unwrap()
            .assert_unexpected_parts();

        let err = harness.run_and_validate(&component, input, &validator).unwrap_err();
        let failure = err
            .downcast_ref::<crate::errors::ValidationFailure>()
            .unwrap();

        assert_eq!(failure.aspect, ValidationAspect::UnexpectedPart);
        assert_eq!(failure.target.as_deref(), Some("trailer"));
    }

    #[test]
    fn test_chained_components_and_transport_submission() {
        let recorder = RecordingComponent::new("record");
        let pass = PassThroughComponent::new("pass");
        let harness = ComponentHarness::new();

        let input = MessageBuilder::new()
            .body("body", "hello")
            .promoted("ReceivePortName", SYS, json!("OrdersIn"))
            .build();
        let output = harness.run(&recorder, input).unwrap();
        let mut output = harness.run(&pass, output).unwrap();

        PipelineResultValidator::new()
            .assert_part_order(&["body"])
            .unwrap()
            .assert_property("ReceivePortName", SYS, json!("OrdersIn"))
            .unwrap()
            .assert_valid(&mut output);

        let proxy = TransportProxy::new();
        let callback = Arc::new(BatchCallback::new());
        let batch = proxy.get_batch(Some(callback), Some(json!("cookie")));
        let id = output.id();
        batch.submit_message(output);
        batch.done(None);

        assert_eq!(recorder.execution_count(), 1);
        assert_eq!(pass.call_count(), 1);
        assert_eq!(batch.submitted_ids(), vec![id]);
        assert_eq!(
            batch.calls().calls()[0].args[0]["message_id"],
            json!(id.to_string())
        );

        let mut submitted = batch.take_submitted();
        for msg in &mut submitted {
            msg.dispose();
            assert!(msg.is_disposed());
        }
    }
}
