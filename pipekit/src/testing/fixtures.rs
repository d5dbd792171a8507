//! Test fixtures for component testing.

use crate::components::PipelineComponent;
use crate::context::PipelineContext;
use crate::document::{DataStream, Message, Part, PropertyValue};
use crate::errors::DuplicatePartError;
use crate::testing::PipelineResultValidator;
use tracing::{debug, warn};
use uuid::Uuid;

/// Fluent builder for input messages.
///
/// The first duplicate part name is remembered and reported by
/// [`MessageBuilder::try_build`].
#[derive(Debug, Default)]
pub struct MessageBuilder {
    message: Message,
    error: Option<DuplicatePartError>,
}

impl MessageBuilder {
    /// Starts an empty message with a fresh identity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts an empty message with the given identity.
    #[must_use]
    pub fn with_id(id: Uuid) -> Self {
        Self {
            message: Message::with_id(id),
            error: None,
        }
    }

    /// Adds a prepared part.
    #[must_use]
    pub fn with_part(mut self, name: &str, part: Part, is_body: bool) -> Self {
        if let Err(e) = self.message.add_part(name, part, is_body) {
            self.error.get_or_insert(e);
        }
        self
    }

    /// Adds a part with a content type and in-memory data.
    #[must_use]
    pub fn part(
        self,
        name: &str,
        content_type: &str,
        data: impl Into<Vec<u8>>,
        is_body: bool,
    ) -> Self {
        let part = Part::new().with_content_type(content_type).with_bytes(data);
        self.with_part(name, part, is_body)
    }

    /// Adds a part backed by an arbitrary stream, such as a file.
    #[must_use]
    pub fn stream_part<S: DataStream + 'static>(
        self,
        name: &str,
        content_type: &str,
        stream: S,
        is_body: bool,
    ) -> Self {
        let part = Part::new().with_content_type(content_type).with_data(stream);
        self.with_part(name, part, is_body)
    }

    /// Adds a non-body text part.
    #[must_use]
    pub fn text_part(self, name: &str, content_type: &str, text: &str) -> Self {
        self.part(name, content_type, text.as_bytes(), false)
    }

    /// Adds a `text/plain` body part.
    #[must_use]
    pub fn body(self, name: &str, text: &str) -> Self {
        self.part(name, "text/plain", text.as_bytes(), true)
    }

    /// Writes a context property.
    #[must_use]
    pub fn property(mut self, name: &str, namespace: &str, value: PropertyValue) -> Self {
        self.message.context_mut().write(name, namespace, value);
        self
    }

    /// Promotes a context property.
    #[must_use]
    pub fn promoted(mut self, name: &str, namespace: &str, value: PropertyValue) -> Self {
        self.message.context_mut().promote(name, namespace, value);
        self
    }

    /// Records a predicate context property.
    #[must_use]
    pub fn predicate(mut self, name: &str, namespace: &str, value: PropertyValue) -> Self {
        self.message.context_mut().add_predicate(name, namespace, value);
        self
    }

    /// Attaches error info.
    #[must_use]
    pub fn error(mut self, error: impl Into<anyhow::Error>) -> Self {
        self.message.set_error_info(error);
        self
    }

    /// Finishes the message.
    ///
    /// # Errors
    ///
    /// Returns the first duplicate part name encountered while building.
    pub fn try_build(self) -> Result<Message, DuplicatePartError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.message),
        }
    }

    /// Finishes the message.
    ///
    /// # Panics
    ///
    /// Panics if a part name was added twice.
    #[must_use]
    pub fn build(self) -> Message {
        match self.try_build() {
            Ok(message) => message,
            Err(e) => panic!("{e}"),
        }
    }
}

/// Runs components against a shared pipeline context.
#[derive(Debug, Default)]
pub struct ComponentHarness {
    context: PipelineContext,
}

impl ComponentHarness {
    /// Creates a harness with a default context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a harness around an existing context.
    #[must_use]
    pub const fn with_context(context: PipelineContext) -> Self {
        Self { context }
    }

    /// Returns the pipeline context.
    #[must_use]
    pub const fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Executes `component` with `message` and returns its output.
    pub fn run(&self, component: &dyn PipelineComponent, message: Message) -> anyhow::Result<Message> {
        let input_id = message.id();
        debug!(component = component.name(), message_id = %input_id, "Running component");

        match component.execute(&self.context, message) {
            Ok(output) => {
                debug!(
                    component = component.name(),
                    message_id = %output.id(),
                    parts = output.part_count(),
                    "Component completed"
                );
                Ok(output)
            }
            Err(e) => {
                warn!(component = component.name(), message_id = %input_id, error = %e, "Component failed");
                Err(e)
            }
        }
    }

    /// Executes `component` and validates its output.
    pub fn run_and_validate(
        &self,
        component: &dyn PipelineComponent,
        message: Message,
        validator: &PipelineResultValidator,
    ) -> anyhow::Result<Message> {
        let mut output = self.run(component, message)?;
        validator.validate(&mut output)?;
        Ok(output)
    }

    /// Disposes every resource registered with the context's tracker.
    ///
    /// Returns the number of resources disposed.
    pub fn finish(&self) -> usize {
        self.context.resource_tracker().dispose_all()
    }
}
