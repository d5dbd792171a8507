//! Pipeline component trait.
//!
//! A component takes ownership of an input message and returns the message
//! the next stage would receive.

use crate::context::PipelineContext;
use crate::document::Message;
use std::fmt::Debug;

/// Trait for pipeline components under test.
#[cfg_attr(test, mockall::automock)]
pub trait PipelineComponent: Send + Sync + Debug {
    /// Returns the name of the component.
    fn name(&self) -> &str;

    /// Executes the component.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The pipeline context
    /// * `message` - The input message
    ///
    /// # Returns
    ///
    /// The output message, or the error the component raised.
    fn execute(&self, ctx: &PipelineContext, message: Message) -> anyhow::Result<Message>;
}

/// A simple function-based component.
pub struct FnComponent<F>
where
    F: Fn(&PipelineContext, Message) -> anyhow::Result<Message> + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnComponent<F>
where
    F: Fn(&PipelineContext, Message) -> anyhow::Result<Message> + Send + Sync,
{
    /// Creates a new function-based component.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnComponent<F>
where
    F: Fn(&PipelineContext, Message) -> anyhow::Result<Message> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnComponent")
            .field("name", &self.name)
            .finish()
    }
}

impl<F> PipelineComponent for FnComponent<F>
where
    F: Fn(&PipelineContext, Message) -> anyhow::Result<Message> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: &PipelineContext, message: Message) -> anyhow::Result<Message> {
        (self.func)(ctx, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Part;
    use serde_json::json;

    #[test]
    fn test_fn_component() {
        let component = FnComponent::new("promote-order-id", |_ctx, mut msg: Message| {
            msg.context_mut().promote("OrderId", "urn:acme", json!("42"));
            Ok(msg)
        });

        assert_eq!(component.name(), "promote-order-id");

        let ctx = PipelineContext::new();
        let out = component.execute(&ctx, Message::new()).unwrap();
        assert!(out.context().is_promoted("OrderId", "urn:acme").unwrap());
    }

    #[test]
    fn test_fn_component_error() {
        let component = FnComponent::new("reject", |_ctx, _msg| anyhow::bail!("rejected"));

        let ctx = PipelineContext::new();
        let err = component.execute(&ctx, Message::new()).unwrap_err();
        assert_eq!(err.to_string(), "rejected");
    }

    #[test]
    fn test_fn_component_uses_context_factory() {
        let component = FnComponent::new("add-trailer", |ctx: &PipelineContext, mut msg: Message| {
            let part = ctx.message_factory().create_message_part().with_text("end");
            msg.add_part("trailer", part, false)?;
            Ok(msg)
        });

        let mut input = Message::new();
        input.add_part("body", Part::new().with_text("x"), true).unwrap();

        let out = component.execute(&PipelineContext::new(), input).unwrap();
        assert_eq!(out.part_names(), vec!["body", "trailer"]);
    }
}
