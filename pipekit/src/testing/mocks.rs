//! Mock components for testing.

use parking_lot::Mutex;

use crate::components::PipelineComponent;
use crate::context::PipelineContext;
use crate::document::{Message, MessageSnapshot};

/// A component that returns its input unchanged and counts calls.
#[derive(Debug)]
pub struct PassThroughComponent {
    name: String,
    call_count: Mutex<usize>,
}

impl PassThroughComponent {
    /// Creates a new pass-through component.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            call_count: Mutex::new(0),
        }
    }

    /// Returns the number of times the component was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }
}

impl PipelineComponent for PassThroughComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, _ctx: &PipelineContext, message: Message) -> anyhow::Result<Message> {
        *self.call_count.lock() += 1;
        Ok(message)
    }
}

/// A component that always fails.
#[derive(Debug)]
pub struct FailingComponent {
    name: String,
    error: String,
}

impl FailingComponent {
    /// Creates a new failing component.
    #[must_use]
    pub fn new(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: error.into(),
        }
    }
}

impl PipelineComponent for FailingComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, _ctx: &PipelineContext, _message: Message) -> anyhow::Result<Message> {
        Err(anyhow::anyhow!("{}", self.error))
    }
}

/// A component that snapshots every input before passing it through.
#[derive(Debug)]
pub struct RecordingComponent {
    name: String,
    executions: Mutex<Vec<RecordedExecution>>,
}

/// A recorded execution.
#[derive(Debug, Clone)]
pub struct RecordedExecution {
    /// Pipeline name from the context.
    pub pipeline_name: String,
    /// Stage index from the context.
    pub stage_index: usize,
    /// Input message as received.
    pub input: MessageSnapshot,
}

impl RecordingComponent {
    /// Creates a new recording component.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            executions: Mutex::new(Vec::new()),
        }
    }

    /// Returns all recorded executions.
    #[must_use]
    pub fn executions(&self) -> Vec<RecordedExecution> {
        self.executions.lock().clone()
    }

    /// Returns the number of executions.
    #[must_use]
    pub fn execution_count(&self) -> usize {
        self.executions.lock().len()
    }

    /// Clears recorded executions.
    pub fn clear(&self) {
        self.executions.lock().clear();
    }
}

impl PipelineComponent for RecordingComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: &PipelineContext, mut message: Message) -> anyhow::Result<Message> {
        let input = MessageSnapshot::capture(&mut message)?;
        self.executions.lock().push(RecordedExecution {
            pipeline_name: ctx.pipeline_name().to_string(),
            stage_index: ctx.stage_index(),
            input,
        });
        Ok(message)
    }
}
