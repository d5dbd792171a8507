//! Ordered record of calls made against a transport double.

use crate::document::Message;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use tracing::trace;

/// A single recorded method invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodCall {
    /// Method name, e.g. `submit_message`.
    pub method: String,
    /// Arguments rendered as JSON, in call order.
    pub args: Vec<serde_json::Value>,
    /// When the call was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl MethodCall {
    /// Returns the argument at `index`, if present.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&serde_json::Value> {
        self.args.get(index)
    }
}

/// Observer invoked for every recorded call.
pub type CallObserver = Arc<dyn Fn(&MethodCall) + Send + Sync>;

/// Ordered call log with observer subscription.
#[derive(Default)]
pub struct CallLog {
    calls: Mutex<Vec<MethodCall>>,
    observers: RwLock<Vec<CallObserver>>,
}

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a call and notifies observers.
    ///
    /// Observers run after the call is stored and outside the log's lock, so
    /// an observer may inspect the log.
    pub fn record(&self, method: &str, args: Vec<serde_json::Value>) {
        let call = MethodCall {
            method: method.to_string(),
            args,
            recorded_at: Utc::now(),
        };
        trace!(method = %call.method, args = ?call.args, "Recorded call");

        self.calls.lock().push(call.clone());

        let observers = self.observers.read().clone();
        for observer in observers {
            observer(&call);
        }
    }

    /// Registers an observer for subsequent calls.
    pub fn subscribe<F>(&self, observer: F)
    where
        F: Fn(&MethodCall) + Send + Sync + 'static,
    {
        self.observers.write().push(Arc::new(observer));
    }

    /// Returns every recorded call in order.
    #[must_use]
    pub fn calls(&self) -> Vec<MethodCall> {
        self.calls.lock().clone()
    }

    /// Returns recorded calls to `method` in order.
    #[must_use]
    pub fn calls_to(&self, method: &str) -> Vec<MethodCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    /// Returns the number of calls to `method`.
    #[must_use]
    pub fn count_of(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.method == method).count()
    }

    /// Returns the most recent call, if any.
    #[must_use]
    pub fn last(&self) -> Option<MethodCall> {
        self.calls.lock().last().cloned()
    }

    /// Returns the number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns true if no call has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    /// Forgets recorded calls. Observers stay subscribed.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl std::fmt::Debug for CallLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallLog")
            .field("calls", &self.len())
            .field("observers", &self.observers.read().len())
            .finish()
    }
}

/// Renders a message as a call argument.
#[must_use]
pub fn message_arg(message: &Message) -> serde_json::Value {
    serde_json::json!({
        "message_id": message.id().to_string(),
        "part_count": message.part_count(),
        "body_part": message.body_part_name(),
    })
}

/// Renders an error as a call argument.
#[must_use]
pub fn error_arg(error: &anyhow::Error) -> serde_json::Value {
    serde_json::json!(format!("{error:#}"))
}
