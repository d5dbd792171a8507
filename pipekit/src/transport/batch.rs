//! Transport batch double.

use super::{message_arg, BatchCallback, CallLog};
use crate::context::ResourceTracker;
use crate::document::Message;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Records every batch operation and keeps submitted and suspended messages.
///
/// Nothing is delivered. Submitted and suspended messages stay owned by the
/// batch until a test takes them back.
#[derive(Debug, Default)]
pub struct TransportBatch {
    calls: CallLog,
    submitted: Mutex<Vec<Message>>,
    suspended: Mutex<Vec<Message>>,
    callback: Option<Arc<BatchCallback>>,
    cookie: Option<serde_json::Value>,
    resource_tracker: ResourceTracker,
}

impl TransportBatch {
    /// Creates a batch without a completion callback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a batch that carries a completion callback and cookie.
    #[must_use]
    pub fn with_callback(
        callback: Option<Arc<BatchCallback>>,
        cookie: Option<serde_json::Value>,
    ) -> Self {
        Self {
            callback,
            cookie,
            ..Self::default()
        }
    }

    /// Submits a message.
    pub fn submit_message(&self, message: Message) {
        self.calls.record("submit_message", vec![message_arg(&message)]);
        self.submitted.lock().push(message);
    }

    /// Drops every submitted message.
    pub fn clear(&self) {
        self.calls.record("clear", vec![]);
        self.submitted.lock().clear();
    }

    /// Completes the batch.
    pub fn done(&self, transaction: Option<serde_json::Value>) {
        self.calls
            .record("done", vec![transaction.unwrap_or(serde_json::Value::Null)]);
    }

    /// Removes a submitted message, returning it if it was present.
    pub fn delete_message(&self, message_id: Uuid) -> Option<Message> {
        self.calls
            .record("delete_message", vec![serde_json::json!(message_id.to_string())]);
        let mut submitted = self.submitted.lock();
        let index = submitted.iter().position(|m| m.id() == message_id)?;
        Some(submitted.remove(index))
    }

    /// Moves a message to the suspend queue.
    pub fn move_to_suspend_q(&self, message: Message) {
        self.calls
            .record("move_to_suspend_q", vec![message_arg(&message)]);
        self.suspended.lock().push(message);
    }

    /// Schedules a message for resubmission.
    pub fn resubmit(&self, message: &Message, timestamp: DateTime<Utc>) {
        self.calls.record(
            "resubmit",
            vec![message_arg(message), serde_json::json!(timestamp.to_rfc3339())],
        );
    }

    /// Hands a message to the backup transport.
    pub fn move_to_next_transport(&self, message: &Message) {
        self.calls
            .record("move_to_next_transport", vec![message_arg(message)]);
    }

    /// Submits a solicit-response request.
    pub fn submit_request_message(
        &self,
        request: &Message,
        correlation_token: &str,
        first_response_only: bool,
        expiration: DateTime<Utc>,
    ) {
        self.calls.record(
            "submit_request_message",
            vec![
                message_arg(request),
                serde_json::json!(correlation_token),
                serde_json::json!(first_response_only),
                serde_json::json!(expiration.to_rfc3339()),
            ],
        );
    }

    /// Cancels a pending response by correlation token.
    pub fn cancel_response_message(&self, correlation_token: &str) {
        self.calls.record(
            "cancel_response_message",
            vec![serde_json::json!(correlation_token)],
        );
    }

    /// Submits a response to a previously sent solicit message.
    pub fn submit_response_message(&self, solicit_sent: &Message, response: &Message) {
        self.calls.record(
            "submit_response_message",
            vec![message_arg(solicit_sent), message_arg(response)],
        );
    }

    /// Returns the call log.
    #[must_use]
    pub const fn calls(&self) -> &CallLog {
        &self.calls
    }

    /// Returns the completion callback, if any.
    #[must_use]
    pub const fn callback(&self) -> Option<&Arc<BatchCallback>> {
        self.callback.as_ref()
    }

    /// Returns the callback cookie, if any.
    #[must_use]
    pub const fn cookie(&self) -> Option<&serde_json::Value> {
        self.cookie.as_ref()
    }

    /// Returns the batch's resource tracker.
    #[must_use]
    pub const fn resource_tracker(&self) -> &ResourceTracker {
        &self.resource_tracker
    }

    /// Returns the number of submitted messages.
    #[must_use]
    pub fn submitted_count(&self) -> usize {
        self.submitted.lock().len()
    }

    /// Returns the ids of submitted messages in submission order.
    #[must_use]
    pub fn submitted_ids(&self) -> Vec<Uuid> {
        self.submitted.lock().iter().map(Message::id).collect()
    }

    /// Takes back every submitted message.
    pub fn take_submitted(&self) -> Vec<Message> {
        std::mem::take(&mut *self.submitted.lock())
    }

    /// Returns the number of suspended messages.
    #[must_use]
    pub fn suspended_count(&self) -> usize {
        self.suspended.lock().len()
    }

    /// Takes back every suspended message.
    pub fn take_suspended(&self) -> Vec<Message> {
        std::mem::take(&mut *self.suspended.lock())
    }
}
