//! Batch completion callback double.

use super::CallLog;
use serde::{Deserialize, Serialize};

/// Kind of operation reported in a batch completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum BatchOperation {
    Submit,
    Delete,
    Resubmit,
    MoveToSuspendQ,
    MoveToNextTransport,
    SubmitRequest,
    CancelResponse,
    SubmitResponse,
}

/// Outcome of one operation type within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOperationStatus {
    /// Operation type.
    pub operation: BatchOperation,
    /// HRESULT-style status; negative values are failures.
    pub status: i32,
    /// Number of messages the operation covered.
    pub message_count: usize,
}

impl BatchOperationStatus {
    /// Creates a status entry for one batch operation.
    #[must_use]
    pub const fn new(operation: BatchOperation, status: i32, message_count: usize) -> Self {
        Self {
            operation,
            status,
            message_count,
        }
    }

    /// Returns true if the status is not a failure code.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.status >= 0
    }
}

/// Records `batch_complete` notifications.
#[derive(Debug, Default)]
pub struct BatchCallback {
    calls: CallLog,
}

impl BatchCallback {
    /// Creates a callback with an empty call log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a batch completion.
    pub fn batch_complete(
        &self,
        status: i32,
        op_count: usize,
        operation_statuses: &[BatchOperationStatus],
        cookie: Option<&serde_json::Value>,
    ) {
        let statuses = serde_json::to_value(operation_statuses).unwrap_or_default();
        self.calls.record(
            "batch_complete",
            vec![
                serde_json::json!(status),
                serde_json::json!(op_count),
                statuses,
                cookie.cloned().unwrap_or(serde_json::Value::Null),
            ],
        );
    }

    /// Returns the call log.
    #[must_use]
    pub const fn calls(&self) -> &CallLog {
        &self.calls
    }
}
