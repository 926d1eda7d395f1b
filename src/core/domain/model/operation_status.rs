//! Domain model for the status document of an ARM long-running operation,
//! as served from the `Azure-AsyncOperation` URL.

use serde::Deserialize;

/// Status of an asynchronous operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperationStatus {
    /// One of `InProgress`, `Succeeded`, `Failed`, `Canceled`.
    pub status: String,
    /// Error details when the operation failed.
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

/// The error object used by ARM both in failed operations and in non-success responses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// The envelope of a non-success ARM response: `{"error": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorDetail,
}

/// The state of an operation as far as a poller is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState {
    InProgress,
    Succeeded,
    Failed,
    Canceled,
}

impl OperationStatus {
    #[must_use]
    pub fn state(&self) -> OperationState {
        match self.status.to_ascii_lowercase().as_str() {
            "succeeded" => OperationState::Succeeded,
            "failed" => OperationState::Failed,
            "canceled" | "cancelled" => OperationState::Canceled,
            _ => OperationState::InProgress,
        }
    }
}
