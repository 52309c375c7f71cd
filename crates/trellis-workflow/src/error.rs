//! Error types for workflow operations
//!
//! All workflow failures are returned as typed results so callers can
//! distinguish "misconfigured" from "forbidden" from "retry after
//! re-fetch". Nothing here mutates instance state.

use thiserror::Error;
use uuid::Uuid;

use trellis_layout::LayoutError;

/// Workflow error types.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Malformed workflow configuration or a reference to configuration
    /// that does not exist. Not recoverable locally; surfaced to the
    /// administrator, never silently defaulted.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The actor is not permitted to perform the requested action at the
    /// current stage. Instance state is unchanged.
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// The supplied stage_version no longer matches the stored instance.
    /// Recoverable: re-fetch and retry; retrying an already-recorded
    /// approval is always safe.
    #[error("Conflict: expected stage_version {expected}, instance is at {actual}")]
    Conflict {
        /// Version the caller observed.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// Unknown action/stage string or an action that is meaningless in
    /// the current state. Fails the single request; no partial change.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No workflow instance with this id.
    #[error("Workflow instance {0} not found")]
    InstanceNotFound(Uuid),

    /// View generation failed (missing layout or catalog entry).
    #[error("Configuration error: {0}")]
    Layout(#[from] LayoutError),
}

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

impl WorkflowError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            WorkflowError::Configuration(_) | WorkflowError::Layout(_) => "CONFIGURATION_ERROR",
            WorkflowError::Authorization(_) => "AUTHORIZATION_ERROR",
            WorkflowError::Conflict { .. } => "CONFLICT",
            WorkflowError::Validation(_) => "VALIDATION_ERROR",
            WorkflowError::InstanceNotFound(_) => "INSTANCE_NOT_FOUND",
        }
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            WorkflowError::Configuration(_) | WorkflowError::Layout(_) => 500,
            WorkflowError::Authorization(_) => 403,
            WorkflowError::Conflict { .. } => 409,
            WorkflowError::Validation(_) => 422,
            WorkflowError::InstanceNotFound(_) => 404,
        }
    }

    /// Check if this error should be logged at error level.
    ///
    /// Authorization and conflict failures are expected under normal
    /// operation and should not be logged as errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self, WorkflowError::Configuration(_) | WorkflowError::Layout(_))
    }
}
