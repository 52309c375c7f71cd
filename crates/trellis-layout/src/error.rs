//! Error types for layout and view operations
//!
//! A missing layout is an explicit error, never an empty view, so callers
//! can distinguish "nothing to show" from "misconfigured".

use thiserror::Error;
use trellis_access::AccessError;
use trellis_fields::FieldError;

/// Layout and view generation error types.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// No layout configured for the (request_type, workflow_stage) pair.
    #[error("No layout configured for request type '{request_type}' at stage '{workflow_stage}'")]
    NotFound {
        /// Request type the lookup was for.
        request_type: String,
        /// Workflow stage the lookup was for.
        workflow_stage: String,
    },

    /// Two sections in one layout share an id.
    #[error("Duplicate section id '{section_id}' in layout")]
    DuplicateSection {
        /// The colliding section id.
        section_id: String,
    },

    /// A section references a field that is disabled in the catalog.
    #[error("Layout section '{section_id}' references disabled field '{field_name}'")]
    DisabledField {
        /// Section containing the reference.
        section_id: String,
        /// The disabled field.
        field_name: String,
    },

    /// A section references a field the catalog does not know.
    #[error("Configuration error: {0}")]
    Field(#[from] FieldError),

    /// Permission resolution failed while generating a view.
    #[error(transparent)]
    Access(#[from] AccessError),
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

impl LayoutError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            LayoutError::NotFound { .. } => "LAYOUT_NOT_FOUND",
            LayoutError::DuplicateSection { .. } => "DUPLICATE_SECTION",
            LayoutError::DisabledField { .. } => "DISABLED_FIELD",
            LayoutError::Field(_) => "CONFIGURATION_ERROR",
            LayoutError::Access(_) => "CONFIGURATION_ERROR",
        }
    }
}
