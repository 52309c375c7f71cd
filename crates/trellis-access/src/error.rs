//! Error types for permission resolution
//!
//! Resolution failures are configuration problems by definition: the
//! resolver refuses to answer for fields the catalog does not know, so
//! misconfiguration surfaces to administrators instead of masquerading
//! as "no access".

use thiserror::Error;
use trellis_fields::FieldError;

/// Permission resolution error types.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The catalog does not know the field being resolved.
    #[error("Configuration error: {0}")]
    Configuration(#[from] FieldError),
}

/// Result type for permission resolution.
pub type AccessResult<T> = Result<T, AccessError>;

impl AccessError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}
