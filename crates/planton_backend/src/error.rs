//! Error types for backend configuration.

use thiserror::Error;

use crate::validate::ValidationResult;

/// Result type alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that can occur while resolving the state backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Incomplete backend configuration: missing {}", .0.missing_names().join(", "))]
    BackendIncomplete(ValidationResult),

    #[error("Unsupported backend type '{0}'. Supported types: s3, gcs, azurerm, local")]
    BackendUnsupported(String),

    #[error("Backend prompt aborted: {0}")]
    PromptAborted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    pub fn title(&self) -> &'static str {
        match self {
            BackendError::BackendIncomplete(_) => "Incomplete Backend Configuration",
            BackendError::BackendUnsupported(_) => "Unsupported Backend Type",
            BackendError::PromptAborted(_) => "Backend Configuration Aborted",
            BackendError::Io(_) => "Backend Configuration Error",
        }
    }
}
