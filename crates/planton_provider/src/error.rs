//! Error types for provider credential handling.

use std::path::PathBuf;

use thiserror::Error;

use crate::provider::CloudProvider;

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur while loading or translating provider credentials.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider config file not found: {}", .0.display())]
    CredentialFileMissing(PathBuf),

    #[error("Invalid {} provider config: {message}", .provider.display_name())]
    CredentialMalformed {
        provider: CloudProvider,
        message: String,
    },

    #[error("{} provider config is missing required field '{field}'", .provider.display_name())]
    CredentialMissingRequired {
        provider: CloudProvider,
        field: &'static str,
    },

    #[error("Kubernetes cluster type '{0}' is not supported yet")]
    UnsupportedCluster(String),

    #[error("Field '{field}' is not valid base64: {message}")]
    InvalidBase64 {
        field: &'static str,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ProviderError {
    /// Short heading used by the presentation layer.
    pub fn title(&self) -> &'static str {
        match self {
            ProviderError::CredentialFileMissing(_) => "Provider Config Not Found",
            ProviderError::CredentialMalformed { .. } => "Invalid Provider Config",
            ProviderError::CredentialMissingRequired { .. } => "Incomplete Provider Config",
            ProviderError::UnsupportedCluster(_) => "Unsupported Cluster Type",
            ProviderError::InvalidBase64 { .. } => "Invalid Credential Encoding",
            ProviderError::Io(_) | ProviderError::Yaml(_) => "Provider Config Error",
        }
    }
}
