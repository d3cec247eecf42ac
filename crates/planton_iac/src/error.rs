//! Error types for workspace materialization and dispatch.

use std::path::PathBuf;

use planton_backend::BackendError;
use planton_manifest::ManifestError;
use planton_provider::{missing_provider_config_guidance, CloudProvider, ProviderError};
use planton_runner::RunnerError;
use thiserror::Error;

/// Result type alias for IaC operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur while preparing a workspace or running an IaC tool.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("No {provisioner} module found for {kind} (looked in {})", .path.display())]
    ModuleNotFound {
        kind: String,
        provisioner: String,
        path: PathBuf,
    },

    #[error("Failed to check out modules version '{version}': {message}")]
    ModuleCheckoutFailed { version: String, message: String },

    #[error("Git error: {0}")]
    GitError(String),

    #[error("Staging error: {0}")]
    StagingError(String),

    #[error("{} provider config required for {kind}", .provider.display_name())]
    ProviderConfigRequired { kind: String, provider: CloudProvider },

    #[error("No provisioner selected. Set the '{label}' label or run interactively")]
    ProvisionerRequired { label: &'static str },

    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("Invalid invocation state change {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Cannot determine the home directory; set PROJECT_PLANTON_HOME")]
    HomeDirUnavailable,

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IacError {
    /// Short heading used by the presentation layer.
    pub fn title(&self) -> &'static str {
        match self {
            IacError::ModuleNotFound { .. } => "IaC Module Not Found",
            IacError::ModuleCheckoutFailed { .. } => "Module Version Checkout Failed",
            IacError::GitError(_) => "Git Operation Failed",
            IacError::StagingError(_) => "Staging Area Error",
            IacError::ProviderConfigRequired { .. } => "Provider Config Required",
            IacError::ProvisionerRequired { .. } => "Provisioner Not Specified",
            IacError::UnknownOperation(_) => "Unknown Operation",
            IacError::InvalidTransition { .. } => "Internal Error",
            IacError::HomeDirUnavailable => "Home Directory Unavailable",
            IacError::Manifest(e) => e.title(),
            IacError::Provider(e) => e.title(),
            IacError::Backend(e) => e.title(),
            IacError::Runner(e) => e.title(),
            IacError::Io(_) | IacError::Yaml(_) | IacError::Json(_) => "Workspace Error",
        }
    }

    pub fn tip(&self) -> Option<String> {
        match self {
            IacError::ModuleNotFound { .. } => Some(
                "Run 'project-planton pull' to refresh the modules, or pass --module-dir".to_string(),
            ),
            IacError::ModuleCheckoutFailed { .. } => Some(
                "Check that the tag, branch or commit exists: project-planton checkout <version>"
                    .to_string(),
            ),
            IacError::ProviderConfigRequired { kind, provider } => {
                Some(missing_provider_config_guidance(kind, *provider))
            }
            IacError::ProvisionerRequired { label } => Some(format!(
                "Add '{}: tofu' (or pulumi, terraform) to metadata.labels",
                label
            )),
            IacError::Manifest(e) => e.tip(),
            IacError::Runner(e) => e.tip(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_errors_keep_titles() {
        let err: IacError = RunnerError::BinaryNotInPath {
            display_name: "OpenTofu".to_string(),
            binary: "tofu".to_string(),
        }
        .into();
        assert_eq!(err.title(), "IaC Tool Not Installed");
        assert!(err.tip().unwrap().contains("opentofu"));
        assert_eq!(err.to_string(), "OpenTofu CLI 'tofu' not found in PATH");
    }

    #[test]
    fn test_module_not_found_message() {
        let err = IacError::ModuleNotFound {
            kind: "AwsS3Bucket".to_string(),
            provisioner: "tofu".to_string(),
            path: PathBuf::from("/x"),
        };
        assert!(err.to_string().contains("AwsS3Bucket"));
        assert!(err.tip().is_some());
    }
}
