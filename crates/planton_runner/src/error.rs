//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while running an IaC tool.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("{display_name} CLI '{binary}' not found in PATH")]
    BinaryNotInPath {
        display_name: String,
        binary: String,
    },

    #[error("Command '{command}' failed: {status}")]
    ChildProcessFailed {
        command: String,
        status: String,
        exit_code: Option<i32>,
    },

    #[error("Failed to start '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Output reader panicked: {0}")]
    ReaderPanicked(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    pub fn title(&self) -> &'static str {
        match self {
            RunnerError::BinaryNotInPath { .. } => "IaC Tool Not Installed",
            RunnerError::ChildProcessFailed { .. } => "IaC Command Failed",
            RunnerError::SpawnFailed { .. } => "Could Not Start IaC Tool",
            RunnerError::ReaderPanicked(_) => "Output Streaming Failed",
            RunnerError::Io(_) => "Execution Error",
        }
    }

    /// Install hint for a missing binary.
    pub fn tip(&self) -> Option<String> {
        match self {
            RunnerError::BinaryNotInPath { binary, .. } => Some(install_hint(binary).to_string()),
            RunnerError::ChildProcessFailed { .. } => {
                Some("Review the tool output above for the root cause.".to_string())
            }
            _ => None,
        }
    }
}

/// Install instructions for the supported IaC binaries.
pub fn install_hint(binary: &str) -> &'static str {
    match binary {
        "tofu" => "Install OpenTofu: https://opentofu.org/docs/intro/install/",
        "terraform" => "Install Terraform: https://developer.hashicorp.com/terraform/install",
        "pulumi" => "Install Pulumi: https://www.pulumi.com/docs/install/",
        "git" => "Install git: https://git-scm.com/downloads",
        _ => "Install the tool and make sure it is on your PATH.",
    }
}
