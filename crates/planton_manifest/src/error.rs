//! Error types for manifest resolution, loading and validation.

use std::path::PathBuf;

use thiserror::Error;

use crate::validate::FieldViolation;

/// Result type alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Broad grouping of manifest errors, used to pick a presentation banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Source,
    Load,
    Validation,
}

/// Errors that can occur while resolving, loading or validating a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Clipboard is empty")]
    ClipboardEmpty,

    #[error("Clipboard content is not valid YAML: {message}")]
    ClipboardInvalidYaml { raw: String, message: String },

    #[error("File from clipboard not found: {}", .path.display())]
    ClipboardFileNotFound { path: PathBuf },

    #[error("Clipboard content is not a stack input (missing top-level 'target' field)")]
    ClipboardNotStackInput,

    #[error("No clipboard reader available: {0}")]
    ClipboardUnavailable(String),

    #[error("Invalid manifest path: {0}")]
    ManifestPathInvalid(String),

    #[error("No manifest source provided. Use --manifest, --clipboard, --stack-input, --kustomize-dir with --overlay, or --input-dir")]
    NoManifestSource,

    #[error("Failed to download manifest from {url}: {message}")]
    ManifestDownloadFailed { url: String, message: String },

    #[error("Kustomize build failed for {}: {message}", .dir.display())]
    KustomizeFailed { dir: PathBuf, message: String },

    #[error("Invalid stack input: {0}")]
    StackInputInvalid(String),

    #[error("Unknown resource kind '{0}'")]
    UnknownKind(String),

    #[error("Resource kind '{kind}' expects apiVersion '{expected}', found '{found}'")]
    UnsupportedApiVersion {
        kind: String,
        expected: String,
        found: String,
    },

    #[error("Unknown field '{name}' at {path}{}", location_suffix(.line, .column))]
    UnknownField {
        name: String,
        path: String,
        suggestion: Option<String>,
        line: Option<usize>,
        column: Option<usize>,
    },

    #[error("Field '{path}' expects {expected}, found {found}")]
    InvalidFieldType {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Malformed YAML: {message}{}", location_suffix(.line, .column))]
    MalformedYaml {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    #[error("Manifest validation failed with {} violation(s)", .0.len())]
    ValidationFailed(Vec<FieldViolation>),

    #[error("Invalid override '{key}': {message}")]
    InvalidOverride { key: String, message: String },

    #[error("Invalid schema pattern for {field} '{pattern}': {message}")]
    InvalidPattern {
        field: String,
        pattern: String,
        message: String,
    },

    #[error("Invalid provisioner '{0}' (expected pulumi, tofu or terraform)")]
    InvalidProvisioner(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn location_suffix(line: &Option<usize>, column: &Option<usize>) -> String {
    match (*line, *column) {
        (Some(line), Some(column)) => format!(" (line {}, column {})", line, column),
        (Some(line), None) => format!(" (line {})", line),
        _ => String::new(),
    }
}

impl ManifestError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ManifestError::ClipboardEmpty
            | ManifestError::ClipboardInvalidYaml { .. }
            | ManifestError::ClipboardFileNotFound { .. }
            | ManifestError::ClipboardNotStackInput
            | ManifestError::ClipboardUnavailable(_)
            | ManifestError::ManifestPathInvalid(_)
            | ManifestError::NoManifestSource
            | ManifestError::ManifestDownloadFailed { .. }
            | ManifestError::KustomizeFailed { .. }
            | ManifestError::StackInputInvalid(_)
            | ManifestError::Io(_) => ErrorCategory::Source,
            ManifestError::ValidationFailed(_)
            | ManifestError::InvalidOverride { .. }
            | ManifestError::InvalidProvisioner(_) => ErrorCategory::Validation,
            _ => ErrorCategory::Load,
        }
    }

    /// Short heading used by the presentation layer.
    pub fn title(&self) -> &'static str {
        match self {
            ManifestError::ClipboardEmpty => "Clipboard is Empty",
            ManifestError::ClipboardInvalidYaml { .. } => "Invalid YAML in Clipboard",
            ManifestError::ClipboardFileNotFound { .. } => "File Not Found",
            ManifestError::ClipboardNotStackInput => "Not a Stack Input",
            ManifestError::ClipboardUnavailable(_) => "Clipboard Unavailable",
            ManifestError::ManifestPathInvalid(_) | ManifestError::NoManifestSource => {
                "Manifest Not Found"
            }
            ManifestError::ManifestDownloadFailed { .. } => "Manifest Download Failed",
            ManifestError::KustomizeFailed { .. } => "Kustomize Build Failed",
            ManifestError::StackInputInvalid(_) => "Invalid Stack Input",
            ManifestError::UnknownKind(_) | ManifestError::UnsupportedApiVersion { .. } => {
                "Unsupported Resource Kind"
            }
            ManifestError::UnknownField { .. } => "Unknown Field in Manifest",
            ManifestError::InvalidFieldType { .. } => "Invalid Field Type",
            ManifestError::MalformedYaml { .. } | ManifestError::Yaml(_) => "Malformed YAML",
            ManifestError::ValidationFailed(_) => "Manifest Validation Failed",
            ManifestError::InvalidOverride { .. } => "Invalid Override",
            ManifestError::InvalidProvisioner(_) => "Invalid Provisioner",
            ManifestError::InvalidPattern { .. } => "Invalid Schema Pattern",
            ManifestError::Io(_) | ManifestError::Json(_) => "Manifest Error",
        }
    }

    /// Optional next step shown under the error banner.
    pub fn tip(&self) -> Option<String> {
        match self {
            ManifestError::ClipboardEmpty => Some(
                "Copy a manifest (or a path to one) to your clipboard, then run the command again"
                    .to_string(),
            ),
            ManifestError::ClipboardInvalidYaml { .. } => Some(
                "Make sure you copied the complete manifest, including apiVersion and kind".to_string(),
            ),
            ManifestError::ClipboardFileNotFound { .. } => {
                Some("Check the path for typos, or copy the manifest content instead".to_string())
            }
            ManifestError::ClipboardNotStackInput => Some(
                "Stack inputs have a top-level 'target' field. Drop -i to use a plain manifest"
                    .to_string(),
            ),
            ManifestError::NoManifestSource => {
                Some("project-planton plan -f manifest.yaml".to_string())
            }
            ManifestError::UnknownKind(_) => Some(
                "Check spelling and capitalization of 'kind', or upgrade: brew upgrade project-planton"
                    .to_string(),
            ),
            ManifestError::UnknownField {
                suggestion: Some(s),
                name,
                ..
            } => Some(format!("Did you mean '{}' instead of '{}'?", s, name)),
            ManifestError::InvalidOverride { .. } => Some(
                "Overrides use dotted paths, e.g. --set spec.instanceCount=3 --set metadata.labels.team=core"
                    .to_string(),
            ),
            _ => None,
        }
    }
}
