//! Presentation events emitted at stage boundaries.
//!
//! The engine reports progress through a [`Presenter`]; events never change
//! what the engine does.

use std::path::PathBuf;

use parking_lot::Mutex;
use planton_backend::{BackendConfig, BackendError, BackendResult, ValidationResult};
use planton_manifest::Provisioner;
use planton_provider::CloudProvider;
use serde::Serialize;

use crate::error::IacResult;

/// Why a backend was treated as S3-compatible.
pub const S3_REASON_AUTO_REGION: &str = "Region is set to 'auto', indicating an S3-compatible backend";
pub const S3_REASON_ENDPOINT: &str = "Custom endpoint detected";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PresentationEvent {
    ManifestLoaded {
        path: PathBuf,
        kind: String,
        name: String,
    },
    OverridesApplied {
        count: usize,
    },
    Validated,
    ProvisionerDetected {
        provisioner: Provisioner,
        /// False when the provisioner came from a flag or a prompt.
        from_label: bool,
    },
    KubeContextSelected {
        context: String,
    },
    ProviderDetected {
        kind: String,
        provider: CloudProvider,
        requires_credentials: bool,
    },
    CredentialsLoaded {
        provider: CloudProvider,
        /// Environment variable names exported to the tool.
        variables: Vec<String>,
    },
    /// Bucket or key given without a backend type.
    BackendIncomplete,
    S3CompatibleDetected {
        reason: &'static str,
    },
    BackendFieldsMissing {
        validation: ValidationResult,
    },
    BackendResolved {
        config: BackendConfig,
    },
    ExecutionPrepared {
        resource_id: String,
        module_dir: PathBuf,
    },
    Handoff {
        tool: &'static str,
    },
    ToolCompleted {
        tool: &'static str,
        success: bool,
    },
}

impl PresentationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PresentationEvent::ManifestLoaded { .. } => "manifest_loaded",
            PresentationEvent::OverridesApplied { .. } => "overrides_applied",
            PresentationEvent::Validated => "validated",
            PresentationEvent::ProvisionerDetected { .. } => "provisioner_detected",
            PresentationEvent::KubeContextSelected { .. } => "kube_context_selected",
            PresentationEvent::ProviderDetected { .. } => "provider_detected",
            PresentationEvent::CredentialsLoaded { .. } => "credentials_loaded",
            PresentationEvent::BackendIncomplete => "backend_incomplete",
            PresentationEvent::S3CompatibleDetected { .. } => "s3_compatible_detected",
            PresentationEvent::BackendFieldsMissing { .. } => "backend_fields_missing",
            PresentationEvent::BackendResolved { .. } => "backend_resolved",
            PresentationEvent::ExecutionPrepared { .. } => "execution_prepared",
            PresentationEvent::Handoff { .. } => "handoff",
            PresentationEvent::ToolCompleted { .. } => "tool_completed",
        }
    }
}

/// Receives events and answers the engine's interactive questions.
pub trait Presenter: Send + Sync {
    fn event(&self, event: &PresentationEvent);

    /// Whether prompts may be shown.
    fn is_interactive(&self) -> bool {
        false
    }

    /// Ask for a provisioner when the manifest names none.
    fn choose_provisioner(&self) -> IacResult<Option<Provisioner>> {
        Ok(None)
    }

    /// Fill missing backend fields.
    fn prompt_backend(
        &self,
        config: &mut BackendConfig,
        validation: &ValidationResult,
    ) -> BackendResult<()> {
        let _ = config;
        Err(BackendError::BackendIncomplete(validation.clone()))
    }
}

/// Discards every event and never prompts.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPresenter;

impl Presenter for SilentPresenter {
    fn event(&self, _event: &PresentationEvent) {}
}

/// Keeps every event, optionally answering the provisioner prompt.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PresentationEvent>>,
    provisioner_answer: Option<Provisioner>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behave as an interactive terminal that picks `provisioner`.
    pub fn answering(provisioner: Provisioner) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            provisioner_answer: Some(provisioner),
        }
    }

    pub fn events(&self) -> Vec<PresentationEvent> {
        self.events.lock().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(PresentationEvent::name).collect()
    }
}

impl Presenter for RecordingPresenter {
    fn event(&self, event: &PresentationEvent) {
        self.events.lock().push(event.clone());
    }

    fn is_interactive(&self) -> bool {
        self.provisioner_answer.is_some()
    }

    fn choose_provisioner(&self) -> IacResult<Option<Provisioner>> {
        Ok(self.provisioner_answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_keeps_order() {
        let presenter = RecordingPresenter::new();
        presenter.event(&PresentationEvent::Validated);
        presenter.event(&PresentationEvent::Handoff { tool: "OpenTofu" });
        assert_eq!(presenter.names(), vec!["validated", "handoff"]);
        assert!(!presenter.is_interactive());
    }

    #[test]
    fn test_default_backend_prompt_refuses() {
        let presenter = SilentPresenter;
        let mut config = BackendConfig::new().with_type("gcs");
        let validation = planton_backend::validate_backend(&config, "tofu").unwrap();
        let err = presenter.prompt_backend(&mut config, &validation).unwrap_err();
        assert!(matches!(err, BackendError::BackendIncomplete(_)));
    }

    #[test]
    fn test_answering_presenter() {
        let presenter = RecordingPresenter::answering(Provisioner::Pulumi);
        assert!(presenter.is_interactive());
        assert_eq!(presenter.choose_provisioner().unwrap(), Some(Provisioner::Pulumi));
    }
}
