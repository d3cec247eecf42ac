//! Layered resolution: environment < manifest labels < CLI flags.

use planton_manifest::{Manifest, Provisioner};
use tracing::{debug, info};

use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};
use crate::labels;
use crate::validate::{validate_backend, ValidationResult};

/// Merged backend settings together with their validation outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBackend {
    pub config: BackendConfig,
    pub validation: ValidationResult,
    /// Label prefix used for guidance (`tofu` or `terraform`).
    pub label_provisioner: String,
}

impl ResolvedBackend {
    pub fn is_valid(&self) -> bool {
        self.validation.valid
    }

    /// Fill missing fields through `prompt` when interactive, otherwise fail.
    ///
    /// Validation is re-run after prompting.
    pub fn complete<P>(mut self, interactive: bool, prompt: P) -> BackendResult<Self>
    where
        P: FnOnce(&mut BackendConfig, &ValidationResult) -> BackendResult<()>,
    {
        if self.validation.valid {
            return Ok(self);
        }
        if !interactive {
            return Err(BackendError::BackendIncomplete(self.validation));
        }

        prompt(&mut self.config, &self.validation)?;
        self.validation = validate_backend(&self.config, &self.label_provisioner)?;
        if self.validation.valid {
            Ok(self)
        } else {
            Err(BackendError::BackendIncomplete(self.validation))
        }
    }
}

/// Merge the three layers and validate the result.
pub fn resolve_backend(
    manifest: &Manifest,
    provisioner: Provisioner,
    env_layer: &BackendConfig,
    cli_layer: &BackendConfig,
) -> BackendResult<ResolvedBackend> {
    let label_layer = labels::from_manifest(manifest, provisioner).unwrap_or_default();
    debug!(
        "Backend layers: env set={}, labels set={}, flags set={}",
        !env_layer.is_empty(),
        !label_layer.is_empty(),
        !cli_layer.is_empty()
    );

    let config = BackendConfig::layered([env_layer, &label_layer, cli_layer]);
    let validation = validate_backend(&config, provisioner.as_str())?;
    if let Some(t) = config.type_str() {
        info!("Resolved {} backend (s3-compatible: {})", t, config.s3_compatible);
    }

    Ok(ResolvedBackend {
        config,
        validation,
        label_provisioner: provisioner.as_str().to_string(),
    })
}
