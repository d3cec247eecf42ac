//! Per-backend required field checks.

use serde::Serialize;

use crate::config::{BackendConfig, BackendType};
use crate::env::{ENV_BACKEND_BUCKET, ENV_BACKEND_ENDPOINT, ENV_BACKEND_REGION};
use crate::error::{BackendError, BackendResult};
use crate::labels::backend_label_key;

/// A required backend field that no layer supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingField {
    /// Short name: `bucket`, `key`, `region` or `endpoint`
    pub name: &'static str,
    pub flag_name: &'static str,
    /// Environment variable that can supply it; the key has none
    pub env_var_name: Option<&'static str>,
    pub label_name: String,
    pub description: &'static str,
    pub example: &'static str,
    pub required: bool,
}

/// Outcome of backend validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub backend_type: String,
    pub missing_fields: Vec<MissingField>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn new(backend_type: BackendType) -> Self {
        Self {
            valid: true,
            backend_type: backend_type.as_str().to_string(),
            missing_fields: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn missing(&mut self, field: MissingField) {
        self.valid = false;
        self.missing_fields.push(field);
    }

    pub fn missing_names(&self) -> Vec<&'static str> {
        self.missing_fields.iter().map(|f| f.name).collect()
    }

    /// `Ok(())` when valid, `BackendIncomplete` otherwise.
    pub fn into_result(self) -> BackendResult<()> {
        if self.valid {
            Ok(())
        } else {
            Err(BackendError::BackendIncomplete(self))
        }
    }
}

/// Check that every field the backend type needs is set.
///
/// `label_provisioner` names the label prefix shown in guidance. An unknown
/// backend type fails immediately with [`BackendError::BackendUnsupported`].
pub fn validate_backend(config: &BackendConfig, label_provisioner: &str) -> BackendResult<ValidationResult> {
    let backend_type = config.resolved_type()?;
    let mut result = ValidationResult::new(backend_type);
    let field = |name: &'static str| {
        let mut f = field_guidance(name, backend_type);
        f.label_name = backend_label_key(label_provisioner, name);
        f
    };

    match backend_type {
        BackendType::Local => {}
        BackendType::S3 => {
            if config.bucket().is_none() {
                result.missing(field("bucket"));
            }
            if config.key().is_none() {
                result.missing(field("key"));
            }
            if config.region().is_none() {
                result.missing(field("region"));
            }
            if config.region() == Some("auto") && config.endpoint().is_none() {
                result.missing(field("endpoint"));
                result.warnings.push(
                    "Detected S3-compatible backend (region=auto). An endpoint is required for R2, MinIO and similar stores."
                        .to_string(),
                );
            }
        }
        BackendType::Gcs | BackendType::Azurerm => {
            if config.bucket().is_none() {
                result.missing(field("bucket"));
            }
            if config.key().is_none() {
                result.missing(field("key"));
            }
        }
    }

    Ok(result)
}

fn field_guidance(name: &'static str, backend_type: BackendType) -> MissingField {
    let (flag_name, env_var_name, description, example) = match (name, backend_type) {
        ("bucket", BackendType::Gcs) => (
            "--backend-bucket",
            Some(ENV_BACKEND_BUCKET),
            "GCS bucket name for state storage",
            "my-terraform-state",
        ),
        ("bucket", BackendType::Azurerm) => (
            "--backend-bucket",
            Some(ENV_BACKEND_BUCKET),
            "Azure Storage container name for state storage",
            "tfstate",
        ),
        ("bucket", _) => (
            "--backend-bucket",
            Some(ENV_BACKEND_BUCKET),
            "S3 bucket name for state storage",
            "my-terraform-state-bucket",
        ),
        ("key", BackendType::Gcs) => (
            "--backend-key",
            None,
            "Prefix path for state files within the bucket",
            "terraform/state",
        ),
        ("key", BackendType::Azurerm) => (
            "--backend-key",
            None,
            "State file blob name",
            "prod.terraform.tfstate",
        ),
        ("key", _) => (
            "--backend-key",
            None,
            "Path to the state file within the bucket",
            "env/prod/terraform.tfstate",
        ),
        ("region", _) => (
            "--backend-region",
            Some(ENV_BACKEND_REGION),
            "AWS region (use 'auto' for S3-compatible backends like R2)",
            "us-west-2",
        ),
        (_, _) => (
            "--backend-endpoint",
            Some(ENV_BACKEND_ENDPOINT),
            "Custom S3-compatible endpoint (required when region is 'auto')",
            "https://<account-id>.r2.cloudflarestorage.com",
        ),
    };

    MissingField {
        name,
        flag_name,
        env_var_name,
        label_name: String::new(),
        description,
        example,
        required: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_needs_nothing() {
        let result = validate_backend(&BackendConfig::new(), "tofu").unwrap();
        assert!(result.valid);
        assert_eq!(result.backend_type, "local");
        assert!(validate_backend(&BackendConfig::new().with_type("local"), "tofu")
            .unwrap()
            .valid);
    }

    #[test]
    fn test_s3_required_fields() {
        let result = validate_backend(&BackendConfig::new().with_type("s3"), "tofu").unwrap();
        assert!(!result.valid);
        assert_eq!(result.missing_names(), vec!["bucket", "key", "region"]);

        let key = &result.missing_fields[1];
        assert_eq!(key.env_var_name, None);
        assert_eq!(key.label_name, "tofu.project-planton.org/backend.key");
    }

    #[test]
    fn test_s3_auto_region_needs_endpoint() {
        let config = BackendConfig::new()
            .with_type("s3")
            .with_bucket("b")
            .with_key("k")
            .with_region("auto")
            .with_endpoint("");
        let result = validate_backend(&config, "tofu").unwrap();
        assert_eq!(result.missing_names(), vec!["endpoint"]);
        assert_eq!(result.warnings.len(), 1);

        let config = config.with_endpoint("https://host");
        let result = validate_backend(&config, "tofu").unwrap();
        assert!(result.valid);
        assert!(config.s3_compatible);
    }

    #[test]
    fn test_gcs_and_azurerm() {
        let gcs = BackendConfig::new().with_type("gcs").with_bucket("b");
        assert_eq!(
            validate_backend(&gcs, "terraform").unwrap().missing_names(),
            vec!["key"]
        );

        let azure = BackendConfig::new().with_type("azurerm").with_key("k");
        let result = validate_backend(&azure, "terraform").unwrap();
        assert_eq!(result.missing_names(), vec!["bucket"]);
        assert!(result.missing_fields[0].description.contains("container"));
    }

    #[test]
    fn test_unknown_type() {
        let err = validate_backend(&BackendConfig::new().with_type("consul"), "tofu").unwrap_err();
        assert!(matches!(err, BackendError::BackendUnsupported(_)));
    }

    #[test]
    fn test_into_result() {
        let result = validate_backend(&BackendConfig::new().with_type("gcs"), "tofu").unwrap();
        match result.into_result() {
            Err(BackendError::BackendIncomplete(r)) => assert_eq!(r.missing_names(), vec!["bucket", "key"]),
            other => panic!("unexpected {:?}", other),
        }
    }
}
