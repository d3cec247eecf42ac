//! Backend configuration and layered merging.

use std::fmt;

use serde::Serialize;

use crate::error::{BackendError, BackendResult};

/// State backends supported by the HCL tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    Local,
    S3,
    Gcs,
    Azurerm,
}

impl BackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Local => "local",
            BackendType::S3 => "s3",
            BackendType::Gcs => "gcs",
            BackendType::Azurerm => "azurerm",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Some(BackendType::Local),
            "s3" => Some(BackendType::S3),
            "gcs" => Some(BackendType::Gcs),
            "azurerm" => Some(BackendType::Azurerm),
            _ => None,
        }
    }

    pub fn all() -> [BackendType; 4] {
        [
            BackendType::Local,
            BackendType::S3,
            BackendType::Gcs,
            BackendType::Azurerm,
        ]
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One layer of backend settings, or the merged result.
///
/// `None` and empty strings both mean "not set by this layer".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackendConfig {
    pub backend_type: Option<String>,
    pub bucket: Option<String>,
    pub key: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    /// Recomputed after every merge, see [`BackendConfig::is_s3_compatible`].
    pub s3_compatible: bool,
}

impl BackendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, backend_type: impl Into<String>) -> Self {
        self.backend_type = Some(backend_type.into());
        self.refresh();
        self
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self.refresh();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self.refresh();
        self
    }

    /// Merge layers from lowest to highest priority, field by field.
    pub fn layered<'a, I>(layers: I) -> Self
    where
        I: IntoIterator<Item = &'a BackendConfig>,
    {
        let mut merged = Self::default();
        for layer in layers {
            merged.overlay(layer);
        }
        merged
    }

    /// Override every field `other` sets.
    pub fn overlay(&mut self, other: &BackendConfig) {
        fn pick(target: &mut Option<String>, value: &Option<String>) {
            if let Some(v) = set(value) {
                *target = Some(v.to_string());
            }
        }

        pick(&mut self.backend_type, &other.backend_type);
        pick(&mut self.bucket, &other.bucket);
        pick(&mut self.key, &other.key);
        pick(&mut self.region, &other.region);
        pick(&mut self.endpoint, &other.endpoint);
        self.refresh();
    }

    /// Set a single field by its short name (`type`, `bucket`, `key`, `region`, `endpoint`).
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> bool {
        let value = Some(value.into());
        match name {
            "type" => self.backend_type = value,
            "bucket" => self.bucket = value,
            "key" => self.key = value,
            "region" => self.region = value,
            "endpoint" => self.endpoint = value,
            _ => return false,
        }
        self.refresh();
        true
    }

    pub fn type_str(&self) -> Option<&str> {
        set(&self.backend_type)
    }

    pub fn bucket(&self) -> Option<&str> {
        set(&self.bucket)
    }

    pub fn key(&self) -> Option<&str> {
        set(&self.key)
    }

    pub fn region(&self) -> Option<&str> {
        set(&self.region)
    }

    pub fn endpoint(&self) -> Option<&str> {
        set(&self.endpoint)
    }

    /// Parsed backend type; unset means local.
    pub fn resolved_type(&self) -> BackendResult<BackendType> {
        match self.type_str() {
            None => Ok(BackendType::Local),
            Some(t) => BackendType::from_str(t).ok_or_else(|| BackendError::BackendUnsupported(t.to_string())),
        }
    }

    /// `type=s3` with `region=auto` or a custom endpoint (R2, MinIO).
    pub fn is_s3_compatible(&self) -> bool {
        let is_s3 = self.type_str().and_then(BackendType::from_str) == Some(BackendType::S3);
        is_s3 && (self.region() == Some("auto") || self.endpoint().is_some())
    }

    /// Bucket or key set without a backend type.
    pub fn is_incomplete_without_type(&self) -> bool {
        self.type_str().is_none() && (self.bucket().is_some() || self.key().is_some())
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.type_str().is_none()
            && self.bucket().is_none()
            && self.key().is_none()
            && self.region().is_none()
            && self.endpoint().is_none()
    }

    fn refresh(&mut self) {
        self.s3_compatible = self.is_s3_compatible();
    }
}

fn set(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_type_parsing() {
        for t in BackendType::all() {
            assert_eq!(BackendType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(BackendType::from_str("S3"), Some(BackendType::S3));
        assert_eq!(BackendType::from_str("consul"), None);
    }

    #[test]
    fn test_overlay_is_field_by_field() {
        let env = BackendConfig::new()
            .with_type("s3")
            .with_bucket("env-bucket")
            .with_region("us-east-1");
        let labels = BackendConfig::new().with_bucket("label-bucket").with_key("a/b");
        let cli = BackendConfig::new().with_region("eu-west-1");

        let merged = BackendConfig::layered([&env, &labels, &cli]);
        assert_eq!(merged.type_str(), Some("s3"));
        assert_eq!(merged.bucket(), Some("label-bucket"));
        assert_eq!(merged.key(), Some("a/b"));
        assert_eq!(merged.region(), Some("eu-west-1"));
        assert!(!merged.s3_compatible);
    }

    #[test]
    fn test_empty_values_do_not_override() {
        let base = BackendConfig::new().with_bucket("keep");
        let blank = BackendConfig::new().with_bucket("  ");
        let merged = BackendConfig::layered([&base, &blank]);
        assert_eq!(merged.bucket(), Some("keep"));
    }

    #[test]
    fn test_s3_compatible_detection() {
        let r2 = BackendConfig::new().with_type("s3").with_region("auto");
        assert!(r2.s3_compatible);

        let minio = BackendConfig::new()
            .with_type("s3")
            .with_endpoint("http://localhost:9000");
        assert!(minio.s3_compatible);

        let aws = BackendConfig::new().with_type("s3").with_region("us-west-2");
        assert!(!aws.s3_compatible);

        let gcs = BackendConfig::new().with_type("gcs").with_endpoint("https://x");
        assert!(!gcs.s3_compatible);
    }

    #[test]
    fn test_resolved_type() {
        assert_eq!(BackendConfig::new().resolved_type().unwrap(), BackendType::Local);
        assert!(matches!(
            BackendConfig::new().with_type("consul").resolved_type(),
            Err(BackendError::BackendUnsupported(t)) if t == "consul"
        ));
    }

    #[test]
    fn test_incomplete_without_type() {
        assert!(BackendConfig::new().with_bucket("b").is_incomplete_without_type());
        assert!(!BackendConfig::new().is_incomplete_without_type());
        assert!(!BackendConfig::new()
            .with_type("gcs")
            .with_bucket("b")
            .is_incomplete_without_type());
    }

    #[test]
    fn test_set_field() {
        let mut config = BackendConfig::new().with_type("s3");
        assert!(config.set_field("region", "auto"));
        assert!(config.s3_compatible);
        assert!(!config.set_field("nonsense", "x"));
    }
}
