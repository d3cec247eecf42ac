//! Backend hints from manifest labels.
//!
//! Labels are keyed per provisioner (`tofu.project-planton.org/backend.type`).
//! When none of the provisioner's own type, bucket, key or object labels are
//! present, the legacy `terraform.` prefix is consulted instead.

use std::collections::BTreeMap;

use planton_manifest::{Manifest, Provisioner, API_DOMAIN};
use tracing::{debug, warn};

use crate::config::BackendConfig;

/// Prefix used by manifests written before per-provisioner labels existed.
pub const LEGACY_LABEL_PROVISIONER: &str = "terraform";

/// `<provisioner>.project-planton.org/backend.<field>`.
pub fn backend_label_key(provisioner: &str, field: &str) -> String {
    format!("{}.{}/backend.{}", provisioner, API_DOMAIN, field)
}

/// Label layer for `provisioner`, or `None` when the manifest has no backend labels.
pub fn from_manifest(manifest: &Manifest, provisioner: Provisioner) -> Option<BackendConfig> {
    from_labels(&manifest.metadata.labels, provisioner.as_str())
}

pub fn from_labels(labels: &BTreeMap<String, String>, provisioner: &str) -> Option<BackendConfig> {
    if let Some(config) = read_prefix(labels, provisioner) {
        return Some(config);
    }
    if provisioner != LEGACY_LABEL_PROVISIONER {
        if let Some(config) = read_prefix(labels, LEGACY_LABEL_PROVISIONER) {
            debug!("Using legacy terraform backend labels for {}", provisioner);
            return Some(config);
        }
    }
    None
}

fn read_prefix(labels: &BTreeMap<String, String>, provisioner: &str) -> Option<BackendConfig> {
    let get = |field: &str| {
        labels
            .get(&backend_label_key(provisioner, field))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let backend_type = get("type");
    let mut bucket = get("bucket");
    let mut key = get("key");
    let object = get("object");

    if backend_type.is_none() && bucket.is_none() && key.is_none() && object.is_none() {
        return None;
    }

    if let Some(object) = object {
        let (object_bucket, object_key) = split_object(&object);
        if object_bucket.is_none() {
            warn!("Backend object label '{}' has no bucket part", object);
        }
        bucket = bucket.or(object_bucket);
        key = key.or(object_key);
    }

    let mut config = BackendConfig {
        backend_type,
        bucket,
        key,
        region: get("region"),
        endpoint: get("endpoint"),
        s3_compatible: false,
    };
    config.s3_compatible = config.is_s3_compatible();
    Some(config)
}

/// Split `bucket/path/to/state` at the first `/`.
pub fn split_object(object: &str) -> (Option<String>, Option<String>) {
    let non_empty = |s: &str| Some(s.to_string()).filter(|s| !s.is_empty());
    match object.split_once('/') {
        Some((bucket, key)) => (non_empty(bucket), non_empty(key)),
        None => (None, non_empty(object)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_label_key() {
        assert_eq!(
            backend_label_key("tofu", "type"),
            "tofu.project-planton.org/backend.type"
        );
    }

    #[test]
    fn test_object_split() {
        assert_eq!(
            split_object("rbucket/env/prod.tfstate"),
            (Some("rbucket".to_string()), Some("env/prod.tfstate".to_string()))
        );
        assert_eq!(split_object("state.tfstate"), (None, Some("state.tfstate".to_string())));
    }

    #[test]
    fn test_provisioner_labels() {
        let l = labels(&[
            ("tofu.project-planton.org/backend.type", "s3"),
            ("tofu.project-planton.org/backend.object", "rbucket/env/prod.tfstate"),
        ]);
        let config = from_labels(&l, "tofu").unwrap();
        assert_eq!(config.type_str(), Some("s3"));
        assert_eq!(config.bucket(), Some("rbucket"));
        assert_eq!(config.key(), Some("env/prod.tfstate"));
    }

    #[test]
    fn test_explicit_key_beats_object() {
        let l = labels(&[
            ("tofu.project-planton.org/backend.object", "a/b"),
            ("tofu.project-planton.org/backend.key", "explicit"),
        ]);
        let config = from_labels(&l, "tofu").unwrap();
        assert_eq!(config.bucket(), Some("a"));
        assert_eq!(config.key(), Some("explicit"));
    }

    #[test]
    fn test_legacy_fallback() {
        let l = labels(&[
            ("terraform.project-planton.org/backend.type", "gcs"),
            ("terraform.project-planton.org/backend.object", "legacy/state"),
        ]);
        let config = from_labels(&l, "tofu").unwrap();
        assert_eq!(config.type_str(), Some("gcs"));
        assert_eq!(config.bucket(), Some("legacy"));
    }

    #[test]
    fn test_specific_labels_win_over_legacy() {
        let l = labels(&[
            ("tofu.project-planton.org/backend.type", "s3"),
            ("terraform.project-planton.org/backend.type", "gcs"),
        ]);
        assert_eq!(from_labels(&l, "tofu").unwrap().type_str(), Some("s3"));
    }

    #[test]
    fn test_no_backend_labels() {
        let l = labels(&[("team", "platform")]);
        assert!(from_labels(&l, "tofu").is_none());
        assert!(from_labels(&l, "terraform").is_none());
    }
}
