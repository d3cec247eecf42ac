//! In-memory resource manifest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ManifestResult;
use crate::registry::ResourceKind;

/// Resource metadata shared by every kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Metadata {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// A decoded manifest: envelope plus the kind-specific `spec` tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub api_version: String,
    pub kind: ResourceKind,
    pub metadata: Metadata,
    pub spec: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
}

impl Manifest {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Effective resource id: `metadata.id`, or `<prefix>-<name>`.
    pub fn resource_id(&self) -> String {
        match self.metadata.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => format!("{}-{}", self.kind.id_prefix(), self.metadata.name),
        }
    }

    /// JSON tree of the whole manifest.
    pub fn to_value(&self) -> ManifestResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_yaml(&self) -> ManifestResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest() -> Manifest {
        Manifest {
            api_version: "aws.project-planton.org/v1".to_string(),
            kind: ResourceKind::AwsS3Bucket,
            metadata: Metadata {
                name: "assets".to_string(),
                ..Default::default()
            },
            spec: json!({"awsRegion": "us-east-1"}).as_object().unwrap().clone(),
            status: None,
        }
    }

    #[test]
    fn test_resource_id_synthesized_from_prefix() {
        let mut m = manifest();
        assert_eq!(m.resource_id(), "s3bkt-assets");
        m.metadata.id = Some("s3bkt-custom".to_string());
        assert_eq!(m.resource_id(), "s3bkt-custom");
    }

    #[test]
    fn test_yaml_envelope() {
        let yaml = manifest().to_yaml().unwrap();
        assert!(yaml.contains("apiVersion: aws.project-planton.org/v1"));
        assert!(yaml.contains("kind: AwsS3Bucket"));
        assert!(yaml.contains("awsRegion: us-east-1"));
        assert!(!yaml.contains("status"));
        assert!(!yaml.contains("labels"));
    }

    #[test]
    fn test_blank_label_is_absent() {
        let mut m = manifest();
        m.metadata.labels.insert("a".to_string(), "  ".to_string());
        m.metadata.labels.insert("b".to_string(), "x".to_string());
        assert_eq!(m.metadata.label("a"), None);
        assert_eq!(m.metadata.label("b"), Some("x"));
    }
}
