//! Provider detection from a kind or raw manifest bytes.

use planton_provider::CloudProvider;
use serde_json::Value;

use crate::error::{ManifestError, ManifestResult};
use crate::loader::parse_yaml_tree;
use crate::registry::ResourceKind;

/// Provider and credential requirements of a resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionResult {
    pub kind: ResourceKind,
    pub provider: CloudProvider,
    pub requires_credentials: bool,
}

impl DetectionResult {
    pub fn for_kind(kind: ResourceKind) -> Self {
        let provider = kind.provider();
        Self {
            kind,
            provider,
            requires_credentials: provider.requires_credentials(),
        }
    }
}

/// Detect from a kind name.
pub fn detect_kind(kind: &str) -> ManifestResult<DetectionResult> {
    ResourceKind::from_str(kind)
        .map(DetectionResult::for_kind)
        .ok_or_else(|| ManifestError::UnknownKind(kind.to_string()))
}

/// Detect from manifest bytes, reading only the `kind` field.
///
/// Used to validate a provider config before the full manifest load.
pub fn detect_from_manifest(content: &[u8]) -> ManifestResult<DetectionResult> {
    let text = String::from_utf8_lossy(content);
    let tree = parse_yaml_tree(&text)?;
    let kind = match tree.get("kind") {
        Some(Value::String(kind)) => kind.trim().to_string(),
        _ => String::new(),
    };
    detect_kind(&kind)
}
