//! Stack input documents: `{target, provider_config}`.

use std::fs;
use std::path::{Path, PathBuf};

use planton_provider::write_private_file;
use serde_yaml::{Mapping, Value};

use crate::error::{ManifestError, ManifestResult};

/// A parsed stack input.
#[derive(Debug, Clone, PartialEq)]
pub struct StackInput {
    pub target: Value,
    pub provider_config: Option<Value>,
}

impl StackInput {
    pub fn load(path: &Path) -> ManifestResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            ManifestError::StackInputInvalid(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> ManifestResult<Self> {
        match serde_yaml::from_str::<Value>(text) {
            Ok(Value::Mapping(map)) => Self::from_mapping(map),
            Ok(_) => Err(ManifestError::StackInputInvalid(
                "expected a YAML mapping with a 'target' field".to_string(),
            )),
            Err(e) => Err(ManifestError::StackInputInvalid(e.to_string())),
        }
    }

    pub fn from_mapping(mut map: Mapping) -> ManifestResult<Self> {
        let target = map
            .remove("target")
            .ok_or_else(|| ManifestError::StackInputInvalid("missing top-level 'target' field".to_string()))?;
        if !target.is_mapping() {
            return Err(ManifestError::StackInputInvalid(
                "'target' must be a manifest mapping".to_string(),
            ));
        }

        let provider_config = map.remove("provider_config").filter(|v| !v.is_null());
        Ok(Self {
            target,
            provider_config,
        })
    }

    /// Write `target` to `<uuid>-manifest.yaml` under `dir`.
    pub fn write_target(&self, dir: &Path) -> ManifestResult<PathBuf> {
        let path = dir.join(format!("{}-manifest.yaml", uuid::Uuid::new_v4()));
        let yaml = serde_yaml::to_string(&self.target)?;
        write_private_file(&path, yaml.as_bytes())?;
        Ok(path)
    }
}
