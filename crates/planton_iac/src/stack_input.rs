//! Stack input assembly: `{target, provider_config}` as YAML.

use std::path::{Path, PathBuf};

use planton_manifest::Manifest;
use planton_provider::write_private_file;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::IacResult;

/// Key whose values are always emitted double-quoted.
pub const SERVICE_ACCOUNT_KEY_FIELD: &str = "serviceAccountKeyBase64";

/// Environment variable the Pulumi modules read the stack input path from.
pub const STACK_INPUT_FILE_ENV: &str = "STACK_INPUT_FILE_PATH";

/// Serialize the stack input for `manifest` and an optional credential document.
pub fn build_stack_input_yaml(manifest: &Manifest, provider_config: Option<&Value>) -> IacResult<String> {
    let mut doc = Mapping::new();
    doc.insert(Value::from("target"), serde_yaml::to_value(manifest)?);
    if let Some(config) = provider_config {
        doc.insert(Value::from("provider_config"), config.clone());
    }
    render_with_quoted_keys(Value::Mapping(doc))
}

/// Write the stack input to a private `<uuid>-stack-input.yaml` under `dir`.
pub fn write_stack_input_file(dir: &Path, yaml: &str) -> IacResult<PathBuf> {
    let path = dir.join(format!("{}-stack-input.yaml", uuid::Uuid::new_v4()));
    write_private_file(&path, yaml.as_bytes())?;
    debug!("Wrote stack input {}", path.display());
    Ok(path)
}

/// Serialize `doc` with every `serviceAccountKeyBase64` string double-quoted.
///
/// Key values are swapped for unique plain tokens in the tree, so only real
/// mapping entries are touched; the tokens are then replaced in the text.
pub fn render_with_quoted_keys(mut doc: Value) -> IacResult<String> {
    let prefix = format!("plantonsakey{}x", uuid::Uuid::new_v4().simple());
    let mut keys = Vec::new();
    stash_keys(&mut doc, &prefix, &mut keys);

    let mut yaml = serde_yaml::to_string(&doc)?;
    // Highest index first so `...x1` never matches inside `...x10`.
    for (index, key) in keys.iter().enumerate().rev() {
        let token = format!("{}{}", prefix, index);
        yaml = yaml.replace(&token, &serde_json::to_string(key)?);
    }
    Ok(yaml)
}

fn stash_keys(value: &mut Value, prefix: &str, keys: &mut Vec<String>) {
    match value {
        Value::Mapping(map) => {
            for (k, v) in map.iter_mut() {
                if k.as_str() == Some(SERVICE_ACCOUNT_KEY_FIELD) {
                    if let Value::String(key) = v {
                        let token = format!("{}{}", prefix, keys.len());
                        keys.push(std::mem::replace(key, token));
                        continue;
                    }
                }
                stash_keys(v, prefix, keys);
            }
        }
        Value::Sequence(items) => {
            for item in items {
                stash_keys(item, prefix, keys);
            }
        }
        Value::Tagged(tagged) => stash_keys(&mut tagged.value, prefix, keys),
        _ => {}
    }
}
