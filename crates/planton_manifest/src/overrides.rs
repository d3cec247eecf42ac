//! `--set key=value` field overrides.

use std::path::{Path, PathBuf};

use planton_provider::write_private_file;
use serde_json::{Map, Number, Value};
use tracing::{debug, info};

use crate::error::{ManifestError, ManifestResult};
use crate::loader::{decode_manifest, load_manifest};
use crate::model::Manifest;
use crate::schema::{metadata_schema, FieldType, MessageSchema};

/// A parsed `path=value` override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOverride {
    pub path: String,
    pub value: String,
}

impl FieldOverride {
    /// Parse `spec.instanceCount=3`. The value may itself contain `=`.
    pub fn parse(raw: &str) -> ManifestResult<Self> {
        let (path, value) = raw.split_once('=').ok_or_else(|| ManifestError::InvalidOverride {
            key: raw.to_string(),
            message: "expected key=value".to_string(),
        })?;
        let path = path.trim();
        if path.is_empty() {
            return Err(ManifestError::InvalidOverride {
                key: raw.to_string(),
                message: "key is empty".to_string(),
            });
        }
        Ok(Self {
            path: path.to_string(),
            value: value.to_string(),
        })
    }

    pub fn parse_all(raw: &[String]) -> ManifestResult<Vec<Self>> {
        raw.iter().map(|r| Self::parse(r)).collect()
    }
}

/// Apply overrides to a manifest, returning the re-decoded result.
///
/// Applying the same overrides twice yields the same manifest.
pub fn apply_overrides(manifest: &Manifest, overrides: &[FieldOverride]) -> ManifestResult<Manifest> {
    let mut tree = manifest.to_value()?;
    let root = tree.as_object_mut().ok_or_else(|| ManifestError::InvalidOverride {
        key: String::new(),
        message: "manifest is not an object".to_string(),
    })?;

    for ov in overrides {
        apply_one(root, manifest, ov)?;
        debug!("Applied override {}", ov.path);
    }

    decode_manifest(tree, None)
}

/// Apply overrides to the manifest at `path`.
///
/// Without overrides the input path is returned untouched. Otherwise the
/// result is written to `<uuid>-overrides-manifest.yaml` in `temp_dir` and
/// the boolean is true, marking the file for cleanup.
pub fn apply_overrides_to_file(
    path: &Path,
    overrides: &[FieldOverride],
    temp_dir: &Path,
) -> ManifestResult<(PathBuf, bool)> {
    if overrides.is_empty() {
        return Ok((path.to_path_buf(), false));
    }

    let manifest = load_manifest(path)?;
    let updated = apply_overrides(&manifest, overrides)?;

    let target = temp_dir.join(format!("{}-overrides-manifest.yaml", uuid::Uuid::new_v4()));
    write_private_file(&target, updated.to_yaml()?.as_bytes())?;
    info!(
        "Applied {} override(s), wrote {}",
        overrides.len(),
        target.display()
    );
    Ok((target, true))
}

fn apply_one(root: &mut Map<String, Value>, manifest: &Manifest, ov: &FieldOverride) -> ManifestResult<()> {
    let segments: Vec<&str> = ov.path.split('.').collect();
    let invalid = |message: String| ManifestError::InvalidOverride {
        key: ov.path.clone(),
        message,
    };

    let schema = match segments[0] {
        "metadata" => metadata_schema(),
        "spec" => manifest.kind.spec_schema().clone(),
        other => {
            return Err(invalid(format!(
                "overrides must start with 'metadata.' or 'spec.', found '{}'",
                other
            )))
        }
    };
    if segments.len() < 2 {
        return Err(invalid("path names a whole section".to_string()));
    }

    let section = root
        .entry(segments[0].to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    let section = section
        .as_object_mut()
        .ok_or_else(|| invalid(format!("'{}' is not an object", segments[0])))?;

    set_in_message(&schema, section, &segments[1..], &ov.value).map_err(invalid)
}

fn set_in_message(
    schema: &MessageSchema,
    obj: &mut Map<String, Value>,
    segments: &[&str],
    raw: &str,
) -> Result<(), String> {
    let name = segments[0];
    let rest = &segments[1..];
    let field = schema
        .get(name)
        .ok_or_else(|| format!("unknown field '{}' in {}", name, schema.name))?;

    match &field.ty {
        FieldType::StringMap => {
            if rest.is_empty() {
                return Err(format!("'{}' is a map; add a key, e.g. {}.team", name, name));
            }
            // Map keys may contain dots (label domains), so the key is the
            // remainder of the path.
            let key = rest.join(".");
            let map = obj
                .entry(name.to_string())
                .or_insert_with(|| Value::Object(Map::new()))
                .as_object_mut()
                .ok_or_else(|| format!("'{}' is not a map", name))?;
            map.insert(key, Value::String(raw.to_string()));
            Ok(())
        }
        FieldType::Message(inner) => {
            if rest.is_empty() {
                return Err(format!("'{}' is an object; set one of its fields", name));
            }
            let child = obj
                .entry(name.to_string())
                .or_insert_with(|| Value::Object(Map::new()))
                .as_object_mut()
                .ok_or_else(|| format!("'{}' is not an object", name))?;
            set_in_message(inner, child, rest, raw)
        }
        FieldType::List(item) => {
            let index: usize = rest
                .first()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| format!("'{}' is a list; address an item by index, e.g. {}.0", name, name))?;
            let items = obj
                .entry(name.to_string())
                .or_insert_with(|| Value::Array(Vec::new()))
                .as_array_mut()
                .ok_or_else(|| format!("'{}' is not a list", name))?;
            if index > items.len() {
                return Err(format!(
                    "index {} is out of range for '{}' ({} item(s))",
                    index,
                    name,
                    items.len()
                ));
            }

            let after = &rest[1..];
            match item.as_ref() {
                FieldType::Message(inner) => {
                    if after.is_empty() {
                        return Err(format!("'{}.{}' is an object; set one of its fields", name, index));
                    }
                    if index == items.len() {
                        items.push(Value::Object(Map::new()));
                    }
                    let child = items[index]
                        .as_object_mut()
                        .ok_or_else(|| format!("'{}.{}' is not an object", name, index))?;
                    set_in_message(inner, child, after, raw)
                }
                scalar => {
                    if !after.is_empty() {
                        return Err(format!("'{}.{}' has no fields", name, index));
                    }
                    let value = coerce(scalar, raw)?;
                    if index == items.len() {
                        items.push(value);
                    } else {
                        items[index] = value;
                    }
                    Ok(())
                }
            }
        }
        scalar => {
            if !rest.is_empty() {
                return Err(format!("'{}' has no fields", name));
            }
            obj.insert(name.to_string(), coerce(scalar, raw)?);
            Ok(())
        }
    }
}

/// Convert a raw override string to the field's scalar type.
fn coerce(ty: &FieldType, raw: &str) -> Result<Value, String> {
    match ty {
        FieldType::String => Ok(Value::String(raw.to_string())),
        FieldType::Int => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("'{}' is not an integer", raw)),
        FieldType::Float => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("'{}' is not a number", raw)),
        FieldType::Bool => match raw.trim().to_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(format!("'{}' is not a boolean (true or false)", raw)),
        },
        FieldType::Enum(values) => {
            if values.contains(&raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(format!("'{}' must be {}", raw, ty.describe()))
            }
        }
        other => Err(format!("cannot assign a value to a {}", other.describe())),
    }
}
