//! Manifest loading: YAML parsing, kind lookup, strict decoding and defaults.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::defaults::apply_defaults;
use crate::error::{ManifestError, ManifestResult};
use crate::model::{Manifest, Metadata};
use crate::registry::ResourceKind;
use crate::schema::{describe_value, metadata_schema, FieldType, MessageSchema};
use crate::suggest::suggest_field;
use crate::validate::validate_manifest;

const ENVELOPE_FIELDS: &[&str] = &["apiVersion", "kind", "metadata", "spec", "status"];

/// Load a manifest file: decode strictly and apply schema defaults.
pub fn load_manifest(path: &Path) -> ManifestResult<Manifest> {
    let text = read_manifest_text(path)?;
    debug!("Loading manifest from {}", path.display());
    parse_manifest(&text)
}

/// Load a manifest file and run semantic validation.
pub fn load_validated_manifest(path: &Path) -> ManifestResult<Manifest> {
    let manifest = load_manifest(path)?;
    validate_manifest(&manifest)?;
    Ok(manifest)
}

/// Decode manifest YAML text.
pub fn parse_manifest(text: &str) -> ManifestResult<Manifest> {
    let value = parse_yaml_tree(text)?;
    decode_manifest(value, Some(text))
}

/// Decode an already-parsed manifest tree.
///
/// `source` is the original text, used to report line and column of
/// unknown fields when available.
pub fn decode_manifest(value: Value, source: Option<&str>) -> ManifestResult<Manifest> {
    let mut root = match value {
        Value::Object(map) => map,
        Value::Null => {
            return Err(ManifestError::MalformedYaml {
                message: "manifest is empty".to_string(),
                line: None,
                column: None,
            })
        }
        other => {
            return Err(ManifestError::MalformedYaml {
                message: format!(
                    "expected a mapping at the document root, found {}",
                    describe_value(&other)
                ),
                line: None,
                column: None,
            })
        }
    };

    for key in root.keys() {
        if !ENVELOPE_FIELDS.contains(&key.as_str()) {
            return Err(unknown_field(key, "", ENVELOPE_FIELDS, source));
        }
    }

    let kind = resolve_kind(&root)?;
    let expected = kind.api_version();
    let api_version = match root.get("apiVersion") {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };
    if api_version != expected {
        return Err(ManifestError::UnsupportedApiVersion {
            kind: kind.to_string(),
            expected,
            found: if api_version.is_empty() {
                "<missing>".to_string()
            } else {
                api_version
            },
        });
    }

    let mut metadata = take_object(&mut root, "metadata")?;
    strip_nulls(&mut metadata);
    check_message(&metadata_schema(), &metadata, "metadata", source)?;
    let metadata: Metadata = serde_json::from_value(Value::Object(metadata))?;

    let mut spec = take_object(&mut root, "spec")?;
    strip_nulls(&mut spec);
    let schema = kind.spec_schema();
    check_message(schema, &spec, "spec", source)?;
    apply_defaults(schema, &mut spec);

    let status = root.remove("status").filter(|v| !v.is_null());

    Ok(Manifest {
        api_version: expected,
        kind,
        metadata,
        spec,
        status,
    })
}

/// Write a manifest back to disk as YAML.
pub fn write_manifest(manifest: &Manifest, path: &Path) -> ManifestResult<()> {
    fs::write(path, manifest.to_yaml()?)?;
    Ok(())
}

pub(crate) fn read_manifest_text(path: &Path) -> ManifestResult<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ManifestError::ManifestPathInvalid(format!(
            "manifest file not found: {}",
            path.display()
        )),
        _ => ManifestError::Io(e),
    })
}

/// Parse YAML into a JSON-equivalent tree, keeping error locations.
pub fn parse_yaml_tree(text: &str) -> ManifestResult<Value> {
    serde_yaml::from_str::<Value>(text).map_err(|e| {
        let location = e.location();
        ManifestError::MalformedYaml {
            message: e.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    })
}

fn resolve_kind(root: &Map<String, Value>) -> ManifestResult<ResourceKind> {
    let name = match root.get("kind") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => {
            return Err(ManifestError::InvalidFieldType {
                path: "kind".to_string(),
                expected: "string".to_string(),
                found: describe_value(other).to_string(),
            })
        }
    };
    ResourceKind::from_str(&name).ok_or(ManifestError::UnknownKind(name))
}

fn take_object(root: &mut Map<String, Value>, key: &str) -> ManifestResult<Map<String, Value>> {
    match root.remove(key) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(ManifestError::InvalidFieldType {
            path: key.to_string(),
            expected: "object".to_string(),
            found: describe_value(&other).to_string(),
        }),
    }
}

/// Remove `null` entries recursively; an explicit null means "unset".
fn strip_nulls(obj: &mut Map<String, Value>) {
    obj.retain(|_, v| !v.is_null());
    for value in obj.values_mut() {
        match value {
            Value::Object(child) => strip_nulls(child),
            Value::Array(items) => {
                for child in items.iter_mut().filter_map(Value::as_object_mut) {
                    strip_nulls(child);
                }
            }
            _ => {}
        }
    }
}

fn check_message(
    schema: &MessageSchema,
    obj: &Map<String, Value>,
    path: &str,
    source: Option<&str>,
) -> ManifestResult<()> {
    for (key, value) in obj {
        let field = schema
            .get(key)
            .ok_or_else(|| unknown_field(key, path, &schema.field_names(), source))?;
        check_value(&field.ty, value, &join(path, key), source)?;
    }
    Ok(())
}

fn check_value(ty: &FieldType, value: &Value, path: &str, source: Option<&str>) -> ManifestResult<()> {
    let mismatch = || ManifestError::InvalidFieldType {
        path: path.to_string(),
        expected: ty.describe(),
        found: describe_value(value).to_string(),
    };

    match ty {
        FieldType::String if value.is_string() => Ok(()),
        FieldType::Int if value.is_i64() || value.is_u64() => Ok(()),
        FieldType::Float if value.is_number() => Ok(()),
        FieldType::Bool if value.is_boolean() => Ok(()),
        FieldType::Enum(values) => match value.as_str() {
            Some(s) if values.contains(&s) => Ok(()),
            Some(s) => Err(ManifestError::InvalidFieldType {
                path: path.to_string(),
                expected: ty.describe(),
                found: format!("'{}'", s),
            }),
            None => Err(mismatch()),
        },
        FieldType::StringMap => {
            let map = value.as_object().ok_or_else(mismatch)?;
            for (key, entry) in map {
                if !entry.is_string() {
                    return Err(ManifestError::InvalidFieldType {
                        path: join(path, key),
                        expected: "string".to_string(),
                        found: describe_value(entry).to_string(),
                    });
                }
            }
            Ok(())
        }
        FieldType::List(item) => {
            let items = value.as_array().ok_or_else(mismatch)?;
            for (i, entry) in items.iter().enumerate() {
                check_value(item, entry, &format!("{}[{}]", path, i), source)?;
            }
            Ok(())
        }
        FieldType::Message(inner) => {
            let obj = value.as_object().ok_or_else(mismatch)?;
            check_message(inner, obj, path, source)
        }
        _ => Err(mismatch()),
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn unknown_field(name: &str, path: &str, candidates: &[&str], source: Option<&str>) -> ManifestError {
    let location = source.and_then(|text| locate_key(text, name));
    ManifestError::UnknownField {
        name: name.to_string(),
        path: if path.is_empty() {
            "<root>".to_string()
        } else {
            path.to_string()
        },
        suggestion: suggest_field(name, candidates),
        line: location.map(|(line, _)| line),
        column: location.map(|(_, column)| column),
    }
}

/// 1-based line and column of the first mapping key named `key`.
pub fn locate_key(text: &str, key: &str) -> Option<(usize, usize)> {
    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim_start();
        let entry = trimmed.strip_prefix("- ").unwrap_or(trimmed);
        let rest = entry
            .strip_prefix(key)
            .or_else(|| entry.strip_prefix(&format!("\"{}\"", key)))
            .or_else(|| entry.strip_prefix(&format!("'{}'", key)));
        if let Some(rest) = rest {
            if rest.trim_start().starts_with(':') {
                let column = line.len() - entry.len() + 1;
                return Some((i + 1, column));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOCDB: &str = r#"apiVersion: aws.project-planton.org/v1
kind: AwsDocumentDb
metadata:
  name: ddb1
spec:
  masterPassword: "Pw!"
  subnets:
    - value: subnet-a
    - value: subnet-b
  skipFinalSnapshot: true
"#;

    #[test]
    fn test_parse_applies_defaults() {
        let manifest = parse_manifest(DOCDB).unwrap();
        assert_eq!(manifest.kind, ResourceKind::AwsDocumentDb);
        assert_eq!(manifest.metadata.name, "ddb1");
        assert_eq!(manifest.spec["port"], json!(27017));
        assert_eq!(manifest.spec["engineVersion"], json!("5.0.0"));
        assert!(manifest.spec.get("kmsKey").is_none());
    }

    #[test]
    fn test_unknown_top_level_field() {
        let text = DOCDB.replace("spec:", "spc:");
        match parse_manifest(&text).unwrap_err() {
            ManifestError::UnknownField {
                name,
                suggestion,
                line,
                column,
                ..
            } => {
                assert_eq!(name, "spc");
                assert_eq!(suggestion.as_deref(), Some("spec"));
                assert_eq!(line, Some(5));
                assert_eq!(column, Some(1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_nested_field() {
        let text = DOCDB.replace("masterPassword", "masterPasword");
        match parse_manifest(&text).unwrap_err() {
            ManifestError::UnknownField {
                path, suggestion, line, column, ..
            } => {
                assert_eq!(path, "spec");
                assert_eq!(suggestion.as_deref(), Some("masterPassword"));
                assert_eq!(line, Some(6));
                assert_eq!(column, Some(3));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind() {
        let text = DOCDB.replace("AwsDocumentDb", "AwsDocumentDB");
        assert!(matches!(
            parse_manifest(&text),
            Err(ManifestError::UnknownKind(k)) if k == "AwsDocumentDB"
        ));
    }

    #[test]
    fn test_wrong_api_version() {
        let text = DOCDB.replace("aws.project-planton.org", "gcp.project-planton.org");
        assert!(matches!(
            parse_manifest(&text),
            Err(ManifestError::UnsupportedApiVersion { .. })
        ));
    }

    #[test]
    fn test_malformed_yaml_has_location() {
        let err = parse_manifest("kind: [unclosed\n").unwrap_err();
        match err {
            ManifestError::MalformedYaml { line, .. } => assert!(line.is_some()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_type_mismatch() {
        let text = DOCDB.replace("skipFinalSnapshot: true", "skipFinalSnapshot: yes please");
        match parse_manifest(&text).unwrap_err() {
            ManifestError::InvalidFieldType { path, expected, .. } => {
                assert_eq!(path, "spec.skipFinalSnapshot");
                assert_eq!(expected, "boolean");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_enum_value_checked() {
        let text = format!("{}  enabledCloudwatchLogsExports: [audit, slowquery]\n", DOCDB);
        assert!(matches!(
            parse_manifest(&text),
            Err(ManifestError::InvalidFieldType { found, .. }) if found == "'slowquery'"
        ));
    }

    #[test]
    fn test_nulls_mean_unset() {
        let text = format!("{}  port: null\n", DOCDB);
        let manifest = parse_manifest(&text).unwrap();
        assert_eq!(manifest.spec["port"], json!(27017));
    }

    #[test]
    fn test_locate_key() {
        let text = "a: 1\nlist:\n  - name: x\n    spc: 2\n";
        assert_eq!(locate_key(text, "name"), Some((3, 5)));
        assert_eq!(locate_key(text, "spc"), Some((4, 5)));
        assert_eq!(locate_key(text, "missing"), None);
    }
}
