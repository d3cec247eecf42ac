//! HCL variable file rendering for the Terraform and OpenTofu modules.

use std::path::{Path, PathBuf};

use planton_manifest::schema::{metadata_schema, FieldType, MessageSchema};
use planton_manifest::Manifest;
use planton_provider::write_private_file;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::IacResult;

pub const TFVARS_FILE_NAME: &str = "terraform.tfvars";
/// Hidden state directory inside the module.
pub const TF_STATE_DIR: &str = ".terraform";
/// Plan output written by `plan`.
pub const PLAN_FILE_NAME: &str = "terraform.tfplan";

/// `<module>/.terraform/terraform.tfvars`
pub fn tfvars_path(module_dir: &Path) -> PathBuf {
    module_dir.join(TF_STATE_DIR).join(TFVARS_FILE_NAME)
}

/// Render `metadata = {...}` and `spec = {...}` for a manifest.
pub fn render_tfvars(manifest: &Manifest) -> IacResult<String> {
    let metadata = match serde_json::to_value(&manifest.metadata)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let mut out = String::new();
    out.push_str("metadata = ");
    render_message(&mut out, Some(&metadata_schema()), &metadata, 0);
    out.push_str("\n\nspec = ");
    render_message(&mut out, Some(manifest.kind.spec_schema()), &manifest.spec, 0);
    out.push('\n');
    Ok(out)
}

/// Render and write the tfvars file, returning its path.
pub fn write_tfvars(module_dir: &Path, manifest: &Manifest) -> IacResult<PathBuf> {
    let path = tfvars_path(module_dir);
    write_private_file(&path, render_tfvars(manifest)?.as_bytes())?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

fn render_message(out: &mut String, schema: Option<&MessageSchema>, map: &Map<String, Value>, depth: usize) {
    let entries: Vec<(&String, &Value)> = map.iter().filter(|(_, v)| !v.is_null()).collect();
    if entries.is_empty() {
        out.push_str("{}");
        return;
    }

    out.push_str("{\n");
    for (key, value) in entries {
        let field = schema.and_then(|s| s.get(key)).map(|f| &f.ty);
        indent(out, depth + 1);
        out.push_str(&hcl_key(&camel_to_snake(key)));
        out.push_str(" = ");
        render_value(out, field, value, depth + 1);
        out.push('\n');
    }
    indent(out, depth);
    out.push('}');
}

/// String maps keep their keys verbatim (label keys are not identifiers).
fn render_string_map(out: &mut String, map: &Map<String, Value>, depth: usize) {
    let entries: Vec<(&String, &Value)> = map.iter().filter(|(_, v)| !v.is_null()).collect();
    if entries.is_empty() {
        out.push_str("{}");
        return;
    }

    out.push_str("{\n");
    for (key, value) in entries {
        indent(out, depth + 1);
        out.push_str(&quote(key));
        out.push_str(" = ");
        render_value(out, None, value, depth + 1);
        out.push('\n');
    }
    indent(out, depth);
    out.push('}');
}

fn render_value(out: &mut String, ty: Option<&FieldType>, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(&quote(s)),
        Value::Array(items) => {
            let item_ty = match ty {
                Some(FieldType::List(item)) => Some(item.as_ref()),
                _ => None,
            };
            let items: Vec<&Value> = items.iter().filter(|v| !v.is_null()).collect();
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[\n");
            for item in items {
                indent(out, depth + 1);
                render_value(out, item_ty, item, depth + 1);
                out.push_str(",\n");
            }
            indent(out, depth);
            out.push(']');
        }
        Value::Object(map) => match ty {
            Some(FieldType::StringMap) => render_string_map(out, map, depth),
            Some(FieldType::Message(schema)) => render_message(out, Some(schema), map, depth),
            _ => render_message(out, None, map, depth),
        },
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn hcl_key(key: &str) -> String {
    let mut chars = key.chars();
    let is_ident = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if is_ident {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Double-quoted HCL string with template sequences escaped.
fn quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace("${", "$${")
        .replace("%{", "%%{");
    format!("\"{}\"", escaped)
}

/// `awsRegion` -> `aws_region`, `HTTPPort` -> `http_port`.
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.map_or(false, |n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
