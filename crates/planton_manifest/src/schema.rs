//! Declarative schema layer.
//!
//! Every resource kind describes its `spec` as a [`MessageSchema`]: a list of
//! named fields, each with a type, an optional default and a set of rules.
//! The loader, defaulter, validator and override engine all walk these
//! descriptions, so a single generic implementation serves every kind.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Type of a single schema field.
#[derive(Debug, Clone)]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    /// String restricted to a closed set of values.
    Enum(&'static [&'static str]),
    /// Mapping of string keys to string values (labels, tags).
    StringMap,
    List(Box<FieldType>),
    Message(MessageSchema),
}

impl FieldType {
    /// Human-readable type name used in error messages.
    pub fn describe(&self) -> String {
        match self {
            FieldType::String => "string".to_string(),
            FieldType::Int => "integer".to_string(),
            FieldType::Float => "number".to_string(),
            FieldType::Bool => "boolean".to_string(),
            FieldType::Enum(values) => format!("one of [{}]", values.join(", ")),
            FieldType::StringMap => "mapping of strings".to_string(),
            FieldType::List(item) => format!("list of {}", item.describe()),
            FieldType::Message(schema) => format!("{} object", schema.name),
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            FieldType::StringMap | FieldType::List(_) | FieldType::Message(_)
        )
    }

    pub fn as_message(&self) -> Option<&MessageSchema> {
        match self {
            FieldType::Message(schema) => Some(schema),
            _ => None,
        }
    }
}

/// Describe the JSON type of a value for error messages.
pub fn describe_value(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// A validation rule attached to a field.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Field must be present and non-empty.
    Required,
    MinLen(usize),
    MaxLen(usize),
    /// Regular expression the whole string must match.
    Pattern(Pattern),
    Min(f64),
    Max(f64),
    MinItems(usize),
    MaxItems(usize),
}

/// A regular expression compiled on first use and kept with its schema.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: &'static str,
    compiled: OnceLock<Result<Regex, regex::Error>>,
}

impl Pattern {
    pub fn new(source: &'static str) -> Self {
        Self {
            source,
            compiled: OnceLock::new(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.source
    }

    pub fn regex(&self) -> Result<&Regex, regex::Error> {
        self.compiled
            .get_or_init(|| Regex::new(self.source))
            .as_ref()
            .map_err(Clone::clone)
    }
}

/// A cross-field rule evaluated on a whole message.
#[derive(Clone)]
pub enum Constraint {
    ExactlyOneOf(&'static [&'static str]),
    AtMostOneOf(&'static [&'static str]),
    /// `field` is required unless the boolean `flag` is true.
    RequiredUnless {
        field: &'static str,
        flag: &'static str,
    },
    Custom {
        description: &'static str,
        check: fn(&Map<String, Value>) -> Result<(), String>,
    },
}

impl std::fmt::Debug for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::ExactlyOneOf(fields) => write!(f, "ExactlyOneOf({:?})", fields),
            Constraint::AtMostOneOf(fields) => write!(f, "AtMostOneOf({:?})", fields),
            Constraint::RequiredUnless { field, flag } => {
                write!(f, "RequiredUnless({} unless {})", field, flag)
            }
            Constraint::Custom { description, .. } => write!(f, "Custom({})", description),
        }
    }
}

/// One named field of a message.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    /// Wire name (camelCase).
    pub name: &'static str,
    pub ty: FieldType,
    pub default: Option<Value>,
    pub rules: Vec<Rule>,
}

impl FieldSchema {
    pub fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            default: None,
            rules: Vec::new(),
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn int(name: &'static str) -> Self {
        Self::new(name, FieldType::Int)
    }

    pub fn float(name: &'static str) -> Self {
        Self::new(name, FieldType::Float)
    }

    pub fn bool(name: &'static str) -> Self {
        Self::new(name, FieldType::Bool)
    }

    pub fn enumeration(name: &'static str, values: &'static [&'static str]) -> Self {
        Self::new(name, FieldType::Enum(values))
    }

    pub fn string_map(name: &'static str) -> Self {
        Self::new(name, FieldType::StringMap)
    }

    pub fn list(name: &'static str, item: FieldType) -> Self {
        Self::new(name, FieldType::List(Box::new(item)))
    }

    pub fn message(name: &'static str, schema: MessageSchema) -> Self {
        Self::new(name, FieldType::Message(schema))
    }

    /// A field holding either a literal `value` or a `valueFrom` reference.
    pub fn value_or_ref(name: &'static str) -> Self {
        Self::message(name, value_or_ref_schema())
    }

    pub fn required(mut self) -> Self {
        self.rules.push(Rule::Required);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn min_len(mut self, len: usize) -> Self {
        self.rules.push(Rule::MinLen(len));
        self
    }

    pub fn max_len(mut self, len: usize) -> Self {
        self.rules.push(Rule::MaxLen(len));
        self
    }

    pub fn pattern(mut self, pattern: &'static str) -> Self {
        self.rules.push(Rule::Pattern(Pattern::new(pattern)));
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.rules.push(Rule::Min(min));
        self.rules.push(Rule::Max(max));
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.rules.push(Rule::Min(min));
        self
    }

    pub fn min_items(mut self, count: usize) -> Self {
        self.rules.push(Rule::MinItems(count));
        self
    }

    pub fn max_items(mut self, count: usize) -> Self {
        self.rules.push(Rule::MaxItems(count));
        self
    }

    pub fn is_required(&self) -> bool {
        self.rules.iter().any(|r| matches!(r, Rule::Required))
    }
}

/// Structured type: an ordered set of fields plus cross-field constraints.
#[derive(Debug, Clone)]
pub struct MessageSchema {
    pub name: &'static str,
    pub fields: Vec<FieldSchema>,
    pub constraints: Vec<Constraint>,
}

impl MessageSchema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }
}

/// Schema of the `{value}` / `{valueFrom}` reference helper.
pub fn value_or_ref_schema() -> MessageSchema {
    MessageSchema::new("StringValueOrRef")
        .field(FieldSchema::string("value"))
        .field(FieldSchema::message(
            "valueFrom",
            MessageSchema::new("ValueFromRef")
                .field(FieldSchema::string("kind"))
                .field(FieldSchema::string("env"))
                .field(FieldSchema::string("name").required())
                .field(FieldSchema::string("fieldPath")),
        ))
        .constraint(Constraint::ExactlyOneOf(&["value", "valueFrom"]))
}

/// Schema of `metadata`, shared by every kind.
pub fn metadata_schema() -> MessageSchema {
    MessageSchema::new("Metadata")
        .field(FieldSchema::string("name").required().max_len(63))
        .field(FieldSchema::string("slug"))
        .field(FieldSchema::string("id"))
        .field(FieldSchema::string("org"))
        .field(FieldSchema::string("env"))
        .field(FieldSchema::string_map("labels"))
        .field(FieldSchema::string_map("annotations"))
        .field(FieldSchema::list("tags", FieldType::String))
}

/// Whether a value counts as "set" for one-of style constraints.
///
/// `false`, empty strings and empty lists count as unset; an explicitly
/// written object counts as set even when empty.
pub fn is_populated(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Number(_)) | Some(Value::Object(_)) => true,
    }
}
