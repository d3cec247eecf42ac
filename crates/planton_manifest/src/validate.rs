//! Semantic validation of decoded manifests.

use serde_json::{Map, Value};

use crate::error::{ManifestError, ManifestResult};
use crate::model::Manifest;
use crate::schema::{self, is_populated, Constraint, FieldType, MessageSchema, Rule};

/// A single violated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Dotted path of the offending field, e.g. `spec.subnets[0].value`.
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation outcome with every violation found.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<FieldViolation>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            valid: true,
            violations: Vec::new(),
        }
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.violations.push(FieldViolation::new(field, message));
    }

    pub fn merge(&mut self, other: ValidationReport) {
        if !other.valid {
            self.valid = false;
        }
        self.violations.extend(other.violations);
    }

    pub fn into_result(self) -> ManifestResult<()> {
        if self.valid {
            Ok(())
        } else {
            Err(ManifestError::ValidationFailed(self.violations))
        }
    }
}

/// Validator for decoded manifests.
pub struct ManifestValidator;

impl ManifestValidator {
    /// Run every schema rule of the manifest's kind plus metadata rules.
    ///
    /// Fails only when the schema itself is broken; field violations are
    /// collected in the report.
    pub fn validate(manifest: &Manifest) -> ManifestResult<ValidationReport> {
        let mut report = ValidationReport::new();

        match serde_json::to_value(&manifest.metadata) {
            Ok(Value::Object(metadata)) => {
                report.merge(Self::validate_message(
                    &schema::metadata_schema(),
                    &metadata,
                    "metadata",
                )?);
            }
            _ => report.add("metadata", "could not be serialized"),
        }

        report.merge(Self::validate_message(
            manifest.kind.spec_schema(),
            &manifest.spec,
            "spec",
        )?);
        Ok(report)
    }

    /// Validate one message and everything nested under it.
    pub fn validate_message(
        schema: &MessageSchema,
        obj: &Map<String, Value>,
        path: &str,
    ) -> ManifestResult<ValidationReport> {
        let mut report = ValidationReport::new();

        for field in &schema.fields {
            let field_path = format!("{}.{}", path, field.name);
            let value = obj.get(field.name).filter(|v| !v.is_null());

            for rule in &field.rules {
                if let Some(message) = check_rule(rule, value, &field_path)? {
                    report.add(&field_path, message);
                }
            }

            match (&field.ty, value) {
                (FieldType::Message(inner), Some(Value::Object(child))) => {
                    report.merge(Self::validate_message(inner, child, &field_path)?);
                }
                (FieldType::List(item), Some(Value::Array(items))) => {
                    if let FieldType::Message(inner) = item.as_ref() {
                        for (i, child) in items.iter().enumerate() {
                            if let Value::Object(child) = child {
                                let item_path = format!("{}[{}]", field_path, i);
                                report.merge(Self::validate_message(inner, child, &item_path)?);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        for constraint in &schema.constraints {
            check_constraint(constraint, obj, path, &mut report);
        }
        Ok(report)
    }
}

/// Validate a manifest, failing with every violation found.
pub fn validate_manifest(manifest: &Manifest) -> ManifestResult<()> {
    ManifestValidator::validate(manifest)?.into_result()
}

fn check_rule(rule: &Rule, value: Option<&Value>, path: &str) -> ManifestResult<Option<String>> {
    if let Rule::Required = rule {
        let present = match value {
            None => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        };
        return Ok((!present).then(|| "is required".to_string()));
    }

    if let (Rule::Pattern(pattern), Some(Value::String(s))) = (rule, value) {
        let re = pattern.regex().map_err(|e| ManifestError::InvalidPattern {
            field: path.to_string(),
            pattern: pattern.as_str().to_string(),
            message: e.to_string(),
        })?;
        return Ok((!re.is_match(s))
            .then(|| format!("'{}' does not match pattern {}", s, pattern.as_str())));
    }

    Ok(value.and_then(|value| check_bound(rule, value)))
}

fn check_bound(rule: &Rule, value: &Value) -> Option<String> {
    match rule {
        Rule::Required | Rule::Pattern(_) => None,
        Rule::MinLen(min) => {
            let len = value.as_str()?.chars().count();
            (len < *min).then(|| format!("must be at least {} characters", min))
        }
        Rule::MaxLen(max) => {
            let len = value.as_str()?.chars().count();
            (len > *max).then(|| format!("must be at most {} characters", max))
        }
        Rule::Min(min) => {
            let n = value.as_f64()?;
            (n < *min).then(|| format!("must be greater than or equal to {}", format_bound(*min)))
        }
        Rule::Max(max) => {
            let n = value.as_f64()?;
            (n > *max).then(|| format!("must be less than or equal to {}", format_bound(*max)))
        }
        Rule::MinItems(min) => {
            let len = value.as_array()?.len();
            (len < *min).then(|| format!("must contain at least {} item(s)", min))
        }
        Rule::MaxItems(max) => {
            let len = value.as_array()?.len();
            (len > *max).then(|| format!("must contain at most {} item(s)", max))
        }
    }
}

fn check_constraint(
    constraint: &Constraint,
    obj: &Map<String, Value>,
    path: &str,
    report: &mut ValidationReport,
) {
    match constraint {
        Constraint::ExactlyOneOf(fields) => {
            let set = count_populated(obj, fields);
            if set != 1 {
                report.add(
                    path,
                    format!("exactly one of [{}] must be set (found {})", fields.join(", "), set),
                );
            }
        }
        Constraint::AtMostOneOf(fields) => {
            let set = count_populated(obj, fields);
            if set > 1 {
                report.add(
                    path,
                    format!("at most one of [{}] may be set (found {})", fields.join(", "), set),
                );
            }
        }
        Constraint::RequiredUnless { field, flag } => {
            let flag_set = obj.get(*flag).and_then(Value::as_bool).unwrap_or(false);
            if !flag_set && !is_populated(obj.get(*field)) {
                report.add(
                    format!("{}.{}", path, field),
                    format!("is required when {} is false", flag),
                );
            }
        }
        Constraint::Custom { check, .. } => {
            if let Err(message) = check(obj) {
                report.add(path, message);
            }
        }
    }
}

fn count_populated(obj: &Map<String, Value>, fields: &[&str]) -> usize {
    fields.iter().filter(|f| is_populated(obj.get(**f))).count()
}

fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 {
        format!("{}", bound as i64)
    } else {
        bound.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSchema;
    use serde_json::json;

    fn check(schema: &MessageSchema, value: Value) -> ValidationReport {
        ManifestValidator::validate_message(schema, value.as_object().unwrap(), "spec").unwrap()
    }

    #[test]
    fn test_required_and_empty_string() {
        let schema = MessageSchema::new("T").field(FieldSchema::string("name").required());
        assert!(!check(&schema, json!({})).valid);
        assert!(!check(&schema, json!({"name": ""})).valid);
        assert!(check(&schema, json!({"name": "x"})).valid);
    }

    #[test]
    fn test_range_and_message() {
        let schema = MessageSchema::new("T").field(FieldSchema::int("port").range(1.0, 65535.0));
        let report = check(&schema, json!({"port": 70000}));
        assert_eq!(
            report.violations,
            vec![FieldViolation::new(
                "spec.port",
                "must be less than or equal to 65535"
            )]
        );
    }

    #[test]
    fn test_pattern() {
        let schema = MessageSchema::new("T").field(FieldSchema::string("zone").pattern(r"^[a-z]+$"));
        assert!(check(&schema, json!({"zone": "abc"})).valid);
        assert!(!check(&schema, json!({"zone": "ABC"})).valid);
    }

    #[test]
    fn test_pattern_compiled_once_per_schema() {
        let schema = MessageSchema::new("T").field(FieldSchema::string("zone").pattern(r"^[a-z]+$"));
        let Rule::Pattern(pattern) = &schema.fields[0].rules[0] else {
            panic!("expected a pattern rule");
        };

        let first = pattern.regex().unwrap() as *const regex::Regex;
        check(&schema, json!({"zone": "abc"}));
        check(&schema, json!({"zone": "xyz"}));
        let second = pattern.regex().unwrap() as *const regex::Regex;
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let schema = MessageSchema::new("T").field(FieldSchema::string("zone").pattern(r"^[a-z+$"));
        let obj = json!({"zone": "abc"});

        let err = ManifestValidator::validate_message(&schema, obj.as_object().unwrap(), "spec")
            .unwrap_err();
        match err {
            ManifestError::InvalidPattern { field, pattern, .. } => {
                assert_eq!(field, "spec.zone");
                assert_eq!(pattern, "^[a-z+$");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // An absent value never touches the pattern.
        let empty = json!({});
        assert!(ManifestValidator::validate_message(&schema, empty.as_object().unwrap(), "spec")
            .unwrap()
            .valid);
    }

    #[test]
    fn test_exactly_one_of() {
        let schema = MessageSchema::new("T")
            .field(FieldSchema::int("nodeCount"))
            .field(FieldSchema::message("autoscaling", MessageSchema::new("A")))
            .constraint(Constraint::ExactlyOneOf(&["nodeCount", "autoscaling"]));
        assert!(!check(&schema, json!({})).valid);
        assert!(check(&schema, json!({"nodeCount": 3})).valid);
        assert!(check(&schema, json!({"autoscaling": {}})).valid);
        assert!(!check(&schema, json!({"nodeCount": 3, "autoscaling": {}})).valid);
    }

    #[test]
    fn test_required_unless() {
        let schema = MessageSchema::new("T")
            .field(FieldSchema::bool("skip"))
            .field(FieldSchema::string("snapshot"))
            .constraint(Constraint::RequiredUnless {
                field: "snapshot",
                flag: "skip",
            });
        assert!(check(&schema, json!({"skip": true})).valid);
        let report = check(&schema, json!({"skip": false}));
        assert_eq!(report.violations[0].field, "spec.snapshot");
    }

    #[test]
    fn test_nested_list_paths() {
        let schema = MessageSchema::new("T").field(FieldSchema::list(
            "items",
            FieldType::Message(MessageSchema::new("I").field(FieldSchema::string("name").required())),
        ));
        let report = check(&schema, json!({"items": [{"name": "a"}, {}]}));
        assert_eq!(report.violations[0].field, "spec.items[1].name");
    }

    #[test]
    fn test_report_into_result() {
        let mut report = ValidationReport::new();
        assert!(report.clone().into_result().is_ok());
        report.add("spec.x", "is required");
        match report.into_result() {
            Err(ManifestError::ValidationFailed(v)) => assert_eq!(v.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
    }
}
