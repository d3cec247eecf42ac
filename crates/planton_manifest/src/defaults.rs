//! Schema default application.

use serde_json::{Map, Value};

use crate::schema::{FieldType, MessageSchema};

/// Fill unset scalar fields with their declared defaults.
///
/// Nested messages that are absent stay absent. Messages that are present,
/// even as `{}`, are recursed into, as are message items of lists.
pub fn apply_defaults(schema: &MessageSchema, obj: &mut Map<String, Value>) {
    for field in &schema.fields {
        if matches!(obj.get(field.name), None | Some(Value::Null)) {
            if let Some(default) = &field.default {
                obj.insert(field.name.to_string(), default.clone());
            }
            continue;
        }

        match (&field.ty, obj.get_mut(field.name)) {
            (FieldType::Message(inner), Some(Value::Object(child))) => {
                apply_defaults(inner, child);
            }
            (FieldType::List(item), Some(Value::Array(items))) => {
                if let FieldType::Message(inner) = item.as_ref() {
                    for child in items.iter_mut().filter_map(Value::as_object_mut) {
                        apply_defaults(inner, child);
                    }
                }
            }
            _ => {}
        }
    }
}
