//! Flattening of upstream records into storable properties.
//!
//! The storage policy is:
//! - a known nested status object is hoisted into the parent, each non-null
//!   field renamed with [`STATUS_PREFIX`], and the object itself removed;
//! - every remaining object or array field is dropped;
//! - every scalar field, null included, passes through unchanged.

use serde_json::{Map, Value};

use crate::model::{Properties, PropertyValue};

/// Prefix given to hoisted status fields.
pub const STATUS_PREFIX: &str = "status_";

/// Nested status object carried by proposition records.
pub const PROPOSITION_STATUS_FIELD: &str = "statusProposicao";

/// Whether the store can hold this value as a property.
pub fn is_storable(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

/// Normalize a raw record, hoisting `status_field` when it holds an object.
pub fn normalize_record(mut record: Map<String, Value>, status_field: Option<&str>) -> Properties {
    if let Some(field) = status_field {
        if matches!(record.get(field), Some(Value::Object(_))) {
            if let Some(Value::Object(status)) = record.remove(field) {
                hoist_status(&mut record, status);
            }
        }
    }
    normalize_fields(record)
}

/// Move the non-null fields of `status` into `record` under prefixed keys.
pub fn hoist_status(record: &mut Map<String, Value>, status: Map<String, Value>) {
    for (key, value) in status {
        if !value.is_null() {
            record.insert(format!("{STATUS_PREFIX}{key}"), value);
        }
    }
}

/// Keep scalar fields, drop objects and arrays.
pub fn normalize_fields(fields: Map<String, Value>) -> Properties {
    fields
        .iter()
        .filter_map(|(key, value)| PropertyValue::from_json(value).map(|v| (key.clone(), v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_status_hoisting_and_drop_policy() {
        let record = as_map(json!({
            "id": 7,
            "ementa": "Dispõe sobre",
            "uriAutores": null,
            "status": {"a": 1, "b": null},
            "tags": [1, 2],
        }));

        let props = normalize_record(record, Some("status"));

        assert_eq!(props.get("status_a"), Some(&PropertyValue::Int(1)));
        assert!(!props.contains_key("status_b"));
        assert!(!props.contains_key("status"));
        assert!(!props.contains_key("tags"));
        assert_eq!(props.get("id"), Some(&PropertyValue::Int(7)));
        assert_eq!(props.get("ementa"), Some(&PropertyValue::Text("Dispõe sobre".into())));
        assert_eq!(props.get("uriAutores"), Some(&PropertyValue::Null));
        assert_eq!(props.len(), 4);
    }

    #[test]
    fn test_non_object_status_is_plain_field() {
        let record = as_map(json!({"statusProposicao": "arquivada", "id": 1}));
        let props = normalize_record(record, Some(PROPOSITION_STATUS_FIELD));
        assert_eq!(
            props.get("statusProposicao"),
            Some(&PropertyValue::Text("arquivada".into()))
        );
    }

    #[test]
    fn test_nested_values_inside_status_are_dropped() {
        let record = as_map(json!({
            "statusProposicao": {"descricaoSituacao": "Em tramitação", "orgaos": [1]},
        }));
        let props = normalize_record(record, Some(PROPOSITION_STATUS_FIELD));
        assert_eq!(props.len(), 1);
        assert!(props.contains_key("status_descricaoSituacao"));
    }

    #[test]
    fn test_deterministic() {
        let record = as_map(json!({"x": 1, "y": {"z": 2}, "status": {"k": "v"}}));
        let first = normalize_record(record.clone(), Some("status"));
        let second = normalize_record(record, Some("status"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_without_status_field() {
        let record = as_map(json!({"status": {"a": 1}, "nome": "Fulano"}));
        let props = normalize_record(record, None);
        assert_eq!(props.len(), 1);
        assert!(props.contains_key("nome"));
    }
}
