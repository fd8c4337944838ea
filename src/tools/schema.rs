//! Minimal JSON Schema support for tool arguments.
//!
//! Tool input schemas use the small JSON Schema subset MCP clients expect:
//! an object with typed `properties` and a `required` list. Validation
//! checks exactly that subset before a handler ever runs; schema failures
//! never reach the handler.

use serde_json::{json, Value};

/// Builds an object schema from property definitions and required keys.
#[must_use]
pub fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Builds a string property schema.
#[must_use]
pub fn string(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description,
    })
}

/// Validates arguments against a tool input schema.
///
/// Checks, in order: the arguments form an object (absent arguments count
/// as an empty one), every `required` key is present, and every provided
/// value matches its declared primitive type. Unknown extra keys are
/// allowed.
///
/// # Errors
///
/// Returns a description of the first violation found.
pub fn validate_arguments(schema: &Value, arguments: &Value) -> Result<(), String> {
    let empty = Value::Object(serde_json::Map::new());
    let arguments = if arguments.is_null() { &empty } else { arguments };

    let Some(args) = arguments.as_object() else {
        return Err(format!(
            "arguments must be an object, got {}",
            type_name(arguments)
        ));
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !args.contains_key(key) {
                return Err(format!("missing required argument '{key}'"));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (key, property) in properties {
            let Some(value) = args.get(key) else {
                continue;
            };
            let Some(expected) = property.get("type").and_then(Value::as_str) else {
                continue;
            };
            if !matches_type(value, expected) {
                return Err(format!(
                    "argument '{key}' must be of type {expected}, got {}",
                    type_name(value)
                ));
            }
        }
    }

    Ok(())
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        // Unknown type tags never match; the schema author finds out early.
        _ => false,
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city_schema() -> Value {
        object(
            json!({
                "city": string("City name"),
            }),
            &["city"],
        )
    }

    #[test]
    fn valid_arguments_pass() {
        let args = json!({"city": "Prague"});
        assert!(validate_arguments(&city_schema(), &args).is_ok());
    }

    #[test]
    fn missing_required_key_is_reported() {
        let err = validate_arguments(&city_schema(), &json!({})).unwrap_err();
        assert!(err.contains("missing required argument 'city'"));
    }

    #[test]
    fn null_arguments_count_as_empty_object() {
        let err = validate_arguments(&city_schema(), &Value::Null).unwrap_err();
        assert!(err.contains("missing required argument"));
    }

    #[test]
    fn wrong_primitive_type_is_reported() {
        let err = validate_arguments(&city_schema(), &json!({"city": 42})).unwrap_err();
        assert!(err.contains("'city'"));
        assert!(err.contains("string"));
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        let err = validate_arguments(&city_schema(), &json!(["Prague"])).unwrap_err();
        assert!(err.contains("must be an object"));
    }

    #[test]
    fn extra_keys_are_allowed() {
        let args = json!({"city": "Prague", "unused": true});
        assert!(validate_arguments(&city_schema(), &args).is_ok());
    }

    #[test]
    fn integer_and_number_distinguished() {
        let schema = object(
            json!({
                "count": {"type": "integer"},
                "ratio": {"type": "number"},
            }),
            &[],
        );

        assert!(validate_arguments(&schema, &json!({"count": 3, "ratio": 0.5})).is_ok());
        assert!(validate_arguments(&schema, &json!({"count": 3.5})).is_err());
        assert!(validate_arguments(&schema, &json!({"ratio": 3})).is_ok());
    }

    #[test]
    fn optional_keys_may_be_absent() {
        let schema = object(json!({"flag": {"type": "boolean"}}), &[]);
        assert!(validate_arguments(&schema, &json!({})).is_ok());
    }
}
