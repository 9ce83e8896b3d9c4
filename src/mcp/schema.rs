//! Argument checking against a tool's input schema.
//!
//! Understands the JSON-schema subset used by the registered tools: `type`,
//! `properties`, `required` (at every nesting level), `items`, `enum` and
//! `minimum`. Unknown extra properties are accepted.

use super::error::{McpError, McpResult};
use super::models::InputSchema;
use serde_json::{Map, Value};

/// Normalises `tools/call` arguments: absent becomes `{}`, anything other
/// than an object (including `null`) is invalid.
pub fn arguments_object(arguments: Option<&Value>) -> McpResult<Value> {
    match arguments {
        None => Ok(Value::Object(Map::new())),
        Some(args @ Value::Object(_)) => Ok(args.clone()),
        Some(other) => Err(McpError::InvalidParams(format!(
            "arguments must be an object, got {}",
            type_name(other)
        ))),
    }
}

/// Checks `args` against `schema`.
pub fn check_arguments(schema: &InputSchema, args: &Value) -> McpResult<()> {
    check(&schema.to_value(), args, "arguments")
}

fn check(schema: &Value, value: &Value, path: &str) -> McpResult<()> {
    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        if !has_type(value, expected) {
            return Err(McpError::InvalidParams(format!(
                "{path} must be of type {expected}, got {}",
                type_name(value)
            )));
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            return Err(McpError::InvalidParams(format!(
                "{path} must be one of {}",
                Value::Array(allowed.clone())
            )));
        }
    }

    if let (Some(min), Some(n)) = (schema.get("minimum").and_then(Value::as_f64), value.as_f64()) {
        if n < min {
            return Err(McpError::InvalidParams(format!(
                "{path} must be at least {min}, got {n}"
            )));
        }
    }

    match value {
        Value::Object(obj) => check_object(schema, obj, path),
        Value::Array(items) => match schema.get("items") {
            Some(item_schema) => items
                .iter()
                .enumerate()
                .try_for_each(|(i, item)| check(item_schema, item, &format!("{path}[{i}]"))),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}

fn check_object(schema: &Value, obj: &Map<String, Value>, path: &str) -> McpResult<()> {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if !obj.contains_key(name) {
                let field = if path == "arguments" {
                    name.to_string()
                } else {
                    format!("{path}.{name}")
                };
                return Err(McpError::InvalidParams(format!(
                    "Missing required argument: {field}"
                )));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (name, prop_schema) in properties {
            if let Some(value) = obj.get(name) {
                let child = if path == "arguments" {
                    name.clone()
                } else {
                    format!("{path}.{name}")
                };
                check(prop_schema, value, &child)?;
            }
        }
    }

    Ok(())
}

fn has_type(value: &Value, expected: &str) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
