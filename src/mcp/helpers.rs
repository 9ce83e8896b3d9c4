//! MCP Protocol Helpers
//!
//! Response envelope constructors and small accessors for pulling typed
//! values out of `params` / tool `arguments` objects.

use super::error::{McpError, McpResult};
use super::models::{JsonRpcResponse, RequestId};
use serde_json::{Map, Value};

/// Builds a JSON-RPC 2.0 success response.
///
/// # Arguments
///
/// * `id` – The request identifier that must be echoed back.
/// * `result` – The payload representing the successful outcome.
pub fn rpc_success(id: Option<RequestId>, result: Value) -> JsonRpcResponse {
    JsonRpcResponse::success(id, result)
}

/// Builds a JSON-RPC 2.0 error response.
///
/// # Arguments
///
/// * `id` – The request identifier (or `None` when it could not be read).
/// * `error` – The failure; its code and message are taken from the variant.
pub fn rpc_error(id: Option<RequestId>, error: &McpError) -> JsonRpcResponse {
    JsonRpcResponse::failure(id, error.to_error_object())
}

/// `params` as an object. Absent params read as an empty object; any other
/// shape is rejected.
pub fn params_object(params: Option<&Value>) -> McpResult<Map<String, Value>> {
    match params {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(McpError::InvalidParams(
            "params must be an object".to_string(),
        )),
    }
}

/// A required string member.
pub fn require_str<'a>(map: &'a Map<String, Value>, key: &str) -> McpResult<&'a str> {
    match map.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(McpError::InvalidParams(format!("{key} must be a string"))),
        None => Err(McpError::InvalidParams(format!(
            "Missing required parameter: {key}"
        ))),
    }
}

pub fn opt_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

pub fn opt_f64(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

pub fn opt_i64(map: &Map<String, Value>, key: &str) -> Option<i64> {
    map.get(key).and_then(Value::as_i64)
}
