//! JSON-RPC message validation.
//!
//! Turns raw bytes into typed envelopes before any method logic runs. Never
//! looks at method-specific params.

use super::error::{McpError, McpResult};
use super::models::{JsonRpcRequest, RequestId, JSONRPC_VERSION};
use serde_json::{Map, Value};

/// An envelope that failed structural checks, with whatever id could be read.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub id: Option<RequestId>,
    pub error: McpError,
}

pub type Checked = Result<JsonRpcRequest, Rejected>;

/// Validated input: one envelope or a non-empty batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Single(Checked),
    Batch(Vec<Checked>),
}

/// Decodes raw bytes into a JSON value.
pub fn parse(raw: &[u8]) -> McpResult<Value> {
    serde_json::from_slice(raw).map_err(|e| McpError::ParseError(e.to_string()))
}

/// Classifies a decoded value as a single request or a batch and validates
/// every envelope in it. Elements of a batch are checked independently.
pub fn classify(value: Value) -> McpResult<Incoming> {
    match value {
        Value::Array(items) if items.is_empty() => Err(McpError::InvalidRequest(
            "Batch must not be empty".to_string(),
        )),
        Value::Array(items) => Ok(Incoming::Batch(
            items.iter().map(validate_envelope).collect(),
        )),
        other => Ok(Incoming::Single(validate_envelope(&other))),
    }
}

/// Validates a single envelope.
pub fn validate_envelope(value: &Value) -> Checked {
    let Value::Object(obj) = value else {
        return Err(Rejected {
            id: None,
            error: McpError::InvalidRequest("Request must be an object".to_string()),
        });
    };

    let reject = |error: McpError| Rejected {
        id: read_id(obj).ok().flatten(),
        error,
    };

    match obj.get("jsonrpc") {
        Some(Value::String(v)) if v == JSONRPC_VERSION => {}
        Some(other) => {
            return Err(reject(McpError::InvalidRequest(format!(
                "Expected jsonrpc version \"{JSONRPC_VERSION}\", got {other}"
            ))))
        }
        None => {
            return Err(reject(McpError::InvalidRequest(
                "Missing jsonrpc member".to_string(),
            )))
        }
    }

    let method = match obj.get("method") {
        Some(Value::String(m)) if !m.is_empty() => m.clone(),
        Some(Value::String(_)) => {
            return Err(reject(McpError::InvalidRequest(
                "Method name must not be empty".to_string(),
            )))
        }
        Some(_) => {
            return Err(reject(McpError::InvalidRequest(
                "Method must be a string".to_string(),
            )))
        }
        None => {
            return Err(reject(McpError::InvalidRequest(
                "Missing method member".to_string(),
            )))
        }
    };

    let params = match obj.get("params") {
        None => None,
        Some(p @ (Value::Object(_) | Value::Array(_))) => Some(p.clone()),
        Some(_) => {
            return Err(reject(McpError::InvalidRequest(
                "params must be an object or array".to_string(),
            )))
        }
    };

    let id = read_id(obj).map_err(reject)?;

    Ok(JsonRpcRequest { method, params, id })
}

/// Reads `id`. Absent means notification; `null`, floats and other shapes
/// are invalid.
fn read_id(obj: &Map<String, Value>) -> McpResult<Option<RequestId>> {
    match obj.get("id") {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(RequestId::String(s.clone()))),
        Some(Value::Number(n)) => n.as_i64().map(|n| Some(RequestId::Number(n))).ok_or_else(|| {
            McpError::InvalidRequest(format!("id must be an integer, got {n}"))
        }),
        Some(other) => Err(McpError::InvalidRequest(format!(
            "id must be an integer or string, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn single(value: Value) -> Checked {
        match classify(value).unwrap() {
            Incoming::Single(checked) => checked,
            Incoming::Batch(_) => panic!("expected single"),
        }
    }

    #[test]
    fn garbage_is_parse_error() {
        let err = parse(b"{not json").unwrap_err();
        assert_eq!(err.code(), -32700);
    }

    #[test]
    fn valid_request_and_notification() {
        let req = single(json!({ "jsonrpc": "2.0", "method": "tools/list", "id": 1 })).unwrap();
        assert_eq!(req.method, "tools/list");
        assert_eq!(req.id, Some(RequestId::Number(1)));
        assert!(!req.is_notification());

        let note = single(json!({ "jsonrpc": "2.0", "method": "ping" })).unwrap();
        assert!(note.is_notification());

        let string_id = single(json!({ "jsonrpc": "2.0", "method": "ping", "id": "abc" })).unwrap();
        assert_eq!(string_id.id, Some(RequestId::String("abc".into())));
    }

    #[test]
    fn wrong_or_missing_version_is_invalid_request() {
        let rejected = single(json!({ "jsonrpc": "1.0", "method": "ping", "id": 4 })).unwrap_err();
        assert_eq!(rejected.error.code(), -32600);
        assert_eq!(rejected.id, Some(RequestId::Number(4)));

        let rejected = single(json!({ "method": "ping", "id": 5 })).unwrap_err();
        assert_eq!(rejected.error.code(), -32600);
    }

    #[test]
    fn missing_method_is_invalid_request() {
        let rejected = single(json!({ "jsonrpc": "2.0", "id": 1 })).unwrap_err();
        assert_eq!(rejected.error.code(), -32600);

        let rejected = single(json!({ "jsonrpc": "2.0", "method": 12, "id": 1 })).unwrap_err();
        assert_eq!(rejected.error.code(), -32600);
    }

    #[test]
    fn non_object_single_is_invalid_request() {
        let rejected = single(json!("tools/list")).unwrap_err();
        assert_eq!(rejected.error.code(), -32600);
        assert_eq!(rejected.id, None);
    }

    #[test]
    fn bad_ids_are_rejected() {
        for id in [json!(null), json!(1.5), json!({ "a": 1 }), json!(true)] {
            let rejected =
                single(json!({ "jsonrpc": "2.0", "method": "ping", "id": id })).unwrap_err();
            assert_eq!(rejected.error.code(), -32600);
            assert_eq!(rejected.id, None);
        }
    }

    #[test]
    fn scalar_params_are_rejected() {
        let rejected =
            single(json!({ "jsonrpc": "2.0", "method": "ping", "params": 3, "id": 2 })).unwrap_err();
        assert_eq!(rejected.error.code(), -32600);
        assert_eq!(rejected.id, Some(RequestId::Number(2)));
    }

    #[test]
    fn empty_batch_is_invalid_request() {
        assert_eq!(classify(json!([])).unwrap_err().code(), -32600);
    }

    #[test]
    fn batch_elements_are_checked_independently() {
        let incoming = classify(json!([
            { "jsonrpc": "2.0", "method": "tools/list", "id": 1 },
            { "jsonrpc": "2.0", "method": "ping" },
            42,
        ]))
        .unwrap();

        let Incoming::Batch(items) = incoming else {
            panic!("expected batch");
        };
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(items[1].as_ref().unwrap().is_notification());
        assert!(items[2].is_err());
    }
}
