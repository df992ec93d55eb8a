// JSON-RPC 2.0 envelopes
//
// Requests are validated by hand from a parsed `serde_json::Value` so that a
// malformed envelope can still echo the caller's `id` in the error response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::McpError;

/// Protocol tag every request must carry
pub const JSONRPC_VERSION: &str = "2.0";

/// Structured JSON-RPC 2.0 error object sent in error responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A validated JSON-RPC request
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcRequest {
    /// Echo value; `None` for notifications
    pub id: Option<Value>,
    /// Non-empty method name
    pub method: String,
    /// Parameters object, if any
    pub params: Option<Map<String, Value>>,
}

impl JsonRpcRequest {
    /// Best-effort extraction of the request id, used before full validation
    pub fn peek_id(value: &Value) -> Option<Value> {
        value.as_object().and_then(|obj| obj.get("id")).cloned()
    }

    /// Validate a parsed body against the JSON-RPC 2.0 envelope rules
    pub fn from_value(value: Value) -> Result<Self, McpError> {
        let mut obj = match value {
            Value::Object(obj) => obj,
            _ => {
                return Err(McpError::InvalidRequest {
                    message: "Request must be a JSON object".to_string(),
                })
            }
        };

        match obj.get("jsonrpc") {
            Some(Value::String(tag)) if tag == JSONRPC_VERSION => {}
            _ => {
                return Err(McpError::InvalidRequest {
                    message: "jsonrpc must be \"2.0\"".to_string(),
                })
            }
        }

        let method = match obj.remove("method") {
            Some(Value::String(method)) if !method.is_empty() => method,
            _ => {
                return Err(McpError::InvalidRequest {
                    message: "method is required".to_string(),
                })
            }
        };

        let params = match obj.remove("params") {
            None | Some(Value::Null) => None,
            Some(Value::Object(params)) => Some(params),
            Some(_) => {
                return Err(McpError::InvalidRequest {
                    message: "params must be an object".to_string(),
                })
            }
        };

        Ok(Self {
            id: obj.remove("id"),
            method,
            params,
        })
    }

    /// Whether this request is a notification (no id)
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Result-or-error half of a response; exactly one is ever present
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum JsonRpcOutcome {
    Result(Value),
    Error(JsonRpcError),
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(flatten)]
    pub outcome: JsonRpcOutcome,
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.unwrap_or(Value::Null),
            outcome: JsonRpcOutcome::Result(result),
        }
    }

    /// Create an error response
    pub fn error(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.unwrap_or(Value::Null),
            outcome: JsonRpcOutcome::Error(error),
        }
    }

    /// Error code when this is an error response
    pub fn error_code(&self) -> Option<i32> {
        match &self.outcome {
            JsonRpcOutcome::Error(err) => Some(err.code),
            JsonRpcOutcome::Result(_) => None,
        }
    }
}
