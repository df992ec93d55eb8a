// Error handling module for the MCP dispatcher
//
// This module defines the error types used throughout the crate and their
// mapping onto JSON-RPC error codes.

use thiserror::Error;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::models::jsonrpc::JsonRpcError;

// JSON-RPC 2.0 standard error codes.
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// MCP server-defined codes (within the -32000..-32099 server error range).
pub const AUTHENTICATION_ERROR: i32 = -32001;
pub const RESOURCE_NOT_FOUND: i32 = -32002;

/// API error response format for failures of the host adapter itself
#[derive(Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub code: Option<String>,
}

/// Protocol-level errors, each carried to the client as a JSON-RPC error object
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum McpError {
    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    #[error("Invalid params: {message}")]
    InvalidParams { message: String },

    #[error("{message}")]
    InternalError { message: String },

    #[error("{message}")]
    Authentication { message: String },

    #[error("Resource not found: {uri}")]
    ResourceNotFound { uri: String },
}

impl McpError {
    /// JSON-RPC error code for this error
    pub fn code(&self) -> i32 {
        match self {
            McpError::ParseError { .. } => PARSE_ERROR,
            McpError::InvalidRequest { .. } => INVALID_REQUEST,
            McpError::MethodNotFound { .. } => METHOD_NOT_FOUND,
            McpError::InvalidParams { .. } => INVALID_PARAMS,
            McpError::InternalError { .. } => INTERNAL_ERROR,
            McpError::Authentication { .. } => AUTHENTICATION_ERROR,
            McpError::ResourceNotFound { .. } => RESOURCE_NOT_FOUND,
        }
    }

    /// Convert to a JSON-RPC 2.0 error object for wire transmission
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        let data = match self {
            McpError::ResourceNotFound { uri } => Some(serde_json::json!({ "uri": uri })),
            _ => None,
        };

        JsonRpcError {
            code: self.code(),
            message: self.to_string(),
            data,
        }
    }

    /// -32602 with the given message
    pub fn invalid_params(message: impl Into<String>) -> Self {
        McpError::InvalidParams { message: message.into() }
    }

    /// -32603 with the given message
    pub fn internal(message: impl Into<String>) -> Self {
        McpError::InternalError { message: message.into() }
    }
}

/// Failures raised by tool handlers or by the tool registry
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool parameters: {0}")]
    InvalidParameters(String),

    #[error("{0}")]
    ExecutionFailed(String),

    #[error("Tool invocation was cancelled")]
    Cancelled,
}

impl From<anyhow::Error> for ToolError {
    fn from(err: anyhow::Error) -> Self {
        ToolError::ExecutionFailed(err.to_string())
    }
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::NotFound(name) => McpError::invalid_params(format!("Unknown tool: {}", name)),
            ToolError::InvalidParameters(msg) => McpError::InvalidParams { message: msg },
            other => McpError::internal(other.to_string()),
        }
    }
}

/// Failures raised by resource handlers, list providers, or the resource registry
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid URI template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("{0}")]
    ExecutionFailed(String),

    #[error("Resource read was cancelled")]
    Cancelled,
}

impl From<anyhow::Error> for ResourceError {
    fn from(err: anyhow::Error) -> Self {
        ResourceError::ExecutionFailed(err.to_string())
    }
}

impl From<ResourceError> for McpError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound(uri) => McpError::ResourceNotFound { uri },
            other => McpError::internal(other.to_string()),
        }
    }
}

/// Bootstrap and host adapter errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Host adapter failures still produce a well-formed HTTP response
impl ResponseError for ServerError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::InternalServerError().json(ErrorResponse {
            status: "error".to_string(),
            message: self.to_string(),
            code: Some("INTERNAL_ERROR".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_the_jsonrpc_table() {
        assert_eq!(McpError::ParseError { message: "x".into() }.code(), -32700);
        assert_eq!(McpError::InvalidRequest { message: "x".into() }.code(), -32600);
        assert_eq!(McpError::MethodNotFound { method: "x".into() }.code(), -32601);
        assert_eq!(McpError::invalid_params("x").code(), -32602);
        assert_eq!(McpError::internal("x").code(), -32603);
        assert_eq!(McpError::Authentication { message: "x".into() }.code(), -32001);
        assert_eq!(McpError::ResourceNotFound { uri: "x".into() }.code(), -32002);
    }

    #[test]
    fn internal_error_carries_the_raw_message() {
        let rpc = McpError::internal("disk on fire").to_jsonrpc_error();
        assert_eq!(rpc.code, INTERNAL_ERROR);
        assert_eq!(rpc.message, "disk on fire");
        assert!(rpc.data.is_none());
    }

    #[test]
    fn unknown_tool_maps_to_invalid_params() {
        let err: McpError = ToolError::NotFound("nope".to_string()).into();
        assert_eq!(err.code(), INVALID_PARAMS);
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn handler_failures_map_to_internal_error() {
        let err: McpError = ToolError::from(anyhow::anyhow!("boom")).into();
        assert_eq!(err, McpError::internal("boom"));

        let err: McpError = ResourceError::Cancelled.into();
        assert_eq!(err.code(), INTERNAL_ERROR);
    }

    #[test]
    fn resource_not_found_includes_uri_in_data() {
        let err: McpError = ResourceError::NotFound("menu://x".to_string()).into();
        let rpc = err.to_jsonrpc_error();
        assert_eq!(rpc.code, RESOURCE_NOT_FOUND);
        assert_eq!(rpc.data.unwrap()["uri"], "menu://x");
    }
}
