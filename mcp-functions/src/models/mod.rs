// Models module for the MCP dispatcher
//
// This module defines the wire data models: JSON-RPC envelopes and the MCP
// result structures returned by each method.

pub mod jsonrpc;
pub mod protocol;

pub use jsonrpc::{JsonRpcError, JsonRpcOutcome, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};
pub use protocol::{
    ContentItem, Implementation, InitializeResult, ListResourcesResult, ListToolsResult,
    ReadResourceResult, ResourceContents, ResourceDescriptor, ServerCapabilities, ToolAnnotations,
    ToolCallResult, ToolDefinition,
};
