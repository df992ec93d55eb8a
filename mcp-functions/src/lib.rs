// mcp-functions: Model Context Protocol dispatcher
//
// This library exposes tools and resources to LLM clients over JSON-RPC on
// HTTP. Tools and resources are registered explicitly at startup; the
// dispatcher routes `initialize`, `ping`, `tools/*` and `resources/*` requests
// to them and can be hosted on actix-web or driven by any other HTTP host.

pub mod api;
pub mod auth;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod models;
pub mod resources;
pub mod schema;
pub mod tools;

pub use auth::{AuthValidator, Identity};
pub use config::{JsonOptions, McpSettings, Settings};
pub use dispatch::{McpDispatcher, McpHttpRequest, McpHttpResponse, RequestContext};
pub use errors::{McpError, ResourceError, ServerError, ToolError};
pub use resources::{ResourceDefinition, ResourceOutput, ResourceRegistry, ResourceRequest};
pub use schema::{Describe, FieldShape, ObjectShape, Shape};
pub use tools::{BoundArguments, ToolDescriptor, ToolOutput, ToolRegistry};

/// Protocol version assumed when a client does not send one
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-03-26";

/// Protocol versions `initialize` agrees to by default
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];

/// Default server configuration constants
pub mod defaults {
    /// Default port for the MCP server
    pub const SERVER_PORT: u16 = 3010;
    /// Default host address to bind to
    pub const SERVER_HOST: &str = "127.0.0.1";
    /// Default timeout for requests in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;
    /// Default path of the JSON-RPC endpoint
    pub const ENDPOINT: &str = "/mcp";
    /// Default server name reported by `initialize`
    pub const SERVER_NAME: &str = "mcp-functions";
}

/// Install `env_logger` with the configured level as the default filter.
/// `RUST_LOG` still takes precedence; repeated calls are ignored.
pub fn init_logging(settings: &Settings) {
    let env = env_logger::Env::default().default_filter_or(settings.log_level.as_str());
    let _ = env_logger::Builder::from_env(env).try_init();
}
