// Request dispatcher
//
// Runs the per-request checks in a fixed order (origin, verb, body, envelope,
// session and version, authentication), routes the JSON-RPC method through a
// static table and builds the HTTP response. Nothing is kept between requests.

pub mod context;
pub mod session;
pub mod transport;

pub use context::RequestContext;
pub use transport::{McpHttpRequest, McpHttpResponse};

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use log::{debug, error, warn};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;

use crate::auth::{self, AuthValidator, Identity, DEFAULT_AUTH_ERROR};
use crate::config::McpSettings;
use crate::errors::{McpError, ResourceError, ToolError};
use crate::models::{
    Implementation, InitializeResult, JsonRpcRequest, JsonRpcResponse, ListResourcesResult,
    ListToolsResult, ServerCapabilities,
};
use crate::resources::ResourceRegistry;
use crate::tools::ToolRegistry;

use self::session::{generate_session_id, is_valid_session_id};
use self::transport::{
    MCP_PROTOCOL_VERSION_HEADER, MCP_SESSION_ID_HEADER, ORIGIN_HEADER, STATUS_FORBIDDEN, STATUS_OK,
    STATUS_UNAUTHORIZED, WWW_AUTHENTICATE_HEADER,
};

/// Challenge sent with 401 responses when the validator does not supply one
pub const DEFAULT_WWW_AUTHENTICATE: &str = "Bearer";

/// JSON-RPC methods understood by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpMethod {
    Initialize,
    Initialized,
    Ping,
    ToolsList,
    ToolsCall,
    ResourcesList,
    ResourcesRead,
}

const METHOD_TABLE: &[(&str, McpMethod)] = &[
    ("initialize", McpMethod::Initialize),
    ("notifications/initialized", McpMethod::Initialized),
    ("ping", McpMethod::Ping),
    ("tools/list", McpMethod::ToolsList),
    ("tools/call", McpMethod::ToolsCall),
    ("resources/list", McpMethod::ResourcesList),
    ("resources/read", McpMethod::ResourcesRead),
];

impl McpMethod {
    /// Exact, case-sensitive lookup of a method name
    pub fn parse(name: &str) -> Option<Self> {
        METHOD_TABLE
            .iter()
            .find(|(method, _)| *method == name)
            .map(|(_, method)| *method)
    }

    /// Wire name of the method
    pub fn as_str(&self) -> &'static str {
        METHOD_TABLE
            .iter()
            .find(|(_, method)| method == self)
            .map_or("", |(name, _)| *name)
    }
}

/// The MCP dispatcher: shared, read-only state for every request
#[derive(Clone)]
pub struct McpDispatcher {
    settings: Arc<McpSettings>,
    tools: Arc<ToolRegistry>,
    resources: Arc<ResourceRegistry>,
    auth: Option<Arc<dyn AuthValidator>>,
}

impl McpDispatcher {
    /// Create a dispatcher over the given registries. No validator is
    /// installed, so every tool and resource is callable.
    pub fn new(settings: Arc<McpSettings>, tools: ToolRegistry, resources: ResourceRegistry) -> Self {
        Self {
            settings,
            tools: Arc::new(tools),
            resources: Arc::new(resources),
            auth: None,
        }
    }

    /// Install an authentication validator
    pub fn with_auth(mut self, validator: Arc<dyn AuthValidator>) -> Self {
        self.auth = Some(validator);
        self
    }

    /// Endpoint settings the dispatcher was built with
    pub fn settings(&self) -> &McpSettings {
        &self.settings
    }

    /// Registered tools
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Registered resources and list providers
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Process one HTTP request. Always produces a response.
    pub async fn handle(&self, request: McpHttpRequest) -> McpHttpResponse {
        if let Some(origin) = request.header(ORIGIN_HEADER).filter(|o| !o.is_empty()) {
            if !self.settings.origin_allowed(origin) {
                warn!("Rejected request from origin '{}'", origin);
                let err = McpError::internal(format!("Origin not allowed: {}", origin));
                return self.error_response(STATUS_FORBIDDEN, None, None, &err);
            }
        }

        if request.method != "POST" {
            debug!("Rejected HTTP {} on the MCP endpoint", request.method);
            return McpHttpResponse::method_not_allowed();
        }

        let body: Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(e) => {
                let err = McpError::ParseError { message: e.to_string() };
                return self.error_response(STATUS_OK, None, None, &err);
            }
        };

        let id = JsonRpcRequest::peek_id(&body);
        let rpc = match JsonRpcRequest::from_value(body) {
            Ok(rpc) => rpc,
            Err(err) => return self.error_response(STATUS_OK, id, None, &err),
        };

        let session_id = self.session_id(&request);
        let protocol_version = request
            .header(MCP_PROTOCOL_VERSION_HEADER)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.settings.default_protocol_version.clone());

        let identity = match self.identify(&request).await {
            Ok(identity) => identity,
            Err(err) => return self.error_response(STATUS_OK, rpc.id, session_id.as_deref(), &err),
        };

        let Some(method) = McpMethod::parse(&rpc.method) else {
            debug!("Unknown method '{}'", rpc.method);
            let err = McpError::MethodNotFound { method: rpc.method.clone() };
            return self.error_response(STATUS_OK, rpc.id, session_id.as_deref(), &err);
        };

        let session_id = match (method, session_id) {
            (McpMethod::Initialize, None) => {
                let issued = generate_session_id();
                debug!("Issued a new session id");
                Some(issued)
            }
            (_, session_id) => session_id,
        };

        let context = RequestContext::new(protocol_version)
            .with_session(session_id.clone())
            .with_identity(identity)
            .with_cancellation(request.cancellation.clone().unwrap_or_else(CancellationToken::new));

        debug!(
            "Dispatching '{}' (request {}, session {:?})",
            method.as_str(),
            context.request_id,
            context.session_id
        );

        let outcome = AssertUnwindSafe(self.execute(method, rpc.params.as_ref(), &context))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                let message = panic_message(panic);
                error!("Handler for '{}' panicked: {}", method.as_str(), message);
                Err(McpError::internal(message))
            });

        match outcome {
            Ok(result) => {
                let response = JsonRpcResponse::success(rpc.id, result);
                self.rpc_response(STATUS_OK, &response, session_id.as_deref())
            }
            Err(err @ McpError::Authentication { .. }) => {
                warn!("Authentication required for '{}'", method.as_str());
                let challenge = self
                    .auth
                    .as_ref()
                    .and_then(|validator| guard_hook("www_authenticate", || validator.www_authenticate()))
                    .unwrap_or_else(|| DEFAULT_WWW_AUTHENTICATE.to_string());
                let err = McpError::Authentication {
                    message: self.auth_message(&request, err),
                };
                self.error_response(STATUS_UNAUTHORIZED, rpc.id, session_id.as_deref(), &err)
                    .with_header(WWW_AUTHENTICATE_HEADER, challenge)
            }
            Err(err) => self.error_response(STATUS_OK, rpc.id, session_id.as_deref(), &err),
        }
    }

    async fn execute(
        &self,
        method: McpMethod,
        params: Option<&Map<String, Value>>,
        context: &RequestContext,
    ) -> Result<Value, McpError> {
        match method {
            McpMethod::Initialize => self.initialize(params, context),
            McpMethod::Initialized => Ok(Value::Null),
            McpMethod::Ping => Ok(json!({})),
            McpMethod::ToolsList => to_result(&ListToolsResult {
                tools: self.tools.definitions(),
            }),
            McpMethod::ToolsCall => self.call_tool(params, context).await,
            McpMethod::ResourcesList => to_result(&ListResourcesResult {
                resources: self.resources.list_all(context).await,
            }),
            McpMethod::ResourcesRead => self.read_resource(params, context).await,
        }
    }

    fn initialize(
        &self,
        params: Option<&Map<String, Value>>,
        context: &RequestContext,
    ) -> Result<Value, McpError> {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);
        let protocol_version = self.settings.negotiate_protocol_version(requested);
        debug!(
            "Initialize: client asked for {:?}, answering {} (session {:?})",
            requested, protocol_version, context.session_id
        );

        let capabilities = ServerCapabilities {
            tools: Some(json!({})),
            resources: self.resources.has_resources().then(|| json!({})),
        };

        to_result(&InitializeResult {
            protocol_version,
            capabilities,
            server_info: Implementation {
                name: self.settings.server_name.clone(),
                version: self.settings.server_version.clone(),
            },
            instructions: self.settings.instructions.clone(),
        })
    }

    async fn call_tool(
        &self,
        params: Option<&Map<String, Value>>,
        context: &RequestContext,
    ) -> Result<Value, McpError> {
        let name = required_string(params, "name")?;
        if !self.tools.exists(name) {
            return Err(ToolError::NotFound(name.to_string()).into());
        }
        self.authorize(self.tools.is_anonymous(name), context)?;

        let arguments = params.and_then(|p| p.get("arguments"));
        match self.tools.invoke(name, context.clone(), arguments).await {
            Ok(output) => to_result(&output.into_call_result(&self.settings.json)),
            Err(err) => {
                match &err {
                    ToolError::InvalidParameters(msg) => warn!("Tool '{}' rejected arguments: {}", name, msg),
                    other => error!("Tool '{}' failed: {}", name, other),
                }
                Err(err.into())
            }
        }
    }

    async fn read_resource(
        &self,
        params: Option<&Map<String, Value>>,
        context: &RequestContext,
    ) -> Result<Value, McpError> {
        let uri = required_string(params, "uri")?;
        if !self.resources.matches(uri) {
            return Err(McpError::ResourceNotFound { uri: uri.to_string() });
        }
        self.authorize(self.resources.is_anonymous(uri), context)?;

        match self.resources.read(uri, context.clone(), &self.settings.json).await {
            Ok(result) => to_result(&result),
            Err(err) => {
                if !matches!(err, ResourceError::NotFound(_)) {
                    error!("Resource '{}' failed: {}", uri, err);
                }
                Err(err.into())
            }
        }
    }

    /// Ask the validator for an identity. A panicking validator becomes an
    /// internal error.
    async fn identify(&self, request: &McpHttpRequest) -> Result<Option<Identity>, McpError> {
        let Some(validator) = &self.auth else {
            return Ok(None);
        };
        AssertUnwindSafe(auth::authenticate(validator.as_ref(), request))
            .catch_unwind()
            .await
            .map_err(|panic| {
                let message = panic_message(panic);
                error!("Auth validator panicked: {}", message);
                McpError::internal(message)
            })
    }

    /// Per-item check; only applies when a validator is installed
    fn authorize(&self, allow_anonymous: bool, context: &RequestContext) -> Result<(), McpError> {
        if self.auth.is_none() || allow_anonymous || context.is_authenticated() {
            return Ok(());
        }
        Err(McpError::Authentication {
            message: DEFAULT_AUTH_ERROR.to_string(),
        })
    }

    fn auth_message(&self, request: &McpHttpRequest, err: McpError) -> String {
        self.auth
            .as_ref()
            .and_then(|validator| guard_hook("auth_error", || validator.auth_error(request)))
            .unwrap_or_else(|| err.to_string())
    }

    fn session_id(&self, request: &McpHttpRequest) -> Option<String> {
        let id = request.header(MCP_SESSION_ID_HEADER)?;
        if is_valid_session_id(id) {
            Some(id.to_string())
        } else {
            warn!("Ignoring malformed session id header");
            None
        }
    }

    fn rpc_response(&self, status: u16, body: &JsonRpcResponse, session_id: Option<&str>) -> McpHttpResponse {
        let response = McpHttpResponse::json(status, body, self.settings.json.pretty);
        match session_id {
            Some(id) => response.with_header(MCP_SESSION_ID_HEADER, id),
            None => response,
        }
    }

    fn error_response(
        &self,
        status: u16,
        id: Option<Value>,
        session_id: Option<&str>,
        err: &McpError,
    ) -> McpHttpResponse {
        let body = JsonRpcResponse::error(id, err.to_jsonrpc_error());
        self.rpc_response(status, &body, session_id)
    }
}

fn required_string<'a>(params: Option<&'a Map<String, Value>>, key: &str) -> Result<&'a str, McpError> {
    params
        .and_then(|p| p.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| McpError::invalid_params(format!("Missing required parameter: {}", key)))
}

fn to_result<T: Serialize>(value: &T) -> Result<Value, McpError> {
    serde_json::to_value(value).map_err(|e| McpError::internal(e.to_string()))
}

/// Run a synchronous validator hook; a panic counts as "no value"
fn guard_hook<T>(hook: &str, f: impl FnOnce() -> Option<T>) -> Option<T> {
    std::panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|panic| {
        error!("Auth validator panicked in {}: {}", hook, panic_message(panic));
        None
    })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_table_is_exact() {
        assert_eq!(McpMethod::parse("tools/call"), Some(McpMethod::ToolsCall));
        assert_eq!(McpMethod::parse("Tools/Call"), None);
        assert_eq!(McpMethod::parse("tools/unknown"), None);
        assert_eq!(McpMethod::ResourcesRead.as_str(), "resources/read");
    }

    #[test]
    fn panic_payloads_become_messages() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new(String::from("bang"))), "bang");
        assert_eq!(panic_message(Box::new(7)), "Handler panicked");
    }

    #[test]
    fn panicking_hooks_yield_no_value() {
        assert_eq!(guard_hook::<String>("auth_error", || panic!("hook bug")), None);
        assert_eq!(guard_hook("www_authenticate", || Some("Basic")), Some("Basic"));
    }

    #[test]
    fn missing_string_params_are_invalid() {
        let mut params = Map::new();
        params.insert("name".into(), json!(""));
        assert!(matches!(
            required_string(Some(&params), "name"),
            Err(McpError::InvalidParams { .. })
        ));
        assert!(required_string(None, "uri").is_err());

        params.insert("uri".into(), json!("a://b"));
        assert_eq!(required_string(Some(&params), "uri").unwrap(), "a://b");
    }
}
