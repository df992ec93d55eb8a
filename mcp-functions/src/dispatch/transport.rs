// Host-neutral HTTP model
//
// The dispatcher consumes an `McpHttpRequest` and produces an
// `McpHttpResponse`. Hosts (actix-web, serverless triggers, tests) translate
// to and from their own types at the edge.

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

pub const MCP_SESSION_ID_HEADER: &str = "Mcp-Session-Id";
pub const MCP_PROTOCOL_VERSION_HEADER: &str = "MCP-Protocol-Version";
pub const ORIGIN_HEADER: &str = "Origin";
pub const ALLOW_HEADER: &str = "Allow";
pub const WWW_AUTHENTICATE_HEADER: &str = "WWW-Authenticate";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

pub const STATUS_OK: u16 = 200;
pub const STATUS_UNAUTHORIZED: u16 = 401;
pub const STATUS_FORBIDDEN: u16 = 403;
pub const STATUS_METHOD_NOT_ALLOWED: u16 = 405;

/// An inbound HTTP request
#[derive(Debug, Clone, Default)]
pub struct McpHttpRequest {
    /// HTTP verb, upper case
    pub method: String,
    headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Cancellation signal supplied by the host; a fresh token is used when absent
    pub cancellation: Option<CancellationToken>,
}

impl McpHttpRequest {
    /// Request with the given verb (uppercased) and body
    pub fn new(method: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            headers: Vec::new(),
            body: body.into(),
            cancellation: None,
        }
    }

    /// POST request with a body
    pub fn post(body: impl Into<Vec<u8>>) -> Self {
        Self::new("POST", body)
    }

    /// GET request with no body
    pub fn get() -> Self {
        Self::new("GET", Vec::new())
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach the host's cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// First value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// All headers in arrival order
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// An outbound HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpHttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl McpHttpResponse {
    /// Response with a status and no body
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: None,
        }
    }

    /// A JSON response. Serialization of the crate's own envelope types cannot
    /// fail; should it anyway, the body degrades to `null`.
    pub fn json<T: Serialize>(status: u16, body: &T, pretty: bool) -> Self {
        let bytes = if pretty {
            serde_json::to_vec_pretty(body)
        } else {
            serde_json::to_vec(body)
        };
        Self {
            status,
            headers: vec![(CONTENT_TYPE_HEADER.to_string(), JSON_CONTENT_TYPE.to_string())],
            body: Some(bytes.unwrap_or_else(|_| b"null".to_vec())),
        }
    }

    /// 405 advertising `Allow: POST`
    pub fn method_not_allowed() -> Self {
        Self::empty(STATUS_METHOD_NOT_ALLOWED).with_header(ALLOW_HEADER, "POST")
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body parsed as JSON, if there is one
    pub fn body_json(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_case_insensitive() {
        let req = McpHttpRequest::post("{}").with_header("mcp-session-id", "abc");
        assert_eq!(req.header(MCP_SESSION_ID_HEADER), Some("abc"));
        assert_eq!(req.header("ORIGIN"), None);
    }

    #[test]
    fn verbs_are_normalized() {
        assert_eq!(McpHttpRequest::new("delete", "").method, "DELETE");
    }

    #[test]
    fn method_not_allowed_advertises_post() {
        let resp = McpHttpResponse::method_not_allowed();
        assert_eq!(resp.status, 405);
        assert_eq!(resp.header("allow"), Some("POST"));
        assert!(resp.body.is_none());
    }

    #[test]
    fn json_responses_carry_content_type() {
        let resp = McpHttpResponse::json(200, &serde_json::json!({"a": 1}), false);
        assert_eq!(resp.header("content-type"), Some(JSON_CONTENT_TYPE));
        assert_eq!(resp.body_json(), Some(serde_json::json!({"a": 1})));
    }
}
