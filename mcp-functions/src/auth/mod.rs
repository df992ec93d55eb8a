// Authentication module for the MCP dispatcher
//
// Concrete validators (JWT, API keys, ...) live outside this crate. The
// dispatcher only knows the `AuthValidator` contract defined here and asks it
// for an optional caller identity on every request.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::dispatch::transport::McpHttpRequest;

/// Message used when a validator does not supply its own
pub const DEFAULT_AUTH_ERROR: &str = "Authentication required";

/// Identity established for a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Subject (user id, key id, client id)
    pub subject: String,
    /// Additional claims attached by the validator
    #[serde(default)]
    pub claims: HashMap<String, String>,
}

impl Identity {
    /// Identity for `subject` with no claims
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            claims: HashMap::new(),
        }
    }

    /// Attach a claim
    pub fn with_claim(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.insert(key.into(), value.into());
        self
    }

    /// Look up a claim
    pub fn claim(&self, key: &str) -> Option<&str> {
        self.claims.get(key).map(String::as_str)
    }
}

/// Pluggable request authentication.
///
/// Implementors override `validate_async`, `validate`, or both. The dispatcher
/// tries the asynchronous check first and falls back to the synchronous one
/// when it yields no identity. Returning `None` does not reject the request by
/// itself; tools and resources that do not allow anonymous access do.
#[async_trait]
pub trait AuthValidator: Send + Sync {
    /// Asynchronous identity check
    async fn validate_async(&self, _request: &McpHttpRequest) -> Option<Identity> {
        None
    }

    /// Synchronous identity check
    fn validate(&self, _request: &McpHttpRequest) -> Option<Identity> {
        None
    }

    /// Error message reported when authentication is required but missing
    fn auth_error(&self, _request: &McpHttpRequest) -> Option<String> {
        None
    }

    /// Value of the `WWW-Authenticate` challenge sent with 401 responses
    fn www_authenticate(&self) -> Option<String> {
        None
    }
}

/// Run a validator: asynchronous check first, synchronous fallback second
pub async fn authenticate(validator: &dyn AuthValidator, request: &McpHttpRequest) -> Option<Identity> {
    match validator.validate_async(request).await {
        Some(identity) => Some(identity),
        None => validator.validate(request),
    }
}
