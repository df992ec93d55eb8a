// Per-request context handed to tool and resource handlers

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::auth::Identity;

/// Context for a single inbound request
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique id for log correlation
    pub request_id: String,
    /// Session id, issued or echoed
    pub session_id: Option<String>,
    /// Protocol version from the request header, or the configured default
    pub protocol_version: String,
    /// Caller identity, `None` when anonymous
    pub identity: Option<Identity>,
    /// Signal triggered by the host when the request should stop
    pub cancellation: CancellationToken,
}

impl RequestContext {
    /// Fresh context with a new request id, no session and no identity
    pub fn new(protocol_version: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            session_id: None,
            protocol_version: protocol_version.into(),
            identity: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Attach the issued or echoed session id
    pub fn with_session(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    /// Attach the identity established by the validator
    pub fn with_identity(mut self, identity: Option<Identity>) -> Self {
        self.identity = identity;
        self
    }

    /// Replace the cancellation token with the host's
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Whether the validator established an identity
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Whether the host has signalled cancellation
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
