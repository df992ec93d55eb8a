// MCP endpoint handler
//
// Forwards every request on the endpoint to the dispatcher. The request's
// cancellation signal fires once the configured timeout elapses; observing it
// is up to the tool and resource handlers.

use std::time::Duration;

use actix_rt::task::JoinHandle;
use actix_web::{web, HttpRequest, HttpResponse};
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::api::handlers::{to_http_response, to_mcp_request};
use crate::dispatch::McpDispatcher;
use crate::errors::ServerError;

/// Application data for the MCP endpoint
#[derive(Clone)]
pub struct McpEndpoint {
    pub dispatcher: McpDispatcher,
    pub request_timeout: Duration,
}

impl McpEndpoint {
    /// Serve `dispatcher`, cancelling each request after `request_timeout`
    pub fn new(dispatcher: McpDispatcher, request_timeout: Duration) -> Self {
        Self {
            dispatcher,
            request_timeout,
        }
    }
}

/// Timer that cancels a request's token once the timeout elapses. Dropping
/// the guard stops the timer, so it never outlives the request.
pub struct TimeoutGuard {
    timer: JoinHandle<()>,
}

impl TimeoutGuard {
    /// Spawn the timer on the current actix runtime
    pub fn start(token: CancellationToken, timeout: Duration) -> Self {
        let timer = actix_rt::spawn(async move {
            tokio::time::sleep(timeout).await;
            debug!("Request timed out after {:?}; signalling cancellation", timeout);
            token.cancel();
        });
        Self { timer }
    }
}

impl Drop for TimeoutGuard {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

/// Handler for the MCP endpoint
pub async fn handle_mcp(
    req: HttpRequest,
    body: web::Bytes,
    endpoint: web::Data<McpEndpoint>,
) -> Result<HttpResponse, ServerError> {
    let cancellation = CancellationToken::new();

    let _timeout = TimeoutGuard::start(cancellation.clone(), endpoint.request_timeout);

    let request = to_mcp_request(&req, body, cancellation);
    let response = endpoint.dispatcher.handle(request).await;

    to_http_response(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn timer_cancels_the_token() {
        let token = CancellationToken::new();
        let _guard = TimeoutGuard::start(token.clone(), Duration::from_millis(10));
        tokio::time::timeout(Duration::from_secs(5), token.cancelled())
            .await
            .expect("token was cancelled");
    }

    #[actix_rt::test]
    async fn dropping_the_guard_stops_the_timer() {
        let token = CancellationToken::new();
        let guard = TimeoutGuard::start(token.clone(), Duration::from_millis(20));
        drop(guard);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!token.is_cancelled());
    }
}
