// API handlers for the MCP server
//
// This module contains the request handlers for the MCP server API endpoints
// and the conversions between actix-web types and the dispatcher's
// host-neutral request/response model.

pub mod mcp;

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use tokio_util::sync::CancellationToken;

use crate::dispatch::{McpHttpRequest, McpHttpResponse};
use crate::errors::ServerError;

/// Build a dispatcher request from an actix-web request and its body
pub fn to_mcp_request(req: &HttpRequest, body: web::Bytes, cancellation: CancellationToken) -> McpHttpRequest {
    let mut request = McpHttpRequest::new(req.method().as_str(), body.to_vec())
        .with_cancellation(cancellation);

    for (name, value) in req.headers() {
        // Non-visible-ASCII header values are skipped
        if let Ok(value) = value.to_str() {
            request = request.with_header(name.as_str(), value);
        }
    }
    request
}

/// Turn a dispatcher response into an actix-web response
pub fn to_http_response(response: McpHttpResponse) -> Result<HttpResponse, ServerError> {
    let status = StatusCode::from_u16(response.status)
        .map_err(|e| ServerError::Internal(format!("Invalid status {}: {}", response.status, e)))?;

    let mut builder = HttpResponse::build(status);
    for (name, value) in &response.headers {
        builder.insert_header((name.as_str(), value.as_str()));
    }

    Ok(match response.body {
        Some(body) => builder.body(body),
        None => builder.finish(),
    })
}
