// API routes for the MCP server
//
// This file defines the routing for the MCP server API endpoints.

use actix_web::{web, HttpResponse, Responder};
use crate::api::{handlers, health_check};

/// Configure API routes. Every HTTP verb on the MCP endpoint reaches the
/// dispatcher, which answers non-POST requests itself.
pub fn configure(cfg: &mut web::ServiceConfig, endpoint: &str) {
    cfg
        // Health check endpoint
        .route("/health", web::get().to(health_check))

        // MCP JSON-RPC endpoint
        .route(endpoint, web::route().to(handlers::mcp::handle_mcp))

        // Fallback for undefined routes
        .default_service(web::route().to(not_found));
}

/// Handler for undefined routes
async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(serde_json::json!({
        "status": "error",
        "message": "Resource not found",
    }))
}
