// API module for the MCP server
//
// This module hosts the dispatcher on actix-web: the MCP endpoint, a health
// check, and the server bootstrap.

mod routes;
pub mod handlers;

pub use routes::configure as configure_routes;

use actix_web::{middleware, web, App, HttpServer};
use log::info;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use crate::dispatch::McpDispatcher;
use handlers::mcp::McpEndpoint;

/// Initialize the API server with the appropriate routes and middleware
pub async fn init_server(settings: Arc<Settings>, dispatcher: McpDispatcher) -> std::io::Result<()> {
    let endpoint = web::Data::new(McpEndpoint::new(
        dispatcher,
        Duration::from_secs(settings.server.request_timeout),
    ));
    let path = settings.mcp.endpoint.clone();

    info!(
        "Starting MCP server on {}:{}{}",
        settings.server.host, settings.server.port, path
    );

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(endpoint.clone())
            .configure(|cfg| configure_routes(cfg, &path))
    });

    if settings.server.workers > 0 {
        server = server.workers(settings.server.workers);
    }

    server
        .bind((settings.server.host.as_str(), settings.server.port))?
        .run()
        .await
}

/// Health check handler
pub async fn health_check() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
