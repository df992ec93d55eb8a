// The actix-web host adapter: routing, header and status passthrough, and
// the request timeout signal.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use mcp_functions::api::configure_routes;
use mcp_functions::api::handlers::mcp::McpEndpoint;
use mcp_functions::tools::handler_fn;
use mcp_functions::{McpDispatcher, McpSettings, ResourceRegistry, ToolDescriptor, ToolError, ToolRegistry};

fn dispatcher() -> McpDispatcher {
    let tools = ToolRegistry::new()
        .with_tool(
            ToolDescriptor::new(
                "echo",
                handler_fn(|args| async move {
                    let message: String = args.get("message")?;
                    Ok::<_, ToolError>(message)
                }),
            )
            .arg::<String>("message"),
        )
        .with_tool(
            ToolDescriptor::new(
                "wait_for_cancel",
                handler_fn(|args| async move {
                    args.cancellation().cancelled().await;
                    Ok::<_, ToolError>("cancelled")
                }),
            )
            .with_cancellation(),
        );
    McpDispatcher::new(Arc::new(McpSettings::default()), tools, ResourceRegistry::new())
}

fn endpoint(timeout: Duration) -> web::Data<McpEndpoint> {
    web::Data::new(McpEndpoint::new(dispatcher(), timeout))
}

fn rpc(id: i64, method: &str, params: Value) -> String {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string()
}

#[actix_rt::test]
async fn post_reaches_the_dispatcher() {
    let app = test::init_service(
        App::new()
            .app_data(endpoint(Duration::from_secs(5)))
            .configure(|cfg| configure_routes(cfg, "/mcp")),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/mcp")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(rpc(1, "tools/call", json!({"name": "echo", "arguments": {"message": "hi"}})))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({"jsonrpc": "2.0", "id": 1, "result": {"content": [{"type": "text", "text": "hi"}]}})
    );
}

#[actix_rt::test]
async fn initialize_sets_the_session_header() {
    let app = test::init_service(
        App::new()
            .app_data(endpoint(Duration::from_secs(5)))
            .configure(|cfg| configure_routes(cfg, "/mcp")),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/mcp")
        .set_payload(rpc(1, "initialize", json!({})))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("mcp-session-id"));
}

#[actix_rt::test]
async fn get_on_the_endpoint_is_405() {
    let app = test::init_service(
        App::new()
            .app_data(endpoint(Duration::from_secs(5)))
            .configure(|cfg| configure_routes(cfg, "/mcp")),
    )
    .await;

    let req = test::TestRequest::get().uri("/mcp").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        resp.headers().get("allow").and_then(|v| v.to_str().ok()),
        Some("POST")
    );
}

#[actix_rt::test]
async fn custom_endpoint_paths_are_honored() {
    let app = test::init_service(
        App::new()
            .app_data(endpoint(Duration::from_secs(5)))
            .configure(|cfg| configure_routes(cfg, "/api/mcp")),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/mcp")
        .set_payload(rpc(2, "ping", json!({})))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["result"], json!({}));
}

#[actix_rt::test]
async fn health_and_not_found() {
    let app = test::init_service(
        App::new()
            .app_data(endpoint(Duration::from_secs(5)))
            .configure(|cfg| configure_routes(cfg, "/mcp")),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");

    let req = test::TestRequest::get().uri("/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn request_timeout_signals_cancellation() {
    let app = test::init_service(
        App::new()
            .app_data(endpoint(Duration::from_millis(50)))
            .configure(|cfg| configure_routes(cfg, "/mcp")),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/mcp")
        .set_payload(rpc(3, "tools/call", json!({"name": "wait_for_cancel"})))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["result"]["content"][0]["text"], "cancelled");
}
