use std::env;
use std::process;
use std::sync::Arc;

use anyhow::Result;
use log::{error, info};
use serde_json::json;

use mcp_functions::models::ToolAnnotations;
use mcp_functions::resources::resource_fn;
use mcp_functions::tools::handler_fn;
use mcp_functions::{
    api, config, FieldShape, McpDispatcher, ResourceDefinition, ResourceError, ResourceRegistry,
    ToolDescriptor, ToolError, ToolRegistry,
};

fn demo_tools() -> ToolRegistry {
    ToolRegistry::new().with_tool(
        ToolDescriptor::new(
            "echo",
            handler_fn(|args| async move {
                let message: String = args.get("message")?;
                Ok::<_, ToolError>(message)
            }),
        )
        .description("Return the message unchanged")
        .allow_anonymous()
        .annotations(ToolAnnotations {
            read_only_hint: Some(true),
            idempotent_hint: Some(true),
            ..Default::default()
        })
        .argument(FieldShape::of::<String>("message").description("Text to echo back")),
    )
}

fn demo_resources() -> Result<ResourceRegistry> {
    let registry = ResourceRegistry::new().with_resource(
        ResourceDefinition::new(
            "server://info",
            "Server information",
            resource_fn(|_| async {
                Ok::<_, ResourceError>(Some(json!({
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                })))
            }),
        )
        .description("Name and version of this server")
        .allow_anonymous(),
    )?;
    Ok(registry)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Get configuration path from command line arguments
    let config_path = env::args().nth(1);

    // Load configuration
    let settings = match config::load_config(config_path.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Initialize logging
    mcp_functions::init_logging(&settings);
    info!("Starting mcp-functions server version {}", env!("CARGO_PKG_VERSION"));

    let tools = demo_tools();
    let resources = demo_resources()?;
    info!(
        "Registered {} tools and {} resources",
        tools.len(),
        resources.list_static().len()
    );

    let dispatcher = McpDispatcher::new(Arc::new(settings.mcp.clone()), tools, resources);

    // Start the API server
    match api::init_server(settings, dispatcher).await {
        Ok(_) => {
            info!("mcp-functions server stopped gracefully");
            Ok(())
        }
        Err(e) => {
            error!("Error starting mcp-functions server: {}", e);
            process::exit(1);
        }
    }
}
