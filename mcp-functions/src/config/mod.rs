// Configuration module for the MCP dispatcher
//
// This module handles loading and managing configuration settings.

mod settings;

pub use settings::{JsonOptions, McpSettings, ServerSettings, Settings, ENV_PREFIX};

use std::sync::Arc;
use crate::errors::ServerError;

/// Default location of the settings file
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Load configuration from a file
pub fn load_config(path: Option<&str>) -> Result<Arc<Settings>, ServerError> {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    let settings = settings::load(config_path)
        .map_err(|e| ServerError::Config(format!("Failed to load config: {}", e)))?;
    settings
        .validate()
        .map_err(|e| ServerError::Config(format!("Invalid config: {}", e)))?;
    Ok(Arc::new(settings))
}

/// Save configuration to a file
pub fn save_config(config: &Settings, path: &str) -> Result<(), ServerError> {
    settings::save(config, path)
        .map_err(|e| ServerError::Config(format!("Failed to save config: {}", e)))
}
