// Settings module for configuration
//
// This module defines the settings structure and loading/saving functions
// for the MCP dispatcher and its HTTP host.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use anyhow::Result;

/// Environment variable prefix for overrides, e.g. `MCP_FUNCTIONS_SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "MCP_FUNCTIONS";

/// HTTP host settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Number of worker threads
    pub workers: usize,
    /// Seconds after which a request's cancellation signal fires
    pub request_timeout: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: crate::defaults::SERVER_HOST.to_string(),
            port: crate::defaults::SERVER_PORT,
            workers: num_cpus::get(),
            request_timeout: crate::defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Serialization behavior for handler output and response bodies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct JsonOptions {
    /// Drop object members whose value is `null`
    pub omit_null_fields: bool,
    /// Pretty-print JSON text
    pub pretty: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            omit_null_fields: true,
            pretty: false,
        }
    }
}

impl JsonOptions {
    /// Render a value as JSON text under these options
    pub fn render(&self, value: &Value) -> String {
        let value = if self.omit_null_fields {
            strip_nulls(value.clone())
        } else {
            value.clone()
        };

        if self.pretty {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
        } else {
            value.to_string()
        }
    }
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

/// MCP protocol settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct McpSettings {
    /// Path the JSON-RPC endpoint is mounted at
    pub endpoint: String,
    /// Origins accepted from browsers; empty accepts all
    pub allowed_origins: Vec<String>,
    /// Server name reported by `initialize`
    pub server_name: String,
    /// Server version reported by `initialize`
    pub server_version: String,
    /// Optional usage instructions reported by `initialize`
    pub instructions: Option<String>,
    /// Protocol version assumed when the client does not send one
    pub default_protocol_version: String,
    /// Protocol versions `initialize` will agree to
    pub supported_protocol_versions: Vec<String>,
    /// Serialization options
    pub json: JsonOptions,
}

impl Default for McpSettings {
    fn default() -> Self {
        Self {
            endpoint: crate::defaults::ENDPOINT.to_string(),
            allowed_origins: Vec::new(),
            server_name: crate::defaults::SERVER_NAME.to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: None,
            default_protocol_version: crate::DEFAULT_PROTOCOL_VERSION.to_string(),
            supported_protocol_versions: crate::SUPPORTED_PROTOCOL_VERSIONS
                .iter()
                .map(|v| v.to_string())
                .collect(),
            json: JsonOptions::default(),
        }
    }
}

impl McpSettings {
    /// Whether a non-empty `Origin` header value passes the allow-list
    pub fn origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == origin)
    }

    /// Pick the protocol version to answer `initialize` with
    pub fn negotiate_protocol_version(&self, requested: Option<&str>) -> String {
        match requested {
            Some(version) if self.supported_protocol_versions.iter().any(|v| v == version) => {
                version.to_string()
            }
            _ => self.default_protocol_version.clone(),
        }
    }
}

/// Complete settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Environment (development, staging, production)
    pub environment: String,
    /// HTTP host settings
    pub server: ServerSettings,
    /// MCP protocol settings
    pub mcp: McpSettings,
    /// Log level
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerSettings::default(),
            mcp: McpSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        if !self.mcp.endpoint.starts_with('/') {
            return Err(format!("mcp.endpoint must start with '/': {}", self.mcp.endpoint));
        }
        if self.mcp.default_protocol_version.is_empty() {
            return Err("mcp.default_protocol_version must not be empty".to_string());
        }
        if self.server.request_timeout == 0 {
            return Err("server.request_timeout must be at least one second".to_string());
        }
        Ok(())
    }
}

/// Load settings from a TOML file with environment overrides. A missing file
/// is created with the default settings first.
pub fn load(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        save(&Settings::default(), path)?;
    }

    let settings = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize::<Settings>()?;
    Ok(settings)
}

/// Save settings to a file
pub fn save(settings: &Settings, path: impl AsRef<Path>) -> Result<()> {
    let config_str = toml::to_string_pretty(settings)?;

    // Create parent directories if they don't exist
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, config_str)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.mcp.endpoint, "/mcp");
        assert_eq!(settings.mcp.default_protocol_version, "2025-03-26");
        assert!(settings.mcp.allowed_origins.is_empty());
    }

    #[test]
    fn empty_allow_list_accepts_any_origin() {
        let mut mcp = McpSettings::default();
        assert!(mcp.origin_allowed("https://evil.example"));

        mcp.allowed_origins = vec!["https://app.example".to_string()];
        assert!(mcp.origin_allowed("https://app.example"));
        assert!(!mcp.origin_allowed("https://evil.example"));
    }

    #[test]
    fn negotiation_falls_back_to_default() {
        let mcp = McpSettings::default();
        assert_eq!(mcp.negotiate_protocol_version(Some("2024-11-05")), "2024-11-05");
        assert_eq!(mcp.negotiate_protocol_version(Some("1999-01-01")), "2025-03-26");
        assert_eq!(mcp.negotiate_protocol_version(None), "2025-03-26");
    }

    #[test]
    fn json_options_strip_nulls_and_pretty_print() {
        let value = json!({"a": 1, "b": null, "c": [{"d": null, "e": 2}]});
        let compact = JsonOptions::default().render(&value);
        assert_eq!(serde_json::from_str::<Value>(&compact).unwrap(), json!({"a": 1, "c": [{"e": 2}]}));

        let keep = JsonOptions { omit_null_fields: false, pretty: true };
        let rendered = keep.render(&value);
        assert!(rendered.contains('\n'));
        assert!(rendered.contains("\"b\": null"));
    }

    #[test]
    fn rejects_relative_endpoint() {
        let mut settings = Settings::default();
        settings.mcp.endpoint = "mcp".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let settings = load(&path).unwrap();
        assert!(path.exists());
        assert_eq!(settings.mcp, McpSettings::default());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            r#"
log_level = "debug"

[mcp]
endpoint = "/api/mcp"
allowed_origins = ["https://app.example"]
instructions = "Use the menu tools."
"#,
        )
        .unwrap();

        let settings = load(&path).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.mcp.endpoint, "/api/mcp");
        assert_eq!(settings.mcp.allowed_origins, vec!["https://app.example".to_string()]);
        assert_eq!(settings.mcp.instructions.as_deref(), Some("Use the menu tools."));
        assert_eq!(settings.server.port, crate::defaults::SERVER_PORT);
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let mut settings = Settings::default();
        settings.mcp.server_name = "menu-server".to_string();
        settings.server.port = 8123;

        save(&settings, &path).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded.mcp.server_name, "menu-server");
        assert_eq!(loaded.server.port, 8123);
    }
}
