// Tool registry module
//
// This module defines the tool registry which holds the registered tools,
// answers discovery queries and invokes tools by name. It is filled once at
// startup and read concurrently afterwards.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde_json::Value;

use crate::dispatch::RequestContext;
use crate::errors::ToolError;
use crate::models::ToolDefinition;

use super::{bind_arguments, ToolDescriptor, ToolOutput};

struct RegisteredTool {
    descriptor: ToolDescriptor,
    definition: ToolDefinition,
}

/// ToolRegistry manages tool registration and discovery
#[derive(Default)]
pub struct ToolRegistry {
    // keyed by lower-cased name
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names are case-insensitive and the last registration
    /// for a name replaces any earlier one.
    pub fn register(&mut self, descriptor: ToolDescriptor) {
        let key = descriptor.name.to_lowercase();
        let definition = descriptor.definition();
        let name = descriptor.name.clone();

        let previous = self.tools.insert(key, RegisteredTool { descriptor, definition });
        match previous {
            Some(old) => warn!(
                "Tool '{}' replaces earlier registration '{}'",
                name, old.descriptor.name
            ),
            None => debug!("Registered tool '{}'", name),
        }
    }

    /// Builder form of [`ToolRegistry::register`]
    pub fn with_tool(mut self, descriptor: ToolDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Definitions of all tools, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition.clone()).collect()
    }

    /// Definition of one tool
    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.lookup(name).map(|tool| &tool.definition)
    }

    /// Whether a tool with this name exists (case-insensitive)
    pub fn exists(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Whether a tool may be called anonymously; false for unknown names
    pub fn is_anonymous(&self, name: &str) -> bool {
        self.lookup(name)
            .map_or(false, |tool| tool.descriptor.allow_anonymous)
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Bind the raw arguments and run the named tool
    pub async fn invoke(
        &self,
        name: &str,
        context: RequestContext,
        arguments: Option<&Value>,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .lookup(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        debug!(
            "Invoking tool '{}' (request {})",
            tool.descriptor.name, context.request_id
        );
        let args = bind_arguments(&tool.descriptor.plan, context, arguments)?;
        tool.descriptor.handler().call(args).await
    }

    fn lookup(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(&name.to_lowercase())
    }
}
