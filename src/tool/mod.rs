pub mod base;
pub mod web_search;

pub use web_search::{
    create_brave_search_tool, create_brave_search_tool_with, create_searxng_search_tool,
    create_searxng_search_tool_with, SearchTool,
};

use crate::config::AppConfig;
use base::{Tool, ToolError, ToolResult};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Tool registry - the search tools an agent can call
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a search tool for every backend the config enables
    pub fn from_config(config: &AppConfig) -> Result<Self, ToolError> {
        let mut registry = Self::new();

        if config.brave().is_enabled() {
            registry.insert_tool(Arc::new(create_brave_search_tool(config)?));
        }
        if config.searxng().is_enabled() {
            registry.insert_tool(Arc::new(create_searxng_search_tool(config)?));
        }

        tracing::debug!(tools = ?registry.list_names(), "tool registry built");
        Ok(registry)
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Look up `name` and run it
    pub async fn execute(&self, name: &str, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.execute(params).await
    }

    /// Tool definitions in the `{name, description, input_schema}` shape
    pub fn list_tool_definitions(&self) -> Vec<serde_json::Value> {
        self.tools
            .values()
            .map(|tool| {
                json!({
                    "name": tool.id(),
                    "description": tool.description(),
                    "input_schema": tool.input_schema(),
                })
            })
            .collect()
    }

    /// Get all tool names, sorted
    pub fn list_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Insert a tool under its own id, replacing any previous one
    pub fn insert_tool(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.id().to_string(), tool);
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
