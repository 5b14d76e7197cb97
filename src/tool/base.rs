use crate::config::ConfigError;
use crate::search::SearchError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a search tool hands back to the calling agent: a text rendering of the
/// hits for the model plus structured metadata for the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Short label, e.g. `Web search: rust async`
    pub title: String,
    /// Numbered listing of the results, or the soft error
    pub output: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ToolResult {
    pub fn new(title: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            output: output.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Tool execution errors
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Base tool trait - every search tool exposed to an agent implements this
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool identifier (e.g., "brave_search")
    fn id(&self) -> &str;

    /// Human-readable description for the model
    fn description(&self) -> &str;

    /// JSON schema for tool parameters
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with given parameters
    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError>;
}
