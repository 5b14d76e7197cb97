use crate::config::{AppConfig, ConfigError};
use crate::search::{
    Backend, BraveClientOptions, BraveSearchClient, SearchError, SearchProvider, SearchResults,
    SearxngClientOptions, SearxngSearchClient,
};
use crate::tool::base::{Tool, ToolError, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Results requested when the caller does not say
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// A configured backend bound to the uniform `(query, max_results)` signature
///
/// Built once by [`create_brave_search_tool`] or [`create_searxng_search_tool`];
/// every [`SearchTool::call`] is one round trip to that backend.
#[derive(Clone)]
pub struct SearchTool {
    provider: Arc<dyn SearchProvider>,
}

impl SearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    pub fn backend(&self) -> Backend {
        self.provider.backend()
    }

    /// Run a search. Brave is always queried with `summary=false` here.
    pub async fn call(&self, query: &str, max_results: usize) -> Result<SearchResults, SearchError> {
        self.provider.search_top(query, max_results).await
    }
}

impl std::fmt::Debug for SearchTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchTool")
            .field("backend", &self.backend())
            .finish()
    }
}

/// Bind the Brave backend. Fails before any network activity if Brave is not configured.
pub fn create_brave_search_tool(config: &AppConfig) -> Result<SearchTool, ConfigError> {
    create_brave_search_tool_with(config, BraveClientOptions::default())
}

/// Same as [`create_brave_search_tool`] with explicit adapter options
pub fn create_brave_search_tool_with(
    config: &AppConfig,
    options: BraveClientOptions,
) -> Result<SearchTool, ConfigError> {
    let api_key = config.brave().api_key().ok_or_else(|| {
        ConfigError::BackendNotConfigured(
            "Brave API key not configured. Set BRAVE_API_KEY environment variable.".to_string(),
        )
    })?;

    let client = BraveSearchClient::new(api_key, options)?;
    tracing::info!(backend = "brave", "search tool initialized");
    Ok(SearchTool::new(Arc::new(client)))
}

/// Bind the SearXNG backend. Fails before any network activity if SearXNG is not configured.
pub fn create_searxng_search_tool(config: &AppConfig) -> Result<SearchTool, ConfigError> {
    create_searxng_search_tool_with(config, None)
}

/// Same as [`create_searxng_search_tool`], optionally reusing a shared HTTP client
pub fn create_searxng_search_tool_with(
    config: &AppConfig,
    client: Option<reqwest::Client>,
) -> Result<SearchTool, ConfigError> {
    let searxng = config.searxng();
    let base_url = searxng.base_url().ok_or_else(|| {
        ConfigError::BackendNotConfigured(
            "SearXNG base URL not configured. Set SEARXNG_BASE_URL environment variable."
                .to_string(),
        )
    })?;

    let options = SearxngClientOptions {
        client,
        ..SearxngClientOptions::from(searxng)
    };
    let adapter = SearxngSearchClient::new(base_url, options)?;
    tracing::info!(backend = "searxng", base_url = %adapter.base_url(), "search tool initialized");
    Ok(SearchTool::new(Arc::new(adapter)))
}

#[derive(Debug, Deserialize)]
struct WebSearchParams {
    query: String,
    #[serde(default)]
    max_results: Option<i64>,
}

#[async_trait]
impl Tool for SearchTool {
    fn id(&self) -> &str {
        match self.backend() {
            Backend::Brave => "brave_search",
            Backend::Searxng => "searxng_search",
        }
    }

    fn description(&self) -> &str {
        match self.backend() {
            Backend::Brave => {
                "Search the web with the Brave Search API and return ranked results \
                 (title, URL, snippet, source domain)."
            }
            Backend::Searxng => {
                "Search the web through a self-hosted SearXNG meta-search instance and \
                 return ranked results (title, URL, snippet, source host)."
            }
        }
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "minLength": 1,
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "minimum": 0,
                    "default": DEFAULT_MAX_RESULTS,
                    "description": "Maximum number of results to return"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        let params: WebSearchParams =
            serde_json::from_value(params).map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        if params.query.trim().is_empty() {
            return Err(ToolError::InvalidParams("query cannot be empty".into()));
        }

        let max_results = params
            .max_results
            .map(|n| usize::try_from(n).unwrap_or(0))
            .unwrap_or(DEFAULT_MAX_RESULTS);

        let results = self.call(&params.query, max_results).await?;

        Ok(ToolResult::new(format!("Web search: {}", params.query), render(&results))
            .with_metadata("backend", json!(results.backend))
            .with_metadata("num_results", json!(results.results.len()))
            .with_metadata("total", json!(results.total))
            .with_metadata("error", json!(results.error))
            .with_metadata("results", results_without_raw(&results)))
    }
}

fn render(results: &SearchResults) -> String {
    let mut output = format!("Search: {}\n", results.query);
    output.push_str(&format!(
        "Found {} results via {}{}\n\n",
        results.results.len(),
        results.backend,
        match results.total {
            Some(total) => format!(" (total available: {total})"),
            None => String::new(),
        }
    ));

    if results.results.is_empty() {
        let reason = results.error.as_deref().unwrap_or("No results found.");
        output.push_str(reason);
        output.push('\n');
        return output;
    }

    for (idx, item) in results.results.iter().enumerate() {
        let position = item.rank.unwrap_or(idx as i64 + 1);
        output.push_str(&format!("{}. {}\n   {}\n", position, item.title, item.url));
        if !item.snippet.is_empty() {
            output.push_str(&format!("   {}\n", item.snippet));
        }
        output.push('\n');
    }

    output
}

fn results_without_raw(results: &SearchResults) -> serde_json::Value {
    let items: Vec<_> = results
        .results
        .iter()
        .cloned()
        .map(|mut item| {
            item.raw = None;
            item
        })
        .collect();
    json!(items)
}
