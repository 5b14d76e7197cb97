pub mod http;
pub mod providers;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use providers::brave::{BraveClientOptions, BraveSearchClient, BraveSearchError, BraveSearchRequest};
pub use providers::searxng::{
    SearxngClientOptions, SearxngSearchClient, SearxngSearchError, SearxngSearchRequest,
};

/// Search provider abstraction - each backend adapter plugs in here
///
/// `search_top` is the uniform `(query, max_results)` entry point used by the
/// tool layer. Backend-specific knobs live on each adapter's own `search`.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Which backend this provider talks to
    fn backend(&self) -> Backend;

    /// Run a single search with backend-appropriate defaults
    async fn search_top(&self, query: &str, max_results: usize) -> Result<SearchResults, SearchError>;
}

/// Backend discriminator carried on every [`SearchResults`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Backend {
    Brave,
    Searxng,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Brave => "brave",
            Backend::Searxng => "searxng",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<&str> for Backend {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Individual normalized search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title
    pub title: String,
    /// Page URL
    pub url: String,
    /// Snippet/description of the page content
    pub snippet: String,
    /// Domain or hostname the result came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// 1-based position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    /// Backend-specific payload for this item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            source: None,
            rank: None,
            raw: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_rank(mut self, rank: i64) -> Self {
        self.rank = Some(rank);
        self
    }
}

/// Search results container, one per search call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// The query as the caller sent it
    pub query: String,
    /// Backend that produced these results
    pub backend: Backend,
    /// Results in rank order
    #[serde(default)]
    pub results: Vec<SearchResult>,
    /// Backend-reported total; may exceed `results.len()`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Follow-up token for Brave's summarizer endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarizer_key: Option<String>,
    /// Soft error: the call succeeded but produced no usable result list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Full backend response, kept for diagnostics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

impl SearchResults {
    pub fn new(query: impl Into<String>, backend: Backend) -> Self {
        Self {
            query: query.into(),
            backend,
            results: Vec::new(),
            total: None,
            summarizer_key: None,
            error: None,
            raw: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }
}

/// Errors from any backend, as seen through [`SearchProvider`]
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Brave(#[from] BraveSearchError),

    #[error(transparent)]
    Searxng(#[from] SearxngSearchError),
}

impl SearchError {
    pub fn backend(&self) -> Backend {
        match self {
            SearchError::Brave(_) => Backend::Brave,
            SearchError::Searxng(_) => Backend::Searxng,
        }
    }
}
