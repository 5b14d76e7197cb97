//! SearXNG backend
//!
//! Talks to a self-hosted SearXNG instance through its JSON API.
//! See: https://docs.searxng.org/dev/search_api.html

use crate::config::{ConfigError, SearxngConfig};
use crate::search::http::{self, ClientHandle, FetchFailure};
use crate::search::{Backend, SearchError, SearchProvider, SearchResult, SearchResults};
use serde_json::Value;
use std::time::Duration;

/// Soft error set when a response has no usable results
pub const NO_RESULTS_MESSAGE: &str = "No results found in SearXNG response";

pub const USER_AGENT: &str = concat!(
    "web-search-agent/",
    env!("CARGO_PKG_VERSION"),
    " (SearXNG JSON client)"
);

/// Failure talking to a SearXNG instance
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct SearxngSearchError {
    message: String,
}

impl SearxngSearchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<FetchFailure> for SearxngSearchError {
    fn from(failure: FetchFailure) -> Self {
        match failure {
            FetchFailure::Status { status, body } => {
                Self::new(format!("SearXNG returned status {}: {}", status.as_u16(), body))
            }
            FetchFailure::Timeout(e) => Self::new(format!("SearXNG request timed out: {e}")),
            FetchFailure::Request(e) => Self::new(format!("Request to SearXNG failed: {e}")),
            FetchFailure::Decode(e) => Self::new(format!("Failed to parse SearXNG JSON response: {e}")),
        }
    }
}

/// Construction options for [`SearxngSearchClient`]
#[derive(Debug, Clone)]
pub struct SearxngClientOptions {
    /// Shared client to reuse; `None` makes the adapter create and own one
    pub client: Option<reqwest::Client>,
    pub timeout: Duration,
    pub default_categories: Vec<String>,
    pub default_language: Option<String>,
    pub default_time_range: Option<String>,
}

impl Default for SearxngClientOptions {
    fn default() -> Self {
        Self {
            client: None,
            timeout: http::DEFAULT_TIMEOUT,
            default_categories: vec!["general".to_string()],
            default_language: None,
            default_time_range: None,
        }
    }
}

impl From<&SearxngConfig> for SearxngClientOptions {
    fn from(config: &SearxngConfig) -> Self {
        Self {
            client: None,
            timeout: config.timeout(),
            default_categories: config.default_categories().to_vec(),
            default_language: config.default_language().map(str::to_string),
            default_time_range: config.default_time_range().map(str::to_string),
        }
    }
}

/// Parameters for one SearXNG search
///
/// Unset `categories`, `language` and `time_range` fall back to the
/// adapter's defaults.
#[derive(Debug, Clone)]
pub struct SearxngSearchRequest {
    pub query: String,
    /// Keep at most this many results; 0 keeps everything
    pub max_results: usize,
    /// 1-based page number; values below 1 are sent as 1
    pub page: i64,
    pub categories: Option<Vec<String>>,
    pub language: Option<String>,
    /// `day`, `week`, `month` or `year`
    pub time_range: Option<String>,
}

impl SearxngSearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: 5,
            page: 1,
            categories: None,
            language: None,
            time_range: None,
        }
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn time_range(mut self, time_range: impl Into<String>) -> Self {
        self.time_range = Some(time_range.into());
        self
    }
}

/// SearXNG adapter
pub struct SearxngSearchClient {
    handle: ClientHandle,
    base_url: String,
    timeout: Duration,
    default_categories: Vec<String>,
    default_language: Option<String>,
    default_time_range: Option<String>,
}

impl SearxngSearchClient {
    /// Create a new adapter. Fails without touching the network if `base_url` is blank.
    ///
    /// Trailing slashes are stripped from `base_url`.
    pub fn new(base_url: &str, options: SearxngClientOptions) -> Result<Self, ConfigError> {
        if base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "base_url must be a non-empty string".to_string(),
            ));
        }

        let default_categories = if options.default_categories.is_empty() {
            vec!["general".to_string()]
        } else {
            options.default_categories
        };

        Ok(Self {
            handle: ClientHandle::new(options.client),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: options.timeout,
            default_categories,
            default_language: options.default_language,
            default_time_range: options.default_time_range,
        })
    }

    /// Build an adapter from validated config
    pub fn from_config(config: &SearxngConfig) -> Result<Self, ConfigError> {
        let base_url = config.base_url().unwrap_or_default();
        Self::new(base_url, SearxngClientOptions::from(config))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn default_categories(&self) -> &[String] {
        &self.default_categories
    }

    pub fn owns_client(&self) -> bool {
        self.handle.owns_client()
    }

    /// Release the HTTP client if this adapter created it
    pub fn close(self) -> bool {
        self.handle.release()
    }

    fn query_params(&self, request: &SearxngSearchRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", request.query.clone()),
            ("format", "json".to_string()),
            ("pageno", request.page.max(1).to_string()),
        ];

        // Blank call-site entries are dropped; nothing left means the defaults apply.
        let requested: Vec<&str> = request
            .categories
            .iter()
            .flatten()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        let categories = if requested.is_empty() {
            self.default_categories.join(",")
        } else {
            requested.join(",")
        };
        if !categories.is_empty() {
            params.push(("categories", categories));
        }

        let language = non_empty(&request.language).or_else(|| non_empty(&self.default_language));
        if let Some(language) = language {
            params.push(("language", language.to_string()));
        }

        let time_range = non_empty(&request.time_range).or_else(|| non_empty(&self.default_time_range));
        if let Some(time_range) = time_range {
            params.push(("time_range", time_range.to_string()));
        }

        params
    }

    /// Execute a search against `{base_url}/search` and normalize the response
    pub async fn search(&self, request: &SearxngSearchRequest) -> Result<SearchResults, SearxngSearchError> {
        let url = format!("{}/search", self.base_url);
        let params = self.query_params(request);

        tracing::debug!(
            query = %request.query,
            max_results = request.max_results,
            page = request.page,
            "performing searxng search"
        );

        let builder = self
            .handle
            .client()
            .get(&url)
            .timeout(self.timeout)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .query(&params);

        let data = http::fetch_json(builder).await.map_err(|failure| {
            if let FetchFailure::Status { status, body } = &failure {
                tracing::warn!(
                    status = %status,
                    error = %crate::logging::redact_secrets(body, &[]),
                    "searxng returned error status"
                );
            }
            SearxngSearchError::from(failure)
        })?;

        let results = parse_response(&request.query, data, request.max_results);

        tracing::debug!(
            query = %request.query,
            result_count = results.len(),
            total = ?results.total,
            "searxng search completed"
        );

        Ok(results)
    }
}

impl std::fmt::Debug for SearxngSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearxngSearchClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("default_categories", &self.default_categories)
            .field("default_language", &self.default_language)
            .field("default_time_range", &self.default_time_range)
            .field("owns_client", &self.owns_client())
            .finish()
    }
}

#[async_trait::async_trait]
impl SearchProvider for SearxngSearchClient {
    fn backend(&self) -> Backend {
        Backend::Searxng
    }

    async fn search_top(&self, query: &str, max_results: usize) -> Result<SearchResults, SearchError> {
        let request = SearxngSearchRequest::new(query).max_results(max_results);
        Ok(self.search(&request).await?)
    }
}

/// Normalize a SearXNG response body into [`SearchResults`]
///
/// Ranks fall back to the item's 1-based position in the raw list, counted
/// before non-object items are skipped and before truncation. `total` is the
/// backend's `number_of_results` when positive, else the kept result count.
pub fn parse_response(query: &str, data: Value, max_results: usize) -> SearchResults {
    let mut out = SearchResults::new(query, Backend::Searxng);

    let raw_results = match data.get("results").and_then(Value::as_array) {
        Some(items) => items.as_slice(),
        None => {
            tracing::warn!(query = %query, "searxng response missing 'results' array");
            out.error = Some(NO_RESULTS_MESSAGE.to_string());
            &[][..]
        }
    };

    let mut results: Vec<SearchResult> = raw_results
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            if !item.is_object() {
                tracing::trace!(position = idx + 1, "skipping non-object searxng result");
                return None;
            }
            Some(normalize_item(idx, item))
        })
        .collect();

    if max_results > 0 {
        results.truncate(max_results);
    }

    out.total = data
        .get("number_of_results")
        .and_then(Value::as_u64)
        .filter(|total| *total > 0)
        .or(Some(results.len() as u64));

    if results.is_empty() && out.error.is_none() {
        out.error = Some(NO_RESULTS_MESSAGE.to_string());
    }

    out.results = results;
    out.raw = Some(data);
    out
}

fn normalize_item(idx: usize, item: &Value) -> SearchResult {
    let text = |field: &str| {
        item.get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };

    let url = item.get("url").and_then(Value::as_str).unwrap_or_default();
    let title = text("title").or_else(|| text("url")).unwrap_or_default();
    let source = text("source").or_else(|| {
        item.get("parsed_url")
            .and_then(|p| p.get("hostname"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    });
    let rank = item
        .get("position")
        .and_then(Value::as_i64)
        .unwrap_or(idx as i64 + 1);

    SearchResult {
        title: title.to_string(),
        url: url.to_string(),
        snippet: text("content").unwrap_or_default().to_string(),
        source: source.map(str::to_string),
        rank: Some(rank),
        raw: Some(item.clone()),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
