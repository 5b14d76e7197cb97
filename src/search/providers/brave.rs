use crate::config::ConfigError;
use crate::search::http::{self, ClientHandle, FetchFailure};
use crate::search::{Backend, SearchError, SearchProvider, SearchResult, SearchResults};
use serde_json::Value;
use std::time::Duration;

/// Public Brave Search API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.search.brave.com";

/// Soft error set when a response carries no `web.results`
pub const NO_RESULTS_MESSAGE: &str = "No results found in Brave response";

/// Failure talking to the Brave Search API
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct BraveSearchError {
    message: String,
}

impl BraveSearchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<FetchFailure> for BraveSearchError {
    fn from(failure: FetchFailure) -> Self {
        match failure {
            FetchFailure::Status { status, body } => Self::new(format!(
                "Brave API returned status {}: {}",
                status.as_u16(),
                body
            )),
            FetchFailure::Timeout(e) => Self::new(format!("Brave API request timed out: {e}")),
            FetchFailure::Request(e) => Self::new(format!("Request to Brave API failed: {e}")),
            FetchFailure::Decode(e) => {
                Self::new(format!("Failed to parse Brave API response as JSON: {e}"))
            }
        }
    }
}

/// Construction options for [`BraveSearchClient`]
#[derive(Debug, Clone)]
pub struct BraveClientOptions {
    pub base_url: String,
    /// Shared client to reuse; `None` makes the adapter create and own one
    pub client: Option<reqwest::Client>,
    pub timeout: Duration,
}

impl Default for BraveClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client: None,
            timeout: http::DEFAULT_TIMEOUT,
        }
    }
}

/// Parameters for one Brave web search
#[derive(Debug, Clone)]
pub struct BraveSearchRequest {
    pub query: String,
    pub count: u32,
    pub offset: u32,
    /// Country code, e.g. `US`
    pub country: Option<String>,
    /// Language code, e.g. `en`
    pub language: Option<String>,
    /// `off`, `moderate` or `strict`
    pub safesearch: Option<String>,
    /// Ask Brave for a summarizer key
    pub summary: bool,
}

impl BraveSearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            count: 5,
            offset: 0,
            country: None,
            language: None,
            safesearch: None,
            summary: false,
        }
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn safesearch(mut self, safesearch: impl Into<String>) -> Self {
        self.safesearch = Some(safesearch.into());
        self
    }

    pub fn summary(mut self, summary: bool) -> Self {
        self.summary = summary;
        self
    }

    /// Query string pairs; optional filters are left out when unset or empty
    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", self.query.clone()),
            ("count", self.count.to_string()),
            ("offset", self.offset.to_string()),
        ];

        let optional = [
            ("country", &self.country),
            ("language", &self.language),
            ("safesearch", &self.safesearch),
        ];
        for (name, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                params.push((name, value.to_string()));
            }
        }

        if self.summary {
            params.push(("summary", "1".to_string()));
        }

        params
    }
}

/// Brave Search API adapter
///
/// Free tier: 2000 requests/month
/// Documentation: https://brave.com/search/api/
pub struct BraveSearchClient {
    handle: ClientHandle,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl BraveSearchClient {
    /// Create a new adapter. Fails without touching the network if `api_key` is blank.
    pub fn new(api_key: &str, options: BraveClientOptions) -> Result<Self, ConfigError> {
        if api_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "api_key must be a non-empty string".to_string(),
            ));
        }

        Ok(Self {
            handle: ClientHandle::new(options.client),
            api_key: api_key.to_string(),
            base_url: options.base_url,
            timeout: options.timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn owns_client(&self) -> bool {
        self.handle.owns_client()
    }

    /// Release the HTTP client if this adapter created it
    pub fn close(self) -> bool {
        self.handle.release()
    }

    /// Perform a web search against `/res/v1/web/search`
    pub async fn search(&self, request: &BraveSearchRequest) -> Result<SearchResults, BraveSearchError> {
        let url = format!("{}/res/v1/web/search", self.base_url);

        tracing::debug!(
            query = %request.query,
            count = request.count,
            offset = request.offset,
            summary = request.summary,
            "performing brave search"
        );

        let builder = self
            .handle
            .client()
            .get(&url)
            .timeout(self.timeout)
            .header("Accept", "application/json")
            .header("Accept-Encoding", "gzip")
            .header("X-Subscription-Token", &self.api_key)
            .query(&request.query_params());

        let data = http::fetch_json(builder).await.map_err(|failure| {
            if let FetchFailure::Status { status, body } = &failure {
                tracing::warn!(
                    status = %status,
                    error = %crate::logging::redact_secrets(body, &[self.api_key.as_str()]),
                    "brave search api error"
                );
            }
            BraveSearchError::from(failure)
        })?;

        let results = parse_response(&request.query, data);

        tracing::debug!(
            query = %request.query,
            result_count = results.len(),
            total = ?results.total,
            "brave search completed"
        );

        Ok(results)
    }
}

impl std::fmt::Debug for BraveSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BraveSearchClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("owns_client", &self.owns_client())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl SearchProvider for BraveSearchClient {
    fn backend(&self) -> Backend {
        Backend::Brave
    }

    async fn search_top(&self, query: &str, max_results: usize) -> Result<SearchResults, SearchError> {
        let count = u32::try_from(max_results).unwrap_or(u32::MAX);
        let request = BraveSearchRequest::new(query).count(count).summary(false);
        Ok(self.search(&request).await?)
    }
}

/// Normalize a Brave response body into [`SearchResults`]
///
/// A body without `web.results` is not an error: it yields an empty list with
/// [`NO_RESULTS_MESSAGE`] set. Ranks are taken from the item as-is.
pub fn parse_response(query: &str, data: Value) -> SearchResults {
    let mut out = SearchResults::new(query, Backend::Brave);

    let web = data.get("web");
    match web.and_then(|w| w.get("results")).and_then(Value::as_array) {
        Some(items) => {
            out.results = items.iter().map(normalize_item).collect();
            out.total = web.and_then(|w| w.get("count")).and_then(Value::as_u64);
        }
        None => {
            tracing::warn!(query = %query, "brave search returned valid JSON but no web.results");
            out.error = Some(NO_RESULTS_MESSAGE.to_string());
        }
    }

    out.summarizer_key = data
        .get("summarizer")
        .and_then(|s| s.get("key"))
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty())
        .map(str::to_string);

    out.raw = Some(data);
    out
}

fn normalize_item(item: &Value) -> SearchResult {
    let text = |field: &str| item.get(field).and_then(Value::as_str).unwrap_or_default().to_string();

    SearchResult {
        title: text("title"),
        url: text("url"),
        snippet: text("description"),
        source: item.get("domain").and_then(Value::as_str).map(str::to_string),
        rank: item.get("rank").and_then(Value::as_i64),
        raw: Some(item.clone()),
    }
}
