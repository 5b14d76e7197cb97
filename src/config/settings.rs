use super::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Default SearXNG request timeout in seconds
pub const DEFAULT_SEARXNG_TIMEOUT_SECS: f64 = 10.0;

/// Category queried when none are configured
pub const DEFAULT_CATEGORY: &str = "general";

/// Unvalidated LLM settings, as read from the environment or a file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmSettings {
    pub provider: String,
    #[serde(default)]
    pub base_url: Option<String>,
    pub api_key: String,
    pub choice: String,
}

/// Validated LLM provider configuration
///
/// `provider`, `api_key` and `choice` are trimmed and guaranteed non-empty.
#[derive(Clone, PartialEq, Deserialize)]
#[serde(try_from = "LlmSettings")]
pub struct LlmConfig {
    provider: String,
    base_url: Option<String>,
    api_key: String,
    choice: String,
}

impl LlmConfig {
    pub fn new(
        provider: impl Into<String>,
        api_key: impl Into<String>,
        choice: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Self::try_from(LlmSettings {
            provider: provider.into(),
            base_url: None,
            api_key: api_key.into(),
            choice: choice.into(),
        })
    }

    /// Same as [`LlmConfig::new`] with a custom API endpoint
    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..self
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn choice(&self) -> &str {
        &self.choice
    }
}

impl TryFrom<LlmSettings> for LlmConfig {
    type Error = ConfigError;

    fn try_from(raw: LlmSettings) -> Result<Self, Self::Error> {
        Ok(Self {
            provider: required(&raw.provider, "LLM provider cannot be empty")?,
            base_url: raw.base_url,
            api_key: required(&raw.api_key, "LLM API key cannot be empty")?,
            choice: required(&raw.choice, "LLM choice cannot be empty")?,
        })
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("choice", &self.choice)
            .finish()
    }
}

/// Unvalidated Brave Search settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BraveSettings {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Brave Search configuration. `api_key == None` means the backend is disabled.
#[derive(Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "BraveSettings")]
pub struct BraveSearchConfig {
    api_key: Option<String>,
}

impl BraveSearchConfig {
    pub fn new(api_key: Option<&str>) -> Result<Self, ConfigError> {
        Self::try_from(BraveSettings {
            api_key: api_key.map(str::to_string),
        })
    }

    /// A config with Brave turned off
    pub fn disabled() -> Self {
        Self { api_key: None }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

impl TryFrom<BraveSettings> for BraveSearchConfig {
    type Error = ConfigError;

    fn try_from(raw: BraveSettings) -> Result<Self, Self::Error> {
        Ok(Self {
            api_key: optional_non_empty(raw.api_key, "Brave Search API key cannot be an empty string")?,
        })
    }
}

impl fmt::Debug for BraveSearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BraveSearchConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Unvalidated SearXNG settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearxngSettings {
    pub base_url: Option<String>,
    pub timeout: f64,
    pub default_categories: Vec<String>,
    pub default_language: Option<String>,
    pub default_time_range: Option<String>,
}

impl Default for SearxngSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_SEARXNG_TIMEOUT_SECS,
            default_categories: vec![DEFAULT_CATEGORY.to_string()],
            default_language: None,
            default_time_range: None,
        }
    }
}

/// SearXNG configuration. `base_url == None` means the backend is disabled.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "SearxngSettings")]
pub struct SearxngConfig {
    base_url: Option<String>,
    timeout: f64,
    default_categories: Vec<String>,
    default_language: Option<String>,
    default_time_range: Option<String>,
}

impl SearxngConfig {
    /// Config with the given base URL and every other field at its default
    pub fn new(base_url: Option<&str>) -> Result<Self, ConfigError> {
        Self::try_from(SearxngSettings {
            base_url: base_url.map(str::to_string),
            ..Default::default()
        })
    }

    pub fn disabled() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_SEARXNG_TIMEOUT_SECS,
            default_categories: vec![DEFAULT_CATEGORY.to_string()],
            default_language: None,
            default_time_range: None,
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.base_url.is_some()
    }

    /// Timeout in seconds, as configured
    pub fn timeout_secs(&self) -> f64 {
        self.timeout
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }

    pub fn default_categories(&self) -> &[String] {
        &self.default_categories
    }

    pub fn default_language(&self) -> Option<&str> {
        self.default_language.as_deref()
    }

    pub fn default_time_range(&self) -> Option<&str> {
        self.default_time_range.as_deref()
    }
}

impl TryFrom<SearxngSettings> for SearxngConfig {
    type Error = ConfigError;

    fn try_from(raw: SearxngSettings) -> Result<Self, Self::Error> {
        let base_url = optional_non_empty(raw.base_url, "SearXNG base URL cannot be an empty string")?;

        if !raw.timeout.is_finite() || raw.timeout <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "SearXNG timeout must be a positive number of seconds, got {}",
                raw.timeout
            )));
        }

        Ok(Self {
            base_url,
            timeout: raw.timeout,
            default_categories: normalize_categories(raw.default_categories),
            default_language: blank_to_none(raw.default_language),
            default_time_range: blank_to_none(raw.default_time_range),
        })
    }
}

/// Unvalidated top-level settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub llm: LlmConfig,
    #[serde(default)]
    pub brave: BraveSearchConfig,
    #[serde(default = "SearxngConfig::disabled")]
    pub searxng: SearxngConfig,
}

/// Top-level application configuration
///
/// Construction fails unless at least one search backend is configured.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "AppSettings")]
pub struct AppConfig {
    llm: LlmConfig,
    brave: BraveSearchConfig,
    searxng: SearxngConfig,
}

impl AppConfig {
    pub fn new(llm: LlmConfig, brave: BraveSearchConfig, searxng: SearxngConfig) -> Result<Self, ConfigError> {
        if !brave.is_enabled() && !searxng.is_enabled() {
            return Err(ConfigError::Validation(
                "At least one search backend must be configured: \
                 either BRAVE_API_KEY or SEARXNG_BASE_URL must be set"
                    .to_string(),
            ));
        }

        Ok(Self { llm, brave, searxng })
    }

    pub fn llm(&self) -> &LlmConfig {
        &self.llm
    }

    pub fn brave(&self) -> &BraveSearchConfig {
        &self.brave
    }

    pub fn searxng(&self) -> &SearxngConfig {
        &self.searxng
    }
}

impl TryFrom<AppSettings> for AppConfig {
    type Error = ConfigError;

    fn try_from(raw: AppSettings) -> Result<Self, Self::Error> {
        Self::new(raw.llm, raw.brave, raw.searxng)
    }
}

fn required(value: &str, message: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}

// `None` disables; `Some("")` is a mistake, not a way to disable.
fn optional_non_empty(value: Option<String>, message: &str) -> Result<Option<String>, ConfigError> {
    value.map(|v| required(&v, message)).transpose()
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_categories(categories: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(categories.len());
    for category in categories {
        let category = category.trim();
        if category.is_empty() || cleaned.iter().any(|c| c == category) {
            continue;
        }
        cleaned.push(category.to_string());
    }

    if cleaned.is_empty() {
        cleaned.push(DEFAULT_CATEGORY.to_string());
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn llm() -> LlmConfig {
        LlmConfig::new("openai", "sk-test-key", "gpt-4").unwrap()
    }

    #[test]
    fn test_valid_llm_config() {
        let config = LlmConfig::new("openai", "sk-test-key", "gpt-4")
            .unwrap()
            .with_base_url("https://api.openai.com/v1");
        assert_eq!(config.provider(), "openai");
        assert_eq!(config.base_url(), Some("https://api.openai.com/v1"));
        assert_eq!(config.api_key(), "sk-test-key");
        assert_eq!(config.choice(), "gpt-4");
    }

    #[test]
    fn test_llm_config_without_base_url() {
        assert!(llm().base_url().is_none());
    }

    #[test]
    fn test_llm_config_rejects_blank_fields() {
        let cases = [
            ("", "key", "gpt-4", "provider cannot be empty"),
            ("openai", "   ", "gpt-4", "API key cannot be empty"),
            ("openai", "key", "\t", "choice cannot be empty"),
        ];

        for (provider, api_key, choice, expected) in cases {
            let err = LlmConfig::new(provider, api_key, choice).unwrap_err();
            assert!(err.to_string().contains(expected), "{err}");
        }
    }

    #[test]
    fn test_llm_config_whitespace_trimming() {
        let config = LlmConfig::new("  openai  ", "  sk-test-key  ", "  gpt-4  ").unwrap();
        assert_eq!(config.provider(), "openai");
        assert_eq!(config.api_key(), "sk-test-key");
        assert_eq!(config.choice(), "gpt-4");
    }

    #[test]
    fn test_llm_config_debug_hides_api_key() {
        let rendered = format!("{:?}", llm());
        assert!(!rendered.contains("sk-test-key"));
    }

    #[test]
    fn test_brave_config() {
        assert_eq!(BraveSearchConfig::new(Some("key")).unwrap().api_key(), Some("key"));
        assert_eq!(BraveSearchConfig::new(Some("  key  ")).unwrap().api_key(), Some("key"));
        assert!(BraveSearchConfig::new(None).unwrap().api_key().is_none());

        for blank in ["", "   "] {
            let err = BraveSearchConfig::new(Some(blank)).unwrap_err();
            assert!(err.to_string().contains("API key cannot be an empty string"));
        }
    }

    #[test]
    fn test_searxng_config_base_url() {
        let config = SearxngConfig::new(Some("  https://searx.example.com  ")).unwrap();
        assert_eq!(config.base_url(), Some("https://searx.example.com"));
        assert!(SearxngConfig::new(None).unwrap().base_url().is_none());

        for blank in ["", " \n "] {
            let err = SearxngConfig::new(Some(blank)).unwrap_err();
            assert!(err.to_string().contains("base URL cannot be an empty string"));
        }
    }

    #[test]
    fn test_searxng_config_defaults() {
        let config = SearxngConfig::new(Some("https://searx.example.com")).unwrap();
        assert_eq!(config.timeout_secs(), 10.0);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.default_categories(), ["general"]);
        assert!(config.default_language().is_none());
        assert!(config.default_time_range().is_none());
    }

    #[test]
    fn test_searxng_categories_are_cleaned() {
        let config = SearxngConfig::try_from(SearxngSettings {
            default_categories: vec![" news ".into(), "".into(), "it".into(), "news".into()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.default_categories(), ["news", "it"]);

        let config = SearxngConfig::try_from(SearxngSettings {
            default_categories: vec!["  ".into(), "".into()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.default_categories(), ["general"]);
    }

    #[test]
    fn test_searxng_rejects_bad_timeout() {
        for timeout in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = SearxngConfig::try_from(SearxngSettings {
                timeout,
                ..Default::default()
            });
            assert!(result.is_err(), "timeout {timeout} should be rejected");
        }
    }

    #[test]
    fn test_app_config_backend_matrix() {
        let brave_on = || BraveSearchConfig::new(Some("brave-key")).unwrap();
        let searx_on = || SearxngConfig::new(Some("https://searx.example.com")).unwrap();

        assert!(AppConfig::new(llm(), brave_on(), SearxngConfig::disabled()).is_ok());
        assert!(AppConfig::new(llm(), BraveSearchConfig::disabled(), searx_on()).is_ok());
        assert!(AppConfig::new(llm(), brave_on(), searx_on()).is_ok());

        let err = AppConfig::new(llm(), BraveSearchConfig::disabled(), SearxngConfig::disabled()).unwrap_err();
        assert!(err
            .to_string()
            .contains("At least one search backend must be configured"));
    }

    #[test]
    fn test_app_config_deserialize_runs_validation() {
        let config: AppConfig = serde_json::from_value(json!({
            "llm": {"provider": " openai ", "api_key": "k", "choice": "gpt-4"},
            "searxng": {"base_url": "https://searx.example.com", "default_categories": ["news"]}
        }))
        .unwrap();
        assert_eq!(config.llm().provider(), "openai");
        assert!(!config.brave().is_enabled());
        assert_eq!(config.searxng().default_categories(), ["news"]);

        let err = serde_json::from_value::<AppConfig>(json!({
            "llm": {"provider": "openai", "api_key": "k", "choice": "gpt-4"}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("At least one search backend"));

        let err = serde_json::from_value::<AppConfig>(json!({
            "llm": {"provider": "openai", "api_key": "k", "choice": "gpt-4"},
            "brave": {"api_key": ""}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("Brave Search API key cannot be an empty string"));
    }

    #[test]
    fn test_searxng_settings_reject_unknown_fields() {
        let result = serde_json::from_value::<SearxngConfig>(json!({
            "base_url": "https://searx.example.com",
            "engines": "google"
        }));
        assert!(result.is_err());
    }
}
