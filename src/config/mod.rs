pub mod settings;

use std::fs;
use std::path::{Path, PathBuf};

pub use settings::{
    AppConfig, AppSettings, BraveSearchConfig, BraveSettings, LlmConfig, LlmSettings, SearxngConfig,
    SearxngSettings,
};

/// Environment variable names read by [`load_config`]
pub mod env {
    pub const LLM_PROVIDER: &str = "LLM_PROVIDER";
    pub const LLM_BASE_URL: &str = "LLM_BASE_URL";
    pub const LLM_API_KEY: &str = "LLM_API_KEY";
    pub const LLM_CHOICE: &str = "LLM_CHOICE";
    pub const BRAVE_API_KEY: &str = "BRAVE_API_KEY";
    pub const SEARXNG_BASE_URL: &str = "SEARXNG_BASE_URL";
    pub const SEARXNG_TIMEOUT: &str = "SEARXNG_TIMEOUT";
    pub const SEARXNG_DEFAULT_CATEGORIES: &str = "SEARXNG_DEFAULT_CATEGORIES";
    pub const SEARXNG_DEFAULT_LANGUAGE: &str = "SEARXNG_DEFAULT_LANGUAGE";
    pub const SEARXNG_DEFAULT_TIME_RANGE: &str = "SEARXNG_DEFAULT_TIME_RANGE";
}

/// Configuration errors. All of them surface before any network I/O.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid value {value:?} for environment variable {name}: {reason}")]
    InvalidEnvVar {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Validation(String),

    #[error("Configuration validation failed: {0}")]
    Load(Box<ConfigError>),

    #[error("{0}")]
    BackendNotConfigured(String),

    #[error("Failed to load config file {}: {reason}", path.display())]
    File { path: PathBuf, reason: String },
}

/// Load and validate configuration from a TOML file
///
/// The file mirrors [`AppSettings`]: an `[llm]` table plus optional `[brave]`
/// and `[searxng]` tables. The same validation as [`load_config`] applies.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let file_error = |reason: String| ConfigError::File {
        path: path.to_path_buf(),
        reason,
    };

    let content = fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
    let config: AppConfig = toml::from_str(&content).map_err(|e| file_error(e.message().to_string()))?;

    tracing::debug!(
        path = %path.display(),
        brave_enabled = config.brave().is_enabled(),
        searxng_enabled = config.searxng().is_enabled(),
        "configuration loaded from file"
    );

    Ok(config)
}

/// Load and validate configuration from the process environment
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(|name| std::env::var(name).ok())
}

/// Load and validate configuration using `lookup` to resolve variable names
///
/// Required LLM variables are checked first, so a missing one is reported by
/// name rather than as a model validation failure.
pub fn load_config_from<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |name: &'static str| -> Result<String, ConfigError> {
        lookup(name)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEnvVar(name))
    };

    let provider = required(env::LLM_PROVIDER)?;
    let api_key = required(env::LLM_API_KEY)?;
    let choice = required(env::LLM_CHOICE)?;

    let timeout = match lookup(env::SEARXNG_TIMEOUT) {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                name: env::SEARXNG_TIMEOUT,
                value: raw.clone(),
                reason: e.to_string(),
            })?,
        None => settings::DEFAULT_SEARXNG_TIMEOUT_SECS,
    };

    let categories: Vec<String> = lookup(env::SEARXNG_DEFAULT_CATEGORIES)
        .unwrap_or_else(|| settings::DEFAULT_CATEGORY.to_string())
        .split(',')
        .filter(|c| !c.trim().is_empty())
        .map(str::to_string)
        .collect();

    let build = || -> Result<AppConfig, ConfigError> {
        let llm = LlmConfig::try_from(LlmSettings {
            provider,
            base_url: lookup(env::LLM_BASE_URL),
            api_key,
            choice,
        })?;
        let brave = BraveSearchConfig::try_from(BraveSettings {
            api_key: lookup(env::BRAVE_API_KEY),
        })?;
        let searxng = SearxngConfig::try_from(SearxngSettings {
            base_url: lookup(env::SEARXNG_BASE_URL),
            timeout,
            default_categories: categories,
            default_language: lookup(env::SEARXNG_DEFAULT_LANGUAGE),
            default_time_range: lookup(env::SEARXNG_DEFAULT_TIME_RANGE),
        })?;
        AppConfig::new(llm, brave, searxng)
    };

    let config = build().map_err(|e| ConfigError::Load(Box::new(e)))?;

    tracing::debug!(
        llm_provider = %config.llm().provider(),
        brave_enabled = config.brave().is_enabled(),
        searxng_enabled = config.searxng().is_enabled(),
        "configuration loaded"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const LLM_VARS: [(&str, &str); 3] = [
        ("LLM_PROVIDER", "openai"),
        ("LLM_API_KEY", "sk-test-key"),
        ("LLM_CHOICE", "gpt-4"),
    ];

    fn with_llm(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        let mut vars = LLM_VARS.to_vec();
        vars.extend_from_slice(extra);
        vars
    }

    #[test]
    fn test_load_config_success_with_brave() {
        let config = load_config_from(lookup_from(&with_llm(&[("BRAVE_API_KEY", "brave-key")]))).unwrap();
        assert_eq!(config.llm().provider(), "openai");
        assert_eq!(config.brave().api_key(), Some("brave-key"));
        assert!(config.searxng().base_url().is_none());
    }

    #[test]
    fn test_load_config_success_with_searxng() {
        let config = load_config_from(lookup_from(&with_llm(&[
            ("SEARXNG_BASE_URL", "https://searx.example.com"),
            ("SEARXNG_TIMEOUT", "2.5"),
            ("SEARXNG_DEFAULT_CATEGORIES", "news, ,science"),
            ("SEARXNG_DEFAULT_LANGUAGE", "en"),
            ("SEARXNG_DEFAULT_TIME_RANGE", "week"),
        ])))
        .unwrap();

        let searxng = config.searxng();
        assert!(config.brave().api_key().is_none());
        assert_eq!(searxng.base_url(), Some("https://searx.example.com"));
        assert_eq!(searxng.timeout_secs(), 2.5);
        assert_eq!(searxng.default_categories(), ["news", "science"]);
        assert_eq!(searxng.default_language(), Some("en"));
        assert_eq!(searxng.default_time_range(), Some("week"));
    }

    #[test]
    fn test_load_config_defaults_for_searxng() {
        let config = load_config_from(lookup_from(&with_llm(&[(
            "SEARXNG_BASE_URL",
            "https://searx.example.com",
        )])))
        .unwrap();
        assert_eq!(config.searxng().timeout_secs(), 10.0);
        assert_eq!(config.searxng().default_categories(), ["general"]);
    }

    #[test]
    fn test_load_config_missing_required_vars() {
        for missing in ["LLM_PROVIDER", "LLM_API_KEY", "LLM_CHOICE"] {
            let vars: Vec<_> = with_llm(&[("BRAVE_API_KEY", "brave-key")])
                .into_iter()
                .filter(|(k, _)| *k != missing)
                .collect();
            let err = load_config_from(lookup_from(&vars)).unwrap_err();
            assert_eq!(err, ConfigError::MissingEnvVar(missing));
            assert!(err.to_string().contains(missing));
        }
    }

    #[test]
    fn test_load_config_empty_llm_provider_is_missing() {
        let mut vars = with_llm(&[("BRAVE_API_KEY", "brave-key")]);
        vars[0] = ("LLM_PROVIDER", "");
        let err = load_config_from(lookup_from(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar("LLM_PROVIDER"));
    }

    #[test]
    fn test_load_config_whitespace_llm_provider_fails_validation() {
        let mut vars = with_llm(&[("BRAVE_API_KEY", "brave-key")]);
        vars[0] = ("LLM_PROVIDER", "   ");
        let err = load_config_from(lookup_from(&vars)).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Configuration validation failed"));
        assert!(message.contains("provider cannot be empty"));
    }

    #[test]
    fn test_load_config_no_backends() {
        let err = load_config_from(lookup_from(&LLM_VARS)).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
        assert!(err
            .to_string()
            .contains("At least one search backend must be configured"));
    }

    #[test]
    fn test_load_config_empty_brave_api_key() {
        let err = load_config_from(lookup_from(&with_llm(&[
            ("BRAVE_API_KEY", ""),
            ("SEARXNG_BASE_URL", "https://searx.example.com"),
        ])))
        .unwrap_err();
        assert!(err
            .to_string()
            .contains("Brave Search API key cannot be an empty string"));
    }

    #[test]
    fn test_load_config_bad_timeout() {
        let err = load_config_from(lookup_from(&with_llm(&[
            ("SEARXNG_BASE_URL", "https://searx.example.com"),
            ("SEARXNG_TIMEOUT", "soon"),
        ])))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar {
                name: "SEARXNG_TIMEOUT",
                ..
            }
        ));
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[llm]
provider = "anthropic"
api_key = "sk-ant-test"
choice = "claude"

[searxng]
base_url = "http://localhost:8888/"
timeout = 4.5
default_categories = ["news", "it"]
"#,
        )
        .unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.llm().provider(), "anthropic");
        assert!(!config.brave().is_enabled());
        assert_eq!(config.searxng().base_url(), Some("http://localhost:8888/"));
        assert_eq!(config.searxng().timeout_secs(), 4.5);
        assert_eq!(config.searxng().default_categories(), ["news", "it"]);
    }

    #[test]
    fn test_load_config_file_runs_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[llm]\nprovider = \"openai\"\napi_key = \"k\"\nchoice = \"gpt-4\"\n",
        )
        .unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::File { .. }));
        assert!(err
            .to_string()
            .contains("At least one search backend must be configured"));
    }

    #[test]
    fn test_load_config_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load config file"));
    }
}
