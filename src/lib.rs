//! web-search-agent library
//!
//! Normalizes Brave Search API and SearXNG responses into one
//! backend-agnostic [`search::SearchResults`] shape for agent tool calls.

pub mod cli;
pub mod config;
pub mod logging;
pub mod search;
pub mod tool;

pub use config::{load_config, AppConfig, ConfigError};
pub use search::{Backend, SearchResult, SearchResults};
pub use tool::{create_brave_search_tool, create_searxng_search_tool, SearchTool};
