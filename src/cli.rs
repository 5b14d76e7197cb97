use crate::config::{self, AppConfig};
use crate::logging::{self, LogRotation, LogSettings};
use crate::search::{Backend, SearchResults};
use crate::tool::{create_brave_search_tool, create_searxng_search_tool, SearchTool};
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;

/// Web Search Agent - run a web search through a configured backend
#[derive(Debug, Parser)]
#[command(name = "web-search-agent", version, about)]
pub struct Args {
    /// Search query
    pub query: Vec<String>,

    /// Backend to use; defaults to Brave when configured, else SearXNG
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Maximum number of results (0 = everything SearXNG returns)
    #[arg(short = 'n', long, default_value_t = 5)]
    pub max_results: usize,

    /// Print the normalized results as JSON
    #[arg(long)]
    pub json: bool,

    /// Write debug logs to a file
    #[arg(long, env = "WEB_SEARCH_AGENT_DEBUG")]
    pub debug: bool,

    /// Debug log file or directory
    #[arg(long, env = "WEB_SEARCH_AGENT_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Rotate the debug log daily
    #[arg(long)]
    pub rotate_daily: bool,

    /// Read configuration from a TOML file instead of the environment
    #[arg(short, long, env = "WEB_SEARCH_AGENT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Brave,
    Searxng,
}

/// Parse arguments, load configuration, and run one search
pub async fn run() -> Result<()> {
    let args = Args::parse();

    let _guard = logging::init(&LogSettings {
        debug: args.debug,
        log_path: args.log_file.clone(),
        rotation: if args.rotate_daily {
            LogRotation::Daily
        } else {
            LogRotation::None
        },
        keep: None,
    })?;

    if args.query.is_empty() {
        Args::command().print_help()?;
        println!();
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config()?,
    };
    let tool = select_tool(&config, args.backend)?;
    let query = args.query.join(" ");

    tracing::info!(backend = %tool.backend(), query = %query, "running search");

    let results = tool
        .call(&query, args.max_results)
        .await
        .with_context(|| format!("{} search failed", tool.backend()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(&results);
    }

    Ok(())
}

fn select_tool(config: &AppConfig, backend: Option<BackendArg>) -> Result<SearchTool> {
    let tool = match backend {
        Some(BackendArg::Brave) => create_brave_search_tool(config)?,
        Some(BackendArg::Searxng) => create_searxng_search_tool(config)?,
        None if config.brave().is_enabled() => create_brave_search_tool(config)?,
        None => create_searxng_search_tool(config)?,
    };
    Ok(tool)
}

fn print_results(results: &SearchResults) {
    if let Some(error) = &results.error {
        println!("{error}");
        return;
    }

    let total = results
        .total
        .map(|t| format!(" of {t}"))
        .unwrap_or_default();
    println!("{} results{} from {}\n", results.len(), total, results.backend);

    for (idx, item) in results.results.iter().enumerate() {
        println!("{:>2}. {}", idx + 1, item.title);
        println!("    {}", item.url);
        if let Some(source) = &item.source {
            println!("    [{source}]");
        }
        if !item.snippet.is_empty() {
            println!("    {}", item.snippet);
        }
        println!();
    }

    if results.backend == Backend::Brave {
        if let Some(key) = &results.summarizer_key {
            println!("summarizer key: {key}");
        }
    }
}
