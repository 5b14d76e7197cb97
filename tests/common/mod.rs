//! Shared helpers for the adapter and tool integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use web_search_agent::config::{AppConfig, BraveSearchConfig, LlmConfig, SearxngConfig};
use wiremock::Request;

/// Valid config with the given backends switched on
pub fn app_config(brave_key: Option<&str>, searxng_url: Option<&str>) -> AppConfig {
    AppConfig::new(
        LlmConfig::new("openai", "llm-key", "gpt-4").expect("valid llm config"),
        BraveSearchConfig::new(brave_key).expect("valid brave config"),
        SearxngConfig::new(searxng_url).expect("valid searxng config"),
    )
    .expect("at least one backend configured")
}

/// Base URL of a local port nothing is listening on
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Query string of a received request as a map
pub fn query_map(request: &Request) -> HashMap<String, String> {
    request.url.query_pairs().into_owned().collect()
}
