use anyhow::Result;

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    web_search_agent::cli::run().await
}
