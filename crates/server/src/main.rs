//! mcp-price server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use pricewatch_client::{FetchConfig, HttpPageProvider, PageProvider, PriceScraper};
use pricewatch_core::AppConfig;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        render_enabled = config.render_enabled,
        cache_ttl_secs = config.cache_ttl_secs,
        "Starting mcp-price server on stdio transport"
    );

    let provider = page_provider(&config)?;
    let scraper = Arc::new(PriceScraper::new(provider, config));

    let handler = handler::PriceWatchServer::new(scraper);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}

/// Headless Chromium when enabled and compiled in, plain HTTP otherwise.
fn page_provider(config: &AppConfig) -> Result<Arc<dyn PageProvider>> {
    #[cfg(feature = "render")]
    if config.render_enabled {
        return Ok(Arc::new(pricewatch_client::HeadlessProvider::from_config(config)));
    }

    #[cfg(not(feature = "render"))]
    if config.render_enabled {
        tracing::warn!("built without the render feature, falling back to plain HTTP");
    }

    Ok(Arc::new(HttpPageProvider::new(FetchConfig::from_app_config(config))?))
}
