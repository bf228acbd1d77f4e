//! service_health tool implementation.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use pricewatch_client::PriceScraper;
use pricewatch_core::result::now_iso8601;

use super::json_result;

/// Output structure for service_health tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthOutput {
    /// Always `"healthy"` while the server is answering.
    pub status: String,
    /// Entries currently held in the result cache.
    pub cache_size: usize,
    pub timestamp: String,
}

/// Implementation of the service_health tool.
pub async fn health_impl(scraper: &PriceScraper) -> Result<CallToolResult, McpError> {
    let output = HealthOutput { status: "healthy".into(), cache_size: scraper.cache_size(), timestamp: now_iso8601() };
    json_result(&output)
}
