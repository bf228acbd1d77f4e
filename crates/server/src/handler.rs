//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{
    PriceBatchParams, PriceExtractParams, health::health_impl, price_batch::batch_impl, price_extract::extract_impl,
};

use pricewatch_client::PriceScraper;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for mcp-price.
#[derive(Clone)]
pub struct PriceWatchServer {
    tool_router: ToolRouter<Self>,
    scraper: Arc<PriceScraper>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl PriceWatchServer {
    /// Create a new server handler around a shared scraper.
    pub fn new(scraper: Arc<PriceScraper>) -> Self {
        Self { tool_router: Self::tool_router(), scraper }
    }

    /// Extract the main price from one product page.
    #[tool(
        description = "Load a product page and extract its main price. Returns success, title, price, all_prices (up to 10), timestamp, load_time_ms, and cache_hit for cached results."
    )]
    async fn price_extract(&self, params: Parameters<PriceExtractParams>) -> Result<CallToolResult, McpError> {
        extract_impl(&self.scraper, params.0).await
    }

    /// Extract prices for a labeled list of URLs.
    #[tool(
        description = "Extract prices for a list of URLs. Each entry is {label, url} or {\"<label>\": \"<url>\"}. Results come back in input order tagged with pid and comp_key."
    )]
    async fn price_batch(&self, params: Parameters<PriceBatchParams>) -> Result<CallToolResult, McpError> {
        batch_impl(&self.scraper, params.0).await
    }

    /// Report liveness and cache occupancy.
    #[tool(description = "Report service status and the number of cached results.")]
    async fn service_health(&self) -> Result<CallToolResult, McpError> {
        health_impl(&self.scraper).await
    }
}

impl ServerHandler for PriceWatchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mcp-price".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{FixtureProvider, scraper};

    #[test]
    fn test_server_info() {
        let server = PriceWatchServer::new(scraper(FixtureProvider::default()));
        let info = server.get_info();
        assert_eq!(info.server_info.name, "mcp-price");
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_tools_registered() {
        let server = PriceWatchServer::new(scraper(FixtureProvider::default()));
        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["price_batch", "price_extract", "service_health"]);
    }
}
