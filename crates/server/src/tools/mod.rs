//! MCP tool implementations.
//!
//! This module contains all tools exposed by the mcp-price server.

pub mod health;
pub mod price_batch;
pub mod price_extract;

pub use health::HealthOutput;
pub use price_batch::{BatchEntry, BatchResult, PriceBatchOutput, PriceBatchParams};
pub use price_extract::PriceExtractParams;

use rmcp::{ErrorData as McpError, model::*};
use serde::Serialize;

/// Serialize `output` as the single pretty-printed JSON text block of a tool result.
fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| McpError::internal_error(format!("failed to serialize output: {e}"), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
