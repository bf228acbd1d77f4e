//! price_batch tool implementation.
//!
//! Extracts prices for a list of labeled URLs with bounded concurrency and
//! tags each result with its label and the caller's batch identifier.

use std::sync::Arc;

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use pricewatch_client::PriceScraper;
use pricewatch_core::result::now_iso8601;
use pricewatch_core::{Error, ExtractionResult};

use super::json_result;

/// One URL in a batch.
///
/// Either `{"label": "comp1", "url": "https://..."}` or the keyed form
/// `{"comp1_url": "https://..."}`, where the first key as written is the
/// label. Anything else is skipped.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum BatchEntry {
    Labeled { label: String, url: String },
    Keyed(serde_json::Map<String, serde_json::Value>),
    Other(serde_json::Value),
}

impl BatchEntry {
    /// `(label, url)` for a usable entry.
    ///
    /// The URL is passed on as given; it only has to be non-blank.
    pub fn target(&self) -> Option<(String, String)> {
        let (label, url) = match self {
            BatchEntry::Labeled { label, url } => (label.clone(), url.clone()),
            BatchEntry::Keyed(map) => {
                let (label, value) = map.iter().next()?;
                (label.clone(), value.as_str()?.to_string())
            }
            BatchEntry::Other(_) => return None,
        };
        (!url.trim().is_empty()).then_some((label, url))
    }
}

/// Input parameters for price_batch tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PriceBatchParams {
    /// Opaque batch identifier echoed back on every result.
    #[serde(default)]
    pub pid: Option<serde_json::Value>,

    /// URLs to extract, in the order results should be returned.
    #[serde(default)]
    pub urls: Vec<BatchEntry>,
}

/// An extraction result tagged with its batch label.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BatchResult {
    #[serde(flatten)]
    pub result: ExtractionResult,
    pub pid: Option<serde_json::Value>,
    /// Label of the entry this result belongs to.
    pub comp_key: String,
}

/// Output structure for price_batch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PriceBatchOutput {
    pub pid: Option<serde_json::Value>,
    /// One result per usable entry, in input order.
    pub results: Vec<BatchResult>,
    pub timestamp: String,
}

/// Implementation of the price_batch tool.
pub async fn batch_impl(scraper: &Arc<PriceScraper>, params: PriceBatchParams) -> Result<CallToolResult, McpError> {
    if params.urls.is_empty() {
        return Err(Error::InvalidInput("No URLs provided".into()).into());
    }

    let targets: Vec<(String, String)> = params.urls.iter().filter_map(BatchEntry::target).collect();
    let skipped = params.urls.len() - targets.len();
    if skipped > 0 {
        tracing::warn!(skipped, "skipping unusable batch entries");
    }

    let semaphore = Arc::new(Semaphore::new(scraper.config().batch_concurrency));
    let mut join_set = JoinSet::new();

    for (index, (label, url)) in targets.into_iter().enumerate() {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        let scraper = scraper.clone();

        tracing::info!(pid = ?params.pid, label = %label, url = %url, "scraping batch entry");
        join_set.spawn(async move {
            let _permit = permit;
            let result = scraper.extract_price(&url).await;
            (index, label, result)
        });
    }

    let mut collected = Vec::with_capacity(join_set.len());
    while let Some(joined) = join_set.join_next().await {
        let (index, label, result) =
            joined.map_err(|e| McpError::from(Error::ExtractFailed(format!("batch task failed: {e}"))))?;
        collected.push((index, BatchResult { result, pid: params.pid.clone(), comp_key: label }));
    }
    collected.sort_by_key(|(index, _)| *index);

    let output = PriceBatchOutput {
        pid: params.pid,
        results: collected.into_iter().map(|(_, r)| r).collect(),
        timestamp: now_iso8601(),
    };

    json_result(&output)
}
