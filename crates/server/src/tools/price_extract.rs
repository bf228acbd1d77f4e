//! price_extract tool implementation.
//!
//! Loads one product page and returns its extraction result. Failures to
//! load or read the page come back as a result with `success: false`, not as
//! a tool error.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use pricewatch_client::PriceScraper;
use pricewatch_core::Error;

use super::json_result;

/// Input parameters for price_extract tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PriceExtractParams {
    /// Product page URL.
    pub url: String,
}

/// Implementation of the price_extract tool.
pub async fn extract_impl(scraper: &PriceScraper, params: PriceExtractParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let result = scraper.extract_price(&params.url).await;
    json_result(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{FixtureProvider, output_json, scraper};

    const URL: &str = "https://www.officeworks.com.au/shop/officeworks/p/ergonomic-chair";

    #[tokio::test]
    async fn test_extract_returns_result_json() {
        let html = "<body><h1>Ergonomic Chair</h1><p>Was $299.00 Now $249.00</p><p>Ways you can get it</p></body>";
        let scraper = scraper(FixtureProvider::default().page(URL, html));

        let result = extract_impl(&scraper, PriceExtractParams { url: URL.into() }).await.unwrap();
        let json = output_json(&result);

        assert_eq!(json["success"], true);
        assert_eq!(json["price"], "$249.00");
        assert_eq!(json["title"], "Ergonomic Chair");
        assert!(json.get("cache_hit").is_none());
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn test_extract_failure_is_not_tool_error() {
        let scraper = scraper(FixtureProvider::default());

        let result = extract_impl(&scraper, PriceExtractParams { url: URL.into() }).await.unwrap();
        let json = output_json(&result);

        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().starts_with("NAVIGATION_FAILED"));
    }

    #[tokio::test]
    async fn test_extract_keeps_url_as_given() {
        let padded = format!("{URL} ");
        let html = "<body><h1>Chair</h1><p>$249.00</p><p>Ways you can get it</p></body>";
        let scraper = scraper(FixtureProvider::default().page(URL, html).page(&padded, html));

        extract_impl(&scraper, PriceExtractParams { url: URL.into() }).await.unwrap();
        let result = extract_impl(&scraper, PriceExtractParams { url: padded.clone() }).await.unwrap();
        let json = output_json(&result);

        assert_eq!(json["url"], padded.as_str());
        assert!(json.get("cache_hit").is_none());
        assert_eq!(scraper.cache_size(), 2);
    }

    #[tokio::test]
    async fn test_extract_empty_url_fails() {
        let scraper = scraper(FixtureProvider::default());
        let err = extract_impl(&scraper, PriceExtractParams { url: "  ".into() }).await.unwrap_err();
        assert_eq!(err.code, ErrorCode(-32602));
    }
}
