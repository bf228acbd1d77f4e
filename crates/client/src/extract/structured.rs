//! Selector-based extraction.

use std::time::Duration;

use crate::render::RenderedPage;

use super::sites::SiteRegistry;
use super::{first_price_token, normalize_numeric};

/// Probe each selector for `url` in order and return the first price found.
///
/// A probe that reads a bare number (common for `content` attributes) is
/// prefixed with the currency symbol. Otherwise the first price token in the
/// element text is used. Probes that time out or find nothing are skipped.
/// Returns an empty string when no selector yields a price.
pub async fn extract_structured(page: &dyn RenderedPage, url: &str, registry: &SiteRegistry, timeout: Duration) -> String {
    for selector in registry.selectors_for(url) {
        let Some(raw) = page.query(selector.css, selector.read, timeout).await.found() else {
            continue;
        };

        let price = normalize_numeric(&raw).or_else(|| first_price_token(&raw).map(str::to_string));
        if let Some(price) = price {
            tracing::debug!(selector = selector.css, price = %price, "structured price found");
            return price;
        }
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::StaticPage;

    const TIMEOUT: Duration = Duration::from_millis(200);

    async fn extract(html: &str, url: &str) -> String {
        let page = StaticPage::parse(html);
        extract_structured(&page, url, &SiteRegistry::default(), TIMEOUT).await
    }

    #[tokio::test]
    async fn test_numeric_content_attribute() {
        let html = r#"<html><head><meta itemprop="price" content="899"></head><body><p>Sold out</p></body></html>"#;
        assert_eq!(extract(html, "https://shop.example.com/p/1").await, "$899");
    }

    #[tokio::test]
    async fn test_numeric_element_text_with_decimals() {
        let html = r#"<body><span itemprop="price"> 1,299.00 </span></body>"#;
        assert_eq!(extract(html, "https://shop.example.com/p/1").await, "$1,299.00");
    }

    #[tokio::test]
    async fn test_price_token_in_element_text() {
        let html = r#"<body><div class="price">Now only $249.95 (save $50)</div></body>"#;
        assert_eq!(extract(html, "https://shop.example.com/p/1").await, "$249.95");
    }

    #[tokio::test]
    async fn test_skips_selectors_without_price() {
        let html = r#"<body>
            <div class="price">Call for pricing</div>
            <div class="product-price">$75.00</div>
        </body>"#;
        assert_eq!(extract(html, "https://shop.example.com/p/1").await, "$75.00");
    }

    #[tokio::test]
    async fn test_generic_selector_order() {
        let html = r#"<body>
            <div class="current-price">$10.00</div>
            <span data-testid="product-price">$20.00</span>
        </body>"#;
        assert_eq!(extract(html, "https://shop.example.com/p/1").await, "$20.00");
    }

    #[tokio::test]
    async fn test_site_selectors_before_generic() {
        let html = r#"<body>
            <div class="price">$999.00</div>
            <span class="PriceTag_actual__1eb7mu9">$849.00</span>
        </body>"#;
        assert_eq!(extract(html, "https://www.jbhifi.com.au/products/tv").await, "$849.00");
        assert_eq!(extract(html, "https://shop.example.com/p/1").await, "$999.00");
    }

    #[tokio::test]
    async fn test_no_match_returns_empty() {
        let html = "<body><p>$15.00 shipping</p></body>";
        assert_eq!(extract(html, "https://shop.example.com/p/1").await, "");
    }

    #[tokio::test]
    async fn test_three_decimals_not_numeric() {
        let html = r#"<head><meta itemprop="price" content="12.345"></head><body></body>"#;
        assert_eq!(extract(html, "https://shop.example.com/p/1").await, "");
    }
}
