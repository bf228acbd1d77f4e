//! The price extraction pipeline.
//!
//! [`PriceScraper::extract_price`] is the single entry point: cache lookup,
//! page load through a [`PageProvider`], structured extraction, then the
//! text heuristics. It never returns an error; failures become a result with
//! `success = false`.

use std::sync::Arc;
use std::time::Instant;

use pricewatch_core::{AppConfig, Error, ExtractionResult, FingerprintCache, fingerprint};

use crate::extract::{SiteRegistry, all_prices, extract_structured, find_main_price};
use crate::render::{OpenOptions, PageGuard, PageProvider, RenderedPage};

/// Fields read from a loaded page.
struct PageReading {
    title: String,
    price: String,
    all_prices: Vec<String>,
}

/// Extracts prices from product pages, caching successful results.
pub struct PriceScraper {
    provider: Arc<dyn PageProvider>,
    cache: FingerprintCache,
    registry: SiteRegistry,
    config: AppConfig,
}

impl PriceScraper {
    /// Scraper with the built-in site classes and a cache sized from `config`.
    pub fn new(provider: Arc<dyn PageProvider>, config: AppConfig) -> Self {
        let cache = FingerprintCache::from_config(&config);
        Self::with_parts(provider, cache, SiteRegistry::default(), config)
    }

    pub fn with_parts(
        provider: Arc<dyn PageProvider>, cache: FingerprintCache, registry: SiteRegistry, config: AppConfig,
    ) -> Self {
        Self { provider, cache, registry, config }
    }

    /// Extract the main price from `url`.
    ///
    /// A cached result younger than the TTL is returned with
    /// `cache_hit = Some(true)`. Only successful results are cached.
    pub async fn extract_price(&self, url: &str) -> ExtractionResult {
        let key = fingerprint(url);
        if let Some(mut cached) = self.cache.get(&key) {
            tracing::info!(url, "cache hit");
            cached.cache_hit = Some(true);
            return cached;
        }

        let start = Instant::now();
        let outcome = self.scrape(url).await;
        let load_time_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(reading) => {
                let result =
                    ExtractionResult::success(url, reading.title, reading.price, reading.all_prices, load_time_ms);
                self.cache.set(&key, &result);
                tracing::info!(url, load_time_ms, price = %result.price, "scraped page");
                result
            }
            Err(e) => {
                if e.is_navigation() {
                    tracing::warn!(url, load_time_ms, error = %e, "page failed to load");
                } else {
                    tracing::error!(url, load_time_ms, error = %e, "scrape failed");
                }
                ExtractionResult::failure(url, e.to_string(), load_time_ms)
            }
        }
    }

    /// Number of entries currently held in the cache, expired ones included.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    async fn scrape(&self, url: &str) -> Result<PageReading, Error> {
        let opts = OpenOptions {
            navigation_timeout: self.config.navigation_timeout(),
            settle_delay: self.config.settle_delay(self.registry.slow_render(url)),
        };

        tracing::info!(url, settle_ms = opts.settle_delay.as_millis() as u64, "loading page");
        let guard = PageGuard::new(self.provider.open(url, &opts).await?);
        let reading = self.read_page(guard.page(), url).await;
        guard.release().await;

        reading
    }

    async fn read_page(&self, page: &dyn RenderedPage, url: &str) -> Result<PageReading, Error> {
        let structured = extract_structured(page, url, &self.registry, self.config.selector_timeout()).await;

        let text = page.text().await?;
        let title = page.title().await?;
        let all_prices = all_prices(&text);

        let price = if structured.is_empty() {
            find_main_price(&text, &all_prices, url, &self.registry)
        } else {
            structured
        };

        Ok(PageReading { title: title.trim().to_string(), price, all_prices })
    }
}
