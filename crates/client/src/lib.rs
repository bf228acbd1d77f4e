//! Client code for pricewatch.
//!
//! This crate provides the page providers (headless Chromium and plain
//! HTTP), price extraction strategies, and the [`PriceScraper`] pipeline
//! that ties them to the fingerprint cache.

pub mod extract;
pub mod fetch;
pub mod render;
pub mod scrape;

pub use extract::{PriceSelector, SiteClass, SiteRegistry, all_prices, extract_structured, find_main_price};
pub use fetch::{FetchConfig, HttpPageProvider};
#[cfg(feature = "render")]
pub use render::HeadlessProvider;
pub use render::{OpenOptions, PageGuard, PageProvider, Probe, RenderError, RenderedPage, StaticPage};
pub use scrape::PriceScraper;
