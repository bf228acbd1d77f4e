//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PRICEWATCH_*)
//! 2. TOML config file (if PRICEWATCH_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Desktop Chrome user agent presented to retailer sites.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PRICEWATCH_*)
/// 2. TOML config file (if PRICEWATCH_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Seconds a cached result stays fresh.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Store size above which a write evicts the oldest entries.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Number of oldest entries dropped per eviction.
    #[serde(default = "default_cache_evict_count")]
    pub cache_evict_count: usize,

    /// Hard limit on page navigation in milliseconds.
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Wait after navigation before reading page state.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Settle delay for site classes that render prices late.
    #[serde(default = "default_slow_settle_delay_ms")]
    pub slow_settle_delay_ms: u64,

    /// Timeout for a single selector probe in milliseconds.
    #[serde(default = "default_selector_timeout_ms")]
    pub selector_timeout_ms: u64,

    /// User-Agent string for browser and HTTP requests.
    ///
    /// Set via PRICEWATCH_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    /// Whether pages are rendered by a headless browser.
    ///
    /// When false, raw HTML is fetched over HTTP and no scripts run.
    #[serde(default = "default_true")]
    pub render_enabled: bool,

    /// Maximum bytes to fetch per request in HTTP mode.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum number of URLs of one batch extracted at the same time.
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_cache_max_entries() -> usize {
    1000
}

fn default_cache_evict_count() -> usize {
    100
}

fn default_navigation_timeout_ms() -> u64 {
    15_000
}

fn default_settle_delay_ms() -> u64 {
    800
}

fn default_slow_settle_delay_ms() -> u64 {
    2_000
}

fn default_selector_timeout_ms() -> u64 {
    200
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}

fn default_viewport_width() -> u32 {
    1920
}

fn default_viewport_height() -> u32 {
    1080
}

fn default_true() -> bool {
    true
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_batch_concurrency() -> usize {
    1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_max_entries: default_cache_max_entries(),
            cache_evict_count: default_cache_evict_count(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            slow_settle_delay_ms: default_slow_settle_delay_ms(),
            selector_timeout_ms: default_selector_timeout_ms(),
            user_agent: default_user_agent(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            render_enabled: true,
            max_bytes: default_max_bytes(),
            batch_concurrency: default_batch_concurrency(),
        }
    }
}

impl AppConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// Settle delay for a page, longer when the site renders slowly.
    pub fn settle_delay(&self, slow_render: bool) -> Duration {
        if slow_render {
            Duration::from_millis(self.slow_settle_delay_ms)
        } else {
            Duration::from_millis(self.settle_delay_ms)
        }
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_millis(self.selector_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PRICEWATCH_`
    /// 2. TOML file from `PRICEWATCH_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PRICEWATCH_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PRICEWATCH_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
