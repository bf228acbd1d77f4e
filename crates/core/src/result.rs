//! The normalized price record returned for every extraction request.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of entries kept in [`ExtractionResult::all_prices`].
pub const MAX_ALL_PRICES: usize = 10;

/// Outcome of one price extraction.
///
/// Failures carry `success = false` and a populated `error`; the extraction
/// fields are left empty in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ExtractionResult {
    pub success: bool,
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Main displayed price, currency-prefixed, or empty when none was found.
    #[serde(default)]
    pub price: String,
    /// Distinct price tokens in first-seen order, at most [`MAX_ALL_PRICES`].
    #[serde(default)]
    pub all_prices: Vec<String>,
    /// ISO-8601 UTC timestamp of when the result was produced.
    pub timestamp: String,
    pub load_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set to `true` on results served from the cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_hit: Option<bool>,
}

impl ExtractionResult {
    /// Build a successful result stamped with the current time.
    ///
    /// `all_prices` is truncated to [`MAX_ALL_PRICES`] entries.
    pub fn success(
        url: impl Into<String>, title: impl Into<String>, price: impl Into<String>, mut all_prices: Vec<String>,
        load_time_ms: u64,
    ) -> Self {
        all_prices.truncate(MAX_ALL_PRICES);
        Self {
            success: true,
            url: url.into(),
            title: title.into(),
            price: price.into(),
            all_prices,
            timestamp: now_iso8601(),
            load_time_ms,
            error: None,
            cache_hit: None,
        }
    }

    /// Build a failed result stamped with the current time.
    pub fn failure(url: impl Into<String>, error: impl Into<String>, load_time_ms: u64) -> Self {
        Self {
            success: false,
            url: url.into(),
            title: String::new(),
            price: String::new(),
            all_prices: Vec::new(),
            timestamp: now_iso8601(),
            load_time_ms,
            error: Some(error.into()),
            cache_hit: None,
        }
    }
}

/// Current UTC time as an RFC 3339 string with millisecond precision.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
