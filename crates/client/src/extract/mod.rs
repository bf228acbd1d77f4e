//! Price extraction from rendered pages.
//!
//! Two strategies run in a fixed order:
//!
//! 1. [`structured`]: ranked CSS selectors probed against the live page.
//!    Site-specific selectors first, then generic ones.
//! 2. [`heuristic`]: text-window rules over the page's plain text, keyed by
//!    site class, then a numeric-threshold fallback.
//!
//! Everything works on price tokens: a `$` followed by digits with optional
//! thousands separators and decimals, e.g. `$1,234.56`.

pub mod heuristic;
pub mod sites;
pub mod structured;

pub use heuristic::{find_main_price, generic_fallback};
pub use sites::{PriceSelector, SiteClass, SiteRegistry};
pub use structured::extract_structured;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use pricewatch_core::result::MAX_ALL_PRICES;

/// Currency symbol every returned price starts with.
pub const CURRENCY_SYMBOL: &str = "$";

/// Regex source for a single price token.
pub(crate) const PRICE_TOKEN_PATTERN: &str = r"\$\d+(?:,\d+)*(?:\.\d+)?";

static PRICE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(PRICE_TOKEN_PATTERN).expect("invalid price regex"));

static NUMERIC_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:,\d+)*(?:\.\d{1,2})?$").expect("invalid numeric regex"));

/// All price tokens in `text`, in order of appearance.
pub fn price_tokens(text: &str) -> impl Iterator<Item = &str> {
    PRICE_TOKEN.find_iter(text).map(|m| m.as_str())
}

pub fn first_price_token(text: &str) -> Option<&str> {
    PRICE_TOKEN.find(text).map(|m| m.as_str())
}

pub fn last_price_token(text: &str) -> Option<&str> {
    price_tokens(text).last()
}

/// Distinct price tokens in first-seen order, capped at ten.
pub fn all_prices(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut prices = Vec::new();

    for token in price_tokens(text) {
        if prices.len() == MAX_ALL_PRICES {
            break;
        }
        if seen.insert(token) {
            prices.push(token.to_string());
        }
    }

    prices
}

/// Prefix a bare number like `1,299.00` with the currency symbol.
///
/// Returns `None` unless the whole (trimmed) input is a number with optional
/// thousands separators and at most two decimal digits.
pub fn normalize_numeric(text: &str) -> Option<String> {
    let trimmed = text.trim();
    NUMERIC_ONLY
        .is_match(trimmed)
        .then(|| format!("{CURRENCY_SYMBOL}{trimmed}"))
}

/// Numeric value of a price token, ignoring the symbol and separators.
pub fn price_value(token: &str) -> Option<f64> {
    let digits: String = token.chars().filter(|c| *c != '$' && *c != ',').collect();
    digits.parse().ok()
}

/// Up to `chars` characters of `text` ending just before byte offset `end`.
pub(crate) fn chars_before(text: &str, end: usize, chars: usize) -> &str {
    let head = &text[..end];
    let start = head.char_indices().rev().nth(chars.saturating_sub(1)).map_or(0, |(i, _)| i);
    if chars == 0 { "" } else { &head[start..] }
}

/// Up to `chars` characters of `text` starting at byte offset `start`.
pub(crate) fn chars_after(text: &str, start: usize, chars: usize) -> &str {
    let tail = &text[start..];
    let end = tail.char_indices().nth(chars).map_or(tail.len(), |(i, _)| i);
    &tail[..end]
}
