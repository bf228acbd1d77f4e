//! Text-pattern price heuristics.
//!
//! Each site rule looks for a fixed UI label in the page text and searches a
//! bounded window around it, so unrelated prices elsewhere on the page
//! (accessories, shipping, recommendations) are not picked up. When no rule
//! applies, [`generic_fallback`] picks the first price above a threshold.

use std::sync::LazyLock;

use regex::Regex;

use super::sites::SiteRegistry;
use super::{CURRENCY_SYMBOL, PRICE_TOKEN_PATTERN, chars_after, chars_before, first_price_token, last_price_token, price_value};

/// Availability line printed below the main price.
pub const AVAILABILITY_MARKER: &str = "Available on";
/// Promotional suffix that follows the real price.
pub const PROMO_SUFFIX: &str = "EASAVE";
/// Marker preceding a "starting from" price.
pub const FROM_MARKER: &str = "FROM";
/// Prompt rendered right after the price block.
pub const COUPON_PROMPT: &str = "Log in to see if you have coupons";
/// Label preceding the ticketed and current prices.
pub const TICKET_LABEL: &str = "Ticket";
/// Heading under the price on the product page.
pub const DELIVERY_OPTIONS: &str = "Ways you can get it";

const AVAILABILITY_WINDOW: usize = 500;
const FROM_TAIL: usize = 100;
const COUPON_WINDOW: usize = 300;
const TICKET_WINDOW: usize = 100;
const DELIVERY_WINDOW: usize = 300;

/// Prices at or below this are assumed to be accessories or shipping.
pub const FALLBACK_THRESHOLD: f64 = 100.0;

static PROMO_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{PRICE_TOKEN_PATTERN}\s*{PROMO_SUFFIX}")).expect("invalid promo regex")
});

static TICKET_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:,\d+)*(?:\.\d{2})?").expect("invalid ticket regex"));

/// Pick the main price from page text.
///
/// Site rules for every class matching `url` run first, in registry order;
/// the first that yields a price wins. Otherwise [`generic_fallback`].
pub fn find_main_price(text: &str, all_prices: &[String], url: &str, registry: &SiteRegistry) -> String {
    for site in registry.matching(url) {
        if let Some(price) = (site.rule)(text) {
            tracing::debug!(site = site.name, price = %price, "site heuristic matched");
            return price;
        }
        tracing::debug!(site = site.name, "site heuristic found nothing");
    }

    generic_fallback(all_prices)
}

/// First price above [`FALLBACK_THRESHOLD`], else the first price, else empty.
pub fn generic_fallback(all_prices: &[String]) -> String {
    all_prices
        .iter()
        .find(|p| price_value(p).is_some_and(|v| v > FALLBACK_THRESHOLD))
        .or_else(|| all_prices.first())
        .cloned()
        .unwrap_or_default()
}

/// Price block that ends at an availability line.
///
/// Within the 500 characters before [`AVAILABILITY_MARKER`], in order:
/// the last price followed by [`PROMO_SUFFIX`]; the first price after the
/// last [`FROM_MARKER`]; the last price. A [`FROM_MARKER`] printed on the
/// availability line itself (within 100 characters past the marker) takes
/// precedence over one inside the window, and its price is read from that
/// line only.
pub fn before_availability_marker(text: &str) -> Option<String> {
    let idx = text.find(AVAILABILITY_MARKER)?;
    let window = chars_before(text, idx, AVAILABILITY_WINDOW);

    if let Some(promo) = PROMO_PRICE.find_iter(window).last() {
        return first_price_token(promo.as_str()).map(str::to_string);
    }

    let tail = chars_after(text, idx, AVAILABILITY_MARKER.len() + FROM_TAIL);
    let from_price = match tail.rfind(FROM_MARKER) {
        Some(from_idx) => first_price_token(&tail[from_idx..]),
        None => window
            .rfind(FROM_MARKER)
            .and_then(|from_idx| first_price_token(&window[from_idx..])),
    };
    if let Some(price) = from_price {
        return Some(price.to_string());
    }

    last_price_token(window).map(str::to_string)
}

/// Price block followed by a coupon prompt or introduced by a ticket label.
///
/// The last price in the 300 characters before [`COUPON_PROMPT`] wins.
/// Otherwise the numbers in the 100 characters from [`TICKET_LABEL`] are
/// read as ticketed then current price; the second (or only) one is used.
pub fn near_coupon_prompt_or_ticket(text: &str) -> Option<String> {
    if let Some(idx) = text.find(COUPON_PROMPT)
        && let Some(price) = last_price_token(chars_before(text, idx, COUPON_WINDOW))
    {
        return Some(price.to_string());
    }

    let idx = text.find(TICKET_LABEL)?;
    let region = chars_after(text, idx, TICKET_WINDOW);
    let numbers: Vec<&str> = TICKET_NUMBER.find_iter(region).take(2).map(|m| m.as_str()).collect();

    numbers
        .get(1)
        .or_else(|| numbers.first())
        .map(|n| format!("{CURRENCY_SYMBOL}{n}"))
}

/// Last price in the 300 characters before [`DELIVERY_OPTIONS`].
pub fn before_delivery_options(text: &str) -> Option<String> {
    let idx = text.find(DELIVERY_OPTIONS)?;
    last_price_token(chars_before(text, idx, DELIVERY_WINDOW)).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::all_prices;

    const HARVEY: &str = "https://www.harveynorman.com.au/lg-65-inch-oled";
    const JB: &str = "https://www.jbhifi.com.au/products/sony-headphones";
    const OFFICEWORKS: &str = "https://www.officeworks.com.au/shop/officeworks/p/chair";
    const GENERIC: &str = "https://shop.example.com/widget";

    fn main_price(text: &str, url: &str) -> String {
        find_main_price(text, &all_prices(text), url, &SiteRegistry::default())
    }

    #[test]
    fn test_availability_from_marker_after_anchor() {
        let text = "...$499.00 stuff... Available on eBay FROM $399.00 more text";
        assert_eq!(main_price(text, HARVEY), "$399.00");
    }

    #[test]
    fn test_availability_promo_suffix_wins() {
        let text = "Bundle $59.00 EASAVE $2,199.00 EASAVE was $2,499.00 FROM $99.00 Available on backorder";
        assert_eq!(before_availability_marker(text).as_deref(), Some("$2,199.00"));
    }

    #[test]
    fn test_availability_from_marker_in_window() {
        let text = "Was $1,999.00 FROM $1,499.00 per month $60.00 Available on order";
        assert_eq!(before_availability_marker(text).as_deref(), Some("$1,499.00"));
    }

    #[test]
    fn test_availability_last_price_in_window() {
        let text = "RRP $1,999.00 Our price $1,549.00 Available on order";
        assert_eq!(before_availability_marker(text).as_deref(), Some("$1,549.00"));
    }

    #[test]
    fn test_availability_window_is_bounded() {
        let filler = "x".repeat(600);
        let text = format!("Far away $9,999.00 {filler} Available on order");
        assert_eq!(before_availability_marker(&text), None);
    }

    #[test]
    fn test_availability_from_without_price_stays_in_window() {
        let text = "Our price $899.00 FROM Available on eBay $20.00 shipping";
        assert_eq!(before_availability_marker(text).as_deref(), Some("$899.00"));
    }

    #[test]
    fn test_availability_from_on_marker_line_wins() {
        let text = "Was $1,299.00 FROM $1,199.00 Available on eBay FROM $999.00";
        assert_eq!(before_availability_marker(text).as_deref(), Some("$999.00"));
    }

    #[test]
    fn test_availability_from_beyond_tail_ignored() {
        let filler = "z".repeat(120);
        let text = format!("Now $749.00 Available on eBay {filler} FROM $10.00");
        assert_eq!(before_availability_marker(&text).as_deref(), Some("$749.00"));
    }

    #[test]
    fn test_availability_no_anchor() {
        assert_eq!(before_availability_marker("$499.00 in stock"), None);
    }

    #[test]
    fn test_availability_falls_through_to_generic() {
        let text = "Available on request. Cables $29.00 TV $1,149.00";
        assert_eq!(main_price(text, HARVEY), "$1,149.00");
    }

    #[test]
    fn test_ticket_second_number() {
        let text = "Ticket $129.00 $89.00 save now";
        assert_eq!(main_price(text, JB), "$89.00");
    }

    #[test]
    fn test_ticket_single_number() {
        let text = "Ticket price 1,299.00";
        assert_eq!(near_coupon_prompt_or_ticket(text).as_deref(), Some("$1,299.00"));
    }

    #[test]
    fn test_ticket_numbers_bounded_to_window() {
        let filler = "x".repeat(120);
        let text = format!("Ticket $129.00 {filler} $89.00");
        assert_eq!(near_coupon_prompt_or_ticket(&text).as_deref(), Some("$129.00"));
    }

    #[test]
    fn test_coupon_prompt_preferred_over_ticket() {
        let text = "Ticket $349.00 $299.00 Now $279.00 Log in to see if you have coupons";
        assert_eq!(near_coupon_prompt_or_ticket(text).as_deref(), Some("$279.00"));
    }

    #[test]
    fn test_coupon_prompt_without_price_uses_ticket() {
        let filler = "y".repeat(400);
        let text = format!("Ticket $20.00 $15.00 {filler} Log in to see if you have coupons");
        assert_eq!(near_coupon_prompt_or_ticket(&text).as_deref(), Some("$15.00"));
    }

    #[test]
    fn test_ticket_rule_ignored_for_other_sites() {
        let text = "Ticket $129.00 $89.00 save now";
        assert_eq!(main_price(text, GENERIC), "$129.00");
    }

    #[test]
    fn test_delivery_options() {
        let text = "Chair $45.00 Sale $199.00 Ways you can get it Delivery $9.95";
        assert_eq!(main_price(text, OFFICEWORKS), "$199.00");
        assert_eq!(before_delivery_options("Free delivery. Ways you can get it"), None);
    }

    #[test]
    fn test_delivery_window_is_bounded() {
        let filler = "x".repeat(300);
        let text = format!("Desk $349.00 {filler}Ways you can get it");
        assert_eq!(before_delivery_options(&text), None);

        let text = format!("Desk $349.00{filler}Ways you can get it");
        assert_eq!(before_delivery_options(&text), None);

        let filler = "x".repeat(292);
        let text = format!("$349.00{filler}Ways you can get it");
        assert_eq!(before_delivery_options(&text).as_deref(), Some("$349.00"));
    }

    #[test]
    fn test_generic_threshold() {
        let text = "Cable $45.00 Television $199.99 Mount $12.50";
        assert_eq!(main_price(text, GENERIC), "$199.99");
    }

    #[test]
    fn test_generic_threshold_is_exclusive() {
        let prices = vec!["$100.00".to_string(), "$100.01".to_string()];
        assert_eq!(generic_fallback(&prices), "$100.01");
    }

    #[test]
    fn test_generic_first_when_all_small() {
        let prices = vec!["$45.00".to_string(), "$12.50".to_string()];
        assert_eq!(generic_fallback(&prices), "$45.00");
    }

    #[test]
    fn test_no_prices() {
        assert_eq!(main_price("Out of stock. Check back later.", GENERIC), "");
        assert_eq!(main_price("Ways you can get it", OFFICEWORKS), "");
    }
}
