//! Site-class registry.
//!
//! A site class groups retailer pages that share a layout convention. Each
//! class is plain data: a URL marker, an ordered selector list, a render
//! speed hint, and a text heuristic. Adding a retailer means adding an
//! entry here.

use crate::render::ElementRead;

use super::heuristic;

/// A CSS selector plus what to read from the element it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSelector {
    pub css: &'static str,
    pub read: ElementRead,
}

impl PriceSelector {
    pub const fn text(css: &'static str) -> Self {
        Self { css, read: ElementRead::Text }
    }

    pub const fn meta(css: &'static str) -> Self {
        Self { css, read: ElementRead::Attribute("content") }
    }
}

/// Heuristic run over a page's plain text. `None` defers to the fallback.
pub type TextRule = fn(&str) -> Option<String>;

/// One retailer layout convention.
#[derive(Debug, Clone, Copy)]
pub struct SiteClass {
    pub name: &'static str,
    /// Lowercase substring identifying the retailer in a URL.
    pub url_marker: &'static str,
    /// Tried in order before the generic selectors.
    pub selectors: &'static [PriceSelector],
    /// Whether prices render late and need the longer settle delay.
    pub slow_render: bool,
    pub rule: TextRule,
}

impl SiteClass {
    pub fn matches(&self, url: &str) -> bool {
        url.to_lowercase().contains(self.url_marker)
    }
}

/// Selectors tried on every page after any site-specific ones.
pub const GENERIC_SELECTORS: &[PriceSelector] = &[
    PriceSelector::text(r#"[itemprop="price"]"#),
    PriceSelector::text(r#"[data-testid*="price"]"#),
    PriceSelector::text(".price"),
    PriceSelector::text(".product-price"),
    PriceSelector::text(".current-price"),
    PriceSelector::meta(r#"meta[itemprop="price"]"#),
];

const JBHIFI_SELECTORS: &[PriceSelector] = &[
    PriceSelector::text(r#"span[class*="PriceTag_actual"]"#),
    PriceSelector::text(r#"span[class*="PriceFont_fontStyle"]"#),
    PriceSelector::text(".price__current"),
    PriceSelector::text(r#"[data-testid="price-display"]"#),
];

/// Built-in site classes in evaluation order.
pub const BUILTIN_SITES: &[SiteClass] = &[
    SiteClass {
        name: "harveynorman",
        url_marker: "harveynorman",
        selectors: &[],
        slow_render: true,
        rule: heuristic::before_availability_marker,
    },
    SiteClass {
        name: "jbhifi",
        url_marker: "jbhifi",
        selectors: JBHIFI_SELECTORS,
        slow_render: false,
        rule: heuristic::near_coupon_prompt_or_ticket,
    },
    SiteClass {
        name: "officeworks",
        url_marker: "officeworks",
        selectors: &[],
        slow_render: false,
        rule: heuristic::before_delivery_options,
    },
];

/// Ordered collection of site classes plus the generic selector list.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    sites: Vec<SiteClass>,
    generic: &'static [PriceSelector],
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self { sites: BUILTIN_SITES.to_vec(), generic: GENERIC_SELECTORS }
    }
}

impl SiteRegistry {
    /// A registry with no site classes; only generic selectors apply.
    pub fn generic_only() -> Self {
        Self { sites: Vec::new(), generic: GENERIC_SELECTORS }
    }

    /// Append a site class, evaluated after those already registered.
    pub fn with_site(mut self, site: SiteClass) -> Self {
        self.sites.push(site);
        self
    }

    /// Site classes whose marker appears in `url`, in registry order.
    pub fn matching<'a>(&'a self, url: &'a str) -> impl Iterator<Item = &'a SiteClass> + 'a {
        self.sites.iter().filter(move |s| s.matches(url))
    }

    /// Whether any matching site class renders slowly.
    pub fn slow_render(&self, url: &str) -> bool {
        self.matching(url).any(|s| s.slow_render)
    }

    /// Every selector to try for `url`: site-specific first, then generic.
    pub fn selectors_for<'a>(&'a self, url: &'a str) -> impl Iterator<Item = &'a PriceSelector> + 'a {
        self.matching(url)
            .flat_map(|s| s.selectors.iter())
            .chain(self.generic.iter())
    }
}
