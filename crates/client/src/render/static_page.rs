//! Pages backed by a fixed HTML document.
//!
//! No scripts run, so prices injected client-side are invisible here. The
//! document is reparsed for every probe because `scraper::Html` cannot be
//! held across an await point.

use std::time::Duration;

use scraper::{ElementRef, Html, Selector};

use super::{ElementRead, Probe, RenderError, RenderedPage};

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// A page whose content is a static HTML document.
#[derive(Debug, Clone)]
pub struct StaticPage {
    html: String,
    text: String,
    title: String,
}

impl StaticPage {
    /// Parse `html`, deriving body text and title from the document.
    pub fn parse(html: impl Into<String>) -> Self {
        let html = html.into();
        let document = Html::parse_document(&html);
        let text = visible_text(&document);
        let title = document_title(&document);
        Self { html, text, title }
    }

    /// Use `text` as the page text instead of deriving it from `html`.
    pub fn with_text(html: impl Into<String>, text: impl Into<String>) -> Self {
        let mut page = Self::parse(html);
        page.text = text.into();
        page
    }

    /// Synchronous selector probe.
    pub fn probe(&self, selector: &str, read: ElementRead) -> Probe {
        let Ok(selector) = Selector::parse(selector) else {
            tracing::debug!(selector, "unparseable selector");
            return Probe::NotFound;
        };

        let document = Html::parse_document(&self.html);
        let Some(element) = document.select(&selector).next() else {
            return Probe::NotFound;
        };

        let value = match read {
            ElementRead::Text => Some(element_text(element)),
            ElementRead::Attribute(name) => element.value().attr(name).map(|v| v.trim().to_string()),
        };

        match value {
            Some(v) => Probe::Found(v),
            None => Probe::NotFound,
        }
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Visible text of `<body>`, one space between text nodes.
fn visible_text(document: &Html) -> String {
    let Ok(body) = Selector::parse("body") else {
        return String::new();
    };
    let Some(body) = document.select(&body).next() else {
        return String::new();
    };

    let mut pieces = Vec::new();
    for node in body.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .ancestors()
            .filter_map(|a| a.value().as_element())
            .any(|e| HIDDEN_ELEMENTS.contains(&e.name()));
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed);
        }
    }

    pieces.join(" ")
}

/// First `<h1>` text, else `<title>`, else empty.
fn document_title(document: &Html) -> String {
    ["h1", "title"]
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .filter_map(|sel| document.select(&sel).next().map(element_text))
        .find(|t| !t.is_empty())
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl RenderedPage for StaticPage {
    async fn text(&self) -> Result<String, RenderError> {
        Ok(self.text.clone())
    }

    async fn title(&self) -> Result<String, RenderError> {
        Ok(self.title.clone())
    }

    async fn query(&self, selector: &str, read: ElementRead, _timeout: Duration) -> Probe {
        self.probe(selector, read)
    }

    async fn close(self: Box<Self>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_HTML: &str = r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>Acme TV | Example Store</title>
            <meta itemprop="price" content="1299.00">
            <style>.price { color: red; }</style>
        </head>
        <body>
            <h1> Acme 65" OLED TV </h1>
            <div class="price">Now $1,299.00</div>
            <script>var fake = "$5.00";</script>
            <p>Delivery from $9.95</p>
        </body>
        </html>
    "#;

    #[test]
    fn test_title_prefers_h1() {
        let page = StaticPage::parse(PRODUCT_HTML);
        assert_eq!(page.title, r#"Acme 65" OLED TV"#);
    }

    #[test]
    fn test_title_falls_back_to_document_title() {
        let page = StaticPage::parse("<html><head><title>Only Title</title></head><body></body></html>");
        assert_eq!(page.title, "Only Title");
    }

    #[test]
    fn test_title_empty_when_absent() {
        let page = StaticPage::parse("<p>nothing</p>");
        assert_eq!(page.title, "");
    }

    #[test]
    fn test_text_skips_scripts_and_styles() {
        let page = StaticPage::parse(PRODUCT_HTML);
        assert!(page.text.contains("Now $1,299.00"));
        assert!(page.text.contains("Delivery from $9.95"));
        assert!(!page.text.contains("$5.00"));
        assert!(!page.text.contains("color"));
    }

    #[test]
    fn test_probe_text() {
        let page = StaticPage::parse(PRODUCT_HTML);
        assert_eq!(page.probe(".price", ElementRead::Text), Probe::Found("Now $1,299.00".into()));
    }

    #[test]
    fn test_probe_attribute() {
        let page = StaticPage::parse(PRODUCT_HTML);
        assert_eq!(
            page.probe(r#"meta[itemprop="price"]"#, ElementRead::Attribute("content")),
            Probe::Found("1299.00".into())
        );
    }

    #[test]
    fn test_probe_missing_element() {
        let page = StaticPage::parse(PRODUCT_HTML);
        assert_eq!(page.probe(".current-price", ElementRead::Text), Probe::NotFound);
    }

    #[test]
    fn test_probe_missing_attribute() {
        let page = StaticPage::parse(PRODUCT_HTML);
        assert_eq!(page.probe(".price", ElementRead::Attribute("content")), Probe::NotFound);
    }

    #[test]
    fn test_probe_invalid_selector_is_not_found() {
        let page = StaticPage::parse(PRODUCT_HTML);
        assert_eq!(page.probe("[[[", ElementRead::Text), Probe::NotFound);
    }

    #[test]
    fn test_with_text_overrides_body_text() {
        let page = StaticPage::with_text(PRODUCT_HTML, "Ticket $129.00 $89.00");
        assert_eq!(page.text, "Ticket $129.00 $89.00");
        assert_eq!(page.title, r#"Acme 65" OLED TV"#);
    }

    #[tokio::test]
    async fn test_rendered_page_impl() {
        let page: Box<dyn RenderedPage> = Box::new(StaticPage::parse(PRODUCT_HTML));
        assert!(page.text().await.unwrap().contains("$1,299.00"));
        assert_eq!(
            page.query(".price", ElementRead::Text, Duration::from_millis(200)).await,
            Probe::Found("Now $1,299.00".into())
        );
        page.close().await;
    }
}
