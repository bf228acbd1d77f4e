//! Plain HTTP page provider.
//!
//! Used when headless rendering is disabled. The raw HTML response becomes a
//! [`StaticPage`]; prices that only appear after scripts run are missed.
//!
//! - URL normalized first (scheme default, fragment dropped)
//! - Whole request bounded by the navigation timeout
//! - Body capped at `max_bytes`

pub mod url;

use std::time::Instant;

use reqwest::{Client, header};

pub use url::{UrlError, canonicalize};

use pricewatch_core::AppConfig;

use crate::render::{OpenOptions, PageProvider, RenderError, RenderedPage, StaticPage};

/// Configuration for the HTTP provider.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: pricewatch_core::config::DEFAULT_USER_AGENT.to_string(),
            max_bytes: 5 * 1024 * 1024,
            max_redirects: 5,
        }
    }
}

impl FetchConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), max_bytes: config.max_bytes, ..Default::default() }
    }
}

/// Fetches raw HTML and serves it as a static page.
pub struct HttpPageProvider {
    http: Client,
    config: FetchConfig,
}

impl HttpPageProvider {
    /// Create a new provider with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, RenderError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| RenderError::Setup(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    async fn fetch_html(&self, url: &str) -> Result<String, RenderError> {
        let url = canonicalize(url).map_err(|e| RenderError::InvalidUrl(e.to_string()))?;

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| RenderError::Navigation(format!("network error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::HttpStatus(status.as_u16()));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(RenderError::TooLarge { size: len, limit: self.config.max_bytes });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RenderError::Navigation(format!("failed to read response: {e}")))?;

        if bytes.len() > self.config.max_bytes {
            return Err(RenderError::TooLarge { size: bytes.len() as u64, limit: self.config.max_bytes });
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait::async_trait]
impl PageProvider for HttpPageProvider {
    async fn open(&self, url: &str, opts: &OpenOptions) -> Result<Box<dyn RenderedPage>, RenderError> {
        let start = Instant::now();
        let timeout_ms = opts.navigation_timeout.as_millis() as u64;

        let html = tokio::time::timeout(opts.navigation_timeout, self.fetch_html(url))
            .await
            .map_err(|_| RenderError::Timeout(timeout_ms))??;

        tracing::debug!(url, bytes = html.len(), fetch_ms = start.elapsed().as_millis() as u64, "fetched page html");

        Ok(Box::new(StaticPage::parse(html)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert!(config.user_agent.contains("Chrome/"));
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { user_agent: "pricewatch-test".into(), max_bytes: 1024, ..Default::default() };
        let config = FetchConfig::from_app_config(&app);
        assert_eq!(config.user_agent, "pricewatch-test");
        assert_eq!(config.max_bytes, 1024);
    }

    #[test]
    fn test_provider_new() {
        assert!(HttpPageProvider::new(FetchConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_open_rejects_unsupported_scheme() {
        let provider = HttpPageProvider::new(FetchConfig::default()).unwrap();
        let result = provider.open("file:///etc/passwd", &OpenOptions::default()).await;
        assert!(matches!(result, Err(RenderError::InvalidUrl(msg)) if msg.contains("unsupported scheme")));
    }

    #[tokio::test]
    #[ignore = "requires network"]
    async fn test_open_real_page() {
        let provider = HttpPageProvider::new(FetchConfig::default()).unwrap();
        let page = provider.open("https://example.com", &OpenOptions::default()).await.unwrap();
        assert_eq!(page.title().await.unwrap(), "Example Domain");
    }
}
