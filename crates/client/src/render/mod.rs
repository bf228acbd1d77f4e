//! Rendered-page providers.
//!
//! A [`PageProvider`] turns a URL into a live [`RenderedPage`] that can be
//! read as plain text and probed with CSS selectors. Two providers exist:
//!
//! - `HeadlessProvider` (feature `render`): one headless Chromium per page,
//!   heavy resources blocked, scripts executed.
//! - [`HttpPageProvider`](crate::fetch::HttpPageProvider): raw HTML over
//!   HTTP, parsed into a [`StaticPage`].
//!
//! Selector probes never fail: anything that goes wrong while querying an
//! element is reported as [`Probe::NotFound`].

#[cfg(feature = "render")]
pub mod chromium;
pub mod static_page;

#[cfg(feature = "render")]
pub use chromium::HeadlessProvider;
pub use static_page::StaticPage;

use std::time::Duration;
use thiserror::Error;

use pricewatch_core::Error;

/// Errors that can occur while opening or reading a page.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Failed to build an HTTP client or other provider plumbing.
    #[error("provider setup failed: {0}")]
    Setup(String),

    /// URL rejected before any request was made.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Failed to navigate to URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Server answered with a non-success status.
    #[error("http status {0}")]
    HttpStatus(u16),

    /// Response body exceeded the configured cap.
    #[error("response of {size} bytes exceeds limit of {limit}")]
    TooLarge { size: u64, limit: usize },

    /// Failed to get page content.
    #[error("content retrieval failed: {0}")]
    ContentRetrieval(String),

    /// Timeout waiting for page to load.
    #[error("navigation timeout after {0}ms")]
    Timeout(u64),

    /// Browser closed unexpectedly.
    #[error("browser closed unexpectedly")]
    BrowserClosed,
}

impl From<RenderError> for Error {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Timeout(ms) => Error::NavigationTimeout(format!("page did not load within {ms}ms")),
            RenderError::Navigation(msg) => Error::NavigationFailed(msg),
            RenderError::InvalidUrl(msg) => Error::InvalidUrl(msg),
            RenderError::HttpStatus(status) => Error::HttpError(format!("server returned status {status}")),
            err @ RenderError::TooLarge { .. } => Error::FetchTooLarge(err.to_string()),
            other => Error::RenderFailed(other.to_string()),
        }
    }
}

/// Per-request page options.
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// Hard limit on navigation.
    pub navigation_timeout: Duration,

    /// Extra wait after navigation for client-side rendering to finish.
    pub settle_delay: Duration,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self { navigation_timeout: Duration::from_millis(15_000), settle_delay: Duration::from_millis(800) }
    }
}

/// What to read from a matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRead {
    /// Rendered inner text.
    Text,
    /// Value of the named attribute, e.g. `content` on a `<meta>` tag.
    Attribute(&'static str),
}

/// Outcome of a single selector probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Found(String),
    NotFound,
}

impl Probe {
    pub fn found(self) -> Option<String> {
        match self {
            Probe::Found(text) => Some(text),
            Probe::NotFound => None,
        }
    }
}

/// Provider of loaded pages.
#[async_trait::async_trait]
pub trait PageProvider: Send + Sync {
    /// Load `url` and wait for it to settle.
    ///
    /// Fails with [`RenderError::Timeout`] or [`RenderError::Navigation`]
    /// when the page cannot be loaded.
    async fn open(&self, url: &str, opts: &OpenOptions) -> Result<Box<dyn RenderedPage>, RenderError>;
}

/// A loaded page owned by exactly one request.
#[async_trait::async_trait]
pub trait RenderedPage: Send + Sync {
    /// Plain visible text of the page body.
    async fn text(&self) -> Result<String, RenderError>;

    /// Main heading, falling back to the document title. Trimmed.
    async fn title(&self) -> Result<String, RenderError>;

    /// Query the first element matching `selector` and read it.
    async fn query(&self, selector: &str, read: ElementRead, timeout: Duration) -> Probe;

    /// Release the page and everything behind it. Best-effort.
    async fn close(self: Box<Self>);
}

/// Scoped ownership of an open page.
///
/// Call [`PageGuard::release`] on every normal exit path. If the guard is
/// dropped instead (panic, cancelled future) the page's own `Drop` runs.
pub struct PageGuard {
    page: Box<dyn RenderedPage>,
}

impl PageGuard {
    pub fn new(page: Box<dyn RenderedPage>) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &dyn RenderedPage {
        self.page.as_ref()
    }

    /// Close the page.
    pub async fn release(self) {
        self.page.close().await;
    }
}
