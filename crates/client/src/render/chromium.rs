//! Headless Chromium provider using chromiumoxide.
//!
//! Every `open` launches its own browser process so no cookies, storage or
//! DOM state leak between requests. Images, media, fonts and stylesheets
//! are intercepted by resource type and failed before they hit the network.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams, RequestPattern, RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use tokio::task::JoinHandle;

use pricewatch_core::AppConfig;

use super::{ElementRead, OpenOptions, PageProvider, Probe, RenderError, RenderedPage};

/// Chromium flags applied to every launched browser.
pub const BROWSER_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-extensions",
    "--ignore-certificate-errors",
    "--lang=en-US",
];

/// Resource types failed before they are requested.
pub const BLOCKED_RESOURCE_TYPES: &[ResourceType] =
    &[ResourceType::Image, ResourceType::Media, ResourceType::Font, ResourceType::Stylesheet];

fn is_blocked(resource_type: &ResourceType) -> bool {
    BLOCKED_RESOURCE_TYPES.contains(resource_type)
}

/// One interception pattern per blocked resource type, any URL.
fn blocked_request_patterns() -> Vec<RequestPattern> {
    BLOCKED_RESOURCE_TYPES
        .iter()
        .map(|resource_type| RequestPattern {
            url_pattern: Some("*".to_string()),
            resource_type: Some(resource_type.clone()),
            request_stage: Some(RequestStage::Request),
        })
        .collect()
}

const BODY_TEXT_JS: &str = "document.body ? document.body.innerText : ''";
const TITLE_JS: &str = "(function() { \
     const h1 = document.querySelector('h1'); \
     return (h1 && h1.innerText) || document.title || ''; \
 })()";

/// Launches a fresh headless browser per page.
#[derive(Debug, Clone)]
pub struct HeadlessProvider {
    user_agent: String,
    viewport: (u32, u32),
}

impl HeadlessProvider {
    pub fn new(user_agent: impl Into<String>, viewport: (u32, u32)) -> Self {
        Self { user_agent: user_agent.into(), viewport }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.user_agent.clone(), (config.viewport_width, config.viewport_height))
    }

    async fn launch(&self) -> Result<(Browser, JoinHandle<()>), RenderError> {
        let builder = BROWSER_ARGS
            .iter()
            .fold(BrowserConfig::builder(), |b, arg| b.arg(*arg))
            .window_size(self.viewport.0, self.viewport.1);

        let (browser, mut handler) = Browser::launch(builder.build().map_err(RenderError::BrowserLaunch)?)
            .await
            .map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                    break;
                }
            }
        });

        Ok((browser, handle))
    }

    /// Override the user agent and start failing heavy requests.
    ///
    /// Returns the task answering paused requests; it ends when the page goes away.
    async fn prepare(&self, page: &Page) -> Result<JoinHandle<()>, RenderError> {
        page.set_user_agent(SetUserAgentOverrideParams::new(self.user_agent.clone()))
            .await
            .map_err(|e| RenderError::Setup(e.to_string()))?;

        let mut paused = page
            .event_listener::<EventRequestPaused>()
            .await
            .map_err(|e| RenderError::Setup(e.to_string()))?;

        page.execute(EnableParams { patterns: Some(blocked_request_patterns()), handle_auth_requests: None })
            .await
            .map_err(|e| RenderError::Setup(e.to_string()))?;

        let page = page.clone();
        Ok(tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                let outcome = if is_blocked(&event.resource_type) {
                    page.execute(FailRequestParams::new(event.request_id.clone(), ErrorReason::BlockedByClient))
                        .await
                        .map(drop)
                } else {
                    page.execute(ContinueRequestParams::new(event.request_id.clone())).await.map(drop)
                };
                if let Err(e) = outcome {
                    tracing::debug!("paused request not answered: {e}");
                }
            }
        }))
    }
}

#[async_trait::async_trait]
impl PageProvider for HeadlessProvider {
    async fn open(&self, url: &str, opts: &OpenOptions) -> Result<Box<dyn RenderedPage>, RenderError> {
        let (browser, handler) = self.launch().await?;

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                shutdown(browser, handler).await;
                return Err(RenderError::BrowserLaunch(e.to_string()));
            }
        };

        let interceptor = match self.prepare(&page).await {
            Ok(interceptor) => interceptor,
            Err(e) => {
                shutdown(browser, handler).await;
                return Err(e);
            }
        };

        let rendered = ChromiumPage {
            browser: Some(browser),
            page: Some(page),
            handler: Some(handler),
            interceptor: Some(interceptor),
        };

        if let Err(e) = rendered.navigate(url, opts).await {
            Box::new(rendered).close().await;
            return Err(e);
        }

        Ok(Box::new(rendered))
    }
}

/// A page in its own browser process.
struct ChromiumPage {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    interceptor: Option<JoinHandle<()>>,
}

impl ChromiumPage {
    fn page(&self) -> Result<&Page, RenderError> {
        self.page.as_ref().ok_or(RenderError::BrowserClosed)
    }

    async fn navigate(&self, url: &str, opts: &OpenOptions) -> Result<(), RenderError> {
        let page = self.page()?;

        tracing::debug!(url, "navigating");
        let timeout_ms = opts.navigation_timeout.as_millis() as u64;
        match tokio::time::timeout(opts.navigation_timeout, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(RenderError::Navigation(e.to_string())),
            Err(_) => return Err(RenderError::Timeout(timeout_ms)),
        }

        tokio::time::sleep(opts.settle_delay).await;
        Ok(())
    }

    async fn evaluate_string(&self, script: &str) -> Result<String, RenderError> {
        let value = self
            .page()?
            .evaluate(script)
            .await
            .map_err(|e| RenderError::ContentRetrieval(e.to_string()))?;

        value
            .into_value::<Option<String>>()
            .map(Option::unwrap_or_default)
            .map_err(|e| RenderError::ContentRetrieval(format!("unexpected script result: {e}")))
    }

    async fn read_element(&self, selector: &str, read: ElementRead) -> Option<String> {
        let element = self.page.as_ref()?.find_element(selector).await.ok()?;
        let value = match read {
            ElementRead::Text => element.inner_text().await,
            ElementRead::Attribute(name) => element.attribute(name).await,
        };
        value.ok().flatten().map(|v| v.trim().to_string())
    }
}

#[async_trait::async_trait]
impl RenderedPage for ChromiumPage {
    async fn text(&self) -> Result<String, RenderError> {
        self.evaluate_string(BODY_TEXT_JS).await
    }

    async fn title(&self) -> Result<String, RenderError> {
        Ok(self.evaluate_string(TITLE_JS).await?.trim().to_string())
    }

    async fn query(&self, selector: &str, read: ElementRead, timeout: Duration) -> Probe {
        match tokio::time::timeout(timeout, self.read_element(selector, read)).await {
            Ok(Some(value)) => Probe::Found(value),
            Ok(None) => Probe::NotFound,
            Err(_) => {
                tracing::debug!(selector, timeout_ms = timeout.as_millis() as u64, "selector probe timed out");
                Probe::NotFound
            }
        }
    }

    async fn close(self: Box<Self>) {
        let mut this = self;
        if let Some(interceptor) = this.interceptor.take() {
            interceptor.abort();
        }
        if let Some(page) = this.page.take()
            && let Err(e) = page.close().await
        {
            tracing::debug!("page close failed: {e}");
        }
        if let (Some(browser), Some(handler)) = (this.browser.take(), this.handler.take()) {
            shutdown(browser, handler).await;
        }
    }
}

impl Drop for ChromiumPage {
    fn drop(&mut self) {
        if let Some(interceptor) = self.interceptor.take() {
            interceptor.abort();
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

async fn shutdown(mut browser: Browser, handler: JoinHandle<()>) {
    if let Err(e) = browser.close().await {
        tracing::debug!("browser close failed: {e}");
    }
    if let Err(e) = browser.wait().await {
        tracing::debug!("browser wait failed: {e}");
    }
    handler.abort();
}
