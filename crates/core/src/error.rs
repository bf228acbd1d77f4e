//! Unified error types for pricewatch.
//!
//! Every variant renders with a stable upper-case code prefix so the text
//! placed into a failed `ExtractionResult` can be matched by consumers.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the price extraction pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty URL list).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// URL could not be parsed or uses an unsupported scheme.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Page failed to load (network failure, browser navigation error).
    #[error("NAVIGATION_FAILED: {0}")]
    NavigationFailed(String),

    /// Page did not finish loading within the navigation timeout.
    #[error("NAVIGATION_TIMEOUT: {0}")]
    NavigationTimeout(String),

    /// Browser could not be launched or page state could not be read.
    #[error("RENDER_FAILED: {0}")]
    RenderFailed(String),

    /// HTTP error response.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Any other failure while extracting.
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),
}

impl Error {
    /// Whether this error ended the request while loading the page.
    pub fn is_navigation(&self) -> bool {
        matches!(self, Error::NavigationFailed(_) | Error::NavigationTimeout(_) | Error::HttpError(_))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::ExtractFailed(_) => -32000,
            Error::InvalidUrl(_) => -32003,
            Error::NavigationTimeout(_) => -32006,
            Error::FetchTooLarge(_) => -32007,
            Error::HttpError(_) => -32008,
            Error::NavigationFailed(_) => -32009,
            Error::RenderFailed(_) => -32012,
        };
        let message = match err {
            Error::InvalidInput(msg)
            | Error::InvalidUrl(msg)
            | Error::NavigationFailed(msg)
            | Error::NavigationTimeout(msg)
            | Error::RenderFailed(msg)
            | Error::HttpError(msg)
            | Error::FetchTooLarge(msg)
            | Error::ExtractFailed(msg) => msg,
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
