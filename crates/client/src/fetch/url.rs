//! URL checks applied before a page is requested.

/// Error type for URL normalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("missing host")]
    MissingHost,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Normalize a product URL for requesting.
///
/// Surrounding whitespace is trimmed, `https://` is assumed when no scheme
/// is given, only http(s) with a host is accepted, and the fragment is
/// dropped. The host is lowercased by the parser.
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let candidate = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };
    let mut parsed = url::Url::parse(&candidate).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(UrlError::UnsupportedScheme(parsed.scheme().to_string()));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    parsed.set_fragment(None);
    Ok(parsed)
}
