//! Request URL resolution.
//!
//! Hosts hand the agent either absolute URLs or paths relative to the
//! application origin. Schemes are left alone: non-http(s) URLs are valid
//! input and are classified as pass-through later.

use url::Url;

/// Error type for URL resolution.
#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error("URL cannot be empty")]
    Empty,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve `input` to an absolute URL.
///
/// - Trims surrounding whitespace
/// - Absolute URLs are parsed as-is (any scheme)
/// - Anything else is joined onto `origin`
pub fn resolve(input: &str, origin: &Url) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    match Url::parse(trimmed) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))
        }
        Err(e) => Err(UrlError::InvalidUrl(e.to_string())),
    }
}
