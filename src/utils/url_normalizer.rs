//! URL normalization utilities.
//!
//! Two different normalizations live here and they must not be mixed up:
//!
//! - [`ensure_scheme`] is applied before a page is fetched. It only adds a
//!   missing `http://` prefix.
//! - [`normalize_for_comparison`] is applied whenever two URLs are compared
//!   (DSM lookups, cache lookups). It drops the fragment and any trailing
//!   slashes so `http://example.com/page/` and `http://example.com/page#top`
//!   compare equal.

use url::Url;

/// Errors that can occur while preparing a URL for fetching.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("URL is empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,
}

/// Adds `http://` to a URL that has no scheme.
///
/// An empty input is returned unchanged rather than turned into a bare
/// `http://`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(ensure_scheme("web.musc.edu/about"), "http://web.musc.edu/about");
/// assert_eq!(ensure_scheme("https://web.musc.edu"), "https://web.musc.edu");
/// assert_eq!(ensure_scheme(""), "");
/// ```
pub fn ensure_scheme(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    match Url::parse(trimmed) {
        Ok(_) => trimmed.to_string(),
        Err(_) => format!("http://{trimmed}"),
    }
}

/// Normalizes a URL for equality checks.
///
/// # Normalization Rules
///
/// 1. **Whitespace**: Leading and trailing whitespace is removed
/// 2. **Fragments**: Removed (e.g., `#section`)
/// 3. **Query parameters**: Preserved as-is
/// 4. **Trailing slashes**: Removed
/// 5. **Case**: Preserved (callers compare case-insensitively where needed)
///
/// The function is idempotent.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_for_comparison("http://example.com/page/#section"),
///     "http://example.com/page"
/// );
/// ```
pub fn normalize_for_comparison(input: &str) -> String {
    let trimmed = input.trim();
    let without_fragment = match trimmed.find('#') {
        Some(pos) => &trimmed[..pos],
        None => trimmed,
    };

    without_fragment
        .trim_end_matches(|c: char| c == '/' || c.is_whitespace())
        .to_string()
}

/// Returns true when two URLs name the same page.
///
/// Both sides get a missing scheme added before the comparison
/// normalization, so `web.musc.edu/about/` matches `http://web.musc.edu/about`.
pub fn same_page(a: &str, b: &str) -> bool {
    normalize_for_comparison(&ensure_scheme(a)) == normalize_for_comparison(&ensure_scheme(b))
}

/// Prepares a URL for an HTTP request.
///
/// Adds a missing scheme and rejects anything that is not HTTP(S).
///
/// # Errors
///
/// Returns [`UrlNormalizationError::Empty`] for an empty input.
/// Returns [`UrlNormalizationError::InvalidFormat`] for malformed URLs.
/// Returns [`UrlNormalizationError::UnsupportedProtocol`] for non-HTTP(S) schemes.
pub fn parse_fetch_url(input: &str) -> Result<Url, UrlNormalizationError> {
    let with_scheme = ensure_scheme(input);
    if with_scheme.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    let url =
        Url::parse(&with_scheme).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(UrlNormalizationError::UnsupportedProtocol),
    }
}

/// Extracts the lowercase hostname of a URL, if it has one.
pub fn host_of(input: &str) -> Option<String> {
    Url::parse(input.trim())
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
}
