//! Page scraper trait and error types.

use async_trait::async_trait;

use crate::domain::entities::PageData;
use crate::utils::url_normalizer::UrlNormalizationError;

/// Errors that abort a page scrape.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Invalid page URL: {0}")]
    InvalidUrl(#[from] UrlNormalizationError),

    #[error("Invalid CSS selector '{0}'")]
    InvalidSelector(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
}

/// Fetches a legacy page and extracts its links, PDFs and embeds.
///
/// # Implementations
///
/// - [`crate::infrastructure::scraper::HttpPageScraper`] - reqwest + scraper
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageScraper: Send + Sync {
    /// Scrapes the region matched by `selector`, plus the sidebar when
    /// `include_sidebar` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] when the page cannot be fetched. Sidebar
    /// problems never fail the scrape; they leave the sidebar lists empty.
    async fn retrieve_page_data(
        &self,
        url: &str,
        selector: &str,
        include_sidebar: bool,
    ) -> Result<PageData, ScrapeError>;
}
