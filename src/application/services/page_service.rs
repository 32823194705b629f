//! Page check flow and link-migration analysis.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};
use url::Url;

use super::cache_service::CacheService;
use super::dsm_service::DsmService;
use crate::domain::entities::{LookupResult, PageData, PageSummary};
use crate::error::AppError;
use crate::infrastructure::cache::PageCacheStore;
use crate::infrastructure::scraper::PageScraper;
use crate::infrastructure::spreadsheet::Workbook;
use crate::state::{SessionState, Variable};
use crate::utils::url_normalizer::host_of;

/// Where the page data of a check came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSource {
    Cache,
    Fresh,
}

/// Result of [`PageService::check_page`].
#[derive(Debug, Clone, Serialize)]
pub struct PageCheck {
    pub source: PageSource,
    pub summary: PageSummary,
    pub cache_file: Option<String>,
    /// Set when the scraper reported a problem alongside partial data.
    pub error: Option<String>,
}

/// One internal link of a page and where it lands in the DSM.
#[derive(Debug, Clone, Serialize)]
pub struct LinkAnalysis {
    pub text: String,
    pub href: String,
    pub status: String,
    pub lookup: LookupResult,
}

/// Every internal link of a page, resolved against the DSM.
#[derive(Debug, Clone, Serialize)]
pub struct LinkReport {
    pub links: Vec<LinkAnalysis>,
    /// Share of links that are not `tel:`/`mailto:`.
    pub difficulty: f64,
}

impl LinkReport {
    pub fn found(&self) -> usize {
        self.links.iter().filter(|l| l.lookup.is_found()).count()
    }
}

/// Checks pages through the cache and maps their links onto the new site.
pub struct PageService<S: PageScraper, C: PageCacheStore> {
    scraper: Arc<S>,
    cache: CacheService<C>,
    dsm: Arc<DsmService>,
}

impl<S: PageScraper, C: PageCacheStore> PageService<S, C> {
    pub fn new(scraper: Arc<S>, cache: CacheService<C>, dsm: Arc<DsmService>) -> Self {
        Self { scraper, cache, dsm }
    }

    pub fn cache(&self) -> &CacheService<C> {
        &self.cache
    }

    pub fn dsm(&self) -> &DsmService {
        &self.dsm
    }

    /// Makes sure the session holds page data for its URL.
    ///
    /// Cached data is used when `CACHE_FILE` is valid for the context and
    /// `refresh` is not set. Otherwise the page is scraped, stored as the
    /// session's page data and written to the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `URL` or `SELECTOR` is unset.
    /// Returns [`AppError::Scrape`] if the page cannot be retrieved; the
    /// session is left without a cache binding in that case.
    pub async fn check_page(
        &self,
        state: &mut SessionState,
        refresh: bool,
    ) -> Result<PageCheck, AppError> {
        let missing = state.missing_variables(&[Variable::Url, Variable::Selector]);
        if !missing.is_empty() {
            return Err(AppError::bad_request(
                "Missing required variables",
                json!({"missing": missing.iter().map(|v| v.as_str()).collect::<Vec<_>>()}),
            ));
        }

        if !refresh && let Some(check) = self.from_cache(state) {
            return Ok(check);
        }

        let url = state.get(Variable::Url).trim().to_string();
        let selector = state.get(Variable::Selector).trim().to_string();
        let include_sidebar = state.include_sidebar();
        info!("Checking page {} (selector '{}')", url, selector);

        let page = match self
            .scraper
            .retrieve_page_data(&url, &selector, include_sidebar)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                state.set(Variable::CacheFile, "");
                state.current_page_data = None;
                return Err(e.into());
            }
        };

        match self.cache.cache_page_data(state, &url, &page) {
            Ok(Some(_)) => {}
            Ok(None) => state.set(Variable::CacheFile, ""),
            Err(e) => {
                warn!("Failed to cache page data: {}", e);
                state.set(Variable::CacheFile, "");
            }
        }

        let check = PageCheck {
            source: PageSource::Fresh,
            summary: page.summary(),
            cache_file: state.value(Variable::CacheFile).map(str::to_string),
            error: page.error.clone(),
        };
        state.current_page_data = Some(page);
        Ok(check)
    }

    fn from_cache(&self, state: &mut SessionState) -> Option<PageCheck> {
        let validity = self.cache.check_bound(state);
        if !validity.valid {
            debug!("Cache validation failed: {}", validity.reason);
            return None;
        }

        if state.current_page_data.is_none() {
            let path = state.get(Variable::CacheFile).trim().to_string();
            let record = self.cache.store().load(Path::new(&path))?;
            state.current_page_data = Some(record.page_data);
        }

        let page = state.current_page_data.as_ref()?;
        Some(PageCheck {
            source: PageSource::Cache,
            summary: page.summary(),
            cache_file: state.value(Variable::CacheFile).map(str::to_string),
            error: page.error.clone(),
        })
    }

    /// Resolves every internal link and PDF of `page` against the DSM.
    ///
    /// Relative hrefs are joined onto `page_url` first and dropped when
    /// there is no page URL to join them to. Links to hosts outside the
    /// configured domains, and contact links, are left out.
    pub fn analyze_links(
        &self,
        page: &PageData,
        page_url: Option<&str>,
        workbook: &Workbook,
    ) -> LinkReport {
        let index = self.dsm.index(workbook);
        let base = page_url.and_then(|url| Url::parse(url.trim()).ok());

        let links = page
            .all_links()
            .filter(|link| !link.is_contact())
            .filter_map(|link| {
                let href = absolute_href(&link.href, base.as_ref())?;
                self.dsm.registry().is_internal_url(&href).then(|| LinkAnalysis {
                    text: link.text.clone(),
                    status: link.status.clone(),
                    lookup: index.lookup(&href),
                    href,
                })
            })
            .collect::<Vec<_>>();

        debug!("Analyzed {} internal links", links.len());
        LinkReport {
            links,
            difficulty: page.difficulty(),
        }
    }

}

fn absolute_href(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    if host_of(href).is_some() {
        return Some(href.to_string());
    }

    base?.join(href).ok().map(String::from)
}
