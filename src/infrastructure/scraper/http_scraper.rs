//! HTTP scraper built on reqwest and scraper.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::service::{PageScraper, ScrapeError};
use crate::domain::entities::{PageData, PageEmbed, PageLink};
use crate::utils::url_normalizer::parse_fetch_url;

const USER_AGENT: &str = concat!("dsm-linker/", env!("CARGO_PKG_VERSION"));
const STATUS_UNAVAILABLE: &str = "0";

static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));
static IFRAMES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("iframe[src]").expect("valid selector"));
static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="description"]"#).expect("valid selector"));

/// Timeouts and selectors used by [`HttpPageScraper`].
#[derive(Debug, Clone)]
pub struct ScraperSettings {
    pub sidebar_selector: String,
    pub page_timeout: Duration,
    pub status_timeout: Duration,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            sidebar_selector: "#sidebar-components".to_string(),
            page_timeout: Duration::from_secs(30),
            status_timeout: Duration::from_secs(10),
        }
    }
}

/// Fetches pages over HTTP and probes every extracted link with a HEAD request.
///
/// Links are probed one after another; a page with many links takes a while.
pub struct HttpPageScraper {
    client: reqwest::Client,
    settings: ScraperSettings,
}

impl HttpPageScraper {
    /// # Errors
    ///
    /// Returns [`ScrapeError::Request`] if the HTTP client cannot be built.
    pub fn new(settings: ScraperSettings) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .timeout(settings.page_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ScrapeError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, settings })
    }

    async fn fetch(&self, url: Url) -> Result<(String, Url), ScrapeError> {
        debug!("Fetching page: {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ScrapeError::Request(e.to_string()))?;

        let status = response.status();
        debug!("GET {} completed with status {}", url, status);
        if !status.is_success() {
            return Err(ScrapeError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::Request(format!("Failed to read response body: {}", e)))?;

        Ok((body, final_url))
    }

    /// HEAD status of a link as a string, `"0"` when it cannot be determined.
    pub async fn check_status(&self, href: &str) -> String {
        if !(href.starts_with("http://") || href.starts_with("https://")) {
            return STATUS_UNAVAILABLE.to_string();
        }

        match self
            .client
            .head(href)
            .timeout(self.settings.status_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().as_u16().to_string(),
            Err(e) => {
                debug!("Status check failed for {}: {}", href, e);
                STATUS_UNAVAILABLE.to_string()
            }
        }
    }

    /// Probes anchors and splits them into `(links, pdfs)`.
    async fn probe(&self, anchors: Vec<Anchor>) -> (Vec<PageLink>, Vec<PageLink>) {
        let mut links = Vec::new();
        let mut pdfs = Vec::new();

        for anchor in anchors {
            let status = self.check_status(&anchor.href).await;
            let link = PageLink::new(anchor.text, anchor.href, status);
            if link.is_pdf() {
                pdfs.push(link);
            } else {
                links.push(link);
            }
        }

        (links, pdfs)
    }
}

#[async_trait]
impl PageScraper for HttpPageScraper {
    async fn retrieve_page_data(
        &self,
        url: &str,
        selector: &str,
        include_sidebar: bool,
    ) -> Result<PageData, ScrapeError> {
        let url = parse_fetch_url(url)?;
        info!("Retrieving page data for {}", url);

        let (body, final_url) = self.fetch(url).await?;
        let sidebar_selector = include_sidebar.then_some(self.settings.sidebar_selector.as_str());
        let parsed = parse_page(&body, &final_url, selector, sidebar_selector)?;

        let (links, pdfs) = self.probe(parsed.main.anchors).await;
        let mut page = PageData {
            links,
            pdfs,
            embeds: parsed.main.embeds,
            meta_description: parsed.meta_description,
            ..Default::default()
        };

        if let Some(sidebar) = parsed.sidebar {
            let (sidebar_links, sidebar_pdfs) = self.probe(sidebar.anchors).await;
            page.sidebar_links = sidebar_links;
            page.sidebar_pdfs = sidebar_pdfs;
            page.sidebar_embeds = sidebar.embeds;
        }

        let summary = page.summary();
        debug!(
            "Extracted main content: {} links, {} PDFs, {} embeds",
            summary.main.links, summary.main.pdfs, summary.main.embeds
        );
        if include_sidebar {
            debug!(
                "Extracted sidebar content: {} links, {} PDFs, {} embeds",
                summary.sidebar.links, summary.sidebar.pdfs, summary.sidebar.embeds
            );
        }

        Ok(page)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Anchor {
    text: String,
    href: String,
}

#[derive(Debug, Default)]
struct Region {
    anchors: Vec<Anchor>,
    embeds: Vec<PageEmbed>,
}

#[derive(Debug)]
struct ParsedPage {
    main: Region,
    sidebar: Option<Region>,
    meta_description: String,
}

/// Extracts everything needed from the HTML before any further await point.
fn parse_page(
    body: &str,
    base: &Url,
    selector: &str,
    sidebar_selector: Option<&str>,
) -> Result<ParsedPage, ScrapeError> {
    let main_selector =
        Selector::parse(selector).map_err(|_| ScrapeError::InvalidSelector(selector.to_string()))?;
    let document = Html::parse_document(body);

    let main = match document.select(&main_selector).next() {
        Some(scope) => collect_region(scope, base),
        None => {
            warn!(
                "No element found matching selector '{}', falling back to entire page",
                selector
            );
            collect_region(document.root_element(), base)
        }
    };

    let sidebar = sidebar_selector.map(|sidebar_selector| {
        let Ok(sidebar) = Selector::parse(sidebar_selector) else {
            warn!("Invalid sidebar selector '{}'", sidebar_selector);
            return Region::default();
        };
        match document.select(&sidebar).next() {
            Some(scope) => collect_region(scope, base),
            None => {
                debug!("No sidebar found matching '{}'", sidebar_selector);
                Region::default()
            }
        }
    });

    let meta_description = document
        .select(&META_DESCRIPTION)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    Ok(ParsedPage {
        main,
        sidebar,
        meta_description,
    })
}

fn collect_region(scope: ElementRef<'_>, base: &Url) -> Region {
    let anchors = scope
        .select(&ANCHORS)
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            let resolved = base
                .join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string());
            Some(Anchor {
                text: element_text(a),
                href: resolved,
            })
        })
        .collect();

    let embeds = scope
        .select(&IFRAMES)
        .filter_map(|iframe| {
            let src = iframe.value().attr("src")?;
            if !src.to_lowercase().contains("vimeo") {
                return None;
            }
            let title = iframe
                .value()
                .attr("title")
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .or_else(|| Some(element_text(iframe)).filter(|t| !t.is_empty()))
                .unwrap_or_else(|| "Vimeo Video".to_string());
            Some(PageEmbed::new("vimeo", title, src))
        })
        .collect();

    Region { anchors, embeds }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
          <head><meta name="description" content=" College of Medicine "></head>
          <body>
            <div id="main">
              <a href="/about">About   us</a>
              <a href="https://medicine.musc.edu/files/Guide.PDF">Guide</a>
              <a href="mailto:info@musc.edu">Email</a>
              <iframe src="https://player.vimeo.com/video/1" title="Welcome"></iframe>
              <iframe src="https://player.vimeo.com/video/2"></iframe>
              <iframe src="https://www.youtube.com/embed/3"></iframe>
            </div>
            <div id="sidebar-components">
              <a href="contact">Contact</a>
            </div>
            <a href="/outside">Outside</a>
          </body>
        </html>
    "#;

    fn base() -> Url {
        Url::parse("https://medicine.musc.edu/departments/").unwrap()
    }

    #[test]
    fn test_parse_main_region() {
        let page = parse_page(PAGE, &base(), "#main", None).unwrap();

        let hrefs: Vec<_> = page.main.anchors.iter().map(|a| a.href.as_str()).collect();
        assert_eq!(
            hrefs,
            vec![
                "https://medicine.musc.edu/about",
                "https://medicine.musc.edu/files/Guide.PDF",
                "mailto:info@musc.edu",
            ]
        );
        assert_eq!(page.main.anchors[0].text, "About us");
        assert_eq!(page.meta_description, "College of Medicine");
        assert!(page.sidebar.is_none());
    }

    #[test]
    fn test_vimeo_embeds_only() {
        let page = parse_page(PAGE, &base(), "#main", None).unwrap();

        assert_eq!(
            page.main.embeds,
            vec![
                PageEmbed::new("vimeo", "Welcome", "https://player.vimeo.com/video/1"),
                PageEmbed::new("vimeo", "Vimeo Video", "https://player.vimeo.com/video/2"),
            ]
        );
    }

    #[test]
    fn test_sidebar_region() {
        let page = parse_page(PAGE, &base(), "#main", Some("#sidebar-components")).unwrap();
        let sidebar = page.sidebar.unwrap();

        assert_eq!(sidebar.anchors.len(), 1);
        assert_eq!(sidebar.anchors[0].href, "https://medicine.musc.edu/departments/contact");
    }

    #[test]
    fn test_missing_sidebar_is_empty() {
        let page = parse_page(PAGE, &base(), "#main", Some("#no-sidebar")).unwrap();
        assert!(page.sidebar.unwrap().anchors.is_empty());
    }

    #[test]
    fn test_missing_main_falls_back_to_document() {
        let page = parse_page(PAGE, &base(), "#content", None).unwrap();
        assert_eq!(page.main.anchors.len(), 5);
    }

    #[test]
    fn test_invalid_selector() {
        assert!(matches!(
            parse_page(PAGE, &base(), "##", None),
            Err(ScrapeError::InvalidSelector(_))
        ));
    }

    #[tokio::test]
    async fn test_non_http_links_are_not_probed() {
        let scraper = HttpPageScraper::new(ScraperSettings::default()).unwrap();

        assert_eq!(scraper.check_status("mailto:info@musc.edu").await, "0");
        assert_eq!(scraper.check_status("tel:8435550100").await, "0");
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        let scraper = HttpPageScraper::new(ScraperSettings::default()).unwrap();
        let result = scraper.retrieve_page_data("", "#main", false).await;

        assert!(matches!(result, Err(ScrapeError::InvalidUrl(_))));
    }
}
