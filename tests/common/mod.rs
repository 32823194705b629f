#![allow(dead_code)]

use async_trait::async_trait;
use dsm_linker::commands::App;
use dsm_linker::domain::entities::{PageData, PageEmbed, PageLink};
use dsm_linker::domain::registry::DomainRegistry;
use dsm_linker::infrastructure::cache::JsonFileCache;
use dsm_linker::infrastructure::scraper::{PageScraper, ScrapeError};
use dsm_linker::infrastructure::spreadsheet::Workbook;
use dsm_linker::state::SessionState;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Builds a worksheet laid out like the real DSM: three banner rows, the
/// header on the fourth row (index 3), data below.
pub fn dsm_sheet(data: &[[&str; 3]]) -> Vec<Vec<String>> {
    let mut rows = vec![
        vec!["Digital Site Map".to_string()],
        vec![],
        vec!["Updated weekly".to_string()],
        vec![
            "TITLE".to_string(),
            "EXISTING URL".to_string(),
            "PROPOSED URL".to_string(),
        ],
    ];
    rows.extend(data.iter().map(|row| row.iter().map(|c| c.to_string()).collect()));
    rows
}

/// Enterprise and CON worksheets for the built-in domain list.
///
/// Enterprise sheet row 10 (data index 5) is the About page.
pub fn dsm_workbook() -> Workbook {
    Workbook::new()
        .with_sheet(
            "Enterprise",
            dsm_sheet(&[
                ["Home", "http://web.musc.edu/", "/"],
                ["Foo Bar", "http://web.musc.edu/foo-bar", "/foo-bar"],
                ["Contact", "https://web.musc.edu/contact", "/new/contact"],
                ["News", "http://web.musc.edu/news http://web.musc.edu/newsroom", "/news"],
                ["Events", "http://web.musc.edu/events/", "/events"],
                ["About", "http://web.musc.edu/about", "/new/about-us"],
            ]),
        )
        .with_sheet(
            "CON",
            dsm_sheet(&[
                ["Programs", "https://nursing.musc.edu/programs", "/academics/programs"],
                ["Admissions", "https://nursing.musc.edu/admissions/", "/academics/admissions"],
            ]),
        )
}

pub fn about_page() -> PageData {
    PageData {
        links: vec![
            PageLink::new("Contact us", "https://web.musc.edu/contact", "200"),
            PageLink::new("Nursing programs", "https://nursing.musc.edu/programs", "200"),
            PageLink::new("External", "https://www.example.com/", "200"),
            PageLink::new("Email", "mailto:info@musc.edu", "0"),
        ],
        pdfs: vec![PageLink::new("Brochure", "https://web.musc.edu/brochure.pdf", "404")],
        embeds: vec![PageEmbed::new("vimeo", "Welcome", "https://player.vimeo.com/video/1")],
        sidebar_links: vec![PageLink::new("Events", "/events", "200")],
        meta_description: "About MUSC".to_string(),
        ..Default::default()
    }
}

/// Returns a fixed page and counts how often it was asked for.
pub struct StubScraper {
    page: PageData,
    calls: AtomicUsize,
}

impl StubScraper {
    pub fn new(page: PageData) -> Self {
        Self {
            page,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageScraper for StubScraper {
    async fn retrieve_page_data(
        &self,
        _url: &str,
        _selector: &str,
        include_sidebar: bool,
    ) -> Result<PageData, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut page = self.page.clone();
        if !include_sidebar {
            page.sidebar_links.clear();
            page.sidebar_pdfs.clear();
            page.sidebar_embeds.clear();
        }
        Ok(page)
    }
}

/// An app over the built-in domains, the test workbook and a JSON cache in `cache_dir`.
pub fn create_test_app(
    scraper: Arc<StubScraper>,
    cache_dir: &Path,
) -> App<StubScraper, JsonFileCache> {
    App::new(
        scraper,
        Arc::new(JsonFileCache::new(cache_dir)),
        Arc::new(DomainRegistry::builtin()),
        SessionState::default(),
        false,
    )
    .with_workbook("dsm-0101.xlsx", dsm_workbook())
}
