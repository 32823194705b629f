//! Command handlers shared by the one-shot CLI and the interactive shell.
//!
//! Handlers drive the services against one [`SessionState`] and print their
//! results, either as colored text or, with `--json`, as JSON documents.

pub mod bulk;
pub mod render;
pub mod shell;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::application::services::{
    CacheBinding, CacheService, DsmService, LoadedRow, PageCheck, PageService,
};
use crate::domain::entities::ContentCounts;
use bulk::{BulkFailure, BulkRow, BulkSummary};
use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::cache::{JsonFileCache, PageCacheStore};
use crate::infrastructure::scraper::{HttpPageScraper, PageScraper};
use crate::infrastructure::spreadsheet::Workbook;
use crate::state::{SessionState, Variable};

/// Page context given on the command line.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub url: Option<String>,
    pub domain: Option<String>,
    pub row: Option<usize>,
    pub selector: Option<String>,
    pub sidebar: bool,
}

/// Services, the DSM workbook and the session of one run.
pub struct App<S: PageScraper, C: PageCacheStore> {
    pub state: SessionState,
    pages: PageService<S, C>,
    dsm: Arc<DsmService>,
    workbook: Option<(PathBuf, Workbook)>,
    json: bool,
}

impl App<HttpPageScraper, JsonFileCache> {
    /// Wires the HTTP scraper and the JSON cache from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain list or the HTTP client cannot be set up.
    pub fn from_config(config: &Config, json: bool) -> anyhow::Result<Self> {
        let registry = Arc::new(config.domain_registry()?);
        let scraper = Arc::new(HttpPageScraper::new(config.scraper_settings())?);
        let cache = Arc::new(JsonFileCache::new(&config.cache_dir));

        let mut state = SessionState::new(&config.selector, config.include_sidebar);
        if let Some(path) = config.resolve_dsm_file() {
            state.set(Variable::DsmFile, path.display().to_string());
        }

        Ok(Self::new(scraper, cache, registry, state, json))
    }
}

impl<S: PageScraper, C: PageCacheStore> App<S, C> {
    pub fn new(
        scraper: Arc<S>,
        cache: Arc<C>,
        registry: Arc<crate::domain::registry::DomainRegistry>,
        state: SessionState,
        json: bool,
    ) -> Self {
        let dsm = Arc::new(DsmService::new(registry));
        let pages = PageService::new(scraper, CacheService::new(cache), dsm.clone());

        Self {
            state,
            pages,
            dsm,
            workbook: None,
            json,
        }
    }

    /// Supplies an already loaded workbook instead of reading `DSM_FILE`.
    pub fn with_workbook(mut self, path: impl Into<PathBuf>, workbook: Workbook) -> Self {
        let path = path.into();
        self.state.set(Variable::DsmFile, path.display().to_string());
        self.workbook = Some((path, workbook));
        self
    }

    pub fn json(&self) -> bool {
        self.json
    }

    fn cache(&self) -> &CacheService<C> {
        self.pages.cache()
    }

    /// Returns the workbook named by `DSM_FILE`, reading it on first use or
    /// after `DSM_FILE` changes.
    fn workbook(&mut self) -> Result<&Workbook, AppError> {
        self.load_workbook()?;
        self.workbook
            .as_ref()
            .map(|(_, workbook)| workbook)
            .ok_or_else(|| AppError::internal("DSM workbook unavailable", json!({})))
    }

    fn load_workbook(&mut self) -> Result<(), AppError> {
        let Some(wanted) = self.state.value(Variable::DsmFile).map(PathBuf::from) else {
            return Err(AppError::bad_request(
                "No DSM workbook configured",
                json!({"hint": "Set DSM_FILE or place a dsm-MMDD.xlsx file in DSM_DIR"}),
            ));
        };

        let stale = self
            .workbook
            .as_ref()
            .is_none_or(|(loaded, _)| *loaded != wanted);
        if stale {
            info!("Loading DSM workbook {}", wanted.display());
            let workbook = Workbook::open(&wanted)?;
            self.workbook = Some((wanted, workbook));
        }
        Ok(())
    }

    /// `lookup <url>`
    pub fn lookup(&mut self, url: &str) -> Result<(), AppError> {
        let dsm = self.dsm.clone();
        let result = dsm.lookup(url, self.workbook()?);
        render::lookup(url, &result, self.json);
        Ok(())
    }

    /// `load <domain> <row>`: binds the session to a DSM row.
    pub fn load(&mut self, domain: &str, sheet_row: usize) -> Result<(), AppError> {
        let dsm = self.dsm.clone();
        let row = dsm.load_row(domain, sheet_row, self.workbook()?)?;

        self.state.reset_page_context();
        let binding = self.bind_row(&row);

        render::loaded(&row, &binding, self.json);
        Ok(())
    }

    /// Points the session at a loaded row and re-binds its cache file.
    fn bind_row(&mut self, row: &LoadedRow) -> CacheBinding {
        self.state.set(Variable::Url, row.existing_url.as_str());
        self.state.set(Variable::ProposedPath, row.proposed_path.as_str());
        self.state.set(Variable::Domain, row.domain.as_str());
        self.state.set(Variable::Row, row.sheet_row.to_string());

        self.pages.cache().update_state_from_cache(
            &mut self.state,
            Some(&row.existing_url),
            Some(&row.domain),
            Some(&row.sheet_row.to_string()),
        )
    }

    /// Applies command-line context flags to the session.
    pub fn apply_context(&mut self, context: &PageContext) -> Result<(), AppError> {
        if let Some(selector) = &context.selector {
            self.state.set(Variable::Selector, selector.as_str());
        }
        if context.sidebar {
            self.state.set_include_sidebar(true);
        }

        match (&context.domain, context.row, &context.url) {
            (Some(domain), Some(row), _) => {
                let dsm = self.dsm.clone();
                let loaded = dsm.load_row(domain, row, self.workbook()?)?;
                self.bind_row(&loaded);
            }
            (None, None, Some(url)) => {
                self.pages.cache().set_variable(&mut self.state, "URL", url)?;
            }
            (None, None, None) => {}
            _ => {
                return Err(AppError::bad_request(
                    "--domain and --row must be given together",
                    json!({}),
                ));
            }
        }

        Ok(())
    }

    /// `check`: page summary, from cache when possible.
    pub async fn check(&mut self, refresh: bool) -> Result<PageCheck, AppError> {
        let check = self.pages.check_page(&mut self.state, refresh).await?;
        render::check(&self.state, &check, self.json);
        Ok(check)
    }

    /// `links`: internal links of the current page and their DSM destinations.
    pub async fn links(&mut self, refresh: bool) -> Result<(), AppError> {
        let check = self.pages.check_page(&mut self.state, refresh).await?;
        debug!("Page data source: {:?}", check.source);

        self.load_workbook()?;
        let (Some(page), Some((_, workbook))) = (&self.state.current_page_data, &self.workbook)
        else {
            return Err(AppError::internal("Page data unavailable", json!({})));
        };

        let report = self
            .pages
            .analyze_links(page, self.state.value(Variable::Url), workbook);
        render::links(&report, self.json);
        Ok(())
    }

    /// `domains`
    pub fn domains(&self) {
        render::domains(self.dsm.registry(), self.json);
    }

    /// `cache status`
    pub fn cache_status(&self) {
        let validity = self.cache().check_bound(&self.state);
        render::cache_status(&self.state, &validity, self.json);
    }

    /// `migrate`: existing and proposed hierarchy of the loaded page.
    pub fn migrate(&self) -> Result<(), AppError> {
        let Some(url) = self.state.value(Variable::Url) else {
            return Err(AppError::bad_request(
                "Missing required variables",
                json!({"missing": ["URL"]}),
            ));
        };

        let existing = self.dsm.existing_hierarchy(url);
        let proposed = self
            .state
            .value(Variable::ProposedPath)
            .map(|path| self.dsm.proposed_hierarchy(url, path));
        render::migration(&existing, proposed.as_ref(), self.json);
        Ok(())
    }

    /// `dsm`: every column of the loaded DSM row.
    pub fn dsm_row(&mut self) -> Result<(), AppError> {
        let missing = self
            .state
            .missing_variables(&[Variable::Domain, Variable::Row]);
        if !missing.is_empty() {
            return Err(AppError::bad_request(
                "Missing required variables",
                json!({"missing": missing.iter().map(|v| v.as_str()).collect::<Vec<_>>()}),
            ));
        }

        let domain = self.state.get(Variable::Domain).to_string();
        let row = parse_row(self.state.get(Variable::Row))?;
        let dsm = self.dsm.clone();
        let values = dsm.row_data(&domain, row, self.workbook()?)?;
        render::row_data(&domain, row, &values, self.json);
        Ok(())
    }

    /// `bulk-check [csv]`: checks every pending row of the progress CSV.
    ///
    /// Creates a template and returns when the file does not exist yet.
    /// Each row is loaded like `load`, tagged with its `KANBAN_ID`, then
    /// checked from cache or by scraping without the sidebar. Failed rows
    /// are reported and left pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV cannot be read or written, or the DSM
    /// workbook is unavailable.
    pub async fn bulk_check(&mut self, csv: Option<&Path>) -> Result<BulkSummary, AppError> {
        let path = csv.map_or_else(|| PathBuf::from(bulk::DEFAULT_CSV), Path::to_path_buf);
        let mut summary = BulkSummary {
            csv: path.clone(),
            ..Default::default()
        };

        if !path.exists() {
            bulk::create_template(&path)?;
            summary.template_created = true;
            render::bulk_summary(&summary, self.json);
            return Ok(summary);
        }

        let mut rows = bulk::read_rows(&path)?;
        let pending: Vec<_> = rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| row.pending().map(|target| (index, target)))
            .collect();
        summary.pending = pending.len();

        if !pending.is_empty() {
            self.load_workbook()?;
            let include_sidebar = self.state.include_sidebar();
            self.state.set_include_sidebar(false);
            let result = self.bulk_rows(&path, &mut rows, pending, &mut summary).await;
            self.state.set_include_sidebar(include_sidebar);
            result?;
        }

        render::bulk_summary(&summary, self.json);
        Ok(summary)
    }

    async fn bulk_rows(
        &mut self,
        path: &Path,
        rows: &mut [BulkRow],
        pending: Vec<(usize, (String, usize))>,
        summary: &mut BulkSummary,
    ) -> Result<(), AppError> {
        let total = pending.len();

        for (position, (index, (domain, row))) in pending.into_iter().enumerate() {
            render::bulk_progress(position + 1, total, &domain, row, self.json);
            let kanban_id = rows[index].kanban_id().to_string();

            match self.bulk_row(&domain, row, &kanban_id).await {
                Ok((url, counts, difficulty)) => {
                    render::bulk_counts(&counts, difficulty, self.json);
                    let entry = &mut rows[index];
                    entry.existing_url = url;
                    entry.no_links = counts.links.to_string();
                    entry.no_pdfs = counts.pdfs.to_string();
                    entry.no_embeds = counts.embeds.to_string();
                    entry.difficulty = format!("{:.2}", difficulty);
                    bulk::write_rows(path, rows)?;
                    summary.processed += 1;
                }
                Err(e) => {
                    render::error(&e, self.json);
                    summary.failed.push(BulkFailure {
                        domain,
                        row,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    async fn bulk_row(
        &mut self,
        domain: &str,
        row: usize,
        kanban_id: &str,
    ) -> Result<(String, ContentCounts, f64), AppError> {
        let dsm = self.dsm.clone();
        let loaded = dsm.load_row(domain, row, self.workbook()?)?;

        self.state.reset_page_context();
        self.state.set(Variable::KanbanId, kanban_id);
        if self.state.value(Variable::Selector).is_none() {
            self.state.set(Variable::Selector, "#main");
        }
        self.bind_row(&loaded);

        let check = self.pages.check_page(&mut self.state, false).await?;
        if let Some(error) = check.error {
            return Err(AppError::scrape(
                "Page reported an extraction error",
                json!({"url": loaded.existing_url, "reason": error}),
            ));
        }
        let difficulty = self
            .state
            .current_page_data
            .as_ref()
            .map_or(0.0, |page| page.main_difficulty());
        debug!("Bulk row {} {} checked from {:?}", loaded.domain, row, check.source);

        Ok((loaded.existing_url, check.summary.main, difficulty))
    }

    /// `set <name> <value>`
    pub fn set(&mut self, name: &str, value: &str) -> Result<Option<CacheBinding>, AppError> {
        self.pages.cache().set_variable(&mut self.state, name, value)
    }
}

/// Parses a 1-based spreadsheet row number.
///
/// # Errors
///
/// Returns [`AppError::Validation`] for anything but a positive integer.
pub fn parse_row(raw: &str) -> Result<usize, AppError> {
    match raw.trim().parse::<usize>() {
        Ok(row) if row > 0 => Ok(row),
        _ => Err(AppError::bad_request(
            "Row must be a positive whole number",
            json!({"row": raw}),
        )),
    }
}

/// Splits `load` arguments into a domain name (possibly several words) and a row.
///
/// # Errors
///
/// Returns [`AppError::Validation`] when either part is missing or the row is invalid.
pub fn parse_load_args(args: &[String]) -> Result<(String, usize), AppError> {
    let Some((row, domain)) = args.split_last() else {
        return Err(AppError::bad_request(
            "Usage: load <domain> <row>",
            json!({}),
        ));
    };
    if domain.is_empty() {
        return Err(AppError::bad_request(
            "Usage: load <domain> <row>",
            json!({"args": args}),
        ));
    }

    Ok((domain.join(" "), parse_row(row)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_row() {
        assert_eq!(parse_row(" 12 ").unwrap(), 12);
        assert!(parse_row("0").is_err());
        assert!(parse_row("-3").is_err());
        assert!(parse_row("twelve").is_err());
    }

    #[test]
    fn test_parse_load_args_multi_word_domain() {
        let (domain, row) = parse_load_args(&args(&["Adult", "Health", "42"])).unwrap();
        assert_eq!(domain, "Adult Health");
        assert_eq!(row, 42);
    }

    #[test]
    fn test_parse_load_args_requires_both_parts() {
        assert!(parse_load_args(&args(&[])).is_err());
        assert!(parse_load_args(&args(&["12"])).is_err());
        assert!(parse_load_args(&args(&["COM", "x"])).is_err());
    }
}
