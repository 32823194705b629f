//! Cache validity checks and session re-binding.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::entities::{CacheMetadata, PageData};
use crate::error::AppError;
use crate::infrastructure::cache::{CacheResult, PageCacheStore};
use crate::state::{SessionState, Variable};
use crate::utils::url_normalizer::same_page;

pub const NO_CACHE_FILE: &str = "No cache file specified.";
pub const NO_METADATA: &str = "Cache file contains no metadata.";
pub const CACHE_VALID: &str = "Cache is valid for current context.";

/// Outcome of checking a cache file against the session context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheValidity {
    pub valid: bool,
    pub reason: String,
}

impl CacheValidity {
    fn valid() -> Self {
        Self {
            valid: true,
            reason: CACHE_VALID.to_string(),
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: reason.into(),
        }
    }
}

/// How the session relates to its cache after re-binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBinding {
    /// No cache file matches the context; `CACHE_FILE` is cleared.
    Unbound,
    /// `CACHE_FILE` points at a usable file whose data is loaded.
    Valid(PathBuf),
    /// `CACHE_FILE` points at a file that no longer fits the context; the
    /// next read re-scrapes.
    Stale { path: PathBuf, reason: String },
}

impl CacheBinding {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Decides when cached page data may stand in for a fresh scrape.
pub struct CacheService<C: PageCacheStore> {
    store: Arc<C>,
}

impl<C: PageCacheStore> CacheService<C> {
    pub fn new(store: Arc<C>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    /// Checks `cache_file` against the session's URL, domain, row and
    /// sidebar preference.
    ///
    /// Rules apply in order and the first failure wins. Values missing on
    /// either side are not compared. Sidebar is one-way: a cache written
    /// with sidebar content satisfies every request, one written without it
    /// only satisfies requests that do not need the sidebar.
    pub fn is_cache_valid_for_context(&self, state: &SessionState, cache_file: &str) -> CacheValidity {
        let cache_file = cache_file.trim();
        if cache_file.is_empty() {
            return CacheValidity::invalid(NO_CACHE_FILE);
        }

        let record = self.store.load(Path::new(cache_file));
        let Some(metadata) = record.as_ref().and_then(|r| r.usable_metadata()) else {
            return CacheValidity::invalid(NO_METADATA);
        };

        check_context(state, metadata)
    }

    /// Checks the file currently bound in `CACHE_FILE`.
    pub fn check_bound(&self, state: &SessionState) -> CacheValidity {
        self.is_cache_valid_for_context(state, state.get(Variable::CacheFile))
    }

    /// Persists page data under the session's context and binds `CACHE_FILE`
    /// to the written file.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the file cannot be written; the
    /// session is left unchanged in that case.
    pub fn cache_page_data(
        &self,
        state: &mut SessionState,
        url: &str,
        page_data: &PageData,
    ) -> CacheResult<Option<PathBuf>> {
        let metadata = CacheMetadata {
            url: Some(url.to_string()),
            domain: state.value(Variable::Domain).map(str::to_string),
            row: state.value(Variable::Row).map(str::to_string),
            selector: state.value(Variable::Selector).map(str::to_string),
            include_sidebar: state.include_sidebar(),
            kanban_id: state.value(Variable::KanbanId).map(str::to_string),
            ..Default::default()
        };

        let saved = self.store.save(&metadata, page_data)?;
        if let Some(path) = &saved {
            state.set(Variable::CacheFile, path.display().to_string());
        }
        Ok(saved)
    }

    /// Re-discovers the cache file for a context and re-binds the session.
    ///
    /// `None` arguments fall back to the session's current values. The
    /// file named after domain and row is preferred; otherwise files are
    /// scanned for one recorded under the same URL.
    pub fn update_state_from_cache(
        &self,
        state: &mut SessionState,
        url: Option<&str>,
        domain: Option<&str>,
        row: Option<&str>,
    ) -> CacheBinding {
        let url = url.map(str::to_string).or_else(|| state.value(Variable::Url).map(str::to_string));
        let domain =
            domain.map(str::to_string).or_else(|| state.value(Variable::Domain).map(str::to_string));
        let row = row.map(str::to_string).or_else(|| state.value(Variable::Row).map(str::to_string));

        let found = match (domain.as_deref(), row.as_deref()) {
            (Some(domain), Some(row)) => self.store.find_by_context(domain, row),
            _ => None,
        }
        .or_else(|| url.as_deref().and_then(|u| self.store.find_by_url(u)));

        let Some(path) = found else {
            debug!("No cache file for current context");
            state.set(Variable::CacheFile, "");
            state.current_page_data = None;
            return CacheBinding::Unbound;
        };

        let path_str = path.display().to_string();
        state.set(Variable::CacheFile, path_str.as_str());

        let validity = self.is_cache_valid_for_context(state, &path_str);
        if !validity.valid {
            debug!("Cache {} is stale: {}", path_str, validity.reason);
            state.current_page_data = None;
            return CacheBinding::Stale {
                path,
                reason: validity.reason,
            };
        }

        match self.store.load(&path) {
            Some(record) => {
                info!("Loaded cached page data from {}", path_str);
                state.current_page_data = Some(record.page_data);
                CacheBinding::Valid(path)
            }
            None => {
                state.set(Variable::CacheFile, "");
                state.current_page_data = None;
                CacheBinding::Unbound
            }
        }
    }

    /// Sets a session variable, re-binding the cache when the page context
    /// (URL, DOMAIN or ROW) changes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an unknown variable name.
    pub fn set_variable(
        &self,
        state: &mut SessionState,
        name: &str,
        value: &str,
    ) -> Result<Option<CacheBinding>, AppError> {
        let variable: Variable = name
            .parse()
            .map_err(|e: String| AppError::bad_request(e, json!({"variable": name})))?;

        state.set(variable, value);
        if variable.is_page_context() {
            Ok(Some(self.update_state_from_cache(state, None, None, None)))
        } else {
            Ok(None)
        }
    }
}

fn check_context(state: &SessionState, cached: &CacheMetadata) -> CacheValidity {
    if let (Some(current), Some(cached)) = (state.value(Variable::Url), cached.url.as_deref())
        && !same_page(current, cached)
    {
        return CacheValidity::invalid(format!(
            "URL mismatch: current '{}' vs cached '{}'.",
            current, cached
        ));
    }

    if let (Some(current), Some(cached)) = (state.value(Variable::Domain), cached.domain.as_deref())
        && current != cached.trim()
    {
        return CacheValidity::invalid(format!(
            "Domain mismatch: current '{}' vs cached '{}'.",
            current, cached
        ));
    }

    if let (Some(current), Some(cached)) = (state.value(Variable::Row), cached.row.as_deref())
        && current != cached.trim()
    {
        return CacheValidity::invalid(format!(
            "Row mismatch: current '{}' vs cached '{}'.",
            current, cached
        ));
    }

    if state.include_sidebar() && !cached.include_sidebar {
        return CacheValidity::invalid(
            "Sidebar content is required but the cache was created without it.",
        );
    }

    CacheValidity::valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CacheRecord;
    use crate::infrastructure::cache::MockPageCacheStore;

    fn cached(domain: &str, row: &str, include_sidebar: bool) -> CacheRecord {
        CacheRecord {
            metadata: Some(CacheMetadata {
                url: Some("http://medicine.musc.edu/about".to_string()),
                domain: Some(domain.to_string()),
                row: Some(row.to_string()),
                include_sidebar,
                ..Default::default()
            }),
            page_data: PageData::default(),
        }
    }

    fn state(domain: &str, row: &str) -> SessionState {
        let mut state = SessionState::default();
        state.set(Variable::Url, "http://medicine.musc.edu/about/");
        state.set(Variable::Domain, domain);
        state.set(Variable::Row, row);
        state
    }

    fn service_loading(record: Option<CacheRecord>) -> CacheService<MockPageCacheStore> {
        let mut store = MockPageCacheStore::new();
        store.expect_load().returning(move |_| record.clone());
        CacheService::new(Arc::new(store))
    }

    #[test]
    fn test_no_cache_file() {
        let service = CacheService::new(Arc::new(MockPageCacheStore::new()));
        let validity = service.is_cache_valid_for_context(&state("COM", "5"), "");

        assert!(!validity.valid);
        assert_eq!(validity.reason, NO_CACHE_FILE);
    }

    #[test]
    fn test_unreadable_file_has_no_metadata() {
        let validity = service_loading(None).is_cache_valid_for_context(&state("COM", "5"), "x.json");

        assert!(!validity.valid);
        assert_eq!(validity.reason, NO_METADATA);
    }

    #[test]
    fn test_legacy_file_has_no_metadata() {
        let legacy = CacheRecord {
            metadata: None,
            page_data: PageData::default(),
        };
        let validity =
            service_loading(Some(legacy)).is_cache_valid_for_context(&state("COM", "5"), "x.json");

        assert_eq!(validity.reason, NO_METADATA);
    }

    #[test]
    fn test_matching_context_is_valid() {
        let validity = service_loading(Some(cached("COM", "5", false)))
            .is_cache_valid_for_context(&state("COM", "5"), "x.json");

        assert!(validity.valid);
        assert_eq!(validity.reason, CACHE_VALID);
    }

    #[test]
    fn test_domain_mismatch() {
        let validity = service_loading(Some(cached("CON", "5", false)))
            .is_cache_valid_for_context(&state("COM", "5"), "x.json");

        assert!(!validity.valid);
        assert!(validity.reason.contains("Domain mismatch"));
    }

    #[test]
    fn test_domain_compare_is_case_sensitive() {
        let validity = service_loading(Some(cached("com", "5", false)))
            .is_cache_valid_for_context(&state("COM", "5"), "x.json");
        assert!(!validity.valid);
    }

    #[test]
    fn test_row_mismatch() {
        let validity = service_loading(Some(cached("COM", "6", false)))
            .is_cache_valid_for_context(&state("COM", "5"), "x.json");

        assert!(!validity.valid);
        assert!(validity.reason.contains("Row mismatch"));
    }

    #[test]
    fn test_url_mismatch_reports_both_values() {
        let mut s = state("COM", "5");
        s.set(Variable::Url, "http://medicine.musc.edu/other");
        let validity = service_loading(Some(cached("COM", "5", false))).is_cache_valid_for_context(&s, "x.json");

        assert!(!validity.valid);
        assert!(validity.reason.contains("http://medicine.musc.edu/other"));
        assert!(validity.reason.contains("http://medicine.musc.edu/about"));
    }

    #[test]
    fn test_unset_context_values_are_not_compared() {
        let mut s = SessionState::default();
        s.set(Variable::Url, "http://medicine.musc.edu/about");
        let validity = service_loading(Some(cached("CON", "99", false))).is_cache_valid_for_context(&s, "x.json");

        assert!(validity.valid);
    }

    #[test]
    fn test_sidebar_is_one_way() {
        let mut needs_sidebar = state("COM", "5");
        needs_sidebar.set_include_sidebar(true);

        let without = service_loading(Some(cached("COM", "5", false)));
        assert!(!without.is_cache_valid_for_context(&needs_sidebar, "x.json").valid);
        assert!(without.is_cache_valid_for_context(&state("COM", "5"), "x.json").valid);

        let with = service_loading(Some(cached("COM", "5", true)));
        assert!(with.is_cache_valid_for_context(&needs_sidebar, "x.json").valid);
        assert!(with.is_cache_valid_for_context(&state("COM", "5"), "x.json").valid);
    }

    #[test]
    fn test_cache_page_data_binds_cache_file() {
        let mut store = MockPageCacheStore::new();
        store
            .expect_save()
            .withf(|meta, _| {
                meta.domain.as_deref() == Some("COM")
                    && meta.row.as_deref() == Some("7")
                    && meta.selector.as_deref() == Some("#main")
                    && !meta.include_sidebar
            })
            .times(1)
            .returning(|_, _| Ok(Some(PathBuf::from("migration_cache/page_check_COM-7.json"))));
        let service = CacheService::new(Arc::new(store));
        let mut s = state("COM", "7");

        service
            .cache_page_data(&mut s, "http://medicine.musc.edu/about", &PageData::default())
            .unwrap();

        assert_eq!(s.get(Variable::CacheFile), "migration_cache/page_check_COM-7.json");
    }

    #[test]
    fn test_update_state_unbound_when_nothing_found() {
        let mut store = MockPageCacheStore::new();
        store.expect_find_by_context().returning(|_, _| None);
        store.expect_find_by_url().returning(|_| None);
        let service = CacheService::new(Arc::new(store));

        let mut s = state("COM", "5");
        s.set(Variable::CacheFile, "old.json");
        s.current_page_data = Some(PageData::default());

        let binding = service.update_state_from_cache(&mut s, None, None, None);

        assert_eq!(binding, CacheBinding::Unbound);
        assert_eq!(s.get(Variable::CacheFile), "");
        assert!(s.current_page_data.is_none());
    }

    #[test]
    fn test_update_state_binds_valid_file() {
        let mut store = MockPageCacheStore::new();
        store
            .expect_find_by_context()
            .withf(|domain, row| domain == "COM" && row == "5")
            .returning(|_, _| Some(PathBuf::from("page_check_COM-5.json")));
        store
            .expect_load()
            .returning(|_| Some(cached("COM", "5", false)));
        let service = CacheService::new(Arc::new(store));
        let mut s = state("COM", "5");

        let binding = service.update_state_from_cache(&mut s, None, None, None);

        assert!(binding.is_valid());
        assert_eq!(s.get(Variable::CacheFile), "page_check_COM-5.json");
        assert!(s.current_page_data.is_some());
    }

    #[test]
    fn test_update_state_falls_back_to_url_and_goes_stale() {
        let mut store = MockPageCacheStore::new();
        store.expect_find_by_context().returning(|_, _| None);
        store
            .expect_find_by_url()
            .returning(|_| Some(PathBuf::from("page_check_COM-5.json")));
        store
            .expect_load()
            .returning(|_| Some(cached("COM", "5", false)));
        let service = CacheService::new(Arc::new(store));
        let mut s = state("CON", "5");

        let binding = service.update_state_from_cache(&mut s, None, None, None);

        assert!(matches!(binding, CacheBinding::Stale { .. }));
        assert_eq!(s.get(Variable::CacheFile), "page_check_COM-5.json");
        assert!(s.current_page_data.is_none());
        assert!(!service.check_bound(&s).valid);
    }

    #[test]
    fn test_set_variable_rebinds_on_context_change() {
        let mut store = MockPageCacheStore::new();
        store.expect_find_by_context().returning(|_, _| None);
        store.expect_find_by_url().returning(|_| None);
        let service = CacheService::new(Arc::new(store));
        let mut s = state("COM", "5");

        let binding = service.set_variable(&mut s, "domain", "CON").unwrap();
        assert_eq!(binding, Some(CacheBinding::Unbound));
        assert_eq!(s.get(Variable::Domain), "CON");

        assert_eq!(service.set_variable(&mut s, "SELECTOR", "#content").unwrap(), None);
        assert!(service.set_variable(&mut s, "COLOR", "blue").is_err());
    }
}
