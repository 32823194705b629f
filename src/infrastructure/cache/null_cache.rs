//! No-op cache implementation for disabled caching.

use std::path::{Path, PathBuf};

use super::service::{CacheResult, PageCacheStore};
use crate::domain::entities::{CacheMetadata, CacheRecord, PageData};
use tracing::debug;

/// A cache that stores nothing.
///
/// Every check against it re-scrapes the page. Useful for `--refresh`
/// style runs and for tests that must always hit the scraper.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (page caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCacheStore for NullCache {
    fn save(&self, _metadata: &CacheMetadata, _page_data: &PageData) -> CacheResult<Option<PathBuf>> {
        Ok(None)
    }

    fn load(&self, _path: &Path) -> Option<CacheRecord> {
        None
    }

    fn find_by_context(&self, _domain: &str, _row: &str) -> Option<PathBuf> {
        None
    }

    fn find_by_url(&self, _url: &str) -> Option<PathBuf> {
        None
    }
}
