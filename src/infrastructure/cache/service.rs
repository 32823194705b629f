//! Page-data cache trait and error types.

use std::path::{Path, PathBuf};

use crate::domain::entities::{CacheMetadata, CacheRecord, PageData};

/// Errors that can occur while writing the cache.
///
/// Reads never fail: an unreadable file is reported as a missing cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(String),

    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Persistence for scraped page data.
///
/// Each entry stores the page data together with the session context it
/// was scraped in, so callers can re-validate it before trusting it.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::JsonFileCache`] - One JSON file per page in a cache directory
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
pub trait PageCacheStore: Send + Sync {
    /// Persists `page_data` with its context.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(path))` with the file written
    /// - `Ok(None)` when the store does not persist anything
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the entry could not be serialized or written.
    fn save(&self, metadata: &CacheMetadata, page_data: &PageData) -> CacheResult<Option<PathBuf>>;

    /// Reads a cache entry back.
    ///
    /// Returns `None` for missing, unreadable or malformed files.
    fn load(&self, path: &Path) -> Option<CacheRecord>;

    /// Locates the entry written for a domain and spreadsheet row.
    fn find_by_context(&self, domain: &str, row: &str) -> Option<PathBuf>;

    /// Locates an entry whose recorded URL names the same page as `url`.
    fn find_by_url(&self, url: &str) -> Option<PathBuf>;
}
