//! Page-data cache.
//!
//! Provides a [`PageCacheStore`] trait with two implementations:
//! - [`JsonFileCache`] - `page_check_*.json` files in a cache directory
//! - [`NullCache`] - No-op implementation for disabled caching

mod json_file_cache;
mod null_cache;
mod service;

pub use json_file_cache::{JsonFileCache, cache_filename, sanitize_url};
pub use null_cache::NullCache;
pub use service::{CacheError, CacheResult, PageCacheStore};

#[cfg(test)]
pub use service::MockPageCacheStore;
