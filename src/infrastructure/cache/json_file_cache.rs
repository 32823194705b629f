//! JSON-file page cache.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::Local;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::service::{CacheError, CacheResult, PageCacheStore};
use crate::domain::entities::{CacheEnvelope, CacheMetadata, CacheRecord, PageData};
use crate::utils::url_normalizer::same_page;

const FILE_PREFIX: &str = "page_check_";
const FILE_SUFFIX: &str = ".json";
const MAX_URL_KEY_CHARS: usize = 50;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w.\-]").expect("valid regex"));

/// Replaces every character outside `[word . -]` with `_` and keeps the
/// first 50 characters.
pub fn sanitize_url(url: &str) -> String {
    UNSAFE_FILENAME_CHARS
        .replace_all(url, "_")
        .chars()
        .take(MAX_URL_KEY_CHARS)
        .collect()
}

/// Builds the cache filename for a page.
///
/// `page_check_{domain}-{row}.json` when both domain and row are known,
/// otherwise `page_check_{sanitized url}.json`.
pub fn cache_filename(domain: Option<&str>, row: Option<&str>, url: &str) -> String {
    match (non_blank(domain), non_blank(row)) {
        (Some(domain), Some(row)) => format!("{FILE_PREFIX}{domain}-{row}{FILE_SUFFIX}"),
        _ => format!("{FILE_PREFIX}{}{FILE_SUFFIX}", sanitize_url(url)),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn is_cache_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(FILE_PREFIX) && n.ends_with(FILE_SUFFIX))
}

/// Stores each page as `{"metadata": ..., "page_data": ...}` in a directory.
///
/// Writes are last-writer-wins; there is no locking between processes.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    dir: PathBuf,
}

impl JsonFileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lists every cache file in the directory, sorted by name.
    pub fn entries(&self) -> Vec<PathBuf> {
        let Ok(read_dir) = fs::read_dir(&self.dir) else {
            debug!("Cache directory {} not readable", self.dir.display());
            return Vec::new();
        };

        let mut paths: Vec<PathBuf> = read_dir
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_cache_file(path))
            .collect();
        paths.sort();
        paths
    }
}

impl PageCacheStore for JsonFileCache {
    fn save(&self, metadata: &CacheMetadata, page_data: &PageData) -> CacheResult<Option<PathBuf>> {
        let filename = cache_filename(
            metadata.domain.as_deref(),
            metadata.row.as_deref(),
            metadata.url.as_deref().unwrap_or_default(),
        );

        let mut metadata = metadata.clone();
        metadata.cache_filename = Some(filename.clone());
        if metadata.timestamp.is_none() {
            metadata.timestamp = Some(Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string());
        }

        let envelope = CacheEnvelope {
            metadata,
            page_data: page_data.clone(),
        };
        let body = serde_json::to_string_pretty(&envelope)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        fs::create_dir_all(&self.dir).map_err(|e| {
            CacheError::Io(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;

        let path = self.dir.join(&filename);
        fs::write(&path, body)
            .map_err(|e| CacheError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

        info!("Page data cached to {}", path.display());
        Ok(Some(path))
    }

    fn load(&self, path: &Path) -> Option<CacheRecord> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read cache file {}: {}", path.display(), e);
                return None;
            }
        };

        let value: Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!("Cache file {} is not valid JSON: {}", path.display(), e);
                return None;
            }
        };

        let record = CacheRecord::from_json(value);
        if record.is_none() {
            warn!("Cache file {} has an unexpected layout", path.display());
        }
        record
    }

    fn find_by_context(&self, domain: &str, row: &str) -> Option<PathBuf> {
        if domain.trim().is_empty() || row.trim().is_empty() {
            return None;
        }

        let path = self.dir.join(cache_filename(Some(domain), Some(row), ""));
        if path.is_file() {
            debug!("Found cache for {}/{}: {}", domain, row, path.display());
            Some(path)
        } else {
            None
        }
    }

    fn find_by_url(&self, url: &str) -> Option<PathBuf> {
        if url.trim().is_empty() {
            return None;
        }

        self.entries().into_iter().find(|path| {
            self.load(path)
                .and_then(|record| record.metadata)
                .and_then(|metadata| metadata.url)
                .is_some_and(|cached| same_page(&cached, url))
        })
    }
}
