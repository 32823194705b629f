//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before any command runs.
//!
//! ## Example
//!
//! ```bash
//! export DSM_FILE="dsm-0612.xlsx"
//! export CACHE_DIR="migration_cache"
//! export SELECTOR="#main"
//! export INCLUDE_SIDEBAR="false"
//! ```
//!
//! If `DSM_FILE` is not set, the newest `dsm-MMDD.xlsx` in `DSM_DIR` is used.
//!
//! ## Optional Variables
//!
//! - `DSM_FILE` - Path to the DSM workbook
//! - `DSM_DIR` - Directory searched for `dsm-MMDD.xlsx` (default: `.`)
//! - `CACHE_DIR` - Page-data cache directory (default: `migration_cache`)
//! - `DOMAINS_FILE` - JSON file overriding the built-in domain list
//! - `SELECTOR` - Main content selector (default: `#main`)
//! - `SIDEBAR_SELECTOR` - Sidebar selector (default: `#sidebar-components`)
//! - `INCLUDE_SIDEBAR` - Initial sidebar preference (default: `false`)
//! - `HTTP_TIMEOUT_SECONDS` - Page fetch timeout (default: 30, max: 300)
//! - `STATUS_CHECK_TIMEOUT_SECONDS` - Link status probe timeout (default: 10, max: 300)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::entities::is_truthy;
use crate::domain::registry::DomainRegistry;
use crate::infrastructure::scraper::ScraperSettings;
use crate::utils::dsm_file::find_latest_dsm_file;

const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Tool configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit DSM workbook path (`DSM_FILE`).
    pub dsm_file: Option<PathBuf>,
    pub dsm_dir: PathBuf,
    pub cache_dir: PathBuf,
    /// JSON domain list replacing the built-in one (`DOMAINS_FILE`).
    pub domains_file: Option<PathBuf>,
    pub selector: String,
    pub sidebar_selector: String,
    pub include_sidebar: bool,
    pub http_timeout_seconds: u64,
    pub status_check_timeout_seconds: u64,
    pub log_level: String,
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dsm_file: None,
            dsm_dir: PathBuf::from("."),
            cache_dir: PathBuf::from("migration_cache"),
            domains_file: None,
            selector: "#main".to_string(),
            sidebar_selector: "#sidebar-components".to_string(),
            include_sidebar: false,
            http_timeout_seconds: 30,
            status_check_timeout_seconds: 10,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but not a number.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let dsm_file = non_empty_var("DSM_FILE").map(PathBuf::from);
        let dsm_dir = non_empty_var("DSM_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.dsm_dir);
        let cache_dir = env::var("CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_dir);
        let domains_file = non_empty_var("DOMAINS_FILE").map(PathBuf::from);

        let selector = env::var("SELECTOR").unwrap_or(defaults.selector);
        let sidebar_selector = env::var("SIDEBAR_SELECTOR").unwrap_or(defaults.sidebar_selector);
        let include_sidebar = env::var("INCLUDE_SIDEBAR")
            .map(|v| is_truthy(&v))
            .unwrap_or(defaults.include_sidebar);

        let http_timeout_seconds = Self::load_seconds("HTTP_TIMEOUT_SECONDS")?
            .unwrap_or(defaults.http_timeout_seconds);
        let status_check_timeout_seconds = Self::load_seconds("STATUS_CHECK_TIMEOUT_SECONDS")?
            .unwrap_or(defaults.status_check_timeout_seconds);

        let log_level = env::var("RUST_LOG").unwrap_or(defaults.log_level);
        let log_format = env::var("LOG_FORMAT").unwrap_or(defaults.log_format);

        Ok(Self {
            dsm_file,
            dsm_dir,
            cache_dir,
            domains_file,
            selector,
            sidebar_selector,
            include_sidebar,
            http_timeout_seconds,
            status_check_timeout_seconds,
            log_level,
            log_format,
        })
    }

    fn load_seconds(name: &str) -> Result<Option<u64>> {
        match non_empty_var(name) {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .with_context(|| format!("{} must be a whole number of seconds, got '{}'", name, raw)),
            None => Ok(None),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `log_format` is not `text` or `json`
    /// - a timeout is 0 or above 300 seconds
    /// - a selector or `cache_dir` is empty
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        for (name, value) in [
            ("HTTP_TIMEOUT_SECONDS", self.http_timeout_seconds),
            ("STATUS_CHECK_TIMEOUT_SECONDS", self.status_check_timeout_seconds),
        ] {
            if value == 0 || value > MAX_TIMEOUT_SECONDS {
                anyhow::bail!(
                    "{} must be between 1 and {}, got {}",
                    name,
                    MAX_TIMEOUT_SECONDS,
                    value
                );
            }
        }

        if self.selector.trim().is_empty() {
            anyhow::bail!("SELECTOR must not be empty");
        }
        if self.sidebar_selector.trim().is_empty() {
            anyhow::bail!("SIDEBAR_SELECTOR must not be empty");
        }

        if self.cache_dir.as_os_str().is_empty() {
            anyhow::bail!("CACHE_DIR must not be empty");
        }

        Ok(())
    }

    /// Returns the DSM workbook to open: `DSM_FILE`, or the newest
    /// `dsm-MMDD.xlsx` in `DSM_DIR`.
    pub fn resolve_dsm_file(&self) -> Option<PathBuf> {
        self.dsm_file
            .clone()
            .or_else(|| find_latest_dsm_file(&self.dsm_dir))
    }

    /// Builds the domain registry from `DOMAINS_FILE`, or the built-in list.
    ///
    /// # Errors
    ///
    /// Returns an error if `DOMAINS_FILE` is set but unreadable or invalid.
    pub fn domain_registry(&self) -> Result<DomainRegistry> {
        match &self.domains_file {
            Some(path) => DomainRegistry::from_json_file(path)
                .with_context(|| format!("Failed to load domains from {}", path.display())),
            None => Ok(DomainRegistry::builtin()),
        }
    }

    pub fn scraper_settings(&self) -> ScraperSettings {
        ScraperSettings {
            sidebar_selector: self.sidebar_selector.clone(),
            page_timeout: Duration::from_secs(self.http_timeout_seconds),
            status_timeout: Duration::from_secs(self.status_check_timeout_seconds),
        }
    }

    /// Logs a configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        match self.resolve_dsm_file() {
            Some(path) => tracing::info!("  DSM file: {}", path.display()),
            None => tracing::info!("  DSM file: none found in {}", self.dsm_dir.display()),
        }
        tracing::info!("  Cache directory: {}", self.cache_dir.display());
        match &self.domains_file {
            Some(path) => tracing::info!("  Domains: {}", path.display()),
            None => tracing::info!("  Domains: built-in"),
        }
        tracing::info!("  Selector: {}", self.selector);
        tracing::info!("  Include sidebar: {}", self.include_sidebar);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable cannot be parsed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    const VARS: [&str; 11] = [
        "DSM_FILE",
        "DSM_DIR",
        "CACHE_DIR",
        "DOMAINS_FILE",
        "SELECTOR",
        "SIDEBAR_SELECTOR",
        "INCLUDE_SIDEBAR",
        "HTTP_TIMEOUT_SECONDS",
        "STATUS_CHECK_TIMEOUT_SECONDS",
        "RUST_LOG",
        "LOG_FORMAT",
    ];

    fn clear_env() {
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            for var in VARS {
                env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.log_format = "invalid".to_string();
        assert!(config.validate().is_err());
        config.log_format = "json".to_string();
        assert!(config.validate().is_ok());

        config.http_timeout_seconds = 0;
        assert!(config.validate().is_err());
        config.http_timeout_seconds = 301;
        assert!(config.validate().is_err());
        config.http_timeout_seconds = 30;

        config.selector = "  ".to_string();
        assert!(config.validate().is_err());
        config.selector = "#main".to_string();

        config.cache_dir = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_defaults_from_empty_env() {
        clear_env();

        let config = Config::from_env().unwrap();

        assert!(config.dsm_file.is_none());
        assert_eq!(config.cache_dir, PathBuf::from("migration_cache"));
        assert_eq!(config.selector, "#main");
        assert_eq!(config.sidebar_selector, "#sidebar-components");
        assert!(!config.include_sidebar);
        assert_eq!(config.http_timeout_seconds, 30);
        assert_eq!(config.status_check_timeout_seconds, 10);
    }

    #[test]
    #[serial]
    fn test_values_from_env() {
        clear_env();
        // SAFETY: Tests are run serially
        unsafe {
            env::set_var("DSM_FILE", "dsm-0612.xlsx");
            env::set_var("INCLUDE_SIDEBAR", "Yes");
            env::set_var("HTTP_TIMEOUT_SECONDS", "45");
            env::set_var("SELECTOR", "#content");
        }

        let config = Config::from_env().unwrap();

        assert_eq!(config.dsm_file, Some(PathBuf::from("dsm-0612.xlsx")));
        assert!(config.include_sidebar);
        assert_eq!(config.http_timeout_seconds, 45);
        assert_eq!(config.selector, "#content");
        assert_eq!(config.resolve_dsm_file(), Some(PathBuf::from("dsm-0612.xlsx")));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_timeout_is_an_error() {
        clear_env();
        // SAFETY: Tests are run serially
        unsafe {
            env::set_var("STATUS_CHECK_TIMEOUT_SECONDS", "soon");
        }

        assert!(Config::from_env().is_err());

        clear_env();
    }

    #[test]
    fn test_resolve_dsm_file_from_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("dsm-0301.xlsx"), b"").unwrap();
        fs::write(dir.path().join("dsm-1115.xlsx"), b"").unwrap();

        let config = Config {
            dsm_dir: dir.path().to_path_buf(),
            ..Config::default()
        };

        assert_eq!(config.resolve_dsm_file(), Some(dir.path().join("dsm-1115.xlsx")));
    }

    #[test]
    fn test_builtin_domain_registry() {
        let registry = Config::default().domain_registry().unwrap();
        assert!(registry.find("Enterprise").is_some());
    }

    #[test]
    fn test_missing_domains_file_is_an_error() {
        let config = Config {
            domains_file: Some(PathBuf::from("/nonexistent/domains.json")),
            ..Config::default()
        };
        assert!(config.domain_registry().is_err());
    }
}
