//! # DSM Linker
//!
//! Command-line helper for migrating pages from the legacy university sites
//! into the new Sitecore site, driven by the Digital Site Map (DSM) workbook.
//!
//! ## Architecture
//!
//! The crate keeps the same layered split as a service would:
//!
//! - **Domain Layer** ([`domain`]) - DSM domains, page data and lookup results
//! - **Application Layer** ([`application`]) - DSM lookups, cache validity and page checks
//! - **Infrastructure Layer** ([`infrastructure`]) - Spreadsheet reading, HTTP scraping and the JSON page cache
//! - **Command Layer** ([`commands`]) - One-shot CLI commands and the interactive shell
//!
//! ## Features
//!
//! - Resolve any legacy URL to its DSM row and proposed Sitecore location
//! - Extract links, PDFs and embeds from a page's main content and sidebar
//! - Check the HTTP status of every extracted link
//! - Cache page data per DSM row and re-use it only while it matches the session
//!
//! ## Quick Start
//!
//! ```bash
//! export DSM_FILE="./dsm-0412.xlsx"
//!
//! dsm-linker lookup https://medicine.musc.edu/departments
//! dsm-linker check --domain COM --row 12
//! dsm-linker shell
//! ```
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables via [`config::Config`].
//! See the [`config`] module for available options.

pub mod application;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod state;
pub mod utils;

pub use error::AppError;
pub use state::SessionState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for integration tests.
pub mod prelude {
    pub use crate::application::services::{CacheBinding, CacheService, DsmService, PageService};
    pub use crate::domain::entities::{DomainConfig, LookupResult, PageData, PageLink};
    pub use crate::domain::registry::DomainRegistry;
    pub use crate::error::AppError;
    pub use crate::infrastructure::cache::{JsonFileCache, PageCacheStore};
    pub use crate::infrastructure::scraper::PageScraper;
    pub use crate::infrastructure::spreadsheet::Workbook;
    pub use crate::state::{SessionState, Variable};
}
