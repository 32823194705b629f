//! Application layer services implementing the migration workflow.
//!
//! Services coordinate the DSM workbook, the page cache and the scraper.
//! They take the session state explicitly and never print; the command
//! layer decides how results are shown.
//!
//! # Available Services
//!
//! - [`services::dsm_service::DsmService`] - DSM lookups, row loading and hierarchies
//! - [`services::cache_service::CacheService`] - Cache validity and session re-binding
//! - [`services::page_service::PageService`] - Page checks and link-migration analysis

pub mod services;
