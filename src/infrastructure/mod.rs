//! Infrastructure layer for external integrations.
//!
//! Concrete implementations of the seams the services depend on.
//!
//! # Modules
//!
//! - [`spreadsheet`] - DSM workbook loading and row access
//! - [`cache`] - Page-data cache (JSON files and no-op implementations)
//! - [`scraper`] - Fetching legacy pages over HTTP

pub mod cache;
pub mod scraper;
pub mod spreadsheet;
