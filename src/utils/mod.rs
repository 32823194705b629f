//! Utility functions for URL handling, site hierarchies, and file discovery.
//!
//! - [`url_normalizer`] - Fetch-time and comparison-time URL normalization
//! - [`sitecore`] - Hostname to site-root mapping and breadcrumb rendering
//! - [`dsm_file`] - Locating the newest DSM workbook on disk

pub mod dsm_file;
pub mod sitecore;
pub mod url_normalizer;
