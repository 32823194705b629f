//! Core domain entities representing the migration data model.
//!
//! Entities are plain data structures with little behavior beyond
//! conversions and small derived values.
//!
//! # Entity Types
//!
//! - [`DomainConfig`] - An organizational domain and its DSM worksheet
//! - [`PageData`] - Links, PDFs and embeds scraped from a legacy page
//! - [`CacheRecord`] / [`CacheMetadata`] - A persisted page-data cache file
//! - [`LookupResult`] - Where a legacy URL lands in the new site
//!
//! All entities include unit tests demonstrating their construction and usage.

pub mod cache_record;
pub mod domain;
pub mod lookup_result;
pub mod page_data;

pub use cache_record::{CacheEnvelope, CacheMetadata, CacheRecord, is_truthy};
pub use domain::{
    DEFAULT_EXISTING_URL_COLUMN, DEFAULT_HEADER_ROW, DEFAULT_PROPOSED_URL_COLUMN, DomainConfig,
};
pub use lookup_result::{DsmMatch, LookupResult, ProposedHierarchy};
pub use page_data::{ContentCounts, PageData, PageEmbed, PageLink, PageSummary};
