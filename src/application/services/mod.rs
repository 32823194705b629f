//! Business logic services for the application layer.

pub mod cache_service;
pub mod dsm_service;
pub mod page_service;

pub use cache_service::{CacheBinding, CacheService, CacheValidity};
pub use dsm_service::{DsmIndex, DsmService, LoadedRow};
pub use page_service::{LinkAnalysis, LinkReport, PageCheck, PageService, PageSource};
