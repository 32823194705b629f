//! Legacy page scraping.

mod http_scraper;
mod service;

pub use http_scraper::{HttpPageScraper, ScraperSettings};
pub use service::{PageScraper, ScrapeError};

#[cfg(test)]
pub use service::MockPageScraper;
