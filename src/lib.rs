//! Shelter Crawler - listing crawler for pet-shelter sites
//!
//! Walks a fixed number of listing pages, follows every detail link, extracts
//! one record per animal and saves the whole run as a single JSON document.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::CrawlRunner;
pub use domain::{CrawlSummary, Record};
pub use infrastructure::AppConfig;
