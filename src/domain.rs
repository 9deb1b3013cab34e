//! Domain module - records produced by a crawl run
//!
//! Plain data types shared by the parsing, crawling and persistence layers.
//! Nothing in here performs I/O.

pub mod page_job;
pub mod record;
pub mod summary;

pub use page_job::PageJob;
pub use record::Record;
pub use summary::CrawlSummary;
