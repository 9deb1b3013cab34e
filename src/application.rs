//! Application layer
//!
//! Orchestrates one crawl run: listing traversal, per-item extraction,
//! self-throttling and the final flush. Infrastructure is reached only
//! through the `Fetcher` trait and the parsing/persistence types.

pub mod errors;
pub mod item_extractor;
pub mod listing_walker;
pub mod rate_limit;
pub mod runner;

pub use errors::ItemError;
pub use item_extractor::ItemExtractor;
pub use listing_walker::ListingWalker;
pub use rate_limit::{FixedDelayPolicy, NoDelay, QuotaPolicy, RateLimitPolicy};
pub use runner::CrawlRunner;
