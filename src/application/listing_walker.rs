//! Listing traversal
//!
//! Visits listing pages `0..page_count` in order, collects the detail links on
//! each page and extracts them one by one into the run's `RecordStore`. A
//! failed page or item is logged, counted and skipped.

#![allow(clippy::uninlined_format_args)]

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::errors::ItemError;
use crate::application::item_extractor::ItemExtractor;
use crate::application::rate_limit::RateLimitPolicy;
use crate::domain::{CrawlSummary, PageJob};
use crate::infrastructure::config::CrawlConfig;
use crate::infrastructure::{DocumentView, ExtractionRules, Fetcher, RecordStore};

pub struct ListingWalker {
    fetcher: Arc<dyn Fetcher>,
    rules: Arc<ExtractionRules>,
    extractor: ItemExtractor,
    policy: Box<dyn RateLimitPolicy>,
    listing_path_template: String,
}

impl ListingWalker {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        rules: Arc<ExtractionRules>,
        policy: Box<dyn RateLimitPolicy>,
        crawl: &CrawlConfig,
    ) -> Self {
        let extractor = ItemExtractor::new(Arc::clone(&fetcher), Arc::clone(&rules), crawl.listing_path_prefix.clone());
        Self {
            fetcher,
            rules,
            extractor,
            policy,
            listing_path_template: crawl.listing_path_template.clone(),
        }
    }

    /// Walk every listing page and append each extracted record to `store`.
    /// Strictly sequential: each fetch completes before the next wait begins.
    pub async fn walk(&self, base_url: &str, page_count: u32, store: &mut RecordStore) -> CrawlSummary {
        let mut summary = CrawlSummary::start();
        info!(
            run_id = %summary.run_id,
            "🚀 Starting crawl of {} listing pages at {}", page_count, base_url
        );

        for job in PageJob::enumerate(base_url, &self.listing_path_template, page_count) {
            summary.pages_attempted += 1;
            self.policy.before_page(job.page_index).await;

            let links = match self.item_links(&job).await {
                Ok(links) => links,
                Err(e) => {
                    warn!("⚠️ Skipping {}: {}", job, e);
                    summary.pages_failed += 1;
                    continue;
                }
            };
            info!("📄 {}: {} item links", job, links.len());

            for (index, link) in links.iter().enumerate() {
                summary.items_attempted += 1;
                self.policy.before_item(job.page_index, index).await;

                match self.extractor.extract_item(base_url, link).await {
                    Ok(record) => {
                        info!("✅ Extracted {} ({})", record.id_name, record.name);
                        debug!("{}", record);
                        if store.append(record) {
                            summary.records_stored += 1;
                        }
                    }
                    Err(e) => {
                        warn!("⚠️ Skipping item {} on page {}: {}", link, job.page_index, e);
                        summary.items_failed += 1;
                    }
                }
            }
        }

        summary.finish();
        info!(
            run_id = %summary.run_id,
            "🏁 Crawl finished in {}s: {} records, {}/{} pages failed, {}/{} items failed",
            summary.elapsed_seconds(),
            summary.records_stored,
            summary.pages_failed,
            summary.pages_attempted,
            summary.items_failed,
            summary.items_attempted
        );
        summary
    }

    async fn item_links(&self, job: &PageJob) -> Result<Vec<String>, ItemError> {
        let body = self.fetcher.fetch(&job.url).await?;
        let doc = DocumentView::parse(&body, &job.url)?;
        Ok(doc.item_links(&self.rules))
    }
}
