//! Wires one complete run: fetcher, policy, rules and store, then a single flush.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::application::listing_walker::ListingWalker;
use crate::application::rate_limit;
use crate::domain::CrawlSummary;
use crate::infrastructure::{
    AppConfig, DuplicatePolicy, ExtractionRules, Fetcher, HttpFetcher, RecordStore, StagedFetcher,
};

pub struct CrawlRunner;

impl CrawlRunner {
    /// Crawl over HTTP with the configured settings
    pub async fn run(config: &AppConfig) -> Result<CrawlSummary> {
        let fetcher = Self::build_fetcher(config)?;
        Self::run_with_fetcher(config, fetcher).await
    }

    /// Same as [`CrawlRunner::run`] with a caller-supplied fetcher
    pub async fn run_with_fetcher(config: &AppConfig, fetcher: Arc<dyn Fetcher>) -> Result<CrawlSummary> {
        config.validate()?;

        let rules = Arc::new(ExtractionRules::compile(&config.selectors).context("Invalid selector table")?);
        let policy = rate_limit::from_config(&config.rate_limit)?;
        let walker = ListingWalker::new(fetcher, rules, policy, &config.crawl);
        let mut store = RecordStore::new(DuplicatePolicy::from_flag(config.output.deduplicate));

        let summary = walker
            .walk(&config.crawl.base_url, config.crawl.page_count, &mut store)
            .await;

        let written = store
            .flush(&config.output.path, config.output.write_mode, config.output.indent)
            .with_context(|| format!("Failed to save records to {}", config.output.path.display()))?;
        info!("💾 Run {} saved {} records", summary.run_id, written);

        Ok(summary)
    }

    fn build_fetcher(config: &AppConfig) -> Result<Arc<dyn Fetcher>> {
        let http = HttpFetcher::new(&config.http).context("Failed to create HTTP client")?;
        if config.staging.enabled {
            info!("📁 Staging documents in {}", config.staging.directory.display());
            Ok(Arc::new(StagedFetcher::new(http, &config.staging)))
        } else {
            Ok(Arc::new(http))
        }
    }
}
