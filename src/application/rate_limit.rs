//! Self-throttling between requests
//!
//! The walker asks its policy to wait before every listing page and every
//! detail item. Policies are swappable without touching extraction logic.

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, direct::NotKeyed},
};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, info};

use crate::infrastructure::config::{RateLimitConfig, RateLimitStrategy};

#[async_trait]
pub trait RateLimitPolicy: Send + Sync {
    /// Called before fetching listing page `page`
    async fn before_page(&self, page: u32);

    /// Called before fetching item `index` of listing page `page`
    async fn before_item(&self, page: u32, index: usize);
}

/// Fixed sleeps, optionally stretched by a random jitter
#[derive(Debug, Clone)]
pub struct FixedDelayPolicy {
    page_delay: Duration,
    item_delay: Duration,
    jitter_ms: u64,
}

impl FixedDelayPolicy {
    pub fn new(page_delay: Duration, item_delay: Duration) -> Self {
        Self {
            page_delay,
            item_delay,
            jitter_ms: 0,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter_ms = u64::try_from(jitter.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Base delay plus a random extra in `0..=jitter`
    pub fn jittered(&self, base: Duration) -> Duration {
        if self.jitter_ms == 0 {
            return base;
        }
        base + Duration::from_millis(fastrand::u64(0..=self.jitter_ms))
    }
}

#[async_trait]
impl RateLimitPolicy for FixedDelayPolicy {
    async fn before_page(&self, page: u32) {
        let delay = self.jittered(self.page_delay);
        debug!("⏳ Waiting {:?} before listing page {}", delay, page);
        tokio::time::sleep(delay).await;
    }

    async fn before_item(&self, page: u32, index: usize) {
        let delay = self.jittered(self.item_delay);
        debug!("⏳ Waiting {:?} before item {} of page {}", delay, index, page);
        tokio::time::sleep(delay).await;
    }
}

/// Token bucket shared by page and item fetches
pub struct QuotaPolicy {
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl QuotaPolicy {
    pub fn per_minute(requests: u32) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(requests).context("Rate limit must be greater than 0")?);
        Ok(Self {
            rate_limiter: RateLimiter::direct(quota),
        })
    }
}

#[async_trait]
impl RateLimitPolicy for QuotaPolicy {
    async fn before_page(&self, _page: u32) {
        self.rate_limiter.until_ready().await;
    }

    async fn before_item(&self, _page: u32, _index: usize) {
        self.rate_limiter.until_ready().await;
    }
}

/// Never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl RateLimitPolicy for NoDelay {
    async fn before_page(&self, _page: u32) {}

    async fn before_item(&self, _page: u32, _index: usize) {}
}

/// Build the policy selected in the configuration
pub fn from_config(config: &RateLimitConfig) -> Result<Box<dyn RateLimitPolicy>> {
    let policy: Box<dyn RateLimitPolicy> = match config.strategy {
        RateLimitStrategy::FixedDelay => {
            info!(
                "⏱️ Fixed delays: {}ms per page, {}ms per item, jitter {}ms",
                config.page_delay_ms, config.item_delay_ms, config.jitter_ms
            );
            Box::new(
                FixedDelayPolicy::new(
                    Duration::from_millis(config.page_delay_ms),
                    Duration::from_millis(config.item_delay_ms),
                )
                .with_jitter(Duration::from_millis(config.jitter_ms)),
            )
        }
        RateLimitStrategy::Quota => {
            info!("⏱️ Quota rate limit: {} requests per minute", config.quota_per_minute);
            Box::new(QuotaPolicy::per_minute(config.quota_per_minute)?)
        }
        RateLimitStrategy::Disabled => {
            info!("⏱️ Rate limiting disabled");
            Box::new(NoDelay)
        }
    };
    Ok(policy)
}
