//! Configuration infrastructure
//!
//! Contains configuration loading and management for the shelter crawler.
//!
//! Configuration is grouped by concern:
//! 1. Crawl target and page count
//! 2. Rate limiting, HTTP transport and staging
//! 3. Output document and selector table
//! 4. Logging

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::infrastructure::parsing::SelectorConfig;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Crawl target
    pub crawl: CrawlConfig,

    /// Self-imposed throttling between requests
    pub rate_limit: RateLimitConfig,

    /// HTTP transport settings
    pub http: HttpConfig,

    /// Temporary download directory
    pub staging: StagingConfig,

    /// Output document settings
    pub output: OutputConfig,

    /// Field -> selector-rule table
    pub selectors: SelectorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Crawl target settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Site root, detail links are resolved against it
    pub base_url: String,

    /// Listing path with a `{page}` placeholder
    pub listing_path_template: String,

    /// Path prefix removed from detail URLs to form record identifiers
    pub listing_path_prefix: String,

    /// Number of listing pages to visit (`0..page_count`)
    pub page_count: u32,
}

/// Which rate-limit policy drives the walker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitStrategy {
    /// Fixed sleeps before every page and item
    FixedDelay,
    /// Token bucket limited to `quota_per_minute` requests
    Quota,
    /// No waiting at all
    Disabled,
}

/// Rate limiting settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub strategy: RateLimitStrategy,

    /// Wait before each listing page fetch
    pub page_delay_ms: u64,

    /// Wait before each detail page fetch
    pub item_delay_ms: u64,

    /// Upper bound of random extra delay added to every wait
    pub jitter_ms: u64,

    /// Requests per minute for the quota strategy
    pub quota_per_minute: u32,
}

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub follow_redirects: bool,
}

/// Staging of fetched documents on disk before parsing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    pub enabled: bool,
    pub directory: PathBuf,
    /// Keep staged files after reading them back
    pub keep_files: bool,
}

/// How the output document is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Replace any existing file
    Truncate,
    /// Append after existing content
    Append,
}

/// Output document settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub write_mode: WriteMode,
    /// Drop records whose identifier was already stored in this run
    pub deduplicate: bool,
    /// JSON indentation width
    pub indent: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files, relative paths resolve against the working directory
    pub directory: PathBuf,

    /// Log file name
    pub file_name: String,

    /// Fixed UTC offset used for timestamps
    pub utc_offset_hours: i32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: site::BASE_URL.to_string(),
            listing_path_template: site::LISTING_PATH_TEMPLATE.to_string(),
            listing_path_prefix: site::LISTING_PATH_PREFIX.to_string(),
            page_count: defaults::PAGE_COUNT,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            strategy: RateLimitStrategy::FixedDelay,
            page_delay_ms: defaults::PAGE_DELAY_MS,
            item_delay_ms: defaults::ITEM_DELAY_MS,
            jitter_ms: 0,
            quota_per_minute: defaults::QUOTA_PER_MINUTE,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            follow_redirects: true,
        }
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: PathBuf::from(defaults::STAGING_DIR),
            keep_files: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(defaults::OUTPUT_PATH),
            write_mode: WriteMode::Truncate,
            deduplicate: false,
            indent: defaults::OUTPUT_INDENT,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: true,
            directory: PathBuf::from(defaults::LOG_DIR),
            file_name: defaults::LOG_FILE_NAME.to_string(),
            utc_offset_hours: defaults::LOG_UTC_OFFSET_HOURS,
        }
    }
}

impl AppConfig {
    /// Rejects settings that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.crawl.base_url.trim().is_empty() {
            bail!("crawl.base_url must not be empty");
        }
        url::Url::parse(&self.crawl.base_url)
            .with_context(|| format!("crawl.base_url is not a valid URL: {}", self.crawl.base_url))?;
        if !self.crawl.listing_path_template.contains("{page}") {
            bail!(
                "crawl.listing_path_template must contain '{{page}}': {}",
                self.crawl.listing_path_template
            );
        }
        if self.rate_limit.strategy == RateLimitStrategy::Quota && self.rate_limit.quota_per_minute == 0 {
            bail!("rate_limit.quota_per_minute must be greater than 0");
        }
        if !(-12..=14).contains(&self.logging.utc_offset_hours) {
            bail!("logging.utc_offset_hours out of range: {}", self.logging.utc_offset_hours);
        }
        Ok(())
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("shelter-crawler");

        Ok(config_dir)
    }

    /// Configuration manager using the per-user config directory
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    /// Configuration manager for an explicit file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { config_path: path.into() }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("Failed to read configuration file {:?}", self.config_path))?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("⚠️  Configuration file could not be parsed: {}", parse_error);
                warn!("⚠️  Falling back to default configuration");

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                let default_config = AppConfig::default();
                self.save_config(&default_config)
                    .await
                    .context("Failed to save default configuration")?;
                Ok(default_config)
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Target site constants
pub mod site {
    /// Shelter website root
    pub const BASE_URL: &str = "https://izpriuta.ru";

    /// Listing pages, `{page}` is replaced by the 0-based page index
    pub const LISTING_PATH_TEMPLATE: &str = "/koshki/?page={page}";

    /// Detail links look like `/koshki/<id>`
    pub const LISTING_PATH_PREFIX: &str = "/koshki/";
}

/// Default configuration values
pub mod defaults {
    /// Listing pages visited per run
    pub const PAGE_COUNT: u32 = 7;

    /// Wait before each listing page
    pub const PAGE_DELAY_MS: u64 = 3000;

    /// Wait before each detail page
    pub const ITEM_DELAY_MS: u64 = 6000;

    /// Requests per minute for the quota strategy
    pub const QUOTA_PER_MINUTE: u32 = 10;

    /// Browser-like user agent, the site serves the same markup to it
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/101.0.4951.67 Safari/537.36";

    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    pub const STAGING_DIR: &str = "data";

    pub const OUTPUT_PATH: &str = "database.json";

    pub const OUTPUT_INDENT: usize = 4;

    pub const CONFIG_FILE_NAME: &str = "shelter_crawler_config.json";

    pub const LOG_LEVEL: &str = "info";

    pub const LOG_DIR: &str = "logs";

    pub const LOG_FILE_NAME: &str = "shelter-crawler.log";

    /// Moscow time
    pub const LOG_UTC_OFFSET_HOURS: i32 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.crawl.page_count, 7);
        assert_eq!(config.rate_limit.page_delay_ms, 3000);
        assert_eq!(config.rate_limit.item_delay_ms, 6000);
        assert_eq!(config.output.write_mode, WriteMode::Truncate);
    }

    #[test]
    fn test_validate_rejects_template_without_placeholder() {
        let mut config = AppConfig::default();
        config.crawl.listing_path_template = "/koshki/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_quota() {
        let mut config = AppConfig::default();
        config.rate_limit.strategy = RateLimitStrategy::Quota;
        config.rate_limit.quota_per_minute = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"crawl": {"page_count": 2}}"#).unwrap();
        assert_eq!(config.crawl.page_count, 2);
        assert_eq!(config.crawl.base_url, site::BASE_URL);
        assert_eq!(config.output.indent, 4);
    }

    #[tokio::test]
    async fn test_load_creates_default_file() -> Result<()> {
        let dir = tempdir()?;
        let manager = ConfigManager::with_path(dir.path().join("nested").join("config.json"));

        let config = manager.load_config().await?;
        assert!(manager.config_path().exists());
        assert_eq!(config.crawl.page_count, defaults::PAGE_COUNT);
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupted_file_falls_back_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json")?;

        let manager = ConfigManager::with_path(&path);
        let config = manager.load_config().await?;

        assert_eq!(config.crawl.page_count, defaults::PAGE_COUNT);
        assert!(path.with_extension("json.corrupted").exists());
        Ok(())
    }
}
