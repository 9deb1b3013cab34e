#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use tracing::info;

use shelter_crawler_lib::application::CrawlRunner;
use shelter_crawler_lib::infrastructure::ConfigManager;
use shelter_crawler_lib::infrastructure::logging::{get_log_directory, init_logging_with_config, log_system_info};

/// Usage: `shelter-crawler [CONFIG_PATH]`
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config_manager = match std::env::args().nth(1) {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };

    let config = config_manager
        .load_config()
        .await
        .with_context(|| format!("Failed to load configuration from {:?}", config_manager.config_path()))?;
    config.validate().context("Invalid configuration")?;

    init_logging_with_config(config.logging.clone())?;
    log_system_info(&get_log_directory(&config.logging));
    info!("Using configuration: {:?}", config_manager.config_path());

    let summary = CrawlRunner::run(&config).await?;
    info!(
        "Run {} complete: {} records saved to {}",
        summary.run_id,
        summary.records_stored,
        config.output.path.display()
    );
    Ok(())
}
