//! Logging system configuration and initialization
//!
//! This module provides the logging setup for crawl runs:
//! - Console output for watching a run live
//! - File logging into a configurable directory
//! - Structured JSON file logging (optional)
//! - Timestamps in a fixed, configurable UTC offset

#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use chrono::{FixedOffset, Offset, Utc};
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{Subscriber, info};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;

// Keeps the non-blocking file writers alive for the whole process
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> = Mutex::new(Vec::new());
}

/// Dependency targets capped unless the level is `trace`
const NOISY_TARGETS: &[(&str, &str)] = &[
    ("reqwest", "info"),
    ("hyper", "warn"),
    ("hyper_util", "warn"),
    ("h2", "warn"),
    ("html5ever", "warn"),
    ("selectors", "warn"),
    ("tokio", "info"),
];

/// Time formatter for a fixed UTC offset
#[derive(Debug, Clone, Copy)]
struct OffsetTimeFormatter {
    offset: FixedOffset,
}

impl OffsetTimeFormatter {
    fn new(hours: i32) -> Self {
        let offset = FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix());
        Self { offset }
    }
}

impl FormatTime for OffsetTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Utc::now().with_timezone(&self.offset);
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

/// Resolve the log directory, relative paths are taken from the working directory
pub fn get_log_directory(config: &LoggingConfig) -> PathBuf {
    if config.directory.is_absolute() {
        config.directory.clone()
    } else {
        std::env::current_dir()
            .unwrap_or_default()
            .join(&config.directory)
    }
}

/// Build the filter: `RUST_LOG` wins, otherwise the configured level with
/// dependency noise capped.
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| anyhow!("Invalid log level '{}': {}", config.level, e))?;

    if !config.level.to_lowercase().contains("trace") {
        for (target, level) in NOISY_TARGETS {
            let directive = format!("{target}={level}")
                .parse()
                .map_err(|e| anyhow!("Invalid log directive for {}: {}", target, e))?;
            filter = filter.add_directive(directive);
        }
    }

    Ok(filter)
}

/// Initialize logging with custom configuration
///
/// The level can be overridden with `RUST_LOG`:
/// ```bash
/// RUST_LOG="debug,reqwest=debug" shelter-crawler
/// ```
pub fn init_logging_with_config(config: LoggingConfig) -> Result<()> {
    let env_filter = build_env_filter(&config)?;
    let registry = Registry::default().with(env_filter);
    let timer = OffsetTimeFormatter::new(config.utc_offset_hours);

    let log_dir = get_log_directory(&config);
    let file_writer = if config.file_output {
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;
        let (writer, guard) = non_blocking(rolling::never(&log_dir, &config.file_name));
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard registry poisoned"))?
            .push(guard);
        Some(writer)
    } else {
        None
    };

    match (file_writer, config.json_format) {
        (Some(writer), true) => {
            let file_layer = fmt::Layer::new()
                .json()
                .with_writer(writer)
                .with_timer(timer)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false);
            registry
                .with(file_layer)
                .with(console_layer(config.console_output, timer))
                .try_init()
                .map_err(|e| anyhow!("Failed to install subscriber: {}", e))?;
        }
        (Some(writer), false) => {
            // time + level + message only
            let file_layer = fmt::Layer::new()
                .with_writer(writer)
                .with_timer(timer)
                .with_target(false)
                .with_ansi(false);
            registry
                .with(file_layer)
                .with(console_layer(config.console_output, timer))
                .try_init()
                .map_err(|e| anyhow!("Failed to install subscriber: {}", e))?;
        }
        (None, _) => {
            if !config.console_output {
                return Err(anyhow!("No logging output configured"));
            }
            registry
                .with(console_layer(true, timer))
                .try_init()
                .map_err(|e| anyhow!("Failed to install subscriber: {}", e))?;
        }
    }

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    if config.file_output {
        info!("Log file: {:?}", log_dir.join(&config.file_name));
    }

    Ok(())
}

/// Console layer; diagnostics go to stderr so stdout stays clean
fn console_layer<S>(enabled: bool, timer: OffsetTimeFormatter) -> Option<impl Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    enabled.then(|| {
        fmt::Layer::new()
            .with_writer(std::io::stderr)
            .with_timer(timer)
            .with_target(false)
    })
}

/// Log build and environment information for diagnostics
pub fn log_system_info(log_dir: &Path) {
    info!("=== Shelter Crawler ===");
    info!("Application version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {}", std::env::consts::OS);
    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {:?}", current_dir);
    }
    info!("Log directory: {:?}", log_dir);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.console_output);
        assert!(config.file_output);
    }

    #[test]
    fn test_relative_log_directory_is_anchored() {
        let config = LoggingConfig::default();
        let dir = get_log_directory(&config);
        assert!(dir.is_absolute() || dir.ends_with("logs"));
        assert!(dir.to_string_lossy().ends_with("logs"));
    }

    #[test]
    fn test_offset_formatter_falls_back_to_utc() {
        let formatter = OffsetTimeFormatter::new(99);
        assert_eq!(formatter.offset.local_minus_utc(), 0);
        assert_eq!(OffsetTimeFormatter::new(3).offset.local_minus_utc(), 3 * 3600);
    }

    #[test]
    fn test_filter_caps_dependency_noise() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let filter = build_env_filter(&LoggingConfig::default()).unwrap().to_string();
        assert!(filter.contains("hyper=warn"));
        assert!(filter.contains("html5ever=warn"));

        let trace = LoggingConfig {
            level: "trace".to_string(),
            ..LoggingConfig::default()
        };
        let filter = build_env_filter(&trace).unwrap().to_string();
        assert!(!filter.contains("hyper=warn"));
    }
}
