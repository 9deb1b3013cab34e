//! HTTP fetching for crawl runs
//!
//! A `Fetcher` performs exactly one round trip per call and never retries;
//! retry policy, if any, belongs to the caller. `StagedFetcher` optionally
//! routes every document through a staging directory on disk.

#![allow(clippy::uninlined_format_args)]

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::infrastructure::config::{HttpConfig, StagingConfig};

/// Transport failures. The walker only needs to know that a fetch failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("HTTP request failed for {url}: {message}")]
    Request { url: String, message: String },

    #[error("HTTP error {status}: {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read response body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("Empty response from {url}")]
    EmptyBody { url: String },

    #[error("Staging failed for {path}: {message}")]
    Staging { path: String, message: String },

    #[error("HTTP client setup failed: {message}")]
    Setup { message: String },
}

/// Retrieves a document as raw bytes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|e| TransportError::Setup {
                message: format!("Invalid user agent: {}", e),
            })?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| TransportError::Setup {
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        info!("🌐 HTTP GET: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // text() honours the Content-Type charset, so the body handed on is UTF-8
        let body = response.text().await.map_err(|e| TransportError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        if body.is_empty() {
            return Err(TransportError::EmptyBody { url: url.to_string() });
        }

        debug!("Fetched {} bytes from {} ({})", body.len(), url, status);
        Ok(body.into_bytes())
    }
}

/// Writes each fetched document into a staging directory, reads it back and
/// removes it unless `keep_files` is set.
pub struct StagedFetcher<F> {
    inner: F,
    directory: PathBuf,
    keep_files: bool,
}

impl<F: Fetcher> StagedFetcher<F> {
    pub fn new(inner: F, config: &StagingConfig) -> Self {
        Self {
            inner,
            directory: config.directory.clone(),
            keep_files: config.keep_files,
        }
    }

    /// File name for a URL: path and query with separators flattened
    pub fn staging_path(&self, url: &str) -> PathBuf {
        self.directory.join(staging_file_name(url))
    }

    async fn remove(path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            warn!("Failed to remove staged file {:?}: {}", path, e);
        }
    }
}

/// `https://host/koshki/?page=3` -> `page_koshki_page_3.html`
pub fn staging_file_name(url: &str) -> String {
    let tail = url
        .split_once("://")
        .map_or(url, |(_, rest)| rest.split_once('/').map_or("", |(_, path)| path));

    let mut name: String = tail
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    while name.contains("__") {
        name = name.replace("__", "_");
    }
    let name = name.trim_matches('_');

    if name.is_empty() {
        "page_index.html".to_string()
    } else {
        format!("page_{}.html", name)
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for StagedFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let body = self.inner.fetch(url).await?;
        let path = self.staging_path(url);
        let staging_error = |e: std::io::Error| TransportError::Staging {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        fs::create_dir_all(&self.directory).await.map_err(staging_error)?;
        if let Err(e) = fs::write(&path, &body).await {
            Self::remove(&path).await;
            return Err(staging_error(e));
        }

        let read_back = fs::read(&path).await.map_err(staging_error);
        if !self.keep_files {
            Self::remove(&path).await;
        }

        debug!("Staged {} through {:?}", url, path);
        read_back
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::tempdir;

    struct StaticFetcher(&'static str);

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, TransportError> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    #[test]
    fn test_client_creation() {
        assert!(HttpFetcher::new(&HttpConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_user_agent_is_setup_error() {
        let config = HttpConfig {
            user_agent: "bad\nagent".to_string(),
            ..HttpConfig::default()
        };
        assert!(matches!(HttpFetcher::new(&config), Err(TransportError::Setup { .. })));
    }

    #[rstest]
    #[case("https://izpriuta.ru/koshki/?page=3", "page_koshki_page_3.html")]
    #[case("https://izpriuta.ru/koshki/fluffy", "page_koshki_fluffy.html")]
    #[case("https://izpriuta.ru/", "page_index.html")]
    #[case("https://izpriuta.ru", "page_index.html")]
    fn test_staging_file_name(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(staging_file_name(url), expected);
    }

    #[tokio::test]
    async fn test_staged_fetch_removes_file() {
        let dir = tempdir().unwrap();
        let config = StagingConfig {
            enabled: true,
            directory: dir.path().join("data"),
            keep_files: false,
        };
        let fetcher = StagedFetcher::new(StaticFetcher("<p>cat</p>"), &config);

        let body = fetcher.fetch("https://izpriuta.ru/koshki/tom").await.unwrap();
        assert_eq!(body, b"<p>cat</p>");
        assert!(!fetcher.staging_path("https://izpriuta.ru/koshki/tom").exists());
    }

    #[tokio::test]
    async fn test_failed_staging_write_leaves_no_file() {
        let dir = tempdir().unwrap();
        let config = StagingConfig {
            enabled: true,
            directory: dir.path().to_path_buf(),
            keep_files: true,
        };
        let fetcher = StagedFetcher::new(StaticFetcher("<p>cat</p>"), &config);
        let url = "https://izpriuta.ru/koshki/tom";
        // A directory squatting on the staged file name makes the write fail
        let staged = fetcher.staging_path(url);
        std::fs::create_dir(&staged).unwrap();

        let err = fetcher.fetch(url).await.unwrap_err();
        assert!(matches!(err, TransportError::Staging { .. }));
        assert!(!staged.is_file());
    }

    #[tokio::test]
    async fn test_staged_fetch_can_keep_file() {
        let dir = tempdir().unwrap();
        let config = StagingConfig {
            enabled: true,
            directory: dir.path().to_path_buf(),
            keep_files: true,
        };
        let fetcher = StagedFetcher::new(StaticFetcher("<p>cat</p>"), &config);

        fetcher.fetch("https://izpriuta.ru/koshki/tom").await.unwrap();
        let staged = fetcher.staging_path("https://izpriuta.ru/koshki/tom");
        assert_eq!(std::fs::read_to_string(staged).unwrap(), "<p>cat</p>");
    }
}
