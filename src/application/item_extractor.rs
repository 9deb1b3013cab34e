//! Detail page extraction
//!
//! Turns one detail-page link into a `Record`: resolve the URL, derive the
//! identifier, fetch, parse and run the field extractors. Required fields
//! abort the item; phones and images degrade to empty lists.

#![allow(clippy::uninlined_format_args)]

use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::application::errors::ItemError;
use crate::domain::Record;
use crate::infrastructure::{DocumentView, ExtractionRules, Fetcher, ParsingError, ParsingResult};

pub struct ItemExtractor {
    fetcher: Arc<dyn Fetcher>,
    rules: Arc<ExtractionRules>,
    listing_path_prefix: String,
}

impl ItemExtractor {
    pub fn new(fetcher: Arc<dyn Fetcher>, rules: Arc<ExtractionRules>, listing_path_prefix: impl Into<String>) -> Self {
        Self {
            fetcher,
            rules,
            listing_path_prefix: listing_path_prefix.into(),
        }
    }

    pub async fn extract_item(&self, base_url: &str, relative_url: &str) -> Result<Record, ItemError> {
        let detail_url = resolve_url(base_url, relative_url)?;
        let id_name = derive_identifier(relative_url, &detail_url, &self.listing_path_prefix)?;

        debug!("🔍 Extracting {} from {}", id_name, detail_url);
        let body = self.fetcher.fetch(detail_url.as_str()).await?;

        // The parsed document never lives across an await
        self.build_record(id_name, &body, detail_url.as_str())
            .map_err(ItemError::from)
    }

    /// Parse a fetched detail document and assemble the record
    pub fn build_record(&self, id_name: String, body: &[u8], source: &str) -> ParsingResult<Record> {
        let doc = DocumentView::parse(body, source)?;
        let rules = self.rules.as_ref();

        let name = doc.name(rules)?;
        let gender = doc.gender(rules)?;
        let short_description = doc.short_description(rules)?;
        let full_description = doc.full_description(rules)?;

        let phones = doc.phone_numbers(rules).unwrap_or_else(|e| {
            warn!("Couldn't find phone for {}: {}", id_name, e);
            Vec::new()
        });
        let images = doc.image_references(rules).unwrap_or_else(|e| {
            warn!("Couldn't find photos for {}: {}", id_name, e);
            Vec::new()
        });

        Ok(Record {
            id_name,
            name,
            gender,
            short_description,
            full_description,
            phones,
            images,
        })
    }
}

/// Join a detail link onto the site root
pub fn resolve_url(base_url: &str, relative_url: &str) -> ParsingResult<Url> {
    let resolution_failed = |reason: String| ParsingError::UrlResolutionFailed {
        url: relative_url.to_string(),
        reason,
    };
    let base = Url::parse(base_url).map_err(|e| resolution_failed(format!("invalid base URL {}: {}", base_url, e)))?;
    base.join(relative_url).map_err(|e| resolution_failed(e.to_string()))
}

/// Identifier for a detail link: the link with the listing prefix removed,
/// falling back to the last non-empty path segment of the resolved URL.
pub fn derive_identifier(relative_url: &str, detail_url: &Url, listing_path_prefix: &str) -> ParsingResult<String> {
    if let Some(rest) = relative_url
        .strip_prefix(listing_path_prefix)
        .filter(|rest| !rest.is_empty())
    {
        return Ok(rest.to_string());
    }

    if let Some(rest) = detail_url
        .path()
        .strip_prefix(listing_path_prefix)
        .filter(|rest| !rest.is_empty())
    {
        return Ok(rest.to_string());
    }

    detail_url
        .path_segments()
        .and_then(|segments| segments.filter(|segment| !segment.is_empty()).last())
        .map(ToString::to_string)
        .ok_or_else(|| ParsingError::UrlResolutionFailed {
            url: detail_url.to_string(),
            reason: "no path segment to derive an identifier from".to_string(),
        })
}
