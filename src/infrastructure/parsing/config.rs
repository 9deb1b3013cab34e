//! Selector configuration for HTML extraction
//!
//! Maps every extracted field to an ordered list of CSS selectors. The first
//! selector that matches wins, so a markup change on the target site is a
//! configuration change rather than a code change.

use serde::{Deserialize, Serialize};

/// Field -> selector-rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Detail page selectors
    pub detail: DetailSelectors,

    /// Listing page selectors
    pub listing: ListingSelectors,

    /// Phone number pattern applied to the text around the phone anchor
    pub phone_pattern: String,

    /// Characters removed from the start of the full description
    pub full_description_strip_chars: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            detail: DetailSelectors::default(),
            listing: ListingSelectors::default(),
            phone_pattern: r"\+\s?7\s+[0-9]{3}\s+[0-9]{3}\s+[0-9]{2}\s+[0-9]{2}".to_string(),
            full_description_strip_chars: 1,
        }
    }
}

/// CSS selectors for detail pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailSelectors {
    pub name: Vec<String>,
    pub gender: Vec<String>,
    pub short_description: Vec<String>,
    pub full_description: Vec<String>,

    /// Empty marker element whose parent holds the phone numbers
    pub phone_anchor: Vec<String>,

    /// Link wrapping the main photo
    pub main_image_link: Vec<String>,

    /// Gallery container
    pub gallery: Vec<String>,

    /// Links inside the gallery container
    pub gallery_link: Vec<String>,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            name: vec![".pitomec.title".to_string()],
            gender: vec![".gender".to_string()],
            short_description: vec![".fadeInUp.wow".to_string()],
            full_description: vec![".cs12".to_string()],
            phone_anchor: vec![".circle.fa.fa-phone".to_string()],
            main_image_link: vec![".img-wrap a".to_string()],
            gallery: vec![".foto".to_string()],
            gallery_link: vec!["a".to_string()],
        }
    }
}

/// CSS selectors for listing pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    /// One element per listed animal
    pub card: Vec<String>,

    /// Detail link inside a card
    pub card_link: Vec<String>,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            card: vec![".card.box".to_string()],
            card_link: vec!["a".to_string()],
        }
    }
}
