//! Compiled form of the selector table
//!
//! Selectors and the phone pattern are compiled once per run and shared by
//! every document the run parses.

#![allow(clippy::uninlined_format_args)]

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::config::SelectorConfig;
use super::{ParsingError, ParsingResult};

/// Ordered fallback selectors for one field
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: &'static str,
    selectors: Vec<Selector>,
}

impl FieldRule {
    /// Compile selector strings, skipping invalid ones as long as one survives
    pub fn compile(field: &'static str, selector_strings: &[String]) -> ParsingResult<Self> {
        let mut selectors = Vec::new();
        let mut errors = Vec::new();

        for selector_str in selector_strings {
            match Selector::parse(selector_str) {
                Ok(selector) => selectors.push(selector),
                Err(e) => {
                    warn!("Failed to compile selector '{}' for {}: {}", selector_str, field, e);
                    errors.push(format!("'{}': {}", selector_str, e));
                }
            }
        }

        if selectors.is_empty() {
            return Err(ParsingError::InvalidSelector {
                field: field.to_string(),
                selector: selector_strings.join(", "),
                reason: if errors.is_empty() {
                    "no selectors configured".to_string()
                } else {
                    errors.join(", ")
                },
            });
        }

        if !errors.is_empty() {
            debug!("Some selectors for {} failed to compile: {}", field, errors.join(", "));
        }

        Ok(Self { field, selectors })
    }

    /// First element in the document matched by the first matching selector
    pub fn first_in<'a>(&self, html: &'a Html) -> Option<ElementRef<'a>> {
        self.selectors
            .iter()
            .find_map(|selector| html.select(selector).next())
    }

    /// First descendant of `scope` matched by the first matching selector
    pub fn first_within<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.selectors
            .iter()
            .find_map(|selector| scope.select(selector).next())
    }

    /// All elements in the document for the first selector that matches anything
    pub fn all_in<'a>(&self, html: &'a Html) -> Vec<ElementRef<'a>> {
        for selector in &self.selectors {
            let found: Vec<ElementRef<'a>> = html.select(selector).collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// All descendants of `scope` for the first selector that matches anything
    pub fn all_within<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        for selector in &self.selectors {
            let found: Vec<ElementRef<'a>> = scope.select(selector).collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }
}

/// Compiled selector table for detail and listing pages
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    pub name: FieldRule,
    pub gender: FieldRule,
    pub short_description: FieldRule,
    pub full_description: FieldRule,
    pub phone_anchor: FieldRule,
    pub main_image_link: FieldRule,
    pub gallery: FieldRule,
    pub gallery_link: FieldRule,
    pub listing_card: FieldRule,
    pub card_link: FieldRule,
    pub phone_pattern: Regex,
    pub full_description_strip_chars: usize,
}

impl ExtractionRules {
    /// Compile the whole table; fails on the first field with no usable selector
    pub fn compile(config: &SelectorConfig) -> ParsingResult<Self> {
        let phone_pattern = Regex::new(&config.phone_pattern).map_err(|e| ParsingError::InvalidPattern {
            pattern: config.phone_pattern.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            name: FieldRule::compile("name", &config.detail.name)?,
            gender: FieldRule::compile("gender", &config.detail.gender)?,
            short_description: FieldRule::compile("short_description", &config.detail.short_description)?,
            full_description: FieldRule::compile("full_description", &config.detail.full_description)?,
            phone_anchor: FieldRule::compile("phone_anchor", &config.detail.phone_anchor)?,
            main_image_link: FieldRule::compile("main_image_link", &config.detail.main_image_link)?,
            gallery: FieldRule::compile("gallery", &config.detail.gallery)?,
            gallery_link: FieldRule::compile("gallery_link", &config.detail.gallery_link)?,
            listing_card: FieldRule::compile("listing_card", &config.listing.card)?,
            card_link: FieldRule::compile("card_link", &config.listing.card_link)?,
            phone_pattern,
            full_description_strip_chars: config.full_description_strip_chars,
        })
    }
}
