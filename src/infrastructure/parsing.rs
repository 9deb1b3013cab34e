//! HTML parsing infrastructure
//!
//! Turns fetched bytes into a queryable document and pulls typed fields out
//! of it using a configurable selector table.

pub mod config;
pub mod document;
pub mod error;
pub mod fields;
pub mod rules;

pub use config::{DetailSelectors, ListingSelectors, SelectorConfig};
pub use document::DocumentView;
pub use error::{ParsingError, ParsingResult};
pub use rules::{ExtractionRules, FieldRule};
