//! Parsing error re-export
//!
//! Keeps `parsing::ParsingError` as the import path used by callers.

pub use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
