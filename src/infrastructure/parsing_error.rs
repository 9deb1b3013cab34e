//! Parsing error types for HTML extraction
//!
//! Every variant carries enough context (URL, field, selector) to diagnose a
//! skipped page or item from the log alone.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("HTML parsing failed: {message}")]
    HtmlParsingFailed { message: String, url: Option<String> },

    #[error("Required field '{field}' not found in HTML")]
    RequiredFieldMissing { field: String, context: Option<String> },

    #[error("Invalid CSS selector for '{field}': {selector} - {reason}")]
    InvalidSelector {
        field: String,
        selector: String,
        reason: String,
    },

    #[error("Invalid pattern: {pattern} - {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("URL resolution failed: {url} - {reason}")]
    UrlResolutionFailed { url: String, reason: String },
}

impl ParsingError {
    /// Create a required field missing error with context
    pub fn required_field_missing(field: &str, context: Option<&str>) -> Self {
        Self::RequiredFieldMissing {
            field: field.to_string(),
            context: context.map(ToString::to_string),
        }
    }

    /// Create an unparseable document error
    pub fn html_parsing_failed(message: impl Into<String>, url: Option<&str>) -> Self {
        Self::HtmlParsingFailed {
            message: message.into(),
            url: url.map(ToString::to_string),
        }
    }

    /// True for a missing structural marker, which callers may tolerate
    pub fn is_field_missing(&self) -> bool {
        matches!(self, Self::RequiredFieldMissing { .. })
    }

    /// Name of the missing field, if this is a field-missing error
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::RequiredFieldMissing { field, .. } | Self::InvalidSelector { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_missing_message_names_field() {
        let err = ParsingError::required_field_missing("name", Some("https://izpriuta.ru/koshki/tom"));
        assert!(err.is_field_missing());
        assert_eq!(err.field(), Some("name"));
        assert_eq!(err.to_string(), "Required field 'name' not found in HTML");
    }

    #[test]
    fn test_parse_failure_is_not_field_missing() {
        let err = ParsingError::html_parsing_failed("empty document", None);
        assert!(!err.is_field_missing());
        assert_eq!(err.field(), None);
    }
}
