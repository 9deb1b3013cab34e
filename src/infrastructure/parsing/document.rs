//! Parsed document handle
//!
//! `DocumentView` only owns the parsed tree and where it came from. Field
//! lookups live in [`super::fields`] as free functions over the handle and a
//! compiled rule table; the methods here are thin conveniences over them.

use scraper::Html;
use std::borrow::Cow;
use tracing::warn;

use super::fields;
use super::rules::ExtractionRules;
use super::{ParsingError, ParsingResult};

/// A parsed HTML document plus its source URL for diagnostics
#[derive(Debug)]
pub struct DocumentView {
    html: Html,
    source: String,
    lossy_decoding: bool,
}

impl DocumentView {
    /// Parse raw bytes. Invalid UTF-8 sequences are replaced rather than
    /// rejected; fails only when the body is empty or contains no markup.
    pub fn parse(bytes: &[u8], source: &str) -> ParsingResult<Self> {
        let (text, lossy) = decode_body(bytes);
        if lossy {
            warn!("Document {} is not valid UTF-8, decoded with replacement characters", source);
        }
        let mut doc = Self::parse_str(&text, source)?;
        doc.lossy_decoding = lossy;
        Ok(doc)
    }

    pub fn parse_str(text: &str, source: &str) -> ParsingResult<Self> {
        if text.trim().is_empty() {
            return Err(ParsingError::html_parsing_failed("document is empty", Some(source)));
        }
        if !text.contains('<') {
            return Err(ParsingError::html_parsing_failed("document contains no markup", Some(source)));
        }

        Ok(Self {
            html: Html::parse_document(text),
            source: source.to_string(),
            lossy_decoding: false,
        })
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// URL (or file name) the document was read from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when invalid UTF-8 had to be replaced while decoding
    pub fn lossy_decoding(&self) -> bool {
        self.lossy_decoding
    }

    pub fn name(&self, rules: &ExtractionRules) -> ParsingResult<String> {
        fields::name(self, rules)
    }

    pub fn gender(&self, rules: &ExtractionRules) -> ParsingResult<String> {
        fields::gender(self, rules)
    }

    pub fn short_description(&self, rules: &ExtractionRules) -> ParsingResult<String> {
        fields::short_description(self, rules)
    }

    pub fn full_description(&self, rules: &ExtractionRules) -> ParsingResult<String> {
        fields::full_description(self, rules)
    }

    pub fn phone_numbers(&self, rules: &ExtractionRules) -> ParsingResult<Vec<String>> {
        fields::phone_numbers(self, rules)
    }

    pub fn image_references(&self, rules: &ExtractionRules) -> ParsingResult<Vec<String>> {
        fields::image_references(self, rules)
    }

    pub fn item_links(&self, rules: &ExtractionRules) -> Vec<String> {
        fields::item_links(self, rules)
    }
}

fn decode_body(bytes: &[u8]) -> (Cow<'_, str>, bool) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (Cow::Borrowed(text), false),
        Err(_) => (String::from_utf8_lossy(bytes), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty(b"".as_slice())]
    #[case::whitespace(b"   \n\t ".as_slice())]
    #[case::plain_text(b"Service temporarily unavailable".as_slice())]
    #[case::not_utf8_without_markup(&[0xff, 0xfe, 0x20, 0x70][..])]
    fn test_unparseable_bytes_are_rejected(#[case] bytes: &[u8]) {
        let err = DocumentView::parse(bytes, "https://izpriuta.ru/koshki/tom").unwrap_err();
        assert!(matches!(err, ParsingError::HtmlParsingFailed { .. }));
        assert!(!err.is_field_missing());
    }

    #[test]
    fn test_single_byte_encoding_is_decoded_lossily() {
        let rules = ExtractionRules::compile(&crate::infrastructure::parsing::SelectorConfig::default()).unwrap();
        // "Мурка" in windows-1251
        let mut bytes = b"<h1 class=\"pitomec title\">".to_vec();
        bytes.extend_from_slice(&[0xcc, 0xf3, 0xf0, 0xea, 0xe0]);
        bytes.extend_from_slice(b"</h1>");

        let doc = DocumentView::parse(&bytes, "https://izpriuta.ru/koshki/murka").unwrap();
        assert!(doc.lossy_decoding());
        let name = doc.name(&rules).unwrap();
        assert!(!name.is_empty());
        assert!(name.chars().all(|c| c == char::REPLACEMENT_CHARACTER));
    }

    #[test]
    fn test_utf8_document_is_not_lossy() {
        let doc = DocumentView::parse("<p>Мурка</p>".as_bytes(), "page0").unwrap();
        assert!(!doc.lossy_decoding());
    }

    #[test]
    fn test_parse_keeps_source() {
        let doc = DocumentView::parse(b"<p>hi</p>", "page0").unwrap();
        assert_eq!(doc.source(), "page0");
        assert!(doc.html().root_element().text().any(|t| t == "hi"));
    }
}
