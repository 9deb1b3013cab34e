//! Field extractors over a parsed document
//!
//! Each lookup fails independently with `RequiredFieldMissing` when its
//! structural marker is absent; callers decide whether that is fatal.

#![allow(clippy::uninlined_format_args)]

use scraper::ElementRef;
use tracing::{debug, warn};

use super::document::DocumentView;
use super::rules::{ExtractionRules, FieldRule};
use super::{ParsingError, ParsingResult};

/// Concatenated descendant text, trimmed
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Remove `count` leading characters (not bytes)
pub fn strip_leading_chars(text: &str, count: usize) -> String {
    text.chars().skip(count).collect()
}

fn first_text(doc: &DocumentView, rule: &FieldRule) -> ParsingResult<String> {
    let element = rule
        .first_in(doc.html())
        .ok_or_else(|| ParsingError::required_field_missing(rule.field, Some(doc.source())))?;
    let text = element_text(element);
    debug!("Extracted {} from {}: {}", rule.field, doc.source(), text);
    Ok(text)
}

pub fn name(doc: &DocumentView, rules: &ExtractionRules) -> ParsingResult<String> {
    first_text(doc, &rules.name)
}

pub fn gender(doc: &DocumentView, rules: &ExtractionRules) -> ParsingResult<String> {
    first_text(doc, &rules.gender)
}

pub fn short_description(doc: &DocumentView, rules: &ExtractionRules) -> ParsingResult<String> {
    first_text(doc, &rules.short_description)
}

/// Trimmed text with the leading decorative glyph removed
pub fn full_description(doc: &DocumentView, rules: &ExtractionRules) -> ParsingResult<String> {
    let text = first_text(doc, &rules.full_description)?;
    Ok(strip_leading_chars(&text, rules.full_description_strip_chars))
}

/// Numbers found in the text of the phone anchor's parent, in document order.
/// An anchor without any matching number yields an empty list.
pub fn phone_numbers(doc: &DocumentView, rules: &ExtractionRules) -> ParsingResult<Vec<String>> {
    let anchor = rules
        .phone_anchor
        .first_in(doc.html())
        .ok_or_else(|| ParsingError::required_field_missing(rules.phone_anchor.field, Some(doc.source())))?;

    let container = anchor.parent().and_then(ElementRef::wrap).unwrap_or(anchor);
    let text: String = container.text().collect();

    let phones: Vec<String> = rules
        .phone_pattern
        .find_iter(&text)
        .map(|m| m.as_str().to_string())
        .collect();

    if phones.is_empty() {
        debug!("No phone numbers near the phone anchor on {}", doc.source());
    }
    Ok(phones)
}

/// Main image link first (when present), then every gallery link with an
/// `href`, in document order. Duplicates are kept.
pub fn image_references(doc: &DocumentView, rules: &ExtractionRules) -> ParsingResult<Vec<String>> {
    let mut images = Vec::new();

    match rules
        .main_image_link
        .first_in(doc.html())
        .and_then(|link| link.value().attr("href"))
    {
        Some(href) => images.push(href.to_string()),
        None => warn!("Couldn't find main photo on {}", doc.source()),
    }

    let gallery = rules
        .gallery
        .first_in(doc.html())
        .ok_or_else(|| ParsingError::required_field_missing(rules.gallery.field, Some(doc.source())))?;

    images.extend(
        rules
            .gallery_link
            .all_within(gallery)
            .into_iter()
            .filter_map(|link| link.value().attr("href"))
            .map(ToString::to_string),
    );

    Ok(images)
}

/// Detail links of every listing card, in document order. Cards without a
/// link are logged and skipped.
pub fn item_links(doc: &DocumentView, rules: &ExtractionRules) -> Vec<String> {
    let cards = rules.listing_card.all_in(doc.html());
    if cards.is_empty() {
        warn!("No listing cards found on {}", doc.source());
        return Vec::new();
    }

    let mut links = Vec::with_capacity(cards.len());
    for (index, card) in cards.into_iter().enumerate() {
        match rules
            .card_link
            .first_within(card)
            .and_then(|link| link.value().attr("href"))
        {
            Some(href) => links.push(href.to_string()),
            None => warn!("Couldn't find ref to item page in card {} on {}", index, doc.source()),
        }
    }

    debug!("Found {} item links on {}", links.len(), doc.source());
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parsing::SelectorConfig;
    use rstest::rstest;

    const DETAIL: &str = r#"
        <html><body>
          <h1 class="pitomec title"> Fluffy </h1>
          <span class="gender">female</span>
          <p class="fadeInUp wow">Calm and gentle</p>
          <div class="cs12">✿Loves naps</div>
          <div class="contacts">
            <i class="circle fa fa-phone"></i>
            Call: +7 912 345 67 89 or +7 495 123 45 67, ask for Anna
          </div>
          <div class="img-wrap"><a href="/img/main.jpg"><img src="/img/main-s.jpg"></a></div>
          <div class="foto">
            <a href="/img/1.jpg">1</a>
            <a>no href</a>
            <a href="/img/2.jpg">2</a>
            <a href="/img/1.jpg">again</a>
          </div>
        </body></html>
    "#;

    fn rules() -> ExtractionRules {
        ExtractionRules::compile(&SelectorConfig::default()).unwrap()
    }

    fn doc(html: &str) -> DocumentView {
        DocumentView::parse_str(html, "https://izpriuta.ru/koshki/fluffy").unwrap()
    }

    #[test]
    fn test_text_fields_are_trimmed() {
        let doc = doc(DETAIL);
        let rules = rules();
        assert_eq!(name(&doc, &rules).unwrap(), "Fluffy");
        assert_eq!(gender(&doc, &rules).unwrap(), "female");
        assert_eq!(short_description(&doc, &rules).unwrap(), "Calm and gentle");
    }

    #[test]
    fn test_full_description_strips_one_leading_glyph() {
        assert_eq!(full_description(&doc(DETAIL), &rules()).unwrap(), "Loves naps");
    }

    #[rstest]
    #[case("<div class=\"cs12\">\n  ✿Loves naps</div>", "Loves naps")]
    #[case("<div class=\"cs12\">-Loves  naps </div>", "Loves  naps")]
    #[case("<div class=\"cs12\">•</div>", "")]
    #[case("<div class=\"cs12\"></div>", "")]
    fn test_full_description_variants(#[case] html: &str, #[case] expected: &str) {
        assert_eq!(full_description(&doc(html), &rules()).unwrap(), expected);
    }

    #[test]
    fn test_missing_name_marker_is_field_missing() {
        let err = name(&doc("<div class=\"gender\">male</div>"), &rules()).unwrap_err();
        assert!(err.is_field_missing());
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn test_phone_numbers_in_document_order() {
        let phones = phone_numbers(&doc(DETAIL), &rules()).unwrap();
        assert_eq!(phones, vec!["+7 912 345 67 89", "+7 495 123 45 67"]);
    }

    #[rstest]
    #[case("+7 912 345 67 89", true)]
    #[case("+ 7 912 345 67 89", true)]
    #[case("+7  912  345 67 89", true)]
    #[case("8 912 345 67 89", false)]
    #[case("+7 912 345 6789", false)]
    fn test_phone_pattern_spacing(#[case] text: &str, #[case] matches: bool) {
        let html = format!("<p><i class=\"circle fa fa-phone\"></i>{text}</p>");
        let phones = phone_numbers(&doc(&html), &rules()).unwrap();
        assert_eq!(!phones.is_empty(), matches);
    }

    #[test]
    fn test_anchor_without_numbers_yields_empty_list() {
        let html = "<p><i class=\"circle fa fa-phone\"></i>Write to us by email</p>";
        assert!(phone_numbers(&doc(html), &rules()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_phone_anchor_is_field_missing() {
        let err = phone_numbers(&doc("<p>+7 912 345 67 89</p>"), &rules()).unwrap_err();
        assert!(err.is_field_missing());
    }

    #[test]
    fn test_images_main_first_then_gallery_with_duplicates() {
        let images = image_references(&doc(DETAIL), &rules()).unwrap();
        assert_eq!(images, vec!["/img/main.jpg", "/img/1.jpg", "/img/2.jpg", "/img/1.jpg"]);
    }

    #[test]
    fn test_missing_main_image_is_not_fatal() {
        let html = r#"<div class="foto"><a href="/img/1.jpg"></a></div>"#;
        assert_eq!(image_references(&doc(html), &rules()).unwrap(), vec!["/img/1.jpg"]);
    }

    #[test]
    fn test_missing_gallery_is_field_missing() {
        let html = r#"<div class="img-wrap"><a href="/img/main.jpg"></a></div>"#;
        let err = image_references(&doc(html), &rules()).unwrap_err();
        assert_eq!(err.field(), Some("gallery"));
    }

    #[test]
    fn test_item_links_skip_cards_without_link() {
        let html = r#"
            <div class="card box"><a href="/koshki/tom">Tom</a></div>
            <div class="card box"><span>no link</span></div>
            <div class="card box"><a>no href</a></div>
            <div class="card box"><a href="/koshki/mia">Mia</a></div>
        "#;
        assert_eq!(item_links(&doc(html), &rules()), vec!["/koshki/tom", "/koshki/mia"]);
    }

    #[test]
    fn test_item_links_empty_without_cards() {
        assert!(item_links(&doc("<div class=\"card\">x</div>"), &rules()).is_empty());
    }

    #[test]
    fn test_strip_leading_chars_counts_characters() {
        assert_eq!(strip_leading_chars("✿abc", 1), "abc");
        assert_eq!(strip_leading_chars("ab", 5), "");
        assert_eq!(strip_leading_chars("abc", 0), "abc");
    }
}
