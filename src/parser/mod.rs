//! Detail page parsing.
//!
//! [`DetailParser`] turns a fetched detail page into a [`ContentRecord`]. The
//! rest of the pipeline depends only on that trait; [`HegreParser`] is the
//! implementation for the site's current markup, dispatching on the content
//! kind named in the URL path.

mod error;
mod gallery;
mod movie;
mod player;

use std::collections::BTreeSet;

use scraper::{ElementRef, Html, Selector};
use time::Date;
use time::format_description::FormatItem;
use time::macros::format_description;
use url::Url;

pub use error::ParseError;

use crate::listing::kind_from_path;
use crate::model::{ContentKind, ContentRecord, Person};
use crate::selectors::{ABSOLUTE_URL, APPROVED_TAG, COMMENTS_WRAPPER, PUBLISH_DATE, RECORD_MODEL};

/// `January 5, 2024`
const PAGE_DATE: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

/// Maps a fetched detail page to a content record.
pub trait DetailParser: Send + Sync {
    /// Parses `html`, fetched from `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the URL is not a detail page, a required
    /// field is absent, or the page has no downloads.
    fn parse(&self, html: &str, url: &Url) -> Result<ContentRecord, ParseError>;
}

/// Parser for films, massage, sex education and gallery pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct HegreParser;

impl DetailParser for HegreParser {
    fn parse(&self, html: &str, url: &Url) -> Result<ContentRecord, ParseError> {
        let kind = kind_from_path(url).ok_or_else(|| ParseError::UnsupportedUrl {
            url: url.to_string(),
        })?;
        let document = Html::parse_document(html);

        let record = match kind {
            ContentKind::Film | ContentKind::Massage => movie::parse_film_page(&document, url, kind)?,
            ContentKind::SexEd => movie::parse_sexed_page(&document, url)?,
            ContentKind::Gallery => gallery::parse_gallery_page(&document, url)?,
        };

        if record.variants.is_empty() {
            return Err(ParseError::NoDownloads {
                url: url.to_string(),
            });
        }
        Ok(record)
    }
}

/// Returns the URL with its query string removed.
///
/// Accepts a bare URL or a CSS declaration such as
/// `background-image: url('https://...jpg?v=1')`.
pub(crate) fn strip_query(value: &str) -> Option<String> {
    ABSOLUTE_URL
        .captures(value)
        .map(|captures| captures[1].to_string())
}

fn select_first<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    document.select(selector).next()
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn required_text(
    document: &Html,
    selector: &Selector,
    field: &'static str,
) -> Result<String, ParseError> {
    select_first(document, selector)
        .map(text_of)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ParseError::missing(field))
}

fn optional_text(document: &Html, selector: &Selector) -> Option<String> {
    select_first(document, selector)
        .map(text_of)
        .filter(|text| !text.is_empty())
}

fn parse_code(document: &Html) -> Result<u64, ParseError> {
    let raw = select_first(document, &COMMENTS_WRAPPER)
        .and_then(|element| element.value().attr("data-id"))
        .ok_or_else(|| ParseError::missing("code"))?;
    raw.trim()
        .parse()
        .map_err(|_| ParseError::invalid("code", raw))
}

fn parse_publish_date(document: &Html) -> Result<Date, ParseError> {
    let raw = required_text(document, &PUBLISH_DATE, "date")?;
    Date::parse(&raw, PAGE_DATE).map_err(|_| ParseError::invalid("date", raw))
}

/// URL found in an attribute of the first element matching `selector`.
fn attr_url(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    select_first(document, selector)
        .and_then(|element| element.value().attr(attr))
        .and_then(strip_query)
}

fn parse_people(document: &Html, page_url: &Url) -> Vec<Person> {
    document
        .select(&RECORD_MODEL)
        .filter_map(|element| {
            let name = element.value().attr("title")?;
            let href = element.value().attr("href")?;
            let profile = page_url.join(href).ok()?;
            Some(Person::new(name.trim(), profile.as_str()))
        })
        .collect()
}

fn parse_tags(document: &Html) -> BTreeSet<String> {
    document
        .select(&APPROVED_TAG)
        .map(text_of)
        .filter(|tag| !tag.is_empty())
        .map(|tag| title_case(&tag))
        .collect()
}

/// Upper-cases the first letter of every word and lower-cases the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_query_bare_url() {
        assert_eq!(
            strip_query("https://c.hegre.com/a/b-1080p.mp4?v=123").as_deref(),
            Some("https://c.hegre.com/a/b-1080p.mp4")
        );
    }

    #[test]
    fn test_strip_query_from_style() {
        assert_eq!(
            strip_query("background-image: url('https://cdn.hegre.com/cover.jpg?v=9');").as_deref(),
            Some("https://cdn.hegre.com/cover.jpg")
        );
    }

    #[test]
    fn test_strip_query_without_url() {
        assert_eq!(strip_query("display: none"), None);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("oil massage"), "Oil Massage");
        assert_eq!(title_case("FULL-BODY"), "Full-Body");
    }

    #[test]
    fn test_parse_publish_date() {
        let document = Html::parse_document(r#"<span class="date">January 5, 2024</span>"#);
        assert_eq!(
            parse_publish_date(&document).unwrap(),
            Date::from_calendar_date(2024, time::Month::January, 5).unwrap()
        );
    }

    #[test]
    fn test_parse_publish_date_invalid() {
        let document = Html::parse_document(r#"<span class="date">yesterday</span>"#);
        assert_eq!(
            parse_publish_date(&document),
            Err(ParseError::invalid("date", "yesterday"))
        );
    }

    #[test]
    fn test_parse_code_missing() {
        let document = Html::parse_document("<div></div>");
        assert_eq!(parse_code(&document), Err(ParseError::missing("code")));
    }

    #[test]
    fn test_unsupported_url() {
        let url = Url::parse("https://www.hegre.com/models/jane").unwrap();
        let err = HegreParser.parse("<html></html>", &url).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedUrl { .. }));
    }
}
