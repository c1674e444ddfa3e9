//! Discovered items and parsed content records.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};
use time::Date;
use time::format_description::FormatItem;
use time::macros::format_description;

use super::ContentKind;

/// ISO-8601 calendar date, used in the metadata sidecar.
const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Dotted date used as the filename prefix (`2024.01.31`).
const FILENAME_DATE: &[FormatItem<'static>] = format_description!("[year].[month].[day]");

/// An item known only by its page URL and kind.
///
/// Produced by URL classification and by listing crawls. `code` is filled in
/// when the listing markup exposes it, which lets the archive be consulted
/// before the detail page is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemRef {
    /// Absolute detail page URL.
    pub url: String,
    /// Kind derived from the URL path.
    pub kind: ContentKind,
    /// Numeric item code, when known before the detail page is fetched.
    pub code: Option<u64>,
}

impl ItemRef {
    /// Creates a reference without a known code.
    #[must_use]
    pub fn new(url: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            url: url.into(),
            kind,
            code: None,
        }
    }

    /// Sets the item code.
    #[must_use]
    pub fn with_code(mut self, code: u64) -> Self {
        self.code = Some(code);
        self
    }

    /// Archive key, available only when the code is already known.
    #[must_use]
    pub fn archive_key(&self) -> Option<String> {
        self.code.map(|code| archive_key(self.kind, code))
    }
}

/// A model credited on a film or gallery page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    /// Display name.
    pub name: String,
    /// Absolute profile page URL.
    pub profile_url: String,
}

impl Person {
    /// Creates a person entry.
    #[must_use]
    pub fn new(name: impl Into<String>, profile_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profile_url: profile_url.into(),
        }
    }
}

/// A fully parsed downloadable item.
///
/// Records are built once by a [`DetailParser`](crate::parser::DetailParser)
/// and never mutated afterwards; fetching the page again produces a new
/// record. `variants` is never empty: a page without download links is a
/// parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentRecord {
    pub url: String,
    pub kind: ContentKind,
    pub code: u64,
    pub title: String,
    #[serde(rename = "date", serialize_with = "serialize_iso_date")]
    pub publish_date: Option<Date>,
    /// Running time in seconds (movies only).
    pub duration: Option<u64>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub tags: BTreeSet<String>,
    pub related_people: Vec<Person>,
    /// Resolution in pixels to download URL.
    pub variants: BTreeMap<u32, String>,
    /// Lower-cased language label to subtitle URL.
    pub subtitles: BTreeMap<String, String>,
    /// Resolution in pixels to trailer URL.
    pub trailer_variants: BTreeMap<u32, String>,
    pub screengrab_url: Option<String>,
}

impl ContentRecord {
    /// Creates a record with the identifying fields set and everything else empty.
    #[must_use]
    pub fn new(url: impl Into<String>, kind: ContentKind, code: u64, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind,
            code,
            title: title.into(),
            publish_date: None,
            duration: None,
            description: None,
            cover_url: None,
            tags: BTreeSet::new(),
            related_people: Vec::new(),
            variants: BTreeMap::new(),
            subtitles: BTreeMap::new(),
            trailer_variants: BTreeMap::new(),
            screengrab_url: None,
        }
    }

    /// Archive key in the form `"<kind-slug> <code>"`.
    #[must_use]
    pub fn archive_key(&self) -> String {
        archive_key(self.kind, self.code)
    }

    /// Prefix shared by every file written for this record.
    ///
    /// `2024.01.31-1234` for dated items, `1234` for items without a date.
    #[must_use]
    pub fn filename_prefix(&self) -> String {
        match self.publish_date.and_then(|date| date.format(FILENAME_DATE).ok()) {
            Some(date) => format!("{date}-{}", self.code),
            None => self.code.to_string(),
        }
    }

    /// Subtitle URLs whose language label is in `languages`.
    ///
    /// Matching is case-insensitive. Unknown languages are ignored.
    #[must_use]
    pub fn subtitle_urls(&self, languages: &[String]) -> Vec<(&str, &str)> {
        self.subtitles
            .iter()
            .filter(|(label, _)| {
                languages
                    .iter()
                    .any(|language| language.eq_ignore_ascii_case(label))
            })
            .map(|(label, url)| (label.as_str(), url.as_str()))
            .collect()
    }
}

impl fmt::Display for ContentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.publish_date.and_then(|date| date.format(ISO_DATE).ok()) {
            Some(date) => write!(f, "{date} {} [{}]", self.title, self.code),
            None => write!(f, "{} [{}]", self.title, self.code),
        }
    }
}

fn archive_key(kind: ContentKind, code: u64) -> String {
    format!("{kind} {code}")
}

fn serialize_iso_date<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(date) => {
            let formatted = date.format(ISO_DATE).map_err(serde::ser::Error::custom)?;
            serializer.serialize_some(&formatted)
        }
        None => serializer.serialize_none(),
    }
}
