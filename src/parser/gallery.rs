//! Photo gallery pages.

use scraper::Html;
use tracing::debug;
use url::Url;

use super::{
    ParseError, attr_url, parse_code, parse_people, parse_publish_date, parse_tags, required_text,
    strip_query,
};
use crate::model::{ContentKind, ContentRecord};
use crate::selectors::{GALLERY_COVER, GALLERY_TITLE, GALLERY_WIDTH, GALLERY_ZIP};

/// Gallery archives are offered per image width (`...-6000px.zip`); the width
/// is used as the variant key.
pub(super) fn parse_gallery_page(document: &Html, url: &Url) -> Result<ContentRecord, ParseError> {
    let title = required_text(document, &GALLERY_TITLE, "title")?;
    let code = parse_code(document)?;

    let mut record = ContentRecord::new(url.as_str(), ContentKind::Gallery, code, title);
    record.publish_date = Some(parse_publish_date(document)?);
    record.related_people = parse_people(document, url);
    record.tags = parse_tags(document);
    record.cover_url = attr_url(document, &GALLERY_COVER, "style");

    for link in document.select(&GALLERY_ZIP) {
        let Some(zip) = link.value().attr("href").and_then(strip_query) else {
            continue;
        };
        let Some(width) = GALLERY_WIDTH
            .captures(&zip)
            .and_then(|captures| captures[1].parse::<u32>().ok())
        else {
            debug!(url = %zip, "skipping gallery archive without width");
            continue;
        };
        record.variants.entry(width).or_insert(zip);
    }

    Ok(record)
}
