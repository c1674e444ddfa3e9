//! Films, massage and sex education pages.

use std::collections::BTreeMap;

use scraper::Html;
use tracing::debug;
use url::Url;

use super::player::{PlayerMedia, parse_player_script};
use super::{
    ParseError, attr_url, optional_text, parse_code, parse_people, parse_publish_date, parse_tags,
    required_text, select_first, strip_query, text_of,
};
use crate::model::{ContentKind, ContentRecord, duration_to_seconds};
use crate::selectors::{
    FILM_PLAYER_SCRIPT, FILM_TITLE, FORMAT_DETAILS, MASSAGE_COPY, RESOLUTION_LABEL,
    SEXED_DURATION, SEXED_INTRO, SEXED_PLAYER_SCRIPT, SEXED_TITLE, SEXED_VARIANT_SUFFIX, STRONG,
    TRAILER_LINK, VIDEO_PLAYER_WRAPPER, VIDEO_STILLS_LINK,
};

const DURATION_DELIMITER: &str = ":";
const CONTENT_HOST: &str = "c.hegre.com";
const PREVIEW_HOST: &str = "p.hegre.com";

pub(super) fn parse_film_page(
    document: &Html,
    url: &Url,
    kind: ContentKind,
) -> Result<ContentRecord, ParseError> {
    let title = required_text(document, &FILM_TITLE, "title")?;
    let code = parse_code(document)?;

    let mut record = ContentRecord::new(url.as_str(), kind, code, title);
    record.publish_date = Some(parse_publish_date(document)?);
    // "<format> <hh:mm:ss> ..."
    record.duration = optional_text(document, &FORMAT_DETAILS)
        .and_then(|details| details.split_whitespace().nth(1).map(str::to_string))
        .map(|raw| parse_duration(&raw))
        .transpose()?;
    record.description = optional_text(document, &MASSAGE_COPY);
    record.cover_url = attr_url(document, &VIDEO_PLAYER_WRAPPER, "style");
    record.screengrab_url = attr_url(document, &VIDEO_STILLS_LINK, "href");
    record.related_people = parse_people(document, url);
    record.tags = parse_tags(document);

    let media = player_media(document, &FILM_PLAYER_SCRIPT)?;
    record.variants = media.variants;
    record.subtitles = media.subtitles;
    record.trailer_variants = trailer_links(document);

    Ok(record)
}

/// Sex education pages have no publish date and no credited models.
pub(super) fn parse_sexed_page(document: &Html, url: &Url) -> Result<ContentRecord, ParseError> {
    let title = required_text(document, &SEXED_TITLE, "title")?;
    let code = parse_code(document)?;

    let mut record = ContentRecord::new(url.as_str(), ContentKind::SexEd, code, title);
    // "<hh:mm:ss> minutes"
    record.duration = optional_text(document, &SEXED_DURATION)
        .and_then(|text| text.split_whitespace().next().map(str::to_string))
        .map(|raw| parse_duration(&raw))
        .transpose()?;
    record.description = optional_text(document, &SEXED_INTRO);
    record.cover_url = attr_url(document, &VIDEO_PLAYER_WRAPPER, "style");
    record.tags = parse_tags(document);

    let media = player_media(document, &SEXED_PLAYER_SCRIPT)?;
    record.screengrab_url = media
        .variants
        .values()
        .next()
        .map(|url| SEXED_VARIANT_SUFFIX.replace(url, ".zip").into_owned());
    record.trailer_variants = derived_trailers(&media.variants);
    record.variants = media.variants;
    record.subtitles = media.subtitles;

    Ok(record)
}

fn parse_duration(raw: &str) -> Result<u64, ParseError> {
    duration_to_seconds(raw, DURATION_DELIMITER).map_err(|_| ParseError::invalid("duration", raw))
}

fn player_media(document: &Html, selector: &scraper::Selector) -> Result<PlayerMedia, ParseError> {
    match select_first(document, selector) {
        Some(script) => parse_player_script(&script.text().collect::<String>()),
        None => Ok(PlayerMedia::default()),
    }
}

/// Trailer links listed next to the player, keyed by the `NNNp` label.
fn trailer_links(document: &Html) -> BTreeMap<u32, String> {
    let mut trailers = BTreeMap::new();
    for link in document.select(&TRAILER_LINK) {
        let label = link.select(&STRONG).next().map(text_of).unwrap_or_default();
        let resolution = RESOLUTION_LABEL
            .captures(&label)
            .and_then(|captures| captures[1].parse().ok());
        let url = link.value().attr("href").and_then(strip_query);
        match (resolution, url) {
            (Some(resolution), Some(url)) => {
                trailers.entry(resolution).or_insert(url);
            }
            _ => debug!(label, "skipping unrecognized trailer link"),
        }
    }
    trailers
}

/// Trailers of sex education items live on the preview host next to the full
/// videos, with `trailer-` in front of the resolution suffix.
fn derived_trailers(variants: &BTreeMap<u32, String>) -> BTreeMap<u32, String> {
    variants
        .iter()
        .map(|(resolution, url)| {
            let suffix = format!("{resolution}p");
            let trailer = url
                .replace(CONTENT_HOST, PREVIEW_HOST)
                .replace(&suffix, &format!("trailer-{suffix}"));
            (*resolution, trailer)
        })
        .collect()
}
