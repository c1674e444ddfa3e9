//! Extraction of download and subtitle URLs from the embedded video player.
//!
//! Movie pages construct the player with an inline JSON object:
//!
//! ```text
//! new VideoPlayer($('#video-player-...'), {"resolutions": [...], "clip": {"subtitles": [...]}});
//! ```
//!
//! Each resolution entry carries its pixel height in `type` and its URL in
//! `sources.default[0].mp4`. Query strings are stripped from every URL.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::{ParseError, strip_query};
use crate::selectors::PLAYER_JSON;

#[derive(Debug, Deserialize)]
struct PlayerConfig {
    #[serde(default)]
    resolutions: Vec<PlayerResolution>,
    #[serde(default)]
    clip: Option<PlayerClip>,
}

#[derive(Debug, Deserialize)]
struct PlayerResolution {
    #[serde(rename = "type")]
    height: u32,
    sources: PlayerSources,
}

#[derive(Debug, Deserialize)]
struct PlayerSources {
    #[serde(default)]
    default: Vec<PlayerSource>,
}

#[derive(Debug, Deserialize)]
struct PlayerSource {
    mp4: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayerClip {
    #[serde(default)]
    subtitles: Vec<PlayerSubtitle>,
}

#[derive(Debug, Deserialize)]
struct PlayerSubtitle {
    label: String,
    src: String,
}

/// Media sources announced to the player.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct PlayerMedia {
    pub variants: BTreeMap<u32, String>,
    /// Keyed by lower-cased language label.
    pub subtitles: BTreeMap<String, String>,
}

/// Parses the player script. A script without a player object yields no media.
pub(crate) fn parse_player_script(script: &str) -> Result<PlayerMedia, ParseError> {
    let Some(captures) = PLAYER_JSON.captures(script) else {
        return Ok(PlayerMedia::default());
    };
    let raw = &captures[1];
    let config: PlayerConfig =
        serde_json::from_str(raw).map_err(|e| ParseError::invalid("video player", e.to_string()))?;

    let mut media = PlayerMedia::default();
    for resolution in config.resolutions {
        let Some(url) = resolution
            .sources
            .default
            .first()
            .and_then(|source| source.mp4.as_deref())
            .and_then(strip_query)
        else {
            continue;
        };
        media.variants.entry(resolution.height).or_insert(url);
    }

    for subtitle in config.clip.map(|clip| clip.subtitles).unwrap_or_default() {
        if let Some(url) = strip_query(&subtitle.src) {
            media
                .subtitles
                .entry(subtitle.label.to_lowercase())
                .or_insert(url);
        }
    }

    Ok(media)
}
