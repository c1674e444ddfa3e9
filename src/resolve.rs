//! Resolution selection for media variants.
//!
//! The same policy applies to primary media and trailers: an explicit
//! request must be satisfied exactly, otherwise the highest resolution wins.

use std::collections::BTreeMap;

use thiserror::Error;

/// The requested resolution is not offered for an item.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error(
        "resolution {requested}p is not available, available resolutions are: {}",
        join_keys(.available)
    )]
    ResolutionUnavailable {
        requested: u32,
        /// Offered resolutions, ascending.
        available: Vec<u32>,
    },

    /// The mapping has no entries at all.
    #[error("no resolutions available")]
    NoVariants,
}

/// Picks a variant from a resolution → URL mapping.
///
/// With `requested = Some(r)` the entry for `r` is returned if present. With
/// `None` the entry with the largest key is returned.
///
/// # Errors
///
/// Returns [`ResolveError::ResolutionUnavailable`] listing the offered keys
/// when `r` is absent, and [`ResolveError::NoVariants`] for an empty mapping.
pub fn resolve(
    variants: &BTreeMap<u32, String>,
    requested: Option<u32>,
) -> Result<(u32, &str), ResolveError> {
    match requested {
        Some(resolution) => variants
            .get(&resolution)
            .map(|url| (resolution, url.as_str()))
            .ok_or_else(|| ResolveError::ResolutionUnavailable {
                requested: resolution,
                available: variants.keys().copied().collect(),
            }),
        None => variants
            .last_key_value()
            .map(|(resolution, url)| (*resolution, url.as_str()))
            .ok_or(ResolveError::NoVariants),
    }
}

fn join_keys(keys: &[u32]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
