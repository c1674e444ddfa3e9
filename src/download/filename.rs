//! Output file naming.
//!
//! Every file written for an item shares the record's prefix
//! (`{YYYY.MM.DD}-{code}`, or just `{code}` without a date) followed by the
//! asset's original file name from the URL path. The metadata sidecar uses
//! the primary media's name with a `.json` extension.

use std::path::{Component, Path};

use url::Url;

use super::DownloadError;
use crate::model::ContentRecord;

/// Suffix of in-flight transfer files.
pub const TEMP_SUFFIX: &str = ".temp";

/// Decoded, sanitized last path segment of `url`.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidUrl`] if the URL does not parse or has no
/// file name.
pub fn original_filename(url: &str) -> Result<String, DownloadError> {
    let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;
    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| DownloadError::invalid_url(url))?;

    let decoded = urlencoding::decode(segment)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| segment.to_string());
    Ok(sanitize_filename(&decoded))
}

/// `{prefix}-{original}` for an asset of `record`.
///
/// # Errors
///
/// Same as [`original_filename`].
pub fn asset_filename(record: &ContentRecord, url: &str) -> Result<String, DownloadError> {
    Ok(format!(
        "{}-{}",
        record.filename_prefix(),
        original_filename(url)?
    ))
}

/// Sidecar name for `record`, derived from its primary media URL.
///
/// # Errors
///
/// Same as [`original_filename`].
pub fn sidecar_filename(record: &ContentRecord, primary_url: &str) -> Result<String, DownloadError> {
    let original = original_filename(primary_url)?;
    let stem = Path::new(&original)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(&original);
    Ok(format!("{}-{stem}.json", record.filename_prefix()))
}

/// Replaces characters that are invalid in file names.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized.replace('.', "_")
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
