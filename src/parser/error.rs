//! Error types for detail page parsing.

use thiserror::Error;

/// A detail page could not be turned into a [`ContentRecord`](crate::model::ContentRecord).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A field every page of this kind carries was not found.
    #[error("missing field '{field}'")]
    MissingField { field: &'static str },

    /// A field was found but its value could not be interpreted.
    #[error("invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: String },

    /// The page offers no downloadable variants.
    #[error("no downloads found on {url}")]
    NoDownloads { url: String },

    /// The URL does not point at a film, massage, sexed or gallery page.
    #[error("unsupported URL {url}")]
    UnsupportedUrl { url: String },
}

impl ParseError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
        }
    }
}
