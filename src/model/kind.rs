//! Item kinds and listing sort orders.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a downloadable item.
///
/// Each kind maps to the first path segment of its detail page URL
/// (`/films/...`, `/massage/...`, `/sexed/...`, `/photos/...`), and that slug is
/// also what the archive and the metadata sidecar store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContentKind {
    /// A regular film.
    #[serde(rename = "films")]
    Film,
    /// A massage film.
    #[serde(rename = "massage")]
    Massage,
    /// A sex education film. These pages carry neither a publish date nor models.
    #[serde(rename = "sexed")]
    SexEd,
    /// A photo gallery, downloaded as zip archives.
    #[serde(rename = "photos")]
    Gallery,
}

impl ContentKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 4] = [Self::Film, Self::Massage, Self::SexEd, Self::Gallery];

    /// Returns the URL path segment (and archive prefix) for this kind.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Film => "films",
            Self::Massage => "massage",
            Self::SexEd => "sexed",
            Self::Gallery => "photos",
        }
    }

    /// Looks up a kind by its URL path segment.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }

    /// Returns true for the movie-like kinds (everything but galleries).
    #[must_use]
    pub fn is_movie(self) -> bool {
        !matches!(self, Self::Gallery)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Sort order for paginated listings.
///
/// The value is passed unchanged as the `*_sort` query parameter of every page
/// request in a crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortOption {
    /// Newest first.
    #[default]
    MostRecent,
    /// Most viewed first.
    MostViewed,
    /// Best rated first.
    TopRated,
    /// Oldest material first. Only meaningful for gallery listings.
    Vintage,
}

impl SortOption {
    /// Returns the query parameter value understood by the site.
    #[must_use]
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::MostRecent => "most_recent",
            Self::MostViewed => "most_viewed",
            Self::TopRated => "top_rated",
            Self::Vintage => "vintage",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_slug_round_trips_for_every_kind() {
        for kind in ContentKind::ALL {
            assert_eq!(ContentKind::from_slug(kind.slug()), Some(kind));
        }
    }

    #[test]
    fn test_kind_from_unknown_slug_is_none() {
        assert_eq!(ContentKind::from_slug("models"), None);
        assert_eq!(ContentKind::from_slug(""), None);
    }

    #[test]
    fn test_kind_serializes_to_slug() {
        let json = serde_json::to_string(&ContentKind::SexEd).unwrap();
        assert_eq!(json, "\"sexed\"");
        let json = serde_json::to_string(&ContentKind::Gallery).unwrap();
        assert_eq!(json, "\"photos\"");
    }

    #[test]
    fn test_gallery_is_not_a_movie() {
        assert!(ContentKind::Film.is_movie());
        assert!(ContentKind::SexEd.is_movie());
        assert!(!ContentKind::Gallery.is_movie());
    }

    #[test]
    fn test_sort_option_query_values() {
        assert_eq!(SortOption::default().to_string(), "most_recent");
        assert_eq!(SortOption::MostViewed.to_string(), "most_viewed");
        assert_eq!(SortOption::TopRated.to_string(), "top_rated");
        assert_eq!(SortOption::Vintage.to_string(), "vintage");
    }
}
