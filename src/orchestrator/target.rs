//! Classification of user-supplied URLs.

use url::Url;

use crate::listing::{ListingEndpoint, ListingSection, kind_from_path};
use crate::model::ItemRef;

/// What a URL asks to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single film, massage, sex education or gallery page.
    Item(ItemRef),
    /// The `/movies` listing.
    AllMovies(Url),
    /// The `/photos` listing.
    AllGalleries(Url),
    /// A `/models/<name>` page: its films, then its galleries.
    Model(Url),
}

impl Target {
    /// Listing endpoints to crawl, in crawl order. Empty for single items.
    #[must_use]
    pub fn endpoints(&self) -> Vec<ListingEndpoint> {
        match self {
            Self::Item(_) => Vec::new(),
            Self::AllMovies(url) => vec![ListingEndpoint::new(url.clone(), ListingSection::Films)],
            Self::AllGalleries(url) => {
                vec![ListingEndpoint::new(url.clone(), ListingSection::Galleries)]
            }
            Self::Model(url) => vec![
                ListingEndpoint::new(url.clone(), ListingSection::Films),
                ListingEndpoint::new(url.clone(), ListingSection::Galleries),
            ],
        }
    }
}

/// Classifies `raw` against the site at `base`.
///
/// Returns `None` for URLs that do not parse, point at another host, or name a
/// page that has nothing to download.
#[must_use]
pub fn classify(raw: &str, base: &Url) -> Option<Target> {
    let mut url = Url::parse(raw).ok()?;
    if !same_site(&url, base) {
        return None;
    }
    url.set_query(None);
    url.set_fragment(None);

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        ["movies"] => Some(Target::AllMovies(url)),
        ["photos"] => Some(Target::AllGalleries(url)),
        ["models", _] => Some(Target::Model(url)),
        [_, _] => {
            let kind = kind_from_path(&url)?;
            Some(Target::Item(ItemRef::new(url.as_str(), kind)))
        }
        _ => None,
    }
}

fn same_site(url: &Url, base: &Url) -> bool {
    let bare = |u: &Url| {
        u.host_str()
            .map(|host| host.trim_start_matches("www.").to_ascii_lowercase())
    };
    bare(url).is_some()
        && bare(url) == bare(base)
        && url.port_or_known_default() == base.port_or_known_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::ContentKind;

    fn base() -> Url {
        Url::parse("https://www.hegre.com/").unwrap()
    }

    #[test]
    fn test_classify_single_items() {
        let cases = [
            ("https://www.hegre.com/films/sunrise", ContentKind::Film),
            ("https://www.hegre.com/massage/relax", ContentKind::Massage),
            ("https://www.hegre.com/sexed/intro", ContentKind::SexEd),
            ("https://www.hegre.com/photos/beach", ContentKind::Gallery),
        ];
        for (raw, kind) in cases {
            let Some(Target::Item(item)) = classify(raw, &base()) else {
                panic!("expected item for {raw}");
            };
            assert_eq!(item.kind, kind);
            assert_eq!(item.url, raw);
            assert!(item.code.is_none());
        }
    }

    #[test]
    fn test_classify_collections() {
        assert!(matches!(
            classify("https://www.hegre.com/movies", &base()),
            Some(Target::AllMovies(_))
        ));
        assert!(matches!(
            classify("https://www.hegre.com/photos/", &base()),
            Some(Target::AllGalleries(_))
        ));
        assert!(matches!(
            classify("https://www.hegre.com/models/anna", &base()),
            Some(Target::Model(_))
        ));
    }

    #[test]
    fn test_classify_strips_query() {
        let Some(Target::AllMovies(url)) =
            classify("https://www.hegre.com/movies?films_page=3#top", &base())
        else {
            panic!("expected movies listing");
        };
        assert_eq!(url.as_str(), "https://www.hegre.com/movies");
    }

    #[test]
    fn test_classify_accepts_bare_host() {
        assert!(classify("https://hegre.com/films/sunrise", &base()).is_some());
    }

    #[test]
    fn test_classify_rejects_unsupported() {
        for raw in [
            "https://www.hegre.com/",
            "https://www.hegre.com/about",
            "https://www.hegre.com/blog/post",
            "https://www.hegre.com/models",
            "https://www.hegre.com/films/a/b",
            "https://example.com/films/sunrise",
            "not a url",
        ] {
            assert!(classify(raw, &base()).is_none(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_model_endpoints_films_then_galleries() {
        let target = classify("https://www.hegre.com/models/anna", &base()).unwrap();
        let sections: Vec<_> = target.endpoints().iter().map(|e| e.section).collect();
        assert_eq!(sections, vec![ListingSection::Films, ListingSection::Galleries]);
    }

    #[test]
    fn test_item_has_no_endpoints() {
        let target = classify("https://www.hegre.com/films/sunrise", &base()).unwrap();
        assert!(target.endpoints().is_empty());
    }
}
