//! Parsing of a single listing page.

use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use super::ListingSection;
use crate::model::{ContentKind, ItemRef};
use crate::selectors::{
    ANCHOR, FILMS_LISTING_HINT, FILMS_LISTING_ITEM, GALLERIES_LISTING_HINT, GALLERIES_LISTING_ITEM,
};

/// What one listing page contained.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ListingPage {
    pub items: Vec<ItemRef>,
    /// The page showed the "no results" marker.
    pub exhausted: bool,
}

/// Extracts item references from a listing page, in page order.
///
/// Relative links are resolved against `page_url`. Items whose link does not
/// point at a known content kind are skipped.
pub(crate) fn parse_listing_page(html: &str, page_url: &Url, section: ListingSection) -> ListingPage {
    let document = Html::parse_document(html);

    let (item_selector, hint_selector) = match section {
        ListingSection::Films => (&*FILMS_LISTING_ITEM, &*FILMS_LISTING_HINT),
        ListingSection::Galleries => (&*GALLERIES_LISTING_ITEM, &*GALLERIES_LISTING_HINT),
    };

    // a model page carries both blocks; only the crawled one can end the crawl
    if document.select(hint_selector).next().is_some() {
        return ListingPage {
            items: Vec::new(),
            exhausted: true,
        };
    }

    let items = document
        .select(item_selector)
        .filter_map(|element| item_ref(element, page_url))
        .collect();

    ListingPage {
        items,
        exhausted: false,
    }
}

fn item_ref(element: ElementRef<'_>, page_url: &Url) -> Option<ItemRef> {
    let href = element
        .value()
        .attr("href")
        .or_else(|| element.select(&ANCHOR).find_map(|a| a.value().attr("href")))?;

    let Ok(url) = page_url.join(href) else {
        debug!(href, "skipping listing item with invalid link");
        return None;
    };
    let Some(kind) = kind_from_path(&url) else {
        debug!(url = %url, "skipping listing item of unknown kind");
        return None;
    };

    let mut item = ItemRef::new(url.as_str(), kind);
    if let Some(code) = element
        .value()
        .attr("data-id")
        .and_then(|id| id.trim().parse().ok())
    {
        item = item.with_code(code);
    }
    Some(item)
}

/// Content kind named by the first path segment of an item URL.
pub(crate) fn kind_from_path(url: &Url) -> Option<ContentKind> {
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let kind = ContentKind::from_slug(segments.next()?)?;
    // a bare section path is a collection, not an item
    segments.next()?;
    Some(kind)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://www.hegre.com/movies?films_sort=most_recent&films_page=1").unwrap()
    }

    #[test]
    fn test_parse_films_listing_in_page_order() {
        let html = r#"
            <div id="films-listing">
              <div class="item" data-id="101"><a href="/films/first-film">First</a></div>
              <div class="item" data-id="102"><a href="/massage/second">Second</a></div>
              <div class="item"><a href="https://www.hegre.com/sexed/third">Third</a></div>
            </div>"#;

        let page = parse_listing_page(html, &page_url(), ListingSection::Films);

        assert!(!page.exhausted);
        assert_eq!(
            page.items,
            vec![
                ItemRef::new("https://www.hegre.com/films/first-film", ContentKind::Film)
                    .with_code(101),
                ItemRef::new("https://www.hegre.com/massage/second", ContentKind::Massage)
                    .with_code(102),
                ItemRef::new("https://www.hegre.com/sexed/third", ContentKind::SexEd),
            ]
        );
    }

    #[test]
    fn test_parse_listing_detects_no_results_marker() {
        let html = r#"<div id="films-listing"><p class="hint">No results</p></div>"#;
        let page = parse_listing_page(html, &page_url(), ListingSection::Films);
        assert!(page.exhausted);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_parse_listing_ignores_marker_of_other_section() {
        let html = r#"
            <div id="films-listing">
              <div class="item" data-id="5"><a href="/films/only-film">Only</a></div>
            </div>
            <div id="galleries-listing"><p class="hint">No galleries</p></div>"#;

        let films = parse_listing_page(html, &page_url(), ListingSection::Films);
        assert!(!films.exhausted);
        assert_eq!(
            films.items,
            vec![ItemRef::new("https://www.hegre.com/films/only-film", ContentKind::Film).with_code(5)]
        );

        let galleries = parse_listing_page(html, &page_url(), ListingSection::Galleries);
        assert!(galleries.exhausted);
        assert!(galleries.items.is_empty());
    }

    #[test]
    fn test_parse_listing_empty_page_is_not_exhausted() {
        let page = parse_listing_page("<html></html>", &page_url(), ListingSection::Films);
        assert!(!page.exhausted);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_parse_galleries_listing_ignores_films_section() {
        let html = r#"
            <div id="films-listing"><div class="item"><a href="/films/a">A</a></div></div>
            <div id="galleries-listing"><a class="item" href="/photos/b" data-id="7">B</a></div>"#;
        let page = parse_listing_page(html, &page_url(), ListingSection::Galleries);
        assert_eq!(
            page.items,
            vec![ItemRef::new("https://www.hegre.com/photos/b", ContentKind::Gallery).with_code(7)]
        );
    }

    #[test]
    fn test_parse_listing_skips_unknown_kinds() {
        let html = r#"<div id="films-listing"><div class="item"><a href="/models/x">X</a></div></div>"#;
        let page = parse_listing_page(html, &page_url(), ListingSection::Films);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_kind_from_path() {
        let url = Url::parse("https://www.hegre.com/photos/some-gallery").unwrap();
        assert_eq!(kind_from_path(&url), Some(ContentKind::Gallery));
        let collection = Url::parse("https://www.hegre.com/photos").unwrap();
        assert_eq!(kind_from_path(&collection), None);
    }
}
