//! Compiled CSS selectors and regular expressions for the site's markup.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        #[allow(clippy::unwrap_used)]
        pub(crate) static $name: LazyLock<Selector> =
            LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        #[allow(clippy::unwrap_used)]
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Login form
selector!(AUTHENTICITY_TOKEN, r#"input[name="authenticity_token"]"#);

// Listing pages
selector!(FILMS_LISTING_ITEM, "#films-listing .item");
selector!(FILMS_LISTING_HINT, "#films-listing .hint");
selector!(GALLERIES_LISTING_ITEM, "#galleries-listing .item");
selector!(GALLERIES_LISTING_HINT, "#galleries-listing .hint");
selector!(ANCHOR, "a[href]");

// Shared detail page fields
selector!(COMMENTS_WRAPPER, ".comments-wrapper[data-id]");
selector!(PUBLISH_DATE, ".date");
selector!(RECORD_MODEL, ".record-model");
selector!(APPROVED_TAG, ".approved-tags > .tag");
selector!(VIDEO_PLAYER_WRAPPER, ".video-player-wrapper[style]");

// Films and massage pages
selector!(FILM_TITLE, ".title > .translated-text");
selector!(FORMAT_DETAILS, ".format-details");
selector!(MASSAGE_COPY, ".massage-copy");
selector!(VIDEO_STILLS_LINK, ".video-stills > a[href]");
selector!(FILM_PLAYER_SCRIPT, ".video-inner > script");
selector!(TRAILER_LINK, ".trailer > a[href]");
selector!(STRONG, "strong");

// Sex education pages
selector!(SEXED_TITLE, ".film-header > h1");
selector!(SEXED_DURATION, ".film-header > div > strong");
selector!(SEXED_INTRO, ".film-header .intro");
selector!(SEXED_PLAYER_SCRIPT, ".top script");

// Gallery pages
selector!(GALLERY_TITLE, "h1.translated-text");
selector!(GALLERY_ZIP, ".gallery-zips > .members-only[href]");
selector!(GALLERY_COVER, ".record-content > .non-members[style]");

// First absolute URL in an attribute, without its query string.
regex!(ABSOLUTE_URL, r#"(https?://[^?'"\s)]+)"#);
// Player configuration object passed to the player constructor.
regex!(PLAYER_JSON, r#"(\{".*)\);"#);
regex!(RESOLUTION_LABEL, r"(\d{3,4})p");
regex!(GALLERY_WIDTH, r"-(\d{4,5})px");
regex!(SEXED_VARIANT_SUFFIX, r"-\d{2,4}p\.mp4$");
