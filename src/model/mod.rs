//! Domain types shared by every stage of the pipeline.
//!
//! - [`ContentKind`] - the four kinds of downloadable items and their URL slugs
//! - [`ItemRef`] - an item discovered from a URL or listing page, before its details are known
//! - [`ContentRecord`] - a fully parsed item with its download variants
//! - [`SortOption`] - listing sort order threaded through paginated crawls

mod kind;
mod record;
mod units;

pub use kind::{ContentKind, SortOption};
pub use record::{ContentRecord, ItemRef, Person};
pub use units::{DurationFormatError, convert_size, duration_to_seconds};
