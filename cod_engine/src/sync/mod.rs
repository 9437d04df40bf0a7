//! Normalizes the two upstream status sources into [`StatusUpdate`](crate::db_types::StatusUpdate)s.
//!
//! * The external feed is paginated. [`collect_feed_updates`] walks it page by page and keeps whatever it collected
//!   if a page fails.
//! * The worksheet is a flat list of `(formatted id, status)` rows, see [`worksheet_updates`].
mod feed;
mod worksheet;

pub use feed::{collect_feed_updates, FeedCollection, FeedOrder, FeedPage, OrderFeed, DEFAULT_MAX_PAGES};
pub use worksheet::{worksheet_updates, WorksheetRow, WorksheetUpdates};
