//! Data models shared by every pipeline stage.
//!
//! - [`FeedSource`]: one configured feed (URL, display label, category)
//! - [`NewsItem`]: a normalized RSS/Atom item as written to the JSON snapshots
//!
//! `NewsItem` serializes with the camelCase field names the static site
//! consumes (`pubDate`, `impactBrief`).

use serde::{Deserialize, Serialize};

/// Title used when a feed item carries none.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Maximum number of characters kept from an item description or summary.
pub const DESCRIPTION_LIMIT: usize = 200;

/// A single configured feed.
///
/// Built from the feed table before a run starts and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    /// Feed URL (RSS 2.0 or Atom).
    pub url: String,
    /// Human-readable label, written into every item's `source` field.
    pub label: String,
    /// Category the feed belongs to; also the stem of the category file.
    pub category: String,
}

/// A normalized news item.
///
/// The parser fills the feed-derived fields; the category builder then
/// overwrites `source` with the feed label and sets `category` and
/// `impact_brief`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub source: String,
    /// Representative image URL, empty when none was found.
    pub image: String,
    /// Publication date exactly as the feed wrote it (RFC 822 for RSS,
    /// ISO 8601 for Atom).
    pub pub_date: String,
    /// At most [`DESCRIPTION_LIMIT`] characters.
    pub description: String,
    pub guid: String,
    pub category: String,
    pub impact_brief: String,
}
