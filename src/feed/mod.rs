//! RSS 2.0 / Atom parsing into [`NewsItem`]s.
//!
//! # Submodules
//!
//! - [`xml`]: namespace-aware element tree built from `quick-xml` events
//! - [`rss`]: `<rss><channel><item>` documents
//! - [`atom`]: `<feed xmlns="http://www.w3.org/2005/Atom">` documents
//! - [`image`]: image URL fallback chain for RSS items
//!
//! # Dispatch
//!
//! | Root shape | Handled as |
//! |------------|------------|
//! | any root with a direct `<channel>` child | RSS 2.0 |
//! | Atom-namespaced `<feed>` root | Atom |
//! | anything else | no items |
//!
//! Parsing never fails the caller: a malformed document is logged and yields
//! no items.

pub mod atom;
pub mod image;
pub mod rss;
pub mod xml;

use crate::models::NewsItem;
use tracing::{debug, warn};

pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const MEDIA_NS: &str = "http://search.yahoo.com/mrss/";
pub const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";

/// Source name used when a feed declares no title.
pub const DEFAULT_SOURCE: &str = "Source";

/// Parse a raw feed body into items.
pub fn parse_feed(bytes: &[u8]) -> Vec<NewsItem> {
    let root = match xml::parse_document(bytes) {
        Ok(root) => root,
        Err(e) => {
            warn!(error = %e, bytes = bytes.len(), "XML parse error; feed yields no items");
            return Vec::new();
        }
    };

    if let Some(channel) = root.child(None, "channel") {
        return rss::parse_channel(channel);
    }
    if root.is(Some(ATOM_NS), "feed") {
        return atom::parse_feed_element(&root);
    }

    debug!(
        root = root.name(),
        namespace = root.namespace().unwrap_or_default(),
        "Unrecognized feed root; no items"
    );
    Vec::new()
}
