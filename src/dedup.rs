//! Content-addressed deduplication.
//!
//! An item's fingerprint is the SHA-256 of its link, or of `title ++ source`
//! when the link is empty. Description, image and dates never take part, so
//! the same story re-published with a new blurb still collapses.

use crate::models::NewsItem;
use itertools::Itertools;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Counts produced by one [`deduplicate`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    pub duplicates_removed: usize,
    pub items_after_dedup: usize,
}

/// Hex-encoded fingerprint of `item`.
pub fn fingerprint(item: &NewsItem) -> String {
    let digest = if item.link.is_empty() {
        Sha256::new()
            .chain_update(item.title.as_bytes())
            .chain_update(item.source.as_bytes())
            .finalize()
    } else {
        Sha256::digest(item.link.as_bytes())
    };
    format!("{digest:x}")
}

/// Drop every item whose fingerprint was already seen, keeping first
/// occurrences in their original order.
pub fn deduplicate(items: Vec<NewsItem>) -> (Vec<NewsItem>, DedupStats) {
    let before = items.len();
    let unique: Vec<NewsItem> = items.into_iter().unique_by(fingerprint).collect();
    let stats = DedupStats {
        duplicates_removed: before - unique.len(),
        items_after_dedup: unique.len(),
    };
    debug!(before, after = stats.items_after_dedup, removed = stats.duplicates_removed, "Deduplicated items");
    (unique, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, link: &str, source: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            link: link.to_string(),
            source: source.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = item("A", "https://example.com/a", "Avid");
        assert_eq!(fingerprint(&a), fingerprint(&a.clone()));
        assert_eq!(fingerprint(&a).len(), 64);
    }

    #[test]
    fn test_fingerprint_ignores_description_image_and_date() {
        let a = item("A", "https://example.com/a", "Avid");
        let b = NewsItem {
            description: "different".to_string(),
            image: "https://cdn.test/x.jpg".to_string(),
            pub_date: "2025-01-01T00:00:00Z".to_string(),
            title: "Other title".to_string(),
            ..a.clone()
        };
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_without_link_uses_title_and_source() {
        let a = item("Same", "", "Avid");
        let b = NewsItem {
            description: "other".to_string(),
            ..a.clone()
        };
        let c = item("Same", "", "Dalet");
        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_ne!(fingerprint(&a), fingerprint(&c));
    }

    #[test]
    fn test_fingerprint_concatenates_title_and_source() {
        assert_eq!(
            fingerprint(&item("ab", "", "c")),
            fingerprint(&item("a", "", "bc"))
        );
    }

    #[test]
    fn test_deduplicate_keeps_first_seen_order() {
        let items = vec![
            item("1", "https://x/1", "S"),
            item("2", "https://x/2", "S"),
            item("1 again", "https://x/1", "T"),
            item("3", "https://x/3", "S"),
            item("2 again", "https://x/2", "S"),
        ];
        let (unique, stats) = deduplicate(items);
        let titles: Vec<_> = unique.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["1", "2", "3"]);
        assert_eq!(stats.duplicates_removed, 2);
        assert_eq!(stats.items_after_dedup, 3);
    }

    #[test]
    fn test_deduplicate_count_invariant_and_idempotence() {
        let items = vec![
            item("a", "", "S"),
            item("a", "", "S"),
            item("b", "https://x/b", "S"),
            item("c", "https://x/b", "S"),
            item("a", "", "T"),
        ];
        let input_len = items.len();
        let (once, stats) = deduplicate(items);
        assert_eq!(once.len(), input_len - stats.duplicates_removed);

        let (twice, stats_again) = deduplicate(once.clone());
        assert_eq!(twice, once);
        assert_eq!(stats_again.duplicates_removed, 0);
    }

    #[test]
    fn test_deduplicate_empty() {
        let (unique, stats) = deduplicate(Vec::new());
        assert!(unique.is_empty());
        assert_eq!(stats, DedupStats::default());
    }
}
