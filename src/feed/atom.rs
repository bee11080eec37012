//! Atom feed parsing.

use super::xml::Element;
use super::{ATOM_NS, DEFAULT_SOURCE};
use crate::models::{DESCRIPTION_LIMIT, DEFAULT_TITLE, NewsItem};
use crate::utils::truncate_chars;

/// Convert every `<entry>` of an Atom `<feed>` into a [`NewsItem`].
///
/// Atom entries never carry an image.
pub fn parse_feed_element(feed: &Element) -> Vec<NewsItem> {
    let source = feed.child_text(Some(ATOM_NS), "title", DEFAULT_SOURCE);
    feed.children_named(Some(ATOM_NS), "entry")
        .map(|entry| parse_entry(entry, &source))
        .collect()
}

fn parse_entry(entry: &Element, source: &str) -> NewsItem {
    let link = alternate_link(entry);
    let summary = entry.child_text(Some(ATOM_NS), "summary", "");
    NewsItem {
        title: entry.child_text(Some(ATOM_NS), "title", DEFAULT_TITLE),
        guid: entry.child_text(Some(ATOM_NS), "id", &link),
        source: source.to_string(),
        pub_date: entry.child_text(Some(ATOM_NS), "published", ""),
        description: truncate_chars(&summary, DESCRIPTION_LIMIT),
        link,
        ..Default::default()
    }
}

/// `href` of the last `<link>` without `rel` or with `rel="alternate"`.
fn alternate_link(entry: &Element) -> String {
    entry
        .children_named(Some(ATOM_NS), "link")
        .filter(|link| matches!(link.attr("rel"), None | Some("alternate")))
        .filter_map(|link| link.attr("href"))
        .filter(|href| !href.is_empty())
        .last()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use crate::feed::parse_feed;

    fn atom(entries: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Frame.io Insider</title>
  {entries}
</feed>"#
        )
    }

    #[test]
    fn test_entry_fields() {
        let xml = atom(
            r#"<entry>
                <title>Camera to Cloud goes 8K</title>
                <link href="https://blog.frame.io/c2c-8k"/>
                <id>urn:uuid:1234</id>
                <published>2025-05-06T10:00:00Z</published>
                <updated>2025-05-07T10:00:00Z</updated>
                <summary>Remote workflows scale up.</summary>
            </entry>"#,
        );
        let items = parse_feed(xml.as_bytes());
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title, "Camera to Cloud goes 8K");
        assert_eq!(item.link, "https://blog.frame.io/c2c-8k");
        assert_eq!(item.guid, "urn:uuid:1234");
        assert_eq!(item.pub_date, "2025-05-06T10:00:00Z");
        assert_eq!(item.description, "Remote workflows scale up.");
        assert_eq!(item.source, "Frame.io Insider");
        assert_eq!(item.image, "");
    }

    #[test]
    fn test_alternate_link_preferred_over_other_rel() {
        let xml = atom(
            r#"<entry>
                <link rel="alternate" href="https://example.com/html"/>
                <link rel="enclosure" href="https://example.com/file.mp4"/>
            </entry>"#,
        );
        let items = parse_feed(xml.as_bytes());
        assert_eq!(items[0].link, "https://example.com/html");
    }

    #[test]
    fn test_link_without_rel_used_when_no_alternate() {
        let xml = atom(
            r#"<entry>
                <link rel="self" href="https://example.com/self"/>
                <link href="https://example.com/plain"/>
                <link rel="replies" href="https://example.com/comments"/>
            </entry>"#,
        );
        let items = parse_feed(xml.as_bytes());
        assert_eq!(items[0].link, "https://example.com/plain");
    }

    #[test]
    fn test_last_matching_link_wins() {
        let xml = atom(
            r#"<entry>
                <link href="https://example.com/first"/>
                <link rel="alternate" href="https://example.com/second"/>
                <link rel="alternate" href=""/>
            </entry>"#,
        );
        let items = parse_feed(xml.as_bytes());
        assert_eq!(items[0].link, "https://example.com/second");
    }

    #[test]
    fn test_missing_id_falls_back_to_link_and_defaults() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
            <entry><link href="https://example.com/a"/></entry>
        </feed>"#;
        let items = parse_feed(xml.as_bytes());
        assert_eq!(items[0].guid, "https://example.com/a");
        assert_eq!(items[0].title, "Untitled");
        assert_eq!(items[0].source, "Source");
    }

    #[test]
    fn test_feed_without_atom_namespace_is_ignored() {
        let xml = r#"<feed><entry><title>t</title></entry></feed>"#;
        assert!(parse_feed(xml.as_bytes()).is_empty());
    }
}
