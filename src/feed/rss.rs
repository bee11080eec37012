//! RSS 2.0 channel parsing.

use super::image::extract_image;
use super::xml::Element;
use super::DEFAULT_SOURCE;
use crate::models::{DESCRIPTION_LIMIT, DEFAULT_TITLE, NewsItem};
use crate::utils::truncate_chars;

/// Convert every direct `<item>` of `channel` into a [`NewsItem`].
///
/// `source` is the channel title; `category` and `impact_brief` stay empty.
pub fn parse_channel(channel: &Element) -> Vec<NewsItem> {
    let source = channel.child_text(None, "title", DEFAULT_SOURCE);
    channel
        .children_named(None, "item")
        .map(|item| parse_item(item, &source))
        .collect()
}

fn parse_item(item: &Element, source: &str) -> NewsItem {
    let link = item.child_text(None, "link", "");
    let description = item.child_text(None, "description", "");
    NewsItem {
        title: item.child_text(None, "title", DEFAULT_TITLE),
        guid: item.child_text(None, "guid", &link),
        source: source.to_string(),
        image: extract_image(item),
        pub_date: item.child_text(None, "pubDate", ""),
        description: truncate_chars(&description, DESCRIPTION_LIMIT),
        link,
        ..Default::default()
    }
}
