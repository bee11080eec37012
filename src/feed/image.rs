//! Representative image lookup for RSS items.
//!
//! Fallback order, first hit wins:
//!
//! 1. `<media:thumbnail url="…">`
//! 2. `<media:content url="…" type="image/…">`
//! 3. `<enclosure type="image/…" url="…">`
//! 4. the first `<img src="…">` inside `content:encoded`, or the description
//!    when there is no encoded content

use super::xml::Element;
use super::{CONTENT_NS, MEDIA_NS};

/// Find an image URL for `item`, or an empty string.
pub fn extract_image(item: &Element) -> String {
    let thumbnail = item
        .child(Some(MEDIA_NS), "thumbnail")
        .and_then(|t| t.attr("url"))
        .filter(|url| !url.is_empty());
    if let Some(url) = thumbnail {
        return url.to_string();
    }

    if let Some(content) = item.child(Some(MEDIA_NS), "content") {
        let url = content.attr("url").filter(|url| !url.is_empty());
        if let Some(url) = url {
            if is_image_type(content.attr("type")) {
                return url.to_string();
            }
        }
    }

    // An image enclosure ends the search even when it has no url
    if let Some(enclosure) = item.child(None, "enclosure") {
        if is_image_type(enclosure.attr("type")) {
            return enclosure.attr("url").unwrap_or_default().to_string();
        }
    }

    let markup = match item.child(Some(CONTENT_NS), "encoded").and_then(Element::text) {
        Some(encoded) => encoded.to_string(),
        None => item.child_text(None, "description", ""),
    };
    first_img_src(&markup).unwrap_or_default()
}

fn is_image_type(mime: Option<&str>) -> bool {
    mime.unwrap_or_default().starts_with("image/")
}

/// `src` of the first `<img>` tag in an HTML fragment.
///
/// The fragment is entity-decoded first, the tag search ignores ASCII case,
/// and the value must be quoted with `'` or `"`.
pub fn first_img_src(markup: &str) -> Option<String> {
    if markup.is_empty() {
        return None;
    }
    let html = html_escape::decode_html_entities(markup);
    // ASCII lowering keeps byte offsets valid for `html`
    let lower = html.to_ascii_lowercase();

    let img = lower.find("<img ")?;
    let src = img + lower[img..].find("src=")?;
    let value_start = src + "src=".len();

    let quote = html[value_start..].chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let value_start = value_start + quote.len_utf8();
    let value_end = value_start + html[value_start..].find(quote)?;
    Some(html[value_start..value_end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::xml::parse_document;

    fn item(inner: &str) -> Element {
        let xml = format!(
            r#"<item xmlns:media="http://search.yahoo.com/mrss/" xmlns:content="http://purl.org/rss/1.0/modules/content/">{inner}</item>"#
        );
        parse_document(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_thumbnail_beats_img_in_description() {
        let node = item(
            r#"<media:thumbnail url="https://cdn.test/thumb.jpg"/>
               <description>&lt;img src="https://cdn.test/inline.jpg"&gt;</description>"#,
        );
        assert_eq!(extract_image(&node), "https://cdn.test/thumb.jpg");
    }

    #[test]
    fn test_media_content_requires_image_type() {
        let video = item(r#"<media:content url="https://cdn.test/v.mp4" type="video/mp4"/>"#);
        assert_eq!(extract_image(&video), "");

        let image = item(r#"<media:content url="https://cdn.test/p.png" type="image/png"/>"#);
        assert_eq!(extract_image(&image), "https://cdn.test/p.png");
    }

    #[test]
    fn test_image_enclosure() {
        let node = item(r#"<enclosure url="https://cdn.test/e.jpg" type="image/jpeg" length="1"/>"#);
        assert_eq!(extract_image(&node), "https://cdn.test/e.jpg");

        let audio = item(r#"<enclosure url="https://cdn.test/e.mp3" type="audio/mpeg"/>"#);
        assert_eq!(extract_image(&audio), "");
    }

    #[test]
    fn test_encoded_content_preferred_over_description() {
        let node = item(
            r#"<description><![CDATA[<img src="https://cdn.test/desc.jpg">]]></description>
               <content:encoded><![CDATA[<p><IMG class="x" SRC='https://cdn.test/full.jpg'></p>]]></content:encoded>"#,
        );
        assert_eq!(extract_image(&node), "https://cdn.test/full.jpg");
    }

    #[test]
    fn test_empty_item_has_no_image() {
        assert_eq!(extract_image(&item("<title>t</title>")), "");
    }

    #[test]
    fn test_img_src_quote_handling() {
        assert_eq!(first_img_src("<img src='x.jpg'>").as_deref(), Some("x.jpg"));
        assert_eq!(first_img_src(r#"<img src="x.jpg">"#).as_deref(), Some("x.jpg"));
        assert_eq!(first_img_src(r#"<img src="x.jpg>"#), None);
        assert_eq!(first_img_src("<img src=x.jpg>"), None);
    }

    #[test]
    fn test_img_src_mixed_quotes_use_opening_quote() {
        assert_eq!(
            first_img_src(r#"<img src="it's.jpg">"#).as_deref(),
            Some("it's.jpg")
        );
    }

    #[test]
    fn test_img_src_missing_tag_or_attribute() {
        assert_eq!(first_img_src(""), None);
        assert_eq!(first_img_src("<p>no images</p>"), None);
        assert_eq!(first_img_src("<img alt='x'>"), None);
    }

    #[test]
    fn test_img_src_entity_encoded_markup() {
        let escaped = "&lt;img src=&quot;https://cdn.test/a.jpg?w=1&amp;h=2&quot;&gt;";
        assert_eq!(
            first_img_src(escaped).as_deref(),
            Some("https://cdn.test/a.jpg?w=1&h=2")
        );
    }
}
