//! Raw feed item to [`Article`] conversion.
//!
//! The interesting part is image selection. Feeds advertise pictures in
//! several incompatible ways, so sources are tried in a fixed order and
//! the first hit wins:
//!
//! 1. the enclosure thumbnail, else the enclosure link
//! 2. a Media-RSS `thumbnail`
//! 3. a Media-RSS `content` whose type mentions "image"
//! 4. the first `<img src>` in the content (or description)
//! 5. an `og:image` meta tag in the description

use std::sync::OnceLock;

use regex::Regex;

use crate::news::html::{decode_entities, strip_tags, trim_words};
use crate::news::types::{Article, RawItem, DESCRIPTION_WORD_LIMIT};

fn img_quoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["'][^>]*>"#).expect("valid img regex")
    })
}

fn img_unquoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<img[^>]+src=([^\s>]+)").expect("valid img regex"))
}

fn og_image_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"og:image["']?\s+content=["']([^"']+)["']"#).expect("valid og:image regex")
    })
}

/// Normalize a raw item into an article.
pub fn normalize(item: &RawItem) -> Article {
    let description = decode_entities(&trim_words(
        &strip_tags(&item.description),
        DESCRIPTION_WORD_LIMIT,
    ));

    Article {
        title: decode_entities(item.title.trim()),
        link: item.link.trim().to_string(),
        description,
        pub_date: item.published.map(|p| p.naive_local()),
        image: resolve_image(item),
    }
}

/// Pick the representative image for an item.
pub fn resolve_image(item: &RawItem) -> Option<String> {
    enclosure_image(item)
        .or_else(|| non_empty(item.media_thumbnail.as_deref()))
        .or_else(|| media_content_image(item))
        .or_else(|| {
            let markup = if item.content.trim().is_empty() {
                &item.description
            } else {
                &item.content
            };
            first_img_src(markup)
        })
        .or_else(|| og_image(&item.description))
}

fn enclosure_image(item: &RawItem) -> Option<String> {
    let enclosure = item.enclosure.as_ref()?;
    non_empty(enclosure.thumbnail.as_deref()).or_else(|| non_empty(enclosure.url.as_deref()))
}

fn media_content_image(item: &RawItem) -> Option<String> {
    item.media_content
        .iter()
        .filter(|m| {
            m.mime_type
                .as_deref()
                .is_some_and(|t| t.to_ascii_lowercase().contains("image"))
        })
        .find_map(|m| non_empty(m.url.as_deref()))
}

/// First `<img>` source in the markup, quoted form preferred.
pub fn first_img_src(markup: &str) -> Option<String> {
    let raw = img_quoted_re()
        .captures(markup)
        .or_else(|| img_unquoted_re().captures(markup))
        .and_then(|caps| caps.get(1))?
        .as_str();

    let src = raw.trim_matches(|c| c == '"' || c == '\'');
    non_empty(Some(src))
}

/// `og:image` content attribute in the markup.
pub fn og_image(markup: &str) -> Option<String> {
    og_image_re()
        .captures(markup)
        .and_then(|caps| caps.get(1))
        .and_then(|m| non_empty(Some(m.as_str())))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn item() -> RawItem {
        RawItem::new("Title", "https://example.com/a")
    }

    #[test]
    fn test_enclosure_thumbnail_beats_media_content() {
        let raw = item()
            .with_enclosure(
                Some("https://example.com/video.mp4"),
                Some("https://example.com/enc-thumb.jpg"),
            )
            .with_media_content("https://example.com/media.jpg", Some("image/jpeg"));
        assert_eq!(
            resolve_image(&raw).as_deref(),
            Some("https://example.com/enc-thumb.jpg")
        );
    }

    #[test]
    fn test_enclosure_link_without_thumbnail() {
        let raw = item()
            .with_enclosure(Some("https://example.com/enc.jpg"), None)
            .with_media_thumbnail("https://example.com/thumb.jpg");
        assert_eq!(
            resolve_image(&raw).as_deref(),
            Some("https://example.com/enc.jpg")
        );
    }

    #[test]
    fn test_empty_enclosure_falls_through() {
        let raw = item()
            .with_enclosure(None, None)
            .with_media_thumbnail("https://example.com/thumb.jpg");
        assert_eq!(
            resolve_image(&raw).as_deref(),
            Some("https://example.com/thumb.jpg")
        );
    }

    #[test]
    fn test_media_thumbnail_beats_media_content() {
        let raw = item()
            .with_media_content("https://example.com/media.jpg", Some("image/jpeg"))
            .with_media_thumbnail("https://example.com/thumb.jpg");
        assert_eq!(
            resolve_image(&raw).as_deref(),
            Some("https://example.com/thumb.jpg")
        );
    }

    #[test]
    fn test_media_content_requires_image_type() {
        let raw = item()
            .with_media_content("https://example.com/clip.mp4", Some("video/mp4"))
            .with_media_content("https://example.com/untyped.jpg", None);
        assert_eq!(resolve_image(&raw), None);

        let raw = item().with_media_content("https://example.com/pic.png", Some("image/png"));
        assert_eq!(
            resolve_image(&raw).as_deref(),
            Some("https://example.com/pic.png")
        );
    }

    #[test]
    fn test_img_in_content_with_quotes_stripped() {
        let raw = item().with_content(r#"<p>Intro</p><img class="x" src="https://example.com/i.jpg" alt="">"#);
        assert_eq!(
            resolve_image(&raw).as_deref(),
            Some("https://example.com/i.jpg")
        );
    }

    #[test]
    fn test_img_single_quoted() {
        assert_eq!(
            first_img_src("<IMG SRC='https://example.com/s.gif'>").as_deref(),
            Some("https://example.com/s.gif")
        );
    }

    #[test]
    fn test_img_unquoted_fallback() {
        assert_eq!(
            first_img_src("<img src=https://example.com/u.png width=10>").as_deref(),
            Some("https://example.com/u.png")
        );
    }

    #[test]
    fn test_img_uses_description_when_content_empty() {
        let raw = item().with_description(r#"Text <img src="https://example.com/d.jpg">"#);
        assert_eq!(
            resolve_image(&raw).as_deref(),
            Some("https://example.com/d.jpg")
        );
    }

    #[test]
    fn test_img_content_preferred_over_description() {
        let raw = item()
            .with_description(r#"<img src="https://example.com/desc.jpg">"#)
            .with_content(r#"<img src="https://example.com/content.jpg">"#);
        assert_eq!(
            resolve_image(&raw).as_deref(),
            Some("https://example.com/content.jpg")
        );
    }

    #[test]
    fn test_og_image_in_description() {
        let raw = item()
            .with_content("<p>no pictures here</p>")
            .with_description(r#"<meta property="og:image" content="https://example.com/og.jpg">"#);
        assert_eq!(
            resolve_image(&raw).as_deref(),
            Some("https://example.com/og.jpg")
        );
    }

    #[test]
    fn test_no_image() {
        assert_eq!(resolve_image(&item().with_description("plain text")), None);
    }

    #[test]
    fn test_normalize_text_fields() {
        let long = (1..=40).map(|n| format!("w{n}")).collect::<Vec<_>>().join(" ");
        let raw = RawItem::new("Fish &amp; Chips &#8211; a history", " https://example.com/a ")
            .with_description(format!("<p>{long}</p>"));

        let article = normalize(&raw);
        assert_eq!(article.title, "Fish & Chips \u{2013} a history");
        assert_eq!(article.link, "https://example.com/a");
        assert!(article.description.starts_with("w1 w2"));
        assert!(article.description.ends_with("w30\u{2026}"));
    }

    #[test]
    fn test_normalize_decodes_after_stripping() {
        let raw = item().with_description("<p>5 &lt; 6 &amp; 7 &gt; 3</p>");
        assert_eq!(normalize(&raw).description, "5 < 6 & 7 > 3");
    }

    #[test]
    fn test_normalize_decodes_accented_entities() {
        let raw = RawItem::new("Caf&eacute; M&uuml;ller &middot; na&iuml;ve", "https://example.com/c")
            .with_description("<p>Z&uuml;rich &ccedil;a</p>");

        let article = normalize(&raw);
        assert_eq!(article.title, "Caf\u{e9} M\u{fc}ller \u{b7} na\u{ef}ve");
        assert_eq!(article.description, "Z\u{fc}rich \u{e7}a");
    }

    #[test]
    fn test_normalize_keeps_feed_zone() {
        let published = DateTime::parse_from_rfc2822("Tue, 05 Mar 2024 09:30:00 +0100").unwrap();
        let article = normalize(&item().with_published(published));
        assert_eq!(
            article.pub_date_string().as_deref(),
            Some("2024-03-05 09:30:00")
        );
    }

    #[test]
    fn test_normalize_missing_date() {
        assert!(normalize(&item()).pub_date.is_none());
    }
}
