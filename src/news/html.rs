//! Plain-text helpers for feed markup.

use html_escape::decode_html_entities;

/// Remove markup tags, collapsing runs of whitespace to single spaces.
///
/// Entities are left encoded; see [`decode_entities`].
pub fn strip_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;

    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                // Adjacent block elements should not glue words together
                result.push(' ');
            }
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    result.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Decode HTML entities.
///
/// Covers the full HTML5 named set and numeric references. Anything
/// unrecognized is kept verbatim.
pub fn decode_entities(text: &str) -> String {
    decode_html_entities(text).into_owned()
}

/// Keep the first `limit` words, appending an ellipsis when any were cut.
pub fn trim_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > limit {
        format!("{}\u{2026}", words[..limit].join(" "))
    } else {
        words.join(" ")
    }
}
