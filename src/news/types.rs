//! News types for newsdesk.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Number of articles returned when the caller does not ask for a count.
pub const DEFAULT_COUNT: usize = 5;

/// Largest count a single request may ask for.
pub const MAX_COUNT: usize = 50;

/// Category used when the caller does not name one.
pub const DEFAULT_CATEGORY: &str = "all";

/// Word limit for normalized descriptions.
pub const DESCRIPTION_WORD_LIMIT: usize = 30;

/// Raw items requested per article when ranking is enabled.
pub const RANKING_OVERFETCH_FACTOR: usize = 3;

/// Canonical publication date format.
pub const PUB_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A configured feed source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDescriptor {
    /// Category slug.
    #[serde(default)]
    pub id: String,
    /// Human-readable label.
    #[serde(default)]
    pub label: String,
    /// Feed URL.
    #[serde(default)]
    pub url: String,
    /// Whether the feed is offered to callers.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl FeedDescriptor {
    /// Create an enabled descriptor.
    pub fn new(id: impl Into<String>, label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            url: url.into(),
            enabled: true,
        }
    }

    /// Set whether the descriptor is enabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// A `{value, label}` pair used to populate category pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedOption {
    /// Category slug.
    pub value: String,
    /// Display label.
    pub label: String,
}

/// A normalized news article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Title with entities decoded.
    pub title: String,
    /// Article URL.
    pub link: String,
    /// Plain-text description of at most 30 words.
    pub description: String,
    /// Publication time in the feed's own zone.
    #[serde(rename = "pubDate", default, with = "pub_date_format")]
    pub pub_date: Option<NaiveDateTime>,
    /// Representative image URL.
    pub image: Option<String>,
}

impl Article {
    /// Create an article with no date and no image.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: description.into(),
            pub_date: None,
            image: None,
        }
    }

    /// Set the publication time.
    pub fn with_pub_date(mut self, pub_date: NaiveDateTime) -> Self {
        self.pub_date = Some(pub_date);
        self
    }

    /// Set the image URL.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Publication time in canonical `YYYY-MM-DD HH:MM:SS` form.
    pub fn pub_date_string(&self) -> Option<String> {
        self.pub_date
            .map(|d| d.format(PUB_DATE_FORMAT).to_string())
    }
}

/// Serde adapter for the canonical publication date string.
mod pub_date_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::PUB_DATE_FORMAT;

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(PUB_DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(s) => NaiveDateTime::parse_from_str(&s, PUB_DATE_FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

/// A declared media enclosure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enclosure {
    /// Direct link to the enclosed media.
    pub url: Option<String>,
    /// Thumbnail describing the enclosed media.
    pub thumbnail: Option<String>,
}

/// A Media-RSS `content` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaContent {
    /// The `url` attribute.
    pub url: Option<String>,
    /// The declared `type` attribute.
    pub mime_type: Option<String>,
}

/// A feed entry as parsed, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    /// Title as it appears in the feed (entities intact).
    pub title: String,
    /// Entry link.
    pub link: String,
    /// Raw description or summary markup.
    pub description: String,
    /// Raw full content markup (`content:encoded` or Atom content).
    pub content: String,
    /// Publication time with the feed's offset.
    pub published: Option<DateTime<FixedOffset>>,
    /// Declared enclosure.
    pub enclosure: Option<Enclosure>,
    /// First Media-RSS thumbnail URL.
    pub media_thumbnail: Option<String>,
    /// Media-RSS content elements, in document order.
    pub media_content: Vec<MediaContent>,
}

impl RawItem {
    /// Create a raw item with the given title and link.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            ..Default::default()
        }
    }

    /// Set the description markup.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the content markup.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Set the publication time.
    pub fn with_published(mut self, published: DateTime<FixedOffset>) -> Self {
        self.published = Some(published);
        self
    }

    /// Set the enclosure.
    pub fn with_enclosure(mut self, url: Option<&str>, thumbnail: Option<&str>) -> Self {
        self.enclosure = Some(Enclosure {
            url: url.map(str::to_string),
            thumbnail: thumbnail.map(str::to_string),
        });
        self
    }

    /// Set the Media-RSS thumbnail.
    pub fn with_media_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.media_thumbnail = Some(url.into());
        self
    }

    /// Append a Media-RSS content element.
    pub fn with_media_content(mut self, url: impl Into<String>, mime_type: Option<&str>) -> Self {
        self.media_content.push(MediaContent {
            url: Some(url.into()),
            mime_type: mime_type.map(str::to_string),
        });
        self
    }
}

/// Parsed feed data from fetching.
#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    /// Feed title.
    pub title: String,
    /// Items in document order.
    pub items: Vec<RawItem>,
}
