//! Feed fetcher with security measures.
//!
//! Feeds are retrieved over HTTP with SSRF protection and resource limits,
//! then parsed as RSS first and as any other syndication format second.
//! RSS is read with the `rss` crate so that `<enclosure>` and Media-RSS
//! elements keep their original shape; Atom and friends go through
//! `feed-rs`.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use rss::extension::Extension;

use crate::config::FetchConfig;
use crate::error::{FetchError, NewsError, Result};
use crate::news::types::{Enclosure, MediaContent, ParsedFeed, RawItem};

/// Feed fetcher with security measures.
pub struct FeedFetcher {
    client: Client,
    max_feed_size: u64,
    slow_threshold: Duration,
    allow_private_hosts: bool,
}

impl FeedFetcher {
    /// Create a fetcher from configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| NewsError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_feed_size: config.max_feed_size_bytes,
            slow_threshold: Duration::from_secs_f64(config.slow_threshold_secs.max(0.0)),
            allow_private_hosts: config.allow_private_hosts,
        })
    }

    /// Fetch and parse a feed from the given URL.
    ///
    /// Fetches slower than the configured threshold are logged; they still
    /// return normally.
    pub async fn fetch(&self, url: &str) -> std::result::Result<ParsedFeed, FetchError> {
        let started = Instant::now();
        let result = self.fetch_inner(url).await;
        let elapsed = started.elapsed();

        if elapsed > self.slow_threshold {
            tracing::warn!(
                url = %url,
                elapsed_secs = elapsed.as_secs_f64(),
                "Slow feed fetch detected"
            );
        }

        result
    }

    async fn fetch_inner(&self, url: &str) -> std::result::Result<ParsedFeed, FetchError> {
        if self.allow_private_hosts {
            check_scheme(url)?;
        } else {
            validate_url(url)?;
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_feed_size {
                return Err(FetchError::TooLarge {
                    size: content_length,
                    max: self.max_feed_size,
                });
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(format!("failed to read response: {}", e)))?;

        if bytes.len() as u64 > self.max_feed_size {
            return Err(FetchError::TooLarge {
                size: bytes.len() as u64,
                max: self.max_feed_size,
            });
        }

        parse_feed(&bytes)
    }
}

fn check_scheme(url: &str) -> std::result::Result<url::Url, FetchError> {
    let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(FetchError::InvalidUrl(format!(
            "unsupported URL scheme: {}",
            scheme
        ))),
    }
}

/// Validate a URL for SSRF protection.
///
/// This function checks that:
/// - The URL uses http or https scheme
/// - The host is not a private/loopback address
/// - The host is not a reserved hostname
pub fn validate_url(url: &str) -> std::result::Result<(), FetchError> {
    let parsed = check_scheme(url)?;

    let host = parsed
        .host()
        .ok_or_else(|| FetchError::InvalidUrl("URL has no host".to_string()))?;

    match host {
        url::Host::Domain(domain) => {
            if is_forbidden_hostname(domain) {
                return Err(FetchError::InvalidUrl(format!("forbidden host: {}", domain)));
            }
        }
        url::Host::Ipv4(ipv4) => check_ip(IpAddr::V4(ipv4))?,
        url::Host::Ipv6(ipv6) => check_ip(IpAddr::V6(ipv6))?,
    }

    Ok(())
}

fn check_ip(ip: IpAddr) -> std::result::Result<(), FetchError> {
    if is_private_ip(&ip) {
        Err(FetchError::InvalidUrl(format!(
            "private IP address not allowed: {}",
            ip
        )))
    } else {
        Ok(())
    }
}

fn is_forbidden_hostname(host: &str) -> bool {
    let host_lower = host.to_lowercase();

    if host_lower == "localhost" {
        return true;
    }

    [".local", ".localhost", ".internal", ".intranet", ".corp", ".home", ".lan"]
        .iter()
        .any(|suffix| host_lower.ends_with(suffix))
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            let octets = ipv4.octets();
            ipv4.is_loopback()
                || ipv4.is_private()
                || ipv4.is_link_local()
                || ipv4.is_broadcast()
                || ipv4.is_unspecified()
                // Documentation: 192.0.2.0/24, 198.51.100.0/24, 203.0.113.0/24
                || (octets[0] == 192 && octets[1] == 0 && octets[2] == 2)
                || (octets[0] == 198 && octets[1] == 51 && octets[2] == 100)
                || (octets[0] == 203 && octets[1] == 0 && octets[2] == 113)
        }
        IpAddr::V6(ipv6) => {
            let segments = ipv6.segments();
            ipv6.is_loopback()
                || ipv6.is_unspecified()
                // Unique local: fc00::/7
                || (segments[0] & 0xfe00) == 0xfc00
                // Link-local: fe80::/10
                || (segments[0] & 0xffc0) == 0xfe80
        }
    }
}

/// Parse feed bytes into a [`ParsedFeed`].
pub fn parse_feed(bytes: &[u8]) -> std::result::Result<ParsedFeed, FetchError> {
    match rss::Channel::read_from(bytes) {
        Ok(channel) => Ok(parse_rss_channel(&channel)),
        Err(rss_err) => {
            let feed = feed_rs::parser::parse(bytes).map_err(|e| {
                FetchError::Parse(format!("not RSS ({}) and not a known feed ({})", rss_err, e))
            })?;
            Ok(parse_generic_feed(feed))
        }
    }
}

fn parse_rss_channel(channel: &rss::Channel) -> ParsedFeed {
    let items = channel
        .items()
        .iter()
        .map(|item| {
            let contents = media_elements(item, "content");
            let thumbnails = media_elements(item, "thumbnail");

            // A thumbnail nested in a media element describes that element
            let nested_thumbnail = contents
                .iter()
                .flat_map(|c| c.children().get("thumbnail").into_iter().flatten())
                .find_map(|t| t.attrs().get("url").cloned());

            let enclosure = item.enclosure().map(|e| Enclosure {
                url: Some(e.url().to_string()),
                thumbnail: nested_thumbnail,
            });

            RawItem {
                title: item.title().unwrap_or_default().to_string(),
                link: item.link().unwrap_or_default().to_string(),
                description: item.description().unwrap_or_default().to_string(),
                content: item.content().unwrap_or_default().to_string(),
                published: item.pub_date().and_then(parse_pub_date),
                enclosure,
                media_thumbnail: thumbnails
                    .iter()
                    .find_map(|t| t.attrs().get("url").cloned()),
                media_content: contents
                    .iter()
                    .map(|c| MediaContent {
                        url: c.attrs().get("url").cloned(),
                        mime_type: c.attrs().get("type").cloned(),
                    })
                    .collect(),
            }
        })
        .collect();

    ParsedFeed {
        title: channel.title().to_string(),
        items,
    }
}

/// Media-RSS elements with the given name, including those in `media:group`.
fn media_elements<'a>(item: &'a rss::Item, name: &str) -> Vec<&'a Extension> {
    let Some(media) = item.extensions().get("media") else {
        return Vec::new();
    };
    let top = media.get(name).into_iter().flatten();
    let grouped = media
        .get("group")
        .into_iter()
        .flatten()
        .flat_map(|g| g.children().get(name).into_iter().flatten());
    top.chain(grouped).collect()
}

fn parse_generic_feed(feed: feed_rs::model::Feed) -> ParsedFeed {
    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            let link = entry
                .links
                .iter()
                .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
                .or_else(|| entry.links.first())
                .map(|l| l.href.clone())
                .unwrap_or_default();

            let enclosure = entry
                .links
                .iter()
                .find(|l| l.rel.as_deref() == Some("enclosure"))
                .map(|l| Enclosure {
                    url: Some(l.href.clone()),
                    thumbnail: None,
                });

            let media_thumbnail = entry
                .media
                .iter()
                .flat_map(|m| m.thumbnails.iter())
                .map(|t| t.image.uri.clone())
                .next();

            let media_content = entry
                .media
                .iter()
                .flat_map(|m| m.content.iter())
                .map(|c| MediaContent {
                    url: c.url.as_ref().map(|u| u.to_string()),
                    mime_type: c.content_type.as_ref().map(|m| m.to_string()),
                })
                .collect();

            RawItem {
                title: entry.title.map(|t| t.content).unwrap_or_default(),
                link,
                description: entry.summary.map(|t| t.content).unwrap_or_default(),
                content: entry.content.and_then(|c| c.body).unwrap_or_default(),
                published: entry.published.or(entry.updated).map(|d| d.fixed_offset()),
                enclosure,
                media_thumbnail,
                media_content,
            }
        })
        .collect();

    ParsedFeed {
        title: feed.title.map(|t| t.content).unwrap_or_default(),
        items,
    }
}

/// Parse an RSS `pubDate`, keeping the offset the feed reported.
fn parse_pub_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}
