//! Configuration module for newsdesk.

use serde::Deserialize;
use std::path::Path;

use crate::news::FeedDescriptor;
use crate::{NewsError, Result};

/// Environment variable that overrides the ranking API key.
pub const ENV_RANKING_API_KEY: &str = "NEWSDESK_RANKING_API_KEY";

/// Environment variable naming a file that holds the ranking API key.
pub const ENV_RANKING_API_KEY_FILE: &str = "NEWSDESK_RANKING_API_KEY_FILE";

/// Environment variable that overrides the identity salt.
pub const ENV_IDENTITY_SALT: &str = "NEWSDESK_IDENTITY_SALT";

/// Read-only view of the settings the aggregation core depends on.
///
/// The core never writes configuration; it asks for the current values on
/// every request.
pub trait ConfigProvider: Send + Sync {
    /// Configured feed descriptors, in configured order.
    fn feed_descriptors(&self) -> Vec<FeedDescriptor>;

    /// Credential for the ranking service, if one is configured.
    fn ranking_credential(&self) -> Option<String>;
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins. Empty means any origin without credentials.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/newsdesk.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Feed fetching configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum number of redirects.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Maximum feed size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
    /// User agent sent with feed requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Fetches slower than this are logged as slow.
    #[serde(default = "default_fetch_slow_threshold")]
    pub slow_threshold_secs: f64,
    /// Skip the private-address check (local development only).
    #[serde(default)]
    pub allow_private_hosts: bool,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    20
}

fn default_total_timeout() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_feed_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_user_agent() -> String {
    format!("newsdesk/{} (News Aggregator)", env!("CARGO_PKG_VERSION"))
}

fn default_fetch_slow_threshold() -> f64 {
    2.0
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_redirects: default_max_redirects(),
            max_feed_size_bytes: default_max_feed_size(),
            user_agent: default_user_agent(),
            slow_threshold_secs: default_fetch_slow_threshold(),
            allow_private_hosts: false,
        }
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime in seconds, applied to both tiers.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    /// Path to the SQLite file backing the durable tier.
    #[serde(default = "default_durable_path")]
    pub durable_path: String,
    /// Soft cap on fast-tier entries before expired ones are swept.
    #[serde(default = "default_fast_capacity")]
    pub fast_capacity: usize,
}

fn default_cache_ttl() -> u64 {
    900 // 15 minutes
}

fn default_durable_path() -> String {
    "data/newsdesk-cache.db".to_string()
}

fn default_fast_capacity() -> usize {
    1024
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            durable_path: default_durable_path(),
            fast_capacity: default_fast_capacity(),
        }
    }
}

/// Relevance ranking configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    /// API key for the ranking service. Ranking is skipped when unset.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Chat completions endpoint.
    #[serde(default = "default_ranking_endpoint")]
    pub endpoint: String,
    /// Model name sent with each request.
    #[serde(default = "default_ranking_model")]
    pub model: String,
    /// Sampling temperature.
    #[serde(default = "default_ranking_temperature")]
    pub temperature: f32,
    /// Hard request timeout in seconds.
    #[serde(default = "default_ranking_timeout")]
    pub timeout_secs: u64,
    /// Calls allowed per identity per window.
    #[serde(default = "default_max_calls")]
    pub max_calls_per_window: u32,
    /// Quota window length in seconds.
    #[serde(default = "default_window")]
    pub window_secs: u64,
    /// Calls slower than this are logged as slow.
    #[serde(default = "default_ranking_slow_threshold")]
    pub slow_threshold_secs: f64,
}

fn default_ranking_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_ranking_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_ranking_temperature() -> f32 {
    0.3
}

fn default_ranking_timeout() -> u64 {
    30
}

fn default_max_calls() -> u32 {
    100
}

fn default_window() -> u64 {
    3600 // 1 hour
}

fn default_ranking_slow_threshold() -> f64 {
    5.0
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_ranking_endpoint(),
            model: default_ranking_model(),
            temperature: default_ranking_temperature(),
            timeout_secs: default_ranking_timeout(),
            max_calls_per_window: default_max_calls(),
            window_secs: default_window(),
            slow_threshold_secs: default_ranking_slow_threshold(),
        }
    }
}

/// Caller identity configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct IdentityConfig {
    /// Salt mixed into hashed guest addresses.
    #[serde(default)]
    pub salt: String,
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Feed fetching configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Result cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Relevance ranking configuration.
    #[serde(default)]
    pub ranking: RankingConfig,
    /// Caller identity configuration.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Configured feeds, in precedence order.
    #[serde(default)]
    pub feeds: Vec<FeedDescriptor>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(NewsError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| NewsError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `NEWSDESK_RANKING_API_KEY`: ranking API key (highest priority)
    /// - `NEWSDESK_RANKING_API_KEY_FILE`: file holding the key; a readable,
    ///   non-empty file takes precedence over `ranking.api_key`
    /// - `NEWSDESK_IDENTITY_SALT`: salt for hashed guest addresses
    ///
    /// Call after logging is initialized so an unreadable key file is
    /// reported.
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = non_empty_env(ENV_RANKING_API_KEY) {
            self.ranking.api_key = Some(key);
        } else if let Some(key) = non_empty_env(ENV_RANKING_API_KEY_FILE)
            .as_deref()
            .and_then(read_key_file)
        {
            self.ranking.api_key = Some(key);
        }

        if let Some(salt) = non_empty_env(ENV_IDENTITY_SALT) {
            self.identity.salt = salt;
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the cache TTL, quota or quota window is zero
    /// - an enabled feed has an empty id or url
    pub fn validate(&self) -> Result<()> {
        if self.cache.ttl_secs == 0 {
            return Err(NewsError::Config("cache.ttl_secs must be positive".to_string()));
        }
        if self.ranking.max_calls_per_window == 0 || self.ranking.window_secs == 0 {
            return Err(NewsError::Config(
                "ranking quota and window must be positive".to_string(),
            ));
        }
        if let Some(feed) = self
            .feeds
            .iter()
            .find(|f| f.enabled && (f.id.trim().is_empty() || f.url.trim().is_empty()))
        {
            return Err(NewsError::Config(format!(
                "enabled feed '{}' needs both an id and a url",
                feed.label
            )));
        }
        Ok(())
    }
}

impl ConfigProvider for Config {
    fn feed_descriptors(&self) -> Vec<FeedDescriptor> {
        self.feeds.clone()
    }

    fn ranking_credential(&self) -> Option<String> {
        self.ranking
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
    }
}

fn read_key_file(path: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Some(contents.trim().to_string()).filter(|k| !k.is_empty()),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Failed to read ranking key file");
            None
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
