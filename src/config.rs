//! Process configuration read from the environment at startup.
//!
//! Every knob is an environment variable so the service runs unmodified in
//! a container. `Config` is built once in `main` and shared immutably for
//! the lifetime of the process; nothing re-reads the environment later.
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is absent from the environment.
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is present but cannot be used as-is.
    #[error("Invalid value for {name} ({value:?}): {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Immutable service configuration.
///
/// `source_feed_url` and `site_base` have no sensible defaults and are
/// required; everything else falls back to a working default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream feed to normalize.
    pub source_feed_url: String,
    /// Base URL for resolving relative links in entry bodies.
    pub site_base: String,
    /// Channel title for both output feeds.
    pub feed_title: String,
    /// Channel link for both output feeds.
    pub feed_link: String,
    /// Channel description for both output feeds.
    pub feed_description: String,
    /// Character budget for the restricted (bot) description.
    pub telegram_max: usize,
    /// Cache time-to-live in seconds.
    pub cache_ttl_secs: u64,
    /// TCP port for the HTTP server.
    pub port: u16,
}

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// Fails fast on a missing required variable or a malformed value: a
    /// service that starts with a broken config only fails later, at
    /// request time, which is worse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let source_feed_url = require_url("SOURCE_FEED_URL", &get)?;
        let site_base = require_url("SITE_BASE", &get)?;

        let feed_title = get("FEED_TITLE").unwrap_or_else(|| "Normalized feed".to_string());
        let feed_link = get("FEED_LINK").unwrap_or_else(|| site_base.clone());
        let feed_description = get("FEED_DESCRIPTION")
            .unwrap_or_else(|| "Normalized feed for auto-posting".to_string());

        let telegram_max = parse_var("TELEGRAM_MAX", 4096, &get)?;
        if telegram_max < 2 {
            return Err(ConfigError::Invalid {
                name: "TELEGRAM_MAX",
                value: telegram_max.to_string(),
                reason: "character budget must leave room for text and the ellipsis".to_string(),
            });
        }
        let cache_ttl_secs = parse_var("CACHE_TTL", 600, &get)?;
        let port = parse_var("PORT", 8080, &get)?;

        let config = Config {
            source_feed_url,
            site_base,
            feed_title,
            feed_link,
            feed_description,
            telegram_max,
            cache_ttl_secs,
            port,
        };
        tracing::info!(
            source = %config.source_feed_url,
            ttl_secs = config.cache_ttl_secs,
            port = config.port,
            "Loaded configuration"
        );
        Ok(config)
    }
}

fn require_url(
    name: &'static str,
    get: &impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let value = get(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))?;
    Url::parse(&value).map_err(|e| ConfigError::Invalid {
        name,
        value: value.clone(),
        reason: e.to_string(),
    })?;
    Ok(value)
}

fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    default: T,
    get: &impl Fn(&str) -> Option<String>,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw,
            reason: e.to_string(),
        }),
    }
}
