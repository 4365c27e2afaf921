//! Centralized configuration for Encore.
//!
//! All tunable parameters live here so the search backends, the HTTP client
//! and the CLI agree on cache lifetimes, limits and simulated latencies.

use std::time::Duration;

use crate::{EncoreError, RuntimeMode};

/// Central configuration for all Encore components.
///
/// Groups related settings into sections. Supports environment variable
/// overrides through [`EncoreConfig::from_env`].
#[derive(Debug, Clone, Default)]
pub struct EncoreConfig {
    pub mode: RuntimeMode,
    pub search: SearchConfig,
    pub api: ApiConfig,
    pub latency: LatencyConfig,
}

/// Search, cache and history limits.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// How long a cached search result stays fresh
    pub cache_ttl: Duration,
    /// Maximum number of distinct queries kept in the cache
    pub cache_capacity: usize,
    /// Page size used when callers do not pick one
    pub default_page_size: u32,
    /// Maximum entries in the recent-search history
    pub recent_search_limit: usize,
    /// Maximum entries returned for related artists
    pub related_artist_limit: usize,
    /// Result limit sent to the real autocomplete endpoint
    pub autocomplete_limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(24 * 60 * 60),
            cache_capacity: 256,
            default_page_size: 20,
            recent_search_limit: 10,
            related_artist_limit: 6,
            autocomplete_limit: 10,
        }
    }
}

/// Real event API connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the event API, without the `/api/v1` prefix
    pub base_url: String,
    /// Bearer token for user-scoped endpoints
    pub access_token: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: &'static str,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            access_token: None,
            request_timeout: Duration::from_secs(30),
            user_agent: "encore/0.1.0",
        }
    }
}

/// Simulated latencies of the fixture backend.
///
/// Stand-ins for local database and crawl costs so UI flows behave as they
/// will against the real API.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyConfig {
    /// Local artist name lookup
    pub autocomplete: Duration,
    /// Artist, event, related, popular and followed lookups
    pub lookup: Duration,
    /// Per-artist event listing
    pub artist_events: Duration,
    /// Reading the recent-search history
    pub recent_read: Duration,
    /// Saving, deleting or clearing recent searches
    pub recent_write: Duration,
    /// Answering a search from the cache
    pub cache_hit: Duration,
    /// Lower bound of a simulated remote search
    pub remote_search_min: Duration,
    /// Upper bound of a simulated remote search
    pub remote_search_max: Duration,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            autocomplete: Duration::from_millis(300),
            lookup: Duration::from_millis(300),
            artist_events: Duration::from_millis(500),
            recent_read: Duration::from_millis(200),
            recent_write: Duration::from_millis(100),
            cache_hit: Duration::from_millis(100),
            remote_search_min: Duration::from_millis(3000),
            remote_search_max: Duration::from_millis(5000),
        }
    }
}

impl LatencyConfig {
    /// No simulated latency at all.
    pub fn none() -> Self {
        Self {
            autocomplete: Duration::ZERO,
            lookup: Duration::ZERO,
            artist_events: Duration::ZERO,
            recent_read: Duration::ZERO,
            recent_write: Duration::ZERO,
            cache_hit: Duration::ZERO,
            remote_search_min: Duration::ZERO,
            remote_search_max: Duration::ZERO,
        }
    }
}

impl EncoreConfig {
    /// Creates configuration with environment variable overrides.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary variable lookup.
    ///
    /// Unparsable values are ignored and the default is kept.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(flag) = lookup("ENCORE_USE_MOCK_API") {
            config.mode = RuntimeMode::from_mock_flag(Some(&flag));
        }

        // Explicit mode wins over the mock flag
        if let Some(mode) = lookup("ENCORE_MODE")
            && let Ok(mode) = mode.parse::<RuntimeMode>()
        {
            config.mode = mode;
        }

        if let Some(hours) = lookup("ENCORE_SEARCH_CACHE_TTL_HOURS")
            && let Ok(hours) = hours.parse::<u64>()
        {
            config.search.cache_ttl = Duration::from_secs(hours * 60 * 60);
        }

        if let Some(capacity) = lookup("ENCORE_SEARCH_CACHE_CAPACITY")
            && let Ok(capacity) = capacity.parse::<usize>()
        {
            config.search.cache_capacity = capacity;
        }

        if let Some(base_url) = lookup("ENCORE_API_BASE_URL") {
            config.api.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Some(token) = lookup("ENCORE_ACCESS_TOKEN")
            && !token.is_empty()
        {
            config.api.access_token = Some(token);
        }

        if let Some(enabled) = lookup("ENCORE_SIMULATED_LATENCY")
            && !enabled.parse().unwrap_or(true)
        {
            config.latency = LatencyConfig::none();
        }

        config
    }

    /// Creates a configuration optimized for testing.
    pub fn for_testing() -> Self {
        Self {
            mode: RuntimeMode::Development,
            latency: LatencyConfig::none(),
            ..Default::default()
        }
    }

    /// Creates a configuration for development against fixture data.
    pub fn for_development() -> Self {
        Self {
            mode: RuntimeMode::Development,
            ..Default::default()
        }
    }

    /// Checks that limits and URLs are usable.
    ///
    /// # Errors
    /// - `EncoreError::Configuration` - A limit is zero, latency bounds are
    ///   inverted, or the API base URL does not parse
    pub fn validate(&self) -> Result<(), EncoreError> {
        if self.search.default_page_size == 0 {
            return Err(configuration_error("default page size must be at least 1"));
        }
        if self.search.cache_capacity == 0 {
            return Err(configuration_error("search cache capacity must be at least 1"));
        }
        if self.search.recent_search_limit == 0 {
            return Err(configuration_error("recent search limit must be at least 1"));
        }
        if self.latency.remote_search_min > self.latency.remote_search_max {
            return Err(configuration_error(
                "remote search latency minimum exceeds maximum",
            ));
        }
        url::Url::parse(&self.api.base_url).map_err(|e| EncoreError::Configuration {
            reason: format!("invalid API base URL '{}': {e}", self.api.base_url),
        })?;
        Ok(())
    }
}

fn configuration_error(reason: &str) -> EncoreError {
    EncoreError::Configuration {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config_values() {
        let config = EncoreConfig::default();

        assert_eq!(config.mode, RuntimeMode::Development);
        assert_eq!(config.search.cache_ttl, Duration::from_secs(86_400));
        assert_eq!(config.search.default_page_size, 20);
        assert_eq!(config.search.recent_search_limit, 10);
        assert_eq!(config.search.related_artist_limit, 6);
        assert_eq!(config.latency.cache_hit, Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env = vars(&[
            ("ENCORE_USE_MOCK_API", "false"),
            ("ENCORE_SEARCH_CACHE_TTL_HOURS", "2"),
            ("ENCORE_API_BASE_URL", "https://api.example.com/"),
            ("ENCORE_ACCESS_TOKEN", "token-123"),
            ("ENCORE_SIMULATED_LATENCY", "false"),
        ]);
        let config = EncoreConfig::from_vars(|key| env.get(key).cloned());

        assert_eq!(config.mode, RuntimeMode::Production);
        assert_eq!(config.search.cache_ttl, Duration::from_secs(7200));
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.access_token.as_deref(), Some("token-123"));
        assert_eq!(config.latency, LatencyConfig::none());
    }

    #[test]
    fn test_explicit_mode_wins_over_mock_flag() {
        let env = vars(&[("ENCORE_USE_MOCK_API", "false"), ("ENCORE_MODE", "dev")]);
        let config = EncoreConfig::from_vars(|key| env.get(key).cloned());
        assert_eq!(config.mode, RuntimeMode::Development);
    }

    #[test]
    fn test_invalid_overrides_keep_defaults() {
        let env = vars(&[
            ("ENCORE_SEARCH_CACHE_CAPACITY", "lots"),
            ("ENCORE_MODE", "staging"),
        ]);
        let config = EncoreConfig::from_vars(|key| env.get(key).cloned());
        assert_eq!(config.search.cache_capacity, 256);
        assert_eq!(config.mode, RuntimeMode::Development);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = EncoreConfig::for_testing();
        config.search.default_page_size = 0;
        assert!(matches!(
            config.validate(),
            Err(EncoreError::Configuration { .. })
        ));

        let mut config = EncoreConfig::for_testing();
        config.latency.remote_search_min = Duration::from_secs(5);
        config.latency.remote_search_max = Duration::from_secs(1);
        assert!(config.validate().is_err());

        let mut config = EncoreConfig::for_testing();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
