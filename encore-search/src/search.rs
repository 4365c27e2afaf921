//! Artist and event search entry point
//!
//! Wraps a [`SearchBackend`] chosen once at construction, so callers never
//! branch on whether they talk to fixtures or the event API.

use std::sync::Arc;

use encore_core::{EncoreConfig, RuntimeMode};

use crate::errors::SearchError;
use crate::providers::{FixtureBackend, HttpBackend, SearchBackend};
use crate::types::{Artist, Event, RecentSearch, SearchOptions, SearchPage, SearchResult};

/// Artist and event search over a swappable backend.
///
/// Cheap to clone; clones share the backend and therefore its cache and
/// history.
#[derive(Debug, Clone)]
pub struct EventSearch {
    backend: Arc<dyn SearchBackend>,
    default_page_size: u32,
}

impl EventSearch {
    /// Search over an existing backend with the default page size.
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            default_page_size: EncoreConfig::default().search.default_page_size,
        }
    }

    /// Search with the backend matching the configured runtime mode.
    ///
    /// Development mode serves bundled fixtures, production mode talks to
    /// the event API.
    ///
    /// # Errors
    /// - `SearchError::InvalidConfiguration` - Configuration fails validation
    ///   or the HTTP client cannot be built
    pub fn from_config(config: &EncoreConfig) -> Result<Self, SearchError> {
        config
            .validate()
            .map_err(|e| SearchError::InvalidConfiguration {
                reason: e.to_string(),
            })?;

        let backend: Arc<dyn SearchBackend> = match config.mode {
            RuntimeMode::Development => Arc::new(FixtureBackend::from_config(config)),
            RuntimeMode::Production => Arc::new(HttpBackend::from_config(config)?),
        };
        tracing::info!("Event search running in {} mode", config.mode);

        Ok(Self {
            backend,
            default_page_size: config.search.default_page_size,
        })
    }

    /// Search with isolated fixture state and no simulated latency.
    pub fn for_testing() -> Self {
        let config = EncoreConfig::for_testing();
        Self {
            backend: Arc::new(FixtureBackend::from_config(&config)),
            default_page_size: config.search.default_page_size,
        }
    }

    /// The backend serving this search.
    pub fn backend(&self) -> &Arc<dyn SearchBackend> {
        &self.backend
    }

    /// Page size used when the caller does not pick one.
    pub fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    /// Artists whose name or Korean name contains `query`.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend rejected the request
    pub async fn autocomplete_artists(&self, query: &str) -> Result<Vec<Artist>, SearchError> {
        self.backend.autocomplete_artists(query).await
    }

    /// First page of events matching `query` at the default page size.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend rejected the request
    /// - `SearchError::Parse` - Response could not be decoded
    pub async fn search(&self, query: &str) -> Result<SearchResult, SearchError> {
        self.search_with(query, SearchOptions::page(1, self.default_page_size))
            .await
    }

    /// Events matching `query` with explicit paging and refresh options.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend rejected the request
    /// - `SearchError::Parse` - Response could not be decoded
    pub async fn search_with(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<SearchResult, SearchError> {
        let result = self.backend.search(query, options).await;
        if let Err(e) = &result {
            tracing::warn!("Search '{}' failed: {}", query, e);
        }
        result
    }

    /// Every match of `query`, fetched `page_size` events at a time until
    /// no pages are left.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend rejected the request
    /// - `SearchError::Parse` - Response could not be decoded
    pub async fn search_all(&self, query: &str, page_size: u32) -> Result<Vec<Event>, SearchError> {
        let page_size = page_size.max(1);
        let first = self
            .search_with(query, SearchOptions::page(1, page_size))
            .await?;
        let mut events = first.events;
        let mut has_more = first.has_more;
        let mut page = first.page;

        while has_more {
            page += 1;
            let next = self
                .backend
                .search_page(&first.search_id, page, page_size)
                .await?;
            if next.events.is_empty() {
                break;
            }
            events.extend(next.events);
            has_more = next.has_more;
        }

        tracing::debug!("Collected {} events for '{}'", events.len(), query);
        Ok(events)
    }

    /// Another page of an earlier search.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend rejected the request
    pub async fn search_page(
        &self,
        search_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<SearchPage, SearchError> {
        self.backend.search_page(search_id, page, page_size).await
    }

    /// Artist by id.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend failed for a reason other than absence
    pub async fn artist(&self, artist_id: &str) -> Result<Option<Artist>, SearchError> {
        self.backend.artist(artist_id).await
    }

    /// Event by id.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend failed for a reason other than absence
    pub async fn event(&self, event_id: &str) -> Result<Option<Event>, SearchError> {
        self.backend.event(event_id).await
    }

    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend rejected the request
    pub async fn artist_events(&self, artist_id: &str) -> Result<Vec<Event>, SearchError> {
        self.backend.artist_events(artist_id).await
    }

    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend rejected the request
    pub async fn related_artists(&self, artist_id: &str) -> Result<Vec<Artist>, SearchError> {
        self.backend.related_artists(artist_id).await
    }

    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Unauthorized` - No valid user session
    pub async fn recent_searches(&self) -> Result<Vec<RecentSearch>, SearchError> {
        self.backend.recent_searches().await
    }

    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Unauthorized` - No valid user session
    pub async fn save_recent_search(&self, query: &str) -> Result<(), SearchError> {
        self.backend.save_recent_search(query).await
    }

    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Unauthorized` - No valid user session
    pub async fn delete_recent_search(&self, search_id: &str) -> Result<(), SearchError> {
        self.backend.delete_recent_search(search_id).await
    }

    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Unauthorized` - No valid user session
    pub async fn clear_recent_searches(&self) -> Result<(), SearchError> {
        self.backend.clear_recent_searches().await
    }

    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend rejected the request
    pub async fn popular_artists(&self) -> Result<Vec<Artist>, SearchError> {
        self.backend.popular_artists().await
    }

    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Unauthorized` - No valid user session
    pub async fn followed_artists(&self) -> Result<Vec<Artist>, SearchError> {
        self.backend.followed_artists().await
    }

    /// Drop stale cached searches, returning how many were removed.
    pub fn purge_expired_cache(&self) -> usize {
        self.backend.purge_expired_cache()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_development_mode_serves_fixtures() {
        let mut config = EncoreConfig::for_testing();
        config.mode = RuntimeMode::Development;
        let search = EventSearch::from_config(&config).unwrap();

        let popular = search.popular_artists().await.unwrap();
        assert_eq!(popular.len(), 6);
    }

    #[test]
    fn test_production_mode_builds_http_backend() {
        let mut config = EncoreConfig::for_testing();
        config.mode = RuntimeMode::Production;
        config.api.base_url = "https://events.example.com".to_string();

        let search = EventSearch::from_config(&config).unwrap();
        assert!(format!("{:?}", search.backend()).contains("HttpBackend"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EncoreConfig::for_testing();
        config.search.default_page_size = 0;

        let error = EventSearch::from_config(&config).unwrap_err();
        assert!(matches!(error, SearchError::InvalidConfiguration { .. }));
    }

    #[tokio::test]
    async fn test_search_uses_default_page_size() {
        let search = EventSearch::for_testing();
        let result = search.search("").await.unwrap();

        assert_eq!(result.page, 1);
        assert_eq!(result.events.len(), 10);
        assert!(!result.has_more);
    }

    #[tokio::test]
    async fn test_search_all_follows_pages() {
        let mut config = EncoreConfig::for_testing();
        config.search.default_page_size = 3;
        let search = EventSearch::from_config(&config).unwrap();

        let events = search.search_all("", search.default_page_size()).await.unwrap();
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), 10);
        assert_eq!(ids[0], "event-1");
        assert_eq!(ids[9], "event-10");
    }

    #[tokio::test]
    async fn test_search_all_honors_page_size() {
        let search = EventSearch::for_testing();

        let events = search.search_all("", 4).await.unwrap();
        let everything = search.search_all("", 20).await.unwrap();
        assert_eq!(events.len(), 10);
        assert_eq!(events, everything);

        let clamped = search.search_all("BTS", 0).await.unwrap();
        assert_eq!(clamped, search.search_all("BTS", 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let search = EventSearch::for_testing();
        let clone = search.clone();

        search.clear_recent_searches().await.unwrap();
        assert!(clone.recent_searches().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired_cache() {
        let search = EventSearch::for_testing();
        search.search("BTS").await.unwrap();
        search.search("IU").await.unwrap();
        assert_eq!(search.purge_expired_cache(), 0);

        tokio::time::advance(Duration::from_secs(24 * 60 * 60)).await;
        assert_eq!(search.purge_expired_cache(), 2);
    }
}
