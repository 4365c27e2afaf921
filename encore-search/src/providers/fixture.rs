//! Fixture-backed search backend for development mode.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use encore_core::{EncoreConfig, LatencyConfig};
use lru::LruCache;
use parking_lot::Mutex;
use rand::Rng;
use tokio::time::Instant;

use super::SearchBackend;
use crate::cache::{CacheStatistics, SearchCache};
use crate::errors::SearchError;
use crate::fixtures::FixtureSet;
use crate::recent::RecentSearches;
use crate::types::{
    Artist, Event, RecentSearch, SearchOptions, SearchPage, SearchResult, rounded_seconds,
};

/// Search backend serving the bundled fixtures.
///
/// Simulates the real API's behavior: a slow "remote" search whose results
/// are cached per normalized query, fast cache hits, and an in-memory search
/// history. Every instance owns its own cache and history.
#[derive(Debug)]
pub struct FixtureBackend {
    fixtures: FixtureSet,
    cache: SearchCache,
    /// search id -> normalized query, for follow-up pages
    sessions: Mutex<LruCache<String, String>>,
    next_search_id: AtomicU64,
    history: Mutex<RecentSearches>,
    latency: LatencyConfig,
    related_artist_limit: usize,
}

impl Default for FixtureBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureBackend {
    /// Bundled fixtures with development defaults and simulated latency.
    pub fn new() -> Self {
        Self::from_config(&EncoreConfig::for_development())
    }

    /// Bundled fixtures with the given limits and latencies.
    pub fn from_config(config: &EncoreConfig) -> Self {
        Self::with_fixtures(FixtureSet::bundled(), config)
    }

    /// Custom dataset with the given limits and latencies.
    pub fn with_fixtures(fixtures: FixtureSet, config: &EncoreConfig) -> Self {
        let search = &config.search;
        let session_capacity = NonZeroUsize::new(search.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        let history = RecentSearches::with_entries(
            search.recent_search_limit,
            fixtures.recent_searches.iter().cloned(),
        );

        Self {
            cache: SearchCache::new(search.cache_ttl, search.cache_capacity),
            sessions: Mutex::new(LruCache::new(session_capacity)),
            next_search_id: AtomicU64::new(1),
            history: Mutex::new(history),
            latency: config.latency.clone(),
            related_artist_limit: search.related_artist_limit,
            fixtures,
        }
    }

    /// The dataset this backend serves.
    pub fn fixtures(&self) -> &FixtureSet {
        &self.fixtures
    }

    /// Hit and miss counters of the search cache.
    pub fn cache_statistics(&self) -> CacheStatistics {
        self.cache.statistics()
    }

    /// Events whose title or artist name contains the normalized query.
    ///
    /// An empty query matches every event.
    fn matching_events(&self, normalized_query: &str) -> Vec<Event> {
        self.fixtures
            .events
            .iter()
            .filter(|event| event.matches(normalized_query))
            .cloned()
            .collect()
    }

    fn remote_search_delay(&self) -> Duration {
        let min = self.latency.remote_search_min;
        let max = self.latency.remote_search_max;
        if max <= min {
            return min;
        }

        let span_ms = (max - min).as_millis() as u64;
        min + Duration::from_millis(rand::rng().random_range(0..=span_ms))
    }

    fn remember_search(&self, key: &str) -> String {
        let search_id = format!(
            "search-{}",
            self.next_search_id.fetch_add(1, Ordering::Relaxed)
        );
        self.sessions.lock().put(search_id.clone(), key.to_string());
        search_id
    }
}

async fn simulate(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

#[async_trait]
impl SearchBackend for FixtureBackend {
    async fn autocomplete_artists(&self, query: &str) -> Result<Vec<Artist>, SearchError> {
        simulate(self.latency.autocomplete).await;

        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let artists: Vec<Artist> = self
            .fixtures
            .artists
            .iter()
            .filter(|artist| artist.matches(&needle))
            .cloned()
            .collect();

        tracing::debug!("Autocomplete '{}' matched {} artists", query, artists.len());
        Ok(artists)
    }

    async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<SearchResult, SearchError> {
        let started = Instant::now();
        let options = options.clamped();
        let key = SearchCache::normalize_key(query);

        let cached = if options.force_refresh {
            None
        } else {
            self.cache.lookup(&key)
        };
        let was_cached = cached.is_some();

        let matches = match cached {
            Some(events) => {
                simulate(self.latency.cache_hit).await;
                events
            }
            None => {
                simulate(self.remote_search_delay()).await;
                let events = self.matching_events(&key);
                self.cache.store(key.clone(), events)
            }
        };

        let page = SearchPage::slice(&matches, options.page, options.page_size);
        let search_id = self.remember_search(&key);
        let search_time = rounded_seconds(started.elapsed());

        tracing::info!(
            "Search '{}' -> {} matches (page {}, cached={}, {:.1}s)",
            query,
            matches.len(),
            options.page,
            was_cached,
            search_time
        );

        Ok(SearchResult {
            search_id,
            query: query.to_string(),
            events: page.events,
            total: matches.len(),
            search_time,
            cached: was_cached,
            page: options.page,
            has_more: page.has_more,
        })
    }

    async fn search_page(
        &self,
        search_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<SearchPage, SearchError> {
        simulate(self.latency.lookup).await;

        let key = self.sessions.lock().get(search_id).cloned();
        let Some(key) = key else {
            tracing::debug!("Unknown search id '{}'", search_id);
            return Ok(SearchPage::default());
        };

        match self.cache.peek(&key) {
            Some(matches) => Ok(SearchPage::slice(&matches, page, page_size)),
            None => {
                tracing::debug!("Search '{}' expired before page {}", search_id, page);
                Ok(SearchPage::default())
            }
        }
    }

    async fn artist(&self, artist_id: &str) -> Result<Option<Artist>, SearchError> {
        simulate(self.latency.lookup).await;
        Ok(self.fixtures.artist(artist_id).cloned())
    }

    async fn event(&self, event_id: &str) -> Result<Option<Event>, SearchError> {
        simulate(self.latency.lookup).await;
        Ok(self.fixtures.event(event_id).cloned())
    }

    async fn artist_events(&self, artist_id: &str) -> Result<Vec<Event>, SearchError> {
        simulate(self.latency.artist_events).await;
        Ok(self
            .fixtures
            .events
            .iter()
            .filter(|event| event.artist_id == artist_id)
            .cloned()
            .collect())
    }

    async fn related_artists(&self, artist_id: &str) -> Result<Vec<Artist>, SearchError> {
        simulate(self.latency.lookup).await;

        let Some(artist) = self.fixtures.artist(artist_id) else {
            return Ok(Vec::new());
        };

        Ok(self
            .fixtures
            .artists
            .iter()
            .filter(|other| other.id != artist.id && other.genre == artist.genre)
            .take(self.related_artist_limit)
            .cloned()
            .collect())
    }

    async fn recent_searches(&self) -> Result<Vec<RecentSearch>, SearchError> {
        simulate(self.latency.recent_read).await;
        Ok(self.history.lock().snapshot())
    }

    async fn save_recent_search(&self, query: &str) -> Result<(), SearchError> {
        simulate(self.latency.recent_write).await;

        let recorded = self.history.lock().record(query, chrono::Utc::now());
        match recorded {
            Some(entry) => tracing::info!("Saved recent search '{}' as {}", entry.query, entry.id),
            None => tracing::debug!("Ignored blank recent search"),
        }
        Ok(())
    }

    async fn delete_recent_search(&self, search_id: &str) -> Result<(), SearchError> {
        simulate(self.latency.recent_write).await;

        if self.history.lock().remove(search_id) {
            tracing::info!("Deleted recent search {}", search_id);
        }
        Ok(())
    }

    async fn clear_recent_searches(&self) -> Result<(), SearchError> {
        simulate(self.latency.recent_write).await;

        let cleared = self.history.lock().clear();
        tracing::info!("Cleared {} recent searches", cleared);
        Ok(())
    }

    async fn popular_artists(&self) -> Result<Vec<Artist>, SearchError> {
        simulate(self.latency.lookup).await;
        Ok(self.fixtures.artists_by_id(&self.fixtures.popular_artist_ids))
    }

    async fn followed_artists(&self) -> Result<Vec<Artist>, SearchError> {
        simulate(self.latency.lookup).await;
        Ok(self.fixtures.artists_by_id(&self.fixtures.followed_artist_ids))
    }

    fn purge_expired_cache(&self) -> usize {
        self.cache.purge_expired()
    }
}
