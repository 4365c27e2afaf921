//! Backend implementations for artist and event search.

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::types::{Artist, Event, RecentSearch, SearchOptions, SearchPage, SearchResult};

pub mod fixture;
pub mod http;

pub use fixture::FixtureBackend;
pub use http::HttpBackend;

/// Trait for search backends.
///
/// Implementations answer the same calls from different sources (bundled
/// fixtures for development, the event API for production), so callers can
/// swap one for the other at construction time.
///
/// Lookup misses are `Ok(None)` or empty collections. Errors are reserved
/// for failures, and a failed call leaves backend state unchanged.
#[async_trait]
pub trait SearchBackend: Send + Sync + std::fmt::Debug {
    /// Artists whose name or Korean name contains `query`, ignoring case.
    ///
    /// A blank query yields no artists.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend rejected the request
    async fn autocomplete_artists(&self, query: &str) -> Result<Vec<Artist>, SearchError>;

    /// Full event search with caching and pagination.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend rejected the request
    /// - `SearchError::Parse` - Response could not be decoded
    async fn search(&self, query: &str, options: SearchOptions)
    -> Result<SearchResult, SearchError>;

    /// Another page of the search identified by `search_id`.
    ///
    /// Unknown or expired searches yield an empty page.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend rejected the request
    async fn search_page(
        &self,
        search_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<SearchPage, SearchError>;

    /// Artist by id, `None` when absent.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend failed for a reason other than absence
    async fn artist(&self, artist_id: &str) -> Result<Option<Artist>, SearchError>;

    /// Event by id, `None` when absent.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend failed for a reason other than absence
    async fn event(&self, event_id: &str) -> Result<Option<Event>, SearchError>;

    /// Every event of an artist, past and upcoming.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend rejected the request
    async fn artist_events(&self, artist_id: &str) -> Result<Vec<Event>, SearchError>;

    /// Other artists sharing the artist's genre, at most six.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend rejected the request
    async fn related_artists(&self, artist_id: &str) -> Result<Vec<Artist>, SearchError>;

    /// Search history, most recent first.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Unauthorized` - No valid user session
    async fn recent_searches(&self) -> Result<Vec<RecentSearch>, SearchError>;

    /// Record a search, moving repeats to the front.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Unauthorized` - No valid user session
    async fn save_recent_search(&self, query: &str) -> Result<(), SearchError>;

    /// Remove one history entry; absent ids are ignored.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Unauthorized` - No valid user session
    async fn delete_recent_search(&self, search_id: &str) -> Result<(), SearchError>;

    /// Remove the whole history.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Unauthorized` - No valid user session
    async fn clear_recent_searches(&self) -> Result<(), SearchError>;

    /// Curated popular artists.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Backend` - Backend rejected the request
    async fn popular_artists(&self) -> Result<Vec<Artist>, SearchError>;

    /// Artists the current user follows.
    ///
    /// # Errors
    /// - `SearchError::Network` - Backend unreachable
    /// - `SearchError::Unauthorized` - No valid user session
    async fn followed_artists(&self) -> Result<Vec<Artist>, SearchError>;

    /// Drop stale cached searches, returning how many were removed.
    ///
    /// Backends without a local cache report zero.
    fn purge_expired_cache(&self) -> usize {
        0
    }
}
