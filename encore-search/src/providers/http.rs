//! Event API search backend for production use.

use std::num::NonZeroUsize;

use async_trait::async_trait;
use encore_core::EncoreConfig;
use lru::LruCache;
use parking_lot::Mutex;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::SearchBackend;
use crate::errors::SearchError;
use crate::types::{Artist, Event, RecentSearch, SearchOptions, SearchPage, SearchResult};

/// Search backend talking to the event API over HTTP.
///
/// Caching, ranking and history live on the server; this client only keeps
/// a bounded map from search ids to queries so later pages can be requested.
#[derive(Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    autocomplete_limit: u32,
    sessions: Mutex<LruCache<String, String>>,
}

/// List endpoints wrap their items in `data`; paging fields are ignored.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: Vec<T>,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    force_refresh: bool,
}

#[derive(Debug, Serialize)]
struct SaveRecentSearchRequest<'a> {
    query: &'a str,
}

impl HttpBackend {
    /// Create a backend from the API section of the configuration.
    ///
    /// # Errors
    /// - `SearchError::InvalidConfiguration` - The HTTP client cannot be built
    pub fn from_config(config: &EncoreConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(config.api.request_timeout)
            .user_agent(config.api.user_agent)
            .build()
            .map_err(|e| SearchError::InvalidConfiguration {
                reason: format!("HTTP client setup failed: {e}"),
            })?;

        let session_capacity =
            NonZeroUsize::new(config.search.cache_capacity).unwrap_or(NonZeroUsize::MIN);

        Ok(Self {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            access_token: config.api.access_token.clone(),
            autocomplete_limit: config.search.autocomplete_limit,
            sessions: Mutex::new(LruCache::new(session_capacity)),
        })
    }

    /// Create a backend for `base_url` with default settings.
    ///
    /// # Errors
    /// - `SearchError::InvalidConfiguration` - The HTTP client cannot be built
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SearchError> {
        let mut config = EncoreConfig::default();
        config.api.base_url = base_url.into();
        Self::from_config(&config)
    }

    /// Same backend authenticating with a bearer token.
    pub fn with_access_token(self, token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            ..self
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.endpoint(path));
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, SearchError> {
        builder.send().await.map_err(|e| {
            tracing::warn!("Event API request failed: {}", e);
            SearchError::from(e)
        })
    }

    /// Sends the request and rejects non-success statuses.
    async fn send_checked(&self, builder: RequestBuilder) -> Result<Response, SearchError> {
        let response = self.send(builder).await?;
        ensure_success(response).await
    }

    async fn fetch_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, SearchError> {
        let response = self.send_checked(builder).await?;
        decode(response).await
    }

    /// Like `fetch_json`, but a 404 is `Ok(None)`.
    async fn fetch_optional<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Option<T>, SearchError> {
        let response = self.send(builder).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response).await?;
        decode(response).await.map(Some)
    }

    async fn fetch_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, SearchError> {
        let envelope: DataEnvelope<T> = self.fetch_json(self.request(Method::GET, path)).await?;
        Ok(envelope.data)
    }
}

async fn ensure_success(response: Response) -> Result<Response, SearchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let reason = if body.is_empty() {
        status.to_string()
    } else {
        body
    };
    tracing::warn!("Event API answered {}: {}", status, reason);

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(SearchError::Unauthorized { reason })
    } else {
        Err(SearchError::Backend {
            status: status.as_u16(),
            reason,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SearchError> {
    response.json().await.map_err(|e| {
        tracing::warn!("Event API response did not decode: {}", e);
        SearchError::from(e)
    })
}

fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

#[async_trait]
impl SearchBackend for HttpBackend {
    async fn autocomplete_artists(&self, query: &str) -> Result<Vec<Artist>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let limit = self.autocomplete_limit.to_string();
        let builder = self
            .request(Method::GET, "/search/autocomplete")
            .query(&[("q", query), ("limit", limit.as_str())]);
        let envelope: DataEnvelope<Artist> = self.fetch_json(builder).await?;
        Ok(envelope.data)
    }

    async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<SearchResult, SearchError> {
        let options = options.clamped();
        let builder = self
            .request(Method::POST, "/search")
            .query(&[("page", options.page), ("per_page", options.page_size)])
            .json(&SearchRequest {
                query,
                force_refresh: options.force_refresh,
            });

        let result: SearchResult = self.fetch_json(builder).await?;
        self.sessions
            .lock()
            .put(result.search_id.clone(), query.to_string());

        tracing::info!(
            "Search '{}' -> {} matches (page {}, cached={})",
            query,
            result.total,
            result.page,
            result.cached
        );
        Ok(result)
    }

    async fn search_page(
        &self,
        search_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<SearchPage, SearchError> {
        let query = self.sessions.lock().get(search_id).cloned();
        let Some(query) = query else {
            tracing::debug!("Unknown search id '{}'", search_id);
            return Ok(SearchPage::default());
        };

        // The server cache makes repeating the query cheap
        let result = self
            .search(&query, SearchOptions::page(page, page_size))
            .await?;
        Ok(SearchPage {
            events: result.events,
            has_more: result.has_more,
        })
    }

    async fn artist(&self, artist_id: &str) -> Result<Option<Artist>, SearchError> {
        let path = format!("/artists/{}", segment(artist_id));
        self.fetch_optional(self.request(Method::GET, &path)).await
    }

    async fn event(&self, event_id: &str) -> Result<Option<Event>, SearchError> {
        let path = format!("/events/{}", segment(event_id));
        self.fetch_optional(self.request(Method::GET, &path)).await
    }

    async fn artist_events(&self, artist_id: &str) -> Result<Vec<Event>, SearchError> {
        self.fetch_list(&format!("/artists/{}/events", segment(artist_id)))
            .await
    }

    async fn related_artists(&self, artist_id: &str) -> Result<Vec<Artist>, SearchError> {
        self.fetch_list(&format!("/artists/{}/related", segment(artist_id)))
            .await
    }

    async fn recent_searches(&self) -> Result<Vec<RecentSearch>, SearchError> {
        self.fetch_list("/search/recent").await
    }

    async fn save_recent_search(&self, query: &str) -> Result<(), SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        let builder = self
            .request(Method::POST, "/search/recent")
            .json(&SaveRecentSearchRequest { query });
        self.send_checked(builder).await?;
        Ok(())
    }

    async fn delete_recent_search(&self, search_id: &str) -> Result<(), SearchError> {
        let path = format!("/search/recent/{}", segment(search_id));
        let response = self.send(self.request(Method::DELETE, &path)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("Recent search {} already gone", search_id);
            return Ok(());
        }
        ensure_success(response).await?;
        Ok(())
    }

    async fn clear_recent_searches(&self) -> Result<(), SearchError> {
        self.send_checked(self.request(Method::DELETE, "/search/recent"))
            .await?;
        Ok(())
    }

    async fn popular_artists(&self) -> Result<Vec<Artist>, SearchError> {
        self.fetch_list("/artists").await
    }

    async fn followed_artists(&self) -> Result<Vec<Artist>, SearchError> {
        self.fetch_list("/users/me/artists").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on the discard port, so any request would fail
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    #[test]
    fn test_endpoint_building() {
        let backend = HttpBackend::with_base_url("https://api.example.com/").unwrap();
        assert_eq!(
            backend.endpoint("/search/recent"),
            "https://api.example.com/api/v1/search/recent"
        );
    }

    #[test]
    fn test_ids_are_path_encoded() {
        assert_eq!(segment("artist-1"), "artist-1");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }

    #[tokio::test]
    async fn test_blank_queries_skip_the_network() {
        let backend = HttpBackend::with_base_url(UNREACHABLE).unwrap();

        assert!(backend.autocomplete_artists("   ").await.unwrap().is_empty());
        backend.save_recent_search("").await.unwrap();
        assert_eq!(
            backend.search_page("search-1", 2, 20).await.unwrap(),
            SearchPage::default()
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let backend = HttpBackend::with_base_url(UNREACHABLE).unwrap();
        let error = backend.popular_artists().await.unwrap_err();

        assert!(matches!(error, SearchError::Network { .. }));
        assert!(error.is_retryable());
    }
}
