//! HTTP backend against a stub event API

use std::sync::Arc;

use encore_core::{EncoreConfig, RuntimeMode};
use encore_search::{
    Event, EventSearch, FixtureSet, HttpBackend, SearchBackend, SearchError, SearchOptions,
    SearchResult,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::with_base_url(server.uri()).unwrap()
}

fn newjeans_events() -> Vec<Event> {
    FixtureSet::bundled()
        .events
        .into_iter()
        .filter(|e| e.artist_id == "artist-3")
        .collect()
}

fn search_result(search_id: &str, page: u32, events: Vec<Event>, has_more: bool) -> SearchResult {
    SearchResult {
        search_id: search_id.to_string(),
        query: "NewJeans".to_string(),
        events,
        total: 3,
        search_time: 3.42,
        cached: false,
        page,
        has_more,
    }
}

#[tokio::test]
async fn test_artist_lookup() {
    let server = MockServer::start().await;
    let artist = FixtureSet::bundled().artists[2].clone();

    Mock::given(method("GET"))
        .and(path("/api/v1/artists/artist-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&artist))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/artists/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let backend = backend(&server);
    assert_eq!(backend.artist("artist-3").await.unwrap(), Some(artist));
    assert_eq!(backend.artist("missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_server_failure_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/events/event-1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&server)
        .await;

    let error = backend(&server).event("event-1").await.unwrap_err();
    match &error {
        SearchError::Backend { status, reason } => {
            assert_eq!(*status, 500);
            assert_eq!(reason, "database unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(error.is_retryable());
}

#[tokio::test]
async fn test_autocomplete_sends_query_and_limit() {
    let server = MockServer::start().await;
    let artist = FixtureSet::bundled().artists[2].clone();

    Mock::given(method("GET"))
        .and(path("/api/v1/search/autocomplete"))
        .and(query_param("q", "뉴진"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [artist] })))
        .expect(1)
        .mount(&server)
        .await;

    let found = backend(&server).autocomplete_artists(" 뉴진 ").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "NewJeans");
}

#[tokio::test]
async fn test_search_and_follow_up_page() {
    let server = MockServer::start().await;
    let events = newjeans_events();

    Mock::given(method("POST"))
        .and(path("/api/v1/search"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "2"))
        .and(body_json(json!({ "query": "NewJeans", "force_refresh": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_result(
            "b7f3",
            1,
            events[..2].to_vec(),
            true,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/search"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_result(
            "c9a1",
            2,
            events[2..].to_vec(),
            false,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server);
    let first = backend
        .search("NewJeans", SearchOptions::page(1, 2))
        .await
        .unwrap();
    assert_eq!(first.search_id, "b7f3");
    assert_eq!(first.total, 3);
    assert!(first.has_more);

    let next = backend.search_page("b7f3", 2, 2).await.unwrap();
    assert_eq!(next.events, events[2..]);
    assert!(!next.has_more);
}

#[tokio::test]
async fn test_force_refresh_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/search"))
        .and(body_json(json!({ "query": "IU", "force_refresh": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_result(
            "d4e5",
            1,
            Vec::new(),
            false,
        )))
        .expect(1)
        .mount(&server)
        .await;

    backend(&server)
        .search("IU", SearchOptions::default().refreshed())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_malformed_payload_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/artists"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let error = backend(&server).popular_artists().await.unwrap_err();
    assert!(matches!(error, SearchError::Parse { .. }));
    assert!(!error.is_retryable());
}

#[tokio::test]
async fn test_bearer_token_and_unauthorized() {
    let server = MockServer::start().await;
    let followed = FixtureSet::bundled().artists[..2].to_vec();

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me/artists"))
        .and(header("authorization", "Bearer fan-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": followed,
            "total": 2,
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/me/artists"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Not authenticated"))
        .mount(&server)
        .await;

    let anonymous = backend(&server);
    let error = anonymous.followed_artists().await.unwrap_err();
    assert!(matches!(error, SearchError::Unauthorized { .. }));

    let signed_in = backend(&server).with_access_token("fan-token");
    assert_eq!(signed_in.followed_artists().await.unwrap(), followed);
}

#[tokio::test]
async fn test_recent_search_endpoints() {
    let server = MockServer::start().await;
    let history = FixtureSet::bundled().recent_searches;

    Mock::given(method("GET"))
        .and(path("/api/v1/search/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": history })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/search/recent"))
        .and(body_json(json!({ "query": "aespa" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(&history[2]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/search/recent/rs-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/search/recent/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/search/recent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "cleared" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server);
    assert_eq!(backend.recent_searches().await.unwrap(), history);
    backend.save_recent_search(" aespa ").await.unwrap();
    backend.delete_recent_search("rs-1").await.unwrap();
    backend.delete_recent_search("gone").await.unwrap();
    backend.clear_recent_searches().await.unwrap();
}

#[tokio::test]
async fn test_artist_relations() {
    let server = MockServer::start().await;
    let fixtures = FixtureSet::bundled();
    let related = fixtures.artists[3..5].to_vec();

    Mock::given(method("GET"))
        .and(path("/api/v1/artists/artist-3/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": newjeans_events(),
            "total": 3,
            "page": 1,
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/artists/artist-3/related"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": related })))
        .mount(&server)
        .await;

    let backend = backend(&server);
    assert_eq!(backend.artist_events("artist-3").await.unwrap(), newjeans_events());
    assert_eq!(backend.related_artists("artist-3").await.unwrap(), related);
}

#[tokio::test]
async fn test_production_mode_uses_configured_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/artists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let config = EncoreConfig::from_vars(|key| match key {
        "ENCORE_USE_MOCK_API" => Some("false".to_string()),
        "ENCORE_API_BASE_URL" => Some(format!("{}/", server.uri())),
        _ => None,
    });
    assert_eq!(config.mode, RuntimeMode::Production);

    let search = EventSearch::from_config(&config).unwrap();
    assert!(search.popular_artists().await.unwrap().is_empty());
}

const EVENT_ID: &str = "5f0c6a2e-8d4b-4a6e-9b1f-3c2d7e8a9b10";
const ARTIST_ID: &str = "a3c1e0d2-1b2c-4d5e-8f90-123456789abc";

/// An event exactly as the API serializes it: UUID ids, nullable fields
/// sent as `null`, decimal prices as strings and a naive `collectedAt`.
fn api_event() -> serde_json::Value {
    json!({
        "id": EVENT_ID,
        "title": "2026 NewJeans Fan Meeting 'Bunnies Camp'",
        "artistId": ARTIST_ID,
        "artistName": "NewJeans",
        "category": "fanmeeting",
        "date": "2026-04-12",
        "time": "18:00",
        "venue": "KSPO DOME",
        "address": null,
        "city": "서울",
        "country": "대한민국",
        "timezone": "Asia/Seoul",
        "price": {
            "currency": "KRW",
            "min": "99000.00",
            "max": "154000",
            "tiers": null
        },
        "imageUrl": null,
        "ticketUrl": "https://tickets.interpark.com/goods/26001234",
        "source": "interpark",
        "sourceUrl": "https://tickets.interpark.com/goods/26001234",
        "collectedAt": "2026-02-05T10:30:00.123456"
    })
}

fn assert_api_event(event: &Event) {
    assert_eq!(event.id, EVENT_ID);
    assert_eq!(event.artist_id, ARTIST_ID);
    assert_eq!(event.address, None);
    assert_eq!(event.image_url, None);
    let price = event.price.as_ref().unwrap();
    assert_eq!((price.min, price.max), (99_000, 154_000));
    assert!(price.tiers.is_empty());
    assert_eq!(
        event.collected_at.to_rfc3339(),
        "2026-02-05T10:30:00.123456+00:00"
    );
}

#[tokio::test]
async fn test_api_payloads_decode() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "searchId": "0d9c2b4e-3f1a-4c7b-9e2d-5a6b7c8d9e0f",
            "query": "NewJeans",
            "events": [api_event()],
            "total": 1,
            "searchTime": 3.4,
            "cached": true,
            "page": 1,
            "hasMore": false
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/events/{EVENT_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(api_event()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/artists/{ARTIST_ID}/events")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [api_event()],
            "total": 1,
            "page": 1,
            "perPage": 20
        })))
        .mount(&server)
        .await;

    let backend = backend(&server);

    let result = backend
        .search("NewJeans", SearchOptions::default())
        .await
        .unwrap();
    assert!(result.cached);
    assert_eq!(result.events.len(), 1);
    assert_api_event(&result.events[0]);

    let event = backend.event(EVENT_ID).await.unwrap().unwrap();
    assert_api_event(&event);

    let events = backend.artist_events(ARTIST_ID).await.unwrap();
    assert_eq!(events, vec![event]);
}

#[tokio::test]
async fn test_search_all_pages_with_requested_size() {
    let server = MockServer::start().await;
    let events = newjeans_events();

    Mock::given(method("POST"))
        .and(path("/api/v1/search"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_result(
            "d4e5",
            1,
            events[..2].to_vec(),
            true,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/search"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_result(
            "d4e5",
            2,
            events[2..].to_vec(),
            false,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let search = EventSearch::new(Arc::new(backend(&server)));
    let collected = search.search_all("NewJeans", 2).await.unwrap();
    assert_eq!(collected, events);
}
