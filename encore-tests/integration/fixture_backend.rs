//! Fixture backend behavior through the public search API

use std::sync::Arc;
use std::time::Duration;

use encore_core::{EncoreConfig, RuntimeMode};
use encore_search::{EventSearch, FixtureBackend, FixtureSet, SearchBackend, SearchOptions};

const TTL: Duration = Duration::from_secs(24 * 60 * 60);

fn search() -> EventSearch {
    EventSearch::for_testing()
}

#[tokio::test]
async fn test_every_artist_is_found_by_its_name() {
    let search = search();

    for artist in FixtureSet::bundled().artists {
        let found = search.autocomplete_artists(&artist.name).await.unwrap();
        assert!(
            found.iter().any(|a| a.id == artist.id),
            "{} missing from autocomplete",
            artist.name
        );

        if let Some(name_ko) = &artist.name_ko {
            let found = search.autocomplete_artists(name_ko).await.unwrap();
            assert!(found.iter().any(|a| a.id == artist.id));
        }
    }
}

#[tokio::test]
async fn test_autocomplete_blank_query_is_empty() {
    let search = search();
    assert!(search.autocomplete_artists("").await.unwrap().is_empty());
    assert!(search.autocomplete_artists("   ").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_newjeans_first_page() {
    let search = search();
    let result = search
        .search_with("NewJeans", SearchOptions::page(1, 1))
        .await
        .unwrap();

    assert_eq!(result.events.len(), 1);
    assert_eq!(result.events[0].id, "event-4");
    assert_eq!(result.total, 3);
    assert!(result.has_more);
    assert_eq!(result.page, 1);
}

#[tokio::test(start_paused = true)]
async fn test_cache_window() {
    let search = search();

    let first = search.search("BTS").await.unwrap();
    tokio::time::advance(TTL / 2).await;
    let second = search.search("bts").await.unwrap();

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.events, second.events);

    tokio::time::advance(TTL).await;
    let third = search.search("BTS").await.unwrap();
    assert!(!third.cached);
    assert_eq!(third.events, first.events);
}

#[tokio::test(start_paused = true)]
async fn test_cache_hit_is_faster_than_remote_search() {
    let search = EventSearch::from_config(&EncoreConfig::for_development()).unwrap();

    let miss = search.search("aespa").await.unwrap();
    let hit = search.search("aespa").await.unwrap();

    assert!(miss.search_time >= 3.0);
    assert!(hit.search_time < miss.search_time);
}

#[tokio::test]
async fn test_follow_up_pages_cover_every_match() {
    let search = search();
    let first = search
        .search_with("", SearchOptions::page(1, 4))
        .await
        .unwrap();

    let mut ids: Vec<String> = first.events.iter().map(|e| e.id.clone()).collect();
    let mut page = 1;
    let mut has_more = first.has_more;
    while has_more {
        page += 1;
        let next = search.search_page(&first.search_id, page, 4).await.unwrap();
        ids.extend(next.events.iter().map(|e| e.id.clone()));
        has_more = next.has_more;
    }

    let expected: Vec<String> = FixtureSet::bundled()
        .events
        .iter()
        .map(|e| e.id.clone())
        .collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_recent_search_dedup_and_limit() {
    let search = search();
    search.clear_recent_searches().await.unwrap();

    search.save_recent_search("BTS").await.unwrap();
    search.save_recent_search("bts").await.unwrap();
    let history = search.recent_searches().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].query, "bts");

    for n in 0..11 {
        search.save_recent_search(&format!("query {n}")).await.unwrap();
    }
    let history = search.recent_searches().await.unwrap();
    assert_eq!(history.len(), 10);
    assert_eq!(history[0].query, "query 10");
    assert!(history.iter().all(|entry| entry.query != "bts"));
    assert!(history.iter().all(|entry| entry.query != "query 0"));
}

#[tokio::test]
async fn test_related_artists_for_every_artist() {
    let search = search();

    for artist in FixtureSet::bundled().artists {
        let related = search.related_artists(&artist.id).await.unwrap();
        assert!(related.len() <= 6);
        assert!(related.iter().all(|r| r.id != artist.id));
        assert!(related.iter().all(|r| r.genre == artist.genre));
    }
}

#[tokio::test]
async fn test_absent_ids_are_not_errors() {
    let search = search();
    assert!(search.artist("nonexistent").await.unwrap().is_none());
    assert!(search.event("nonexistent").await.unwrap().is_none());
    assert!(search.artist_events("nonexistent").await.unwrap().is_empty());
    search.delete_recent_search("nonexistent").await.unwrap();
}

#[tokio::test]
async fn test_artist_events_are_unfiltered_by_date() {
    let search = search();
    let events = search.artist_events("artist-1").await.unwrap();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e.artist_id == "artist-1"));
}

#[tokio::test]
async fn test_concurrent_history_writes_are_atomic() {
    let backend: Arc<dyn SearchBackend> =
        Arc::new(FixtureBackend::from_config(&EncoreConfig::for_testing()));
    backend.clear_recent_searches().await.unwrap();

    let mut tasks = Vec::new();
    for n in 0..20 {
        let backend = Arc::clone(&backend);
        tasks.push(tokio::spawn(async move {
            backend.save_recent_search(&format!("artist {n}")).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let history = backend.recent_searches().await.unwrap();
    assert_eq!(history.len(), 10);
}

#[tokio::test]
async fn test_concurrent_searches_agree() {
    let search = search();
    let (a, b) = tokio::join!(search.search("IU"), search.search("iu"));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.events, b.events);
    assert_ne!(a.search_id, b.search_id);
}

#[test]
fn test_default_mode_uses_fixtures() {
    let config = EncoreConfig::from_vars(|_| None);
    assert_eq!(config.mode, RuntimeMode::Development);

    let search = EventSearch::from_config(&config).unwrap();
    assert!(format!("{:?}", search.backend()).contains("FixtureBackend"));
}
