//! Pagination properties over generated page sizes and queries

use encore_core::EncoreConfig;
use encore_search::{Event, FixtureBackend, FixtureSet, SearchBackend, SearchOptions, SearchPage};
use proptest::prelude::*;

fn numbered_events(count: usize) -> Vec<Event> {
    let template = FixtureSet::bundled().events[0].clone();
    (0..count)
        .map(|n| Event {
            id: format!("event-{n}"),
            ..template.clone()
        })
        .collect()
}

/// Collects pages 1..k of one search until `has_more` turns false.
fn collect_pages(query: &str, page_size: u32) -> (Vec<String>, usize) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();

    runtime.block_on(async {
        let backend = FixtureBackend::from_config(&EncoreConfig::for_testing());
        let first = backend
            .search(query, SearchOptions::page(1, page_size))
            .await
            .unwrap();

        let mut ids: Vec<String> = first.events.iter().map(|e| e.id.clone()).collect();
        let mut page = 1;
        let mut has_more = first.has_more;
        while has_more {
            page += 1;
            let next = backend
                .search_page(&first.search_id, page, page_size)
                .await
                .unwrap();
            assert!(!next.events.is_empty(), "has_more promised another page");
            ids.extend(next.events.iter().map(|e| e.id.clone()));
            has_more = next.has_more;
        }
        (ids, first.total)
    })
}

proptest! {
    #[test]
    fn slices_partition_the_matches(len in 0usize..60, page_size in 1u32..25) {
        let events = numbered_events(len);
        let mut seen = Vec::new();
        let mut page = 1;

        loop {
            let slice = SearchPage::slice(&events, page, page_size);
            prop_assert!(slice.events.len() <= page_size as usize);
            seen.extend(slice.events);
            if !slice.has_more {
                break;
            }
            page += 1;
        }

        prop_assert_eq!(seen, events);
    }

    #[test]
    fn pages_past_the_end_are_empty(len in 0usize..30, page_size in 1u32..10, extra in 1u32..5) {
        let events = numbered_events(len);
        let last_page = (len as u32).div_ceil(page_size).max(1);

        let beyond = SearchPage::slice(&events, last_page + extra, page_size);
        prop_assert!(beyond.events.is_empty());
        prop_assert!(!beyond.has_more);
    }

    #[test]
    fn search_pages_cover_every_match_once(
        query in prop::sample::select(vec!["", "bts", "NewJeans", "콘서트", "Tour", "nothing"]),
        page_size in 1u32..12,
    ) {
        let expected: Vec<String> = FixtureSet::bundled()
            .events
            .iter()
            .filter(|e| e.matches(&query.trim().to_lowercase()))
            .map(|e| e.id.clone())
            .collect();

        let (ids, total) = collect_pages(query, page_size);

        prop_assert_eq!(total, expected.len());
        prop_assert_eq!(ids, expected);
    }
}
