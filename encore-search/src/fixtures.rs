//! Bundled fixture data for development mode.
//!
//! The JSON files under `fixtures/` use the same wire shape as the real API,
//! so they double as contract samples for the HTTP backend.

use std::sync::LazyLock;

use crate::errors::SearchError;
use crate::types::{Artist, Event, RecentSearch};

const ARTISTS_JSON: &str = include_str!("../fixtures/artists.json");
const EVENTS_JSON: &str = include_str!("../fixtures/events.json");
const RECENT_SEARCHES_JSON: &str = include_str!("../fixtures/recent_searches.json");

/// Hardcoded popular artists: NewJeans, aespa, SEVENTEEN, LE SSERAFIM, ATEEZ, Stray Kids.
const POPULAR_ARTIST_IDS: [&str; 6] = [
    "artist-3", "artist-5", "artist-6", "artist-10", "artist-11", "artist-7",
];

/// Artists the development user follows.
const FOLLOWED_ARTIST_IDS: [&str; 3] = ["artist-1", "artist-3", "artist-4"];

static BUNDLED: LazyLock<FixtureSet> = LazyLock::new(|| {
    FixtureSet::from_json(ARTISTS_JSON, EVENTS_JSON, RECENT_SEARCHES_JSON)
        .expect("bundled fixture JSON is valid")
});

/// Immutable dataset served by the fixture backend.
#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
    /// All searchable artists, in display order
    pub artists: Vec<Artist>,
    /// All events, in display order
    pub events: Vec<Event>,
    /// Artists listed as popular, most followed first
    pub popular_artist_ids: Vec<String>,
    /// Artists the development user follows
    pub followed_artist_ids: Vec<String>,
    /// Seed history, most recent first
    pub recent_searches: Vec<RecentSearch>,
}

impl FixtureSet {
    /// The dataset shipped with the crate.
    ///
    /// # Panics
    /// Only if the JSON compiled into the crate is malformed, which the
    /// crate's own tests rule out.
    pub fn bundled() -> Self {
        BUNDLED.clone()
    }

    /// Builds a dataset from JSON arrays in the API wire format.
    ///
    /// Popular and followed lists use the bundled id sets; ids that do not
    /// resolve are skipped at lookup time.
    ///
    /// # Errors
    /// - `SearchError::Parse` - Any of the arrays fails to decode
    pub fn from_json(artists: &str, events: &str, recent_searches: &str) -> Result<Self, SearchError> {
        Ok(Self {
            artists: parse_array(artists, "artists")?,
            events: parse_array(events, "events")?,
            popular_artist_ids: POPULAR_ARTIST_IDS.iter().map(|id| id.to_string()).collect(),
            followed_artist_ids: FOLLOWED_ARTIST_IDS.iter().map(|id| id.to_string()).collect(),
            recent_searches: parse_array(recent_searches, "recent searches")?,
        })
    }

    /// Same dataset with an empty search history.
    pub fn without_history(self) -> Self {
        Self {
            recent_searches: Vec::new(),
            ..self
        }
    }

    /// Artist by id.
    pub fn artist(&self, id: &str) -> Option<&Artist> {
        self.artists.iter().find(|artist| artist.id == id)
    }

    /// Event by id.
    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Resolves a list of artist ids, keeping list order.
    pub fn artists_by_id(&self, ids: &[String]) -> Vec<Artist> {
        ids.iter()
            .filter_map(|id| self.artist(id))
            .cloned()
            .collect()
    }
}

fn parse_array<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<Vec<T>, SearchError> {
    serde_json::from_str(json).map_err(|e| SearchError::Parse {
        reason: format!("invalid {what} fixture: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::types::EventCategory;

    #[test]
    fn test_bundled_fixtures_parse() {
        let fixtures = FixtureSet::bundled();

        assert_eq!(fixtures.artists.len(), 12);
        assert_eq!(fixtures.events.len(), 10);
        assert_eq!(fixtures.recent_searches.len(), 3);
        assert_eq!(fixtures.recent_searches[0].query, "BTS");
    }

    #[test]
    fn test_fixture_ids_are_unique() {
        let fixtures = FixtureSet::bundled();

        let artist_ids: HashSet<_> = fixtures.artists.iter().map(|a| &a.id).collect();
        let event_ids: HashSet<_> = fixtures.events.iter().map(|e| &e.id).collect();

        assert_eq!(artist_ids.len(), fixtures.artists.len());
        assert_eq!(event_ids.len(), fixtures.events.len());
    }

    #[test]
    fn test_every_event_references_known_artist() {
        let fixtures = FixtureSet::bundled();
        for event in &fixtures.events {
            let artist = fixtures.artist(&event.artist_id).unwrap();
            assert_eq!(artist.name, event.artist_name);
        }
    }

    #[test]
    fn test_popular_and_followed_resolve() {
        let fixtures = FixtureSet::bundled();

        let popular = fixtures.artists_by_id(&fixtures.popular_artist_ids);
        let names: Vec<_> = popular.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            ["NewJeans", "aespa", "SEVENTEEN", "LE SSERAFIM", "ATEEZ", "Stray Kids"]
        );

        let followed = fixtures.artists_by_id(&fixtures.followed_artist_ids);
        assert_eq!(followed.len(), fixtures.followed_artist_ids.len());
    }

    #[test]
    fn test_event_details_survive_parsing() {
        let fixtures = FixtureSet::bundled();
        let festival = fixtures.event("event-10").unwrap();

        assert_eq!(festival.category, EventCategory::Festival);
        assert_eq!(festival.artist_id, "artist-3");
        assert_eq!(festival.price.as_ref().unwrap().currency, "KRW");

        let concert = fixtures.event("event-1").unwrap();
        assert_eq!(concert.price.as_ref().unwrap().tiers.len(), 3);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = FixtureSet::from_json("[]", "{", "[]");
        assert!(matches!(result, Err(SearchError::Parse { .. })));
    }
}
