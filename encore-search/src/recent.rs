//! Bounded, deduplicated recent-search history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::types::RecentSearch;

/// Default number of remembered searches.
pub const DEFAULT_RECENT_SEARCH_LIMIT: usize = 10;

/// Most-recent-first search history for one user.
///
/// Queries are unique ignoring case: recording a query again moves it to
/// the front with a fresh id and timestamp.
#[derive(Debug, Clone)]
pub struct RecentSearches {
    entries: VecDeque<RecentSearch>,
    limit: usize,
}

impl Default for RecentSearches {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_SEARCH_LIMIT)
    }
}

impl RecentSearches {
    /// Empty history keeping at most `limit` entries (at least one).
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit + 1),
            limit,
        }
    }

    /// History seeded from existing entries, most recent first.
    ///
    /// Later case-insensitive duplicates and entries beyond the limit are dropped.
    pub fn with_entries(limit: usize, seed: impl IntoIterator<Item = RecentSearch>) -> Self {
        let mut history = Self::new(limit);
        for entry in seed {
            let duplicate = history
                .entries
                .iter()
                .any(|existing| same_query(&existing.query, &entry.query));
            if !duplicate && history.entries.len() < history.limit {
                history.entries.push_back(entry);
            }
        }
        history
    }

    /// Record `query` as the newest search.
    ///
    /// Returns the new entry, or `None` for a blank query, which leaves the
    /// history untouched.
    pub fn record(&mut self, query: &str, searched_at: DateTime<Utc>) -> Option<RecentSearch> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        self.entries
            .retain(|existing| !same_query(&existing.query, query));

        let entry = RecentSearch {
            id: format!("rs-{}", uuid::Uuid::new_v4().simple()),
            query: query.to_string(),
            searched_at,
        };
        self.entries.push_front(entry.clone());
        self.entries.truncate(self.limit);

        Some(entry)
    }

    /// Remove the entry with `id`; returns whether one was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every entry, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Copy of the history, most recent first.
    pub fn snapshot(&self) -> Vec<RecentSearch> {
        self.entries.iter().cloned().collect()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries kept.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

fn same_query(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn at(minutes: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_770_000_000, 0).unwrap() + Duration::minutes(minutes)
    }

    fn queries(history: &RecentSearches) -> Vec<String> {
        history.snapshot().into_iter().map(|e| e.query).collect()
    }

    #[test]
    fn test_record_puts_newest_first() {
        let mut history = RecentSearches::default();
        history.record("BTS", at(0));
        history.record("aespa", at(1));

        assert_eq!(queries(&history), ["aespa", "BTS"]);
    }

    #[test]
    fn test_repeat_query_moves_to_front_ignoring_case() {
        let mut history = RecentSearches::default();
        let first = history.record("BTS", at(0)).unwrap();
        history.record("IU", at(1));
        let second = history.record("bts", at(2)).unwrap();

        assert_eq!(queries(&history), ["bts", "IU"]);
        assert_ne!(first.id, second.id);
        assert_eq!(history.snapshot()[0].searched_at, at(2));
    }

    #[test]
    fn test_limit_keeps_most_recent() {
        let mut history = RecentSearches::default();
        for n in 0..11 {
            history.record(&format!("query {n}"), at(n));
        }

        assert_eq!(history.len(), 10);
        let kept = queries(&history);
        assert_eq!(kept.first().unwrap(), "query 10");
        assert_eq!(kept.last().unwrap(), "query 1");
        assert!(!kept.contains(&"query 0".to_string()));
    }

    #[test]
    fn test_blank_query_is_ignored() {
        let mut history = RecentSearches::default();
        history.record("TWICE", at(0));

        assert!(history.record("   ", at(1)).is_none());
        assert_eq!(queries(&history), ["TWICE"]);
    }

    #[test]
    fn test_query_is_trimmed() {
        let mut history = RecentSearches::default();
        history.record("  NewJeans  ", at(0));
        history.record("newjeans", at(1));

        assert_eq!(queries(&history), ["newjeans"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut history = RecentSearches::default();
        let bts = history.record("BTS", at(0)).unwrap();
        history.record("IU", at(1));

        assert!(history.remove(&bts.id));
        assert!(!history.remove(&bts.id));
        assert_eq!(queries(&history), ["IU"]);

        assert_eq!(history.clear(), 1);
        assert!(history.is_empty());
    }

    #[test]
    fn test_seed_respects_limit_and_dedup() {
        let seed = ["BTS", "bts", "IU", "aespa"].into_iter().enumerate().map(|(n, q)| {
            RecentSearch {
                id: format!("rs-{n}"),
                query: q.to_string(),
                searched_at: at(-(n as i64)),
            }
        });
        let history = RecentSearches::with_entries(2, seed);

        assert_eq!(queries(&history), ["BTS", "IU"]);
        assert_eq!(history.limit(), 2);
    }
}
