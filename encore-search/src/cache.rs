//! Time-bounded search result cache
//!
//! Maps normalized queries to their full match list. Entries older than the
//! TTL count as misses and get overwritten on recompute; LRU eviction keeps
//! the number of distinct queries bounded.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::types::Event;

/// Cached full match list for one normalized query.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Every match, in display order
    pub events: Arc<[Event]>,
    /// When the matches were computed
    pub captured_at: Instant,
}

impl CacheEntry {
    fn new(events: Arc<[Event]>) -> Self {
        Self {
            events,
            captured_at: Instant::now(),
        }
    }

    /// Get age of entry
    pub fn age(&self) -> Duration {
        self.captured_at.elapsed()
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStatistics {
    /// Stored entries, fresh or stale
    pub entries: usize,
    /// Maximum number of distinct queries
    pub capacity: usize,
    /// Lookups answered from a fresh entry
    pub hit_count: u64,
    /// Lookups that found nothing or a stale entry
    pub miss_count: u64,
    /// Hits as a fraction of all lookups
    pub hit_rate: f64,
}

impl CacheStatistics {
    /// Calculate hit rate as a fraction of lookups
    pub fn calculate_hit_rate(hit_count: u64, miss_count: u64) -> f64 {
        if hit_count + miss_count == 0 {
            0.0
        } else {
            (hit_count as f64) / ((hit_count + miss_count) as f64)
        }
    }
}

#[derive(Debug)]
struct CacheState {
    entries: LruCache<String, CacheEntry>,
    hit_count: u64,
    miss_count: u64,
}

/// Search cache keyed by normalized query.
#[derive(Debug)]
pub struct SearchCache {
    state: Mutex<CacheState>,
    ttl: Duration,
}

impl SearchCache {
    /// Create a cache holding at most `capacity` queries for `ttl` each.
    ///
    /// A zero capacity is raised to one.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                hit_count: 0,
                miss_count: 0,
            }),
            ttl,
        }
    }

    /// Trim and lowercase a query into its cache key.
    pub fn normalize_key(query: &str) -> String {
        query.trim().to_lowercase()
    }

    /// How long an entry stays fresh.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh match list for `key`, recording a hit or miss.
    pub fn lookup(&self, key: &str) -> Option<Arc<[Event]>> {
        let mut state = self.state.lock();
        let fresh = state
            .entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| Arc::clone(&entry.events));

        match fresh {
            Some(events) => {
                state.hit_count += 1;
                tracing::debug!("Search cache hit for '{}' ({} events)", key, events.len());
                Some(events)
            }
            None => {
                state.miss_count += 1;
                tracing::debug!("Search cache miss for '{}'", key);
                None
            }
        }
    }

    /// Fresh match list for `key` without touching statistics or recency.
    pub fn peek(&self, key: &str) -> Option<Arc<[Event]>> {
        let state = self.state.lock();
        state
            .entries
            .peek(key)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| Arc::clone(&entry.events))
    }

    /// Store the full match list for `key`, replacing any previous entry.
    pub fn store(&self, key: String, events: Vec<Event>) -> Arc<[Event]> {
        let events: Arc<[Event]> = events.into();
        let mut state = self.state.lock();

        if let Some((evicted, _)) = state.entries.push(key.clone(), CacheEntry::new(Arc::clone(&events)))
            && evicted != key
        {
            tracing::debug!("Evicted least recently used search '{}'", evicted);
        }

        tracing::debug!("Cached {} events for '{}'", events.len(), key);
        events
    }

    /// Drop every entry older than the TTL, returning how many went.
    pub fn purge_expired(&self) -> usize {
        let mut state = self.state.lock();

        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_fresh(self.ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.entries.pop(key);
        }

        if !expired.is_empty() {
            tracing::info!("Purged {} expired search cache entries", expired.len());
        }
        expired.len()
    }

    /// Clear all cache entries
    pub fn clear(&self) {
        self.state.lock().entries.clear();
        tracing::debug!("Cleared all search cache entries");
    }

    /// Number of stored entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    pub fn statistics(&self) -> CacheStatistics {
        let state = self.state.lock();
        CacheStatistics {
            entries: state.entries.len(),
            capacity: state.entries.cap().get(),
            hit_count: state.hit_count,
            miss_count: state.miss_count,
            hit_rate: CacheStatistics::calculate_hit_rate(state.hit_count, state.miss_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FixtureSet;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn sample_events(count: usize) -> Vec<Event> {
        FixtureSet::bundled().events.into_iter().take(count).collect()
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(SearchCache::normalize_key("  NewJeans "), "newjeans");
        assert_eq!(SearchCache::normalize_key("BTS 콘서트"), "bts 콘서트");
        assert_eq!(SearchCache::normalize_key("   "), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_hit_and_miss() {
        let cache = SearchCache::new(DAY, 8);

        assert!(cache.lookup("bts").is_none());
        cache.store("bts".to_string(), sample_events(3));

        let cached = cache.lookup("bts").unwrap();
        assert_eq!(cached.len(), 3);

        let stats = cache.statistics();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_rate, 0.5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_goes_stale_at_ttl() {
        let cache = SearchCache::new(DAY, 8);
        cache.store("aespa".to_string(), sample_events(1));

        tokio::time::advance(DAY - Duration::from_secs(1)).await;
        assert!(cache.lookup("aespa").is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.lookup("aespa").is_none());
        assert!(cache.peek("aespa").is_none());

        // Stale entries stay until overwritten or purged
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_overwrites_stale_entry() {
        let cache = SearchCache::new(DAY, 8);
        cache.store("iu".to_string(), sample_events(1));
        tokio::time::advance(DAY * 2).await;

        cache.store("iu".to_string(), sample_events(2));

        assert_eq!(cache.lookup("iu").unwrap().len(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired_keeps_fresh_entries() {
        let cache = SearchCache::new(DAY, 8);
        cache.store("old".to_string(), sample_events(1));
        tokio::time::advance(DAY).await;
        cache.store("new".to_string(), sample_events(1));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.peek("new").is_some());
        assert_eq!(cache.purge_expired(), 0);
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache = SearchCache::new(DAY, 2);
        cache.store("a".to_string(), sample_events(1));
        cache.store("b".to_string(), sample_events(1));

        // Touch "a" so "b" becomes least recently used
        assert!(cache.lookup("a").is_some());
        cache.store("c".to_string(), sample_events(1));

        assert_eq!(cache.len(), 2);
        assert!(cache.peek("a").is_some());
        assert!(cache.peek("b").is_none());
        assert!(cache.peek("c").is_some());
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let cache = SearchCache::new(DAY, 0);
        cache.store("a".to_string(), sample_events(1));
        assert_eq!(cache.statistics().capacity, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_peek_does_not_count() {
        let cache = SearchCache::new(DAY, 4);
        cache.store("bts".to_string(), sample_events(1));
        cache.peek("bts");
        cache.peek("missing");

        let stats = cache.statistics();
        assert_eq!(stats.hit_count, 0);
        assert_eq!(stats.miss_count, 0);
    }

    #[test]
    fn test_clear() {
        let cache = SearchCache::new(DAY, 4);
        cache.store("bts".to_string(), sample_events(1));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_statistics_calculation() {
        assert_eq!(CacheStatistics::calculate_hit_rate(0, 0), 0.0);
        assert_eq!(CacheStatistics::calculate_hit_rate(10, 0), 1.0);
        assert_eq!(CacheStatistics::calculate_hit_rate(7, 3), 0.7);
    }
}
