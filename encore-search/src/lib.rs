//! Encore Search - Artist and event discovery

#![deny(missing_docs)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Artist autocomplete, cached event search with pagination, relational
//! lookups and recent-search history. Backends are swappable: bundled
//! fixture data for development, the real event API for production.

pub mod cache;
pub mod errors;
pub mod fixtures;
pub mod providers;
pub mod recent;
pub mod search;
pub mod types;

// Re-export main types
pub use cache::{CacheStatistics, SearchCache};
pub use errors::SearchError;
pub use fixtures::FixtureSet;
pub use providers::{FixtureBackend, HttpBackend, SearchBackend};
pub use recent::RecentSearches;
pub use search::EventSearch;
pub use types::{
    Artist, Event, EventCategory, PriceInfo, PriceTier, RecentSearch, SearchOptions, SearchPage,
    SearchResult,
};

/// Convenience type alias for Results with SearchError.
pub type Result<T> = std::result::Result<T, SearchError>;
