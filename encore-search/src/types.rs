//! Data types for artist and event search.
//!
//! Field names serialize camelCase so the same types read the real API's
//! JSON envelopes and the bundled fixtures.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Kind of fan event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    /// Concert or tour date
    Concert,
    /// Fan meeting
    Fanmeeting,
    /// TV or streaming appearance
    Broadcast,
    /// Multi-artist festival
    Festival,
}

impl EventCategory {
    /// All categories in display order.
    pub const ALL: [EventCategory; 4] = [
        EventCategory::Concert,
        EventCategory::Fanmeeting,
        EventCategory::Broadcast,
        EventCategory::Festival,
    ];

    /// Korean label shown on category badges.
    pub fn label(self) -> &'static str {
        match self {
            EventCategory::Concert => "콘서트",
            EventCategory::Fanmeeting => "팬미팅",
            EventCategory::Broadcast => "방송",
            EventCategory::Festival => "페스티벌",
        }
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            EventCategory::Concert => "concert",
            EventCategory::Fanmeeting => "fanmeeting",
            EventCategory::Broadcast => "broadcast",
            EventCategory::Festival => "festival",
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown event category: '{s}'"))
    }
}

/// Named ticket tier such as "VIP" or "R석".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    /// Tier label
    pub name: String,
    /// Seat price in whole currency units
    #[serde(deserialize_with = "amount::deserialize")]
    pub price: u64,
}

/// Ticket price range in the venue's currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceInfo {
    /// ISO 4217 code, e.g. "KRW"
    pub currency: String,
    /// Cheapest seat
    #[serde(deserialize_with = "amount::deserialize")]
    pub min: u64,
    /// Most expensive seat
    #[serde(deserialize_with = "amount::deserialize")]
    pub max: u64,
    /// Named tiers; the API sends `null` when there are none
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tiers: Vec<PriceTier>,
}

/// A scheduled fan event collected from a ticketing or broadcast source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Stable identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Id of the headlining artist
    pub artist_id: String,
    /// Name of the headlining artist
    pub artist_name: String,
    /// Kind of event
    pub category: EventCategory,
    /// Local date at the venue
    pub date: NaiveDate,
    /// Local start time at the venue
    #[serde(with = "wall_clock")]
    pub time: NaiveTime,
    /// Venue name
    pub venue: String,
    /// Street address, when the source published one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// City of the venue
    pub city: String,
    /// Country of the venue
    pub country: String,
    /// IANA zone name, e.g. "Asia/Seoul"
    pub timezone: String,
    /// Ticket prices, unknown for free or unannounced events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceInfo>,
    /// Poster image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Where tickets are sold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
    /// Name of the site the event was collected from
    pub source: String,
    /// Page the event was collected from
    pub source_url: String,
    /// When the collector last saw the event
    #[serde(with = "utc_timestamp")]
    pub collected_at: DateTime<Utc>,
}

impl Event {
    /// Case-insensitive containment against title or artist name.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.artist_name.to_lowercase().contains(needle)
    }
}

/// An artist that fans can follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    /// Stable identifier
    pub id: String,
    /// Romanized or international name
    pub name: String,
    /// Korean name, when it differs from the romanized one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_ko: Option<String>,
    /// Profile image, empty when unknown
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    /// Genre such as "K-POP", empty when unknown
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre: String,
    /// Number of users following the artist
    #[serde(default)]
    pub follower_count: u64,
}

impl Artist {
    /// Case-insensitive containment against either name.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .name_ko
                .as_ref()
                .is_some_and(|name_ko| name_ko.to_lowercase().contains(needle))
    }
}

/// One entry of a user's search history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSearch {
    /// Entry id, used for deletion
    pub id: String,
    /// The query as saved
    pub query: String,
    /// When the query was last run
    #[serde(with = "utc_timestamp")]
    pub searched_at: DateTime<Utc>,
}

/// Paging and cache controls for a full search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// 1-based page number
    pub page: u32,
    /// Events per page
    pub page_size: u32,
    /// Skip the cache and recompute
    pub force_refresh: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            force_refresh: false,
        }
    }
}

impl SearchOptions {
    /// Options for a specific page.
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            force_refresh: false,
        }
    }

    /// Same options with the cache bypassed.
    pub fn refreshed(self) -> Self {
        Self {
            force_refresh: true,
            ..self
        }
    }

    /// Page and page size clamped to at least 1.
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.max(1),
            ..self
        }
    }
}

/// Result of a full search: one page plus totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Handle for fetching further pages
    pub search_id: String,
    /// The query exactly as the caller sent it
    pub query: String,
    /// Events of the requested page
    pub events: Vec<Event>,
    /// Number of matches across all pages
    pub total: usize,
    /// Wall-clock seconds, one decimal
    pub search_time: f64,
    /// Whether the matches came from the cache
    pub cached: bool,
    /// 1-based page number of `events`
    pub page: u32,
    /// Whether a further page exists
    pub has_more: bool,
}

/// A further page of an earlier search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Events of this page
    pub events: Vec<Event>,
    /// Whether a further page exists
    pub has_more: bool,
}

impl SearchPage {
    /// Slices one page out of a full match list.
    ///
    /// Pages are 1-based; `page` and `page_size` of zero are treated as 1.
    /// Past-the-end pages are empty with `has_more == false`.
    pub fn slice(matches: &[Event], page: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1) as usize;
        let start = (page.max(1) as usize - 1).saturating_mul(page_size);
        let end = start.saturating_add(page_size);

        let events = matches
            .iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect();

        Self {
            events,
            has_more: end < matches.len(),
        }
    }
}

/// Rounds a duration to seconds with one decimal.
pub(crate) fn rounded_seconds(elapsed: std::time::Duration) -> f64 {
    (elapsed.as_secs_f64() * 10.0).round() / 10.0
}

/// Reads `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Whole currency amounts sent as integers, floats or decimal strings.
mod amount {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Whole(u64),
        Fractional(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Whole(value) => Ok(value),
            Raw::Fractional(value) => rounded(value),
            Raw::Text(text) => {
                let text = text.trim();
                match text.parse::<u64>() {
                    Ok(value) => Ok(value),
                    Err(_) => text
                        .parse::<f64>()
                        .map_err(|_| serde::de::Error::custom(format!("invalid amount '{text}'")))
                        .and_then(rounded),
                }
            }
        }
    }

    fn rounded<E: serde::de::Error>(value: f64) -> Result<u64, E> {
        if value.is_finite() && value >= 0.0 && value <= u64::MAX as f64 {
            Ok(value.round() as u64)
        } else {
            Err(E::custom(format!("invalid amount {value}")))
        }
    }
}

/// `HH:MM` wall-clock times, also accepting `HH:MM:SS`.
mod wall_clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

/// RFC 3339 timestamps; naive ISO-8601 input is read as UTC.
mod utc_timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(at.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn numbered_events(count: usize) -> Vec<Event> {
        let template: Event = serde_json::from_value(serde_json::json!({
            "id": "event-0",
            "title": "Template",
            "artistId": "artist-1",
            "artistName": "BTS",
            "category": "concert",
            "date": "2026-03-15",
            "time": "18:00",
            "venue": "KSPO DOME",
            "address": "Seoul",
            "city": "서울",
            "country": "대한민국",
            "timezone": "Asia/Seoul",
            "source": "melon.com",
            "sourceUrl": "https://www.melon.com/ticket/1",
            "collectedAt": "2026-02-05T10:30:00Z"
        }))
        .unwrap();

        (0..count)
            .map(|n| Event {
                id: format!("event-{n}"),
                ..template.clone()
            })
            .collect()
    }

    #[test]
    fn test_category_labels_and_parsing() {
        assert_eq!(EventCategory::Fanmeeting.label(), "팬미팅");
        assert_eq!(
            "Festival".parse::<EventCategory>(),
            Ok(EventCategory::Festival)
        );
        assert!("musical".parse::<EventCategory>().is_err());
        assert_eq!(
            serde_json::to_string(&EventCategory::Broadcast).unwrap(),
            "\"broadcast\""
        );
    }

    #[test]
    fn test_event_wire_format() {
        let event = &numbered_events(1)[0];
        let json = serde_json::to_value(event).unwrap();

        assert_eq!(json["artistName"], "BTS");
        assert_eq!(json["time"], "18:00");
        assert_eq!(json["collectedAt"], "2026-02-05T10:30:00Z");
        assert!(json.get("price").is_none());
        assert!(json.get("ticketUrl").is_none());
    }

    #[test]
    fn test_naive_timestamps_read_as_utc() {
        let recent: RecentSearch = serde_json::from_value(serde_json::json!({
            "id": "0b6f0f1e",
            "query": "aespa",
            "searchedAt": "2026-02-06T18:45:00.123456"
        }))
        .unwrap();

        assert_eq!(
            recent.searched_at.to_rfc3339(),
            "2026-02-06T18:45:00.123456+00:00"
        );
    }

    #[test]
    fn test_api_event_with_nulls_and_decimal_prices() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "id": "5f0c6a2e-8d4b-4a6e-9b1f-3c2d7e8a9b10",
            "title": "NewJeans Fan Meeting",
            "artistId": "a3c1e0d2-1b2c-4d5e-8f90-123456789abc",
            "artistName": "NewJeans",
            "category": "fanmeeting",
            "date": "2026-04-12",
            "time": "00:00",
            "venue": "Jamsil Arena",
            "address": null,
            "city": "서울",
            "country": "대한민국",
            "timezone": "Asia/Seoul",
            "price": {
                "currency": "KRW",
                "min": "99000",
                "max": "154000.00",
                "tiers": null
            },
            "imageUrl": null,
            "ticketUrl": null,
            "source": "interpark",
            "sourceUrl": "https://tickets.interpark.com/goods/1",
            "collectedAt": "2026-02-05T10:30:00.123456"
        }))
        .unwrap();

        assert_eq!(event.address, None);
        assert_eq!(event.image_url, None);
        let price = event.price.unwrap();
        assert_eq!((price.min, price.max), (99_000, 154_000));
        assert!(price.tiers.is_empty());
        assert_eq!(event.time, NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(
            event.collected_at.to_rfc3339(),
            "2026-02-05T10:30:00.123456+00:00"
        );
    }

    #[test]
    fn test_price_amounts_accept_numbers_and_strings() {
        let price: PriceInfo = serde_json::from_value(serde_json::json!({
            "currency": "KRW",
            "min": 55000.4,
            "max": 121000,
            "tiers": [{ "name": "R석", "price": " 121000.50 " }]
        }))
        .unwrap();

        assert_eq!(price.min, 55_000);
        assert_eq!(price.max, 121_000);
        assert_eq!(price.tiers[0].price, 121_001);

        let invalid = serde_json::from_value::<PriceTier>(serde_json::json!({
            "name": "VIP",
            "price": "free"
        }));
        assert!(invalid.is_err());
        let negative = serde_json::from_value::<PriceTier>(serde_json::json!({
            "name": "VIP",
            "price": -5
        }));
        assert!(negative.is_err());
    }

    #[test]
    fn test_api_artist_with_missing_details() {
        let artist: Artist = serde_json::from_value(serde_json::json!({
            "id": "a3c1e0d2-1b2c-4d5e-8f90-123456789abc",
            "name": "QWER",
            "nameKo": null,
            "imageUrl": null,
            "genre": null,
            "followerCount": 12
        }))
        .unwrap();

        assert_eq!(artist.name_ko, None);
        assert!(artist.image_url.is_empty());
        assert!(artist.genre.is_empty());
        assert_eq!(artist.follower_count, 12);
    }

    #[test]
    fn test_seconds_time_is_accepted() {
        let mut json = serde_json::to_value(&numbered_events(1)[0]).unwrap();
        json["time"] = serde_json::json!("19:30:00");
        let event: Event = serde_json::from_value(json).unwrap();
        assert_eq!(event.time, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
    }

    #[test]
    fn test_slice_first_and_last_page() {
        let events = numbered_events(5);

        let first = SearchPage::slice(&events, 1, 2);
        assert_eq!(first.events.len(), 2);
        assert_eq!(first.events[0].id, "event-0");
        assert!(first.has_more);

        let last = SearchPage::slice(&events, 3, 2);
        assert_eq!(last.events.len(), 1);
        assert_eq!(last.events[0].id, "event-4");
        assert!(!last.has_more);
    }

    #[test]
    fn test_slice_exact_boundary_and_past_end() {
        let events = numbered_events(4);

        let exact = SearchPage::slice(&events, 2, 2);
        assert_eq!(exact.events.len(), 2);
        assert!(!exact.has_more);

        let beyond = SearchPage::slice(&events, 9, 2);
        assert!(beyond.events.is_empty());
        assert!(!beyond.has_more);
    }

    #[test]
    fn test_slice_clamps_zero_page() {
        let events = numbered_events(3);
        assert_eq!(
            SearchPage::slice(&events, 0, 0),
            SearchPage::slice(&events, 1, 1)
        );
    }

    #[test]
    fn test_search_options_clamped() {
        let options = SearchOptions::page(0, 0).refreshed().clamped();
        assert_eq!(options.page, 1);
        assert_eq!(options.page_size, 1);
        assert!(options.force_refresh);
    }

    #[test]
    fn test_rounded_seconds() {
        assert_eq!(rounded_seconds(Duration::from_millis(3_460)), 3.5);
        assert_eq!(rounded_seconds(Duration::from_millis(104)), 0.1);
        assert_eq!(rounded_seconds(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_artist_matches_korean_name() {
        let artist = Artist {
            id: "artist-4".to_string(),
            name: "IU".to_string(),
            name_ko: Some("아이유".to_string()),
            image_url: "https://example.com/iu.png".to_string(),
            genre: "K-POP".to_string(),
            follower_count: 1,
        };
        assert!(artist.matches("아이"));
        assert!(artist.matches("iu"));
        assert!(!artist.matches("bts"));
    }
}
