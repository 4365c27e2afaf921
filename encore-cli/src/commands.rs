//! CLI command implementations

use anyhow::{Context, bail};
use clap::Subcommand;
use encore_search::{Artist, Event, EventSearch, RecentSearch, SearchOptions, SearchResult};
use serde::Serialize;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Suggest artists matching a partial name
    Autocomplete {
        /// Partial artist name, Latin or Korean
        query: String,
    },
    /// Search events by artist name or title
    Search {
        /// Search text
        query: String,
        /// Page to show, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Events per page
        #[arg(long)]
        page_size: Option<u32>,
        /// Ignore cached results
        #[arg(long)]
        force_refresh: bool,
        /// Show every match instead of one page
        #[arg(long, conflicts_with = "page")]
        all: bool,
    },
    /// Show an artist profile
    Artist {
        /// Artist id
        id: String,
        /// Include the artist's events
        #[arg(long)]
        events: bool,
        /// Include artists of the same genre
        #[arg(long)]
        related: bool,
    },
    /// Show event details
    Event {
        /// Event id
        id: String,
    },
    /// List popular artists
    Popular,
    /// List followed artists
    Followed,
    /// Manage search history
    Recent {
        #[command(subcommand)]
        action: RecentCommand,
    },
}

/// Search history actions
#[derive(Subcommand)]
pub enum RecentCommand {
    /// List recent searches, newest first
    List,
    /// Record a search
    Save { query: String },
    /// Remove one entry
    Delete { id: String },
    /// Remove every entry
    Clear,
}

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as JSON, or run `human` for plain text output.
    fn emit<T: Serialize>(self, value: &T, human: impl FnOnce()) -> anyhow::Result<()> {
        if self.json {
            let rendered = serde_json::to_string_pretty(value).context("JSON rendering failed")?;
            println!("{rendered}");
        } else {
            human();
        }
        Ok(())
    }
}

/// Run one CLI command against `search`.
///
/// # Errors
/// - Search failures from the backend
/// - Unknown artist or event ids
pub async fn run(search: &EventSearch, command: Commands, output: Output) -> anyhow::Result<()> {
    match command {
        Commands::Autocomplete { query } => autocomplete(search, &query, output).await,
        Commands::Search {
            query,
            page,
            page_size,
            force_refresh,
            all,
        } => {
            let page_size = page_size.unwrap_or(search.default_page_size());
            if all {
                search_everything(search, &query, page_size, output).await
            } else {
                let options = SearchOptions {
                    page,
                    page_size,
                    force_refresh,
                };
                search_events(search, &query, options, output).await
            }
        }
        Commands::Artist {
            id,
            events,
            related,
        } => show_artist(search, &id, events, related, output).await,
        Commands::Event { id } => show_event(search, &id, output).await,
        Commands::Popular => {
            let artists = search.popular_artists().await?;
            output.emit(&artists, || print_artists("Popular artists", &artists))
        }
        Commands::Followed => {
            let artists = search.followed_artists().await?;
            output.emit(&artists, || print_artists("Followed artists", &artists))
        }
        Commands::Recent { action } => recent(search, action, output).await,
    }
}

async fn autocomplete(search: &EventSearch, query: &str, output: Output) -> anyhow::Result<()> {
    let artists = search.autocomplete_artists(query).await?;
    output.emit(&artists, || {
        print_artists(&format!("Artists matching '{query}'"), &artists)
    })
}

async fn search_events(
    search: &EventSearch,
    query: &str,
    options: SearchOptions,
    output: Output,
) -> anyhow::Result<()> {
    let result = search.search_with(query, options).await?;
    output.emit(&result, || print_search_result(&result))
}

async fn search_everything(
    search: &EventSearch,
    query: &str,
    page_size: u32,
    output: Output,
) -> anyhow::Result<()> {
    let events = search.search_all(query, page_size).await?;
    output.emit(&events, || {
        println!("{} events matching '{query}'", events.len());
        println!("{:-<60}", "");
        for event in &events {
            print_event_line(event);
        }
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArtistView {
    artist: Artist,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<Event>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    related: Option<Vec<Artist>>,
}

async fn show_artist(
    search: &EventSearch,
    id: &str,
    with_events: bool,
    with_related: bool,
    output: Output,
) -> anyhow::Result<()> {
    let Some(artist) = search.artist(id).await? else {
        bail!("artist '{id}' not found");
    };

    let events = if with_events {
        Some(search.artist_events(id).await?)
    } else {
        None
    };
    let related = if with_related {
        Some(search.related_artists(id).await?)
    } else {
        None
    };

    let view = ArtistView {
        artist,
        events,
        related,
    };
    output.emit(&view, || {
        print_artist_profile(&view.artist);
        if let Some(events) = &view.events {
            println!();
            println!("Events ({})", events.len());
            for event in events {
                print_event_line(event);
            }
        }
        if let Some(related) = &view.related {
            println!();
            print_artists("Related artists", related);
        }
    })
}

async fn show_event(search: &EventSearch, id: &str, output: Output) -> anyhow::Result<()> {
    let Some(event) = search.event(id).await? else {
        bail!("event '{id}' not found");
    };
    output.emit(&event, || print_event_details(&event))
}

async fn recent(search: &EventSearch, action: RecentCommand, output: Output) -> anyhow::Result<()> {
    match action {
        RecentCommand::List => {}
        RecentCommand::Save { query } => search.save_recent_search(&query).await?,
        RecentCommand::Delete { id } => search.delete_recent_search(&id).await?,
        RecentCommand::Clear => search.clear_recent_searches().await?,
    }

    let history = search.recent_searches().await?;
    output.emit(&history, || print_recent(&history))
}

fn print_artists(heading: &str, artists: &[Artist]) {
    println!("{heading}");
    println!("{:-<60}", "");
    if artists.is_empty() {
        println!("No artists found.");
        return;
    }
    for artist in artists {
        println!(
            "  {:<12} {:<20} {:<8} {:>10} followers",
            artist.id,
            display_name(artist),
            artist.genre,
            artist.follower_count
        );
    }
}

fn print_artist_profile(artist: &Artist) {
    println!("{}", display_name(artist));
    println!("{:-<60}", "");
    println!("  Id:        {}", artist.id);
    println!("  Genre:     {}", artist.genre);
    println!("  Followers: {}", artist.follower_count);
}

fn display_name(artist: &Artist) -> String {
    match &artist.name_ko {
        Some(name_ko) => format!("{} ({name_ko})", artist.name),
        None => artist.name.clone(),
    }
}

fn print_search_result(result: &SearchResult) {
    println!(
        "{} events matching '{}' (page {}, {:.1}s{})",
        result.total,
        result.query,
        result.page,
        result.search_time,
        if result.cached { ", cached" } else { "" }
    );
    println!("{:-<60}", "");
    if result.events.is_empty() {
        println!("No events on this page.");
    }
    for event in &result.events {
        print_event_line(event);
    }
    if result.has_more {
        println!();
        println!("More results: use --page {}", result.page + 1);
    }
}

fn print_event_line(event: &Event) {
    println!(
        "  {:<10} {} {}  [{}] {} @ {}, {}",
        event.id,
        event.date,
        event.time.format("%H:%M"),
        event.category.label(),
        event.title,
        event.venue,
        event.city
    );
}

fn print_event_details(event: &Event) {
    println!("{}", event.title);
    println!("{:-<60}", "");
    println!("  Artist:   {} ({})", event.artist_name, event.artist_id);
    println!("  Category: {}", event.category.label());
    println!(
        "  When:     {} {} ({})",
        event.date,
        event.time.format("%H:%M"),
        event.timezone
    );
    println!("  Venue:    {}", event.venue);
    match &event.address {
        Some(address) => println!("  Address:  {address}, {}, {}", event.city, event.country),
        None => println!("  Address:  {}, {}", event.city, event.country),
    }
    if let Some(price) = &event.price {
        println!("  Price:    {}-{} {}", price.min, price.max, price.currency);
        for tier in &price.tiers {
            println!("            {}: {} {}", tier.name, tier.price, price.currency);
        }
    }
    if let Some(ticket_url) = &event.ticket_url {
        println!("  Tickets:  {ticket_url}");
    }
    println!("  Source:   {} ({})", event.source, event.source_url);
}

fn print_recent(history: &[RecentSearch]) {
    println!("Recent searches");
    println!("{:-<60}", "");
    if history.is_empty() {
        println!("No recent searches.");
        return;
    }
    for entry in history {
        println!(
            "  {:<36} {:<24} {}",
            entry.id,
            entry.query,
            entry.searched_at.format("%Y-%m-%d %H:%M")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json() -> Output {
        Output::new(true)
    }

    #[tokio::test]
    async fn test_unknown_artist_fails() {
        let search = EventSearch::for_testing();
        let error = show_artist(&search, "nonexistent", false, false, json())
            .await
            .unwrap_err();
        assert!(error.to_string().contains("nonexistent"));
    }

    #[tokio::test]
    async fn test_unknown_event_fails() {
        let search = EventSearch::for_testing();
        assert!(show_event(&search, "nonexistent", json()).await.is_err());
    }

    #[tokio::test]
    async fn test_recent_actions_update_history() {
        let search = EventSearch::for_testing();

        recent(&search, RecentCommand::Save { query: "IU".to_string() }, json())
            .await
            .unwrap();
        assert_eq!(search.recent_searches().await.unwrap()[0].query, "IU");

        recent(&search, RecentCommand::Clear, json()).await.unwrap();
        assert!(search.recent_searches().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_commands_run() {
        let search = EventSearch::for_testing();
        let command = Commands::Search {
            query: "BTS".to_string(),
            page: 1,
            page_size: Some(2),
            force_refresh: false,
            all: false,
        };
        run(&search, command, Output::new(false)).await.unwrap();

        let everything = Commands::Search {
            query: "BTS".to_string(),
            page: 1,
            page_size: None,
            force_refresh: false,
            all: true,
        };
        run(&search, everything, json()).await.unwrap();

        let in_pages_of_two = Commands::Search {
            query: "BTS".to_string(),
            page: 1,
            page_size: Some(2),
            force_refresh: false,
            all: true,
        };
        run(&search, in_pages_of_two, Output::new(false))
            .await
            .unwrap();
    }

    #[test]
    fn test_event_details_without_address() {
        let mut event = encore_search::FixtureSet::bundled().events[0].clone();
        event.address = None;
        if let Some(price) = event.price.as_mut() {
            price.tiers.clear();
        }
        print_event_details(&event);
    }
}
