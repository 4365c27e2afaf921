//! Encore CLI - Command-line interface
//!
//! Artist autocomplete, event search and search history from the terminal,
//! against bundled fixtures or the real event API.

mod commands;

use clap::Parser;
use encore_core::tracing_setup::{CliLogLevel, init_tracing};
use encore_core::{EncoreConfig, LatencyConfig, RuntimeMode};
use encore_search::EventSearch;

/// Main CLI structure for Encore.
///
/// Global options pick the backend and output format; subcommands map onto
/// the search operations.
#[derive(Parser)]
#[command(name = "encore")]
#[command(about = "Concert and fan event discovery")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Runtime mode (development serves fixtures, production calls the API)
    #[arg(long, global = true)]
    mode: Option<RuntimeMode>,

    /// Event API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Console log level (the full trace always goes to logs/)
    #[arg(long, global = true, value_enum, default_value_t = CliLogLevel::Warn)]
    log_level: CliLogLevel,

    /// Skip the simulated latency of development mode
    #[arg(long, global = true)]
    no_latency: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    fn config(&self) -> EncoreConfig {
        let mut config = EncoreConfig::from_env();
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(api_url) = &self.api_url {
            config.api.base_url = api_url.trim_end_matches('/').to_string();
        }
        if self.no_latency {
            config.latency = LatencyConfig::none();
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level(), None)?;

    let config = cli.config();
    tracing::debug!(
        "Starting in {} mode against {}",
        config.mode,
        config.api.base_url
    );
    let search = EventSearch::from_config(&config)?;
    let output = commands::Output::new(cli.json);

    commands::run(&search, cli.command, output).await
}
