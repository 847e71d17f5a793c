use anyhow::Context;
use clap::{Parser, Subcommand};
use std::{sync::Arc, time::Duration};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use weather_core::{
    BackgroundLogger, Config, HttpLogSink, HttpLookupClient, SearchCoordinator, SearchHandle,
    ViewState, WeatherLookup, model::SearchLogListing,
};

use crate::render::{render_card, render_logs, render_state};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "City weather lookup")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key used by the server.
    Configure,

    /// Run the lookup and search-log HTTP server.
    Serve {
        /// Address to bind, e.g. "0.0.0.0:3000".
        #[arg(long)]
        addr: Option<String>,
    },

    /// Interactive search: every input line is the new value of the search box.
    Search {
        /// Base URL of the weather server.
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Look up one city and print its card.
    Show {
        /// City name.
        city: String,

        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Print the server's search log.
    Logs {
        #[arg(long)]
        endpoint: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?.with_env_overrides();

        match self.command {
            Command::Configure => configure(config),
            Command::Serve { addr } => {
                let addr = addr.unwrap_or_else(|| config.listen_addr.clone());
                weather_server::serve(&config, &addr).await
            }
            Command::Search { endpoint } => search(&config, endpoint).await,
            Command::Show { city, endpoint } => show(&config, endpoint, &city).await,
            Command::Logs { endpoint } => logs(&config, endpoint).await,
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let key = inquire::Password::new("WeatherAPI.com API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if key.trim().is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    config.set_api_key(key);
    config.save()?;
    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn search(config: &Config, endpoint: Option<String>) -> anyhow::Result<()> {
    let endpoint = endpoint.unwrap_or_else(|| config.endpoint.clone());

    let lookup = Arc::new(HttpLookupClient::new(&endpoint, config.lookup_timeout())?);
    let sink = Arc::new(HttpLogSink::new(&endpoint, config.lookup_timeout())?);
    let logger = BackgroundLogger::new(sink);
    let search = SearchCoordinator::spawn(config.search_settings(), lookup, logger.clone());

    let input = BufReader::new(tokio::io::stdin());
    drive_search(input, &search, &logger, LOG_GRACE, |state| println!("{}", render_state(state)))
        .await
}

const LOG_GRACE: Duration = Duration::from_secs(2);

/// Feed every input line to the coordinator as the new query and emit each
/// visible state. At end of input, waits for the last cycle to settle and
/// gives pending search logs up to `log_grace` to complete.
async fn drive_search<R>(
    input: R,
    search: &SearchHandle,
    logger: &BackgroundLogger,
    log_grace: Duration,
    mut emit: impl FnMut(&ViewState),
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut updates = search.subscribe();
    let initial = updates.borrow_and_update().clone();
    emit(&initial);

    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line.context("Failed to read input")? {
                Some(line) => search.set_query(line),
                None => break,
            },
            Ok(()) = updates.changed() => {
                let state = updates.borrow_and_update().clone();
                emit(&state);
            }
        }
    }

    let settled = search.flush();
    tokio::pin!(settled);
    loop {
        tokio::select! {
            () = &mut settled => break,
            Ok(()) = updates.changed() => {
                let state = updates.borrow_and_update().clone();
                emit(&state);
            }
        }
    }
    if updates.has_changed().unwrap_or(false) {
        let state = updates.borrow_and_update().clone();
        emit(&state);
    }

    logger.drain(log_grace).await;
    Ok(())
}

async fn show(config: &Config, endpoint: Option<String>, city: &str) -> anyhow::Result<()> {
    let endpoint = endpoint.unwrap_or_else(|| config.endpoint.clone());
    let client = HttpLookupClient::new(&endpoint, config.lookup_timeout())?;

    match client.lookup(city).await {
        Ok(snapshot) => {
            println!("{}", render_card(&snapshot));
            Ok(())
        }
        Err(e) => {
            tracing::debug!(kind = ?e.kind(), "lookup failed");
            anyhow::bail!("{e}")
        }
    }
}

async fn logs(config: &Config, endpoint: Option<String>) -> anyhow::Result<()> {
    let endpoint = endpoint.unwrap_or_else(|| config.endpoint.clone());
    let url = format!("{}/api/log", endpoint.trim_end_matches('/'));

    let listing: SearchLogListing = reqwest::Client::builder()
        .timeout(config.lookup_timeout())
        .build()?
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Failed to reach {url}"))?
        .error_for_status()
        .context("Log endpoint returned an error")?
        .json()
        .await
        .context("Failed to parse log listing")?;

    println!("{}", render_logs(&listing));
    Ok(())
}
