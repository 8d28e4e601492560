//! Random plan-to-watch picker CLI.
//!
//! Fetches a user's plan-to-watch list and picks one entry uniformly at
//! random, for the nights when choosing is the hard part.

use anyhow::{bail, Context, Result};
use clap::Parser;
use mal_client::MalClient;
use rand::seq::SliceRandom;
use shared::models::ListFilter;
use shared::{Config, DataPaths};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// MyAnimeList username whose plan-to-watch list is drawn from
    username: String,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Open the picked anime's page in the default browser
    #[arg(long)]
    open: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    shared::logging::init(shared::LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "watch-picker".to_string(),
        default_level: log_level,
        console: true,
        file: true,
        json_format: false,
    })?;

    info!("Watch picker starting");

    // Initialize data paths
    let data_paths = DataPaths::new(config.data_dir());
    data_paths
        .create_dirs()
        .context("Failed to create data directories")?;

    // Initialize the site client
    let mut client = MalClient::new(
        config.mal.base_url.clone(),
        Duration::from_secs(config.mal.http.timeout_secs),
        Duration::from_secs_f64(config.mal.rate_limit.request_interval_secs),
        config.mal.http.max_retries,
        config.mal.http.retry_delay_ms,
    )
    .context("Failed to create site client")?;

    // Fetch the plan-to-watch list
    info!(username = %args.username, "Fetching plan-to-watch list");
    let entries = client
        .anime_list(&args.username, ListFilter::PlanToWatch)
        .await
        .with_context(|| format!("Failed to fetch plan-to-watch list for {}", args.username))?;
    info!(entries = entries.len(), "Fetched plan-to-watch list");

    let pick = match entries.choose(&mut rand::thread_rng()) {
        Some(entry) => entry,
        None => bail!("Plan-to-watch list of {} is empty", args.username),
    };

    let page_url = format!("{}{}", config.mal.base_url, pick.url);
    println!("{}", pick.title);
    println!("{}", page_url);

    if args.open {
        shared::browser::open(&page_url).context("Failed to open anime page in browser")?;
    }

    info!(anime_id = pick.id, title = %pick.title, "Picked anime");

    Ok(())
}
