//! Seiyuu report CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use mal_client::MalClient;
use seiyuu_report::{aggregate, report, CharacterCache, CharacterPipeline, PipelineSettings};
use shared::models::ListFilter;
use shared::paths::sanitize_filename;
use shared::{Config, DataPaths};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// MyAnimeList username whose anime list drives the report
    username: String,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Clear the character cache before running
    #[arg(long)]
    clear_cache: bool,

    /// Open the rendered report in the default browser
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
        component: "seiyuu-report".to_string(),
        default_level: log_level,
        console: true,
        file: true,
        json_format: false,
    })?;

    info!("Seiyuu report starting");
    info!(
        config_file = %args.config.display(),
        username = %args.username,
        "Loaded configuration"
    );

    // Initialize data paths
    let data_paths = DataPaths::new(config.data_dir());
    data_paths
        .create_dirs()
        .context("Failed to create data directories")?;

    // Initialize the character cache
    let cache = CharacterCache::new(config.cache_dir(), config.mal.cache.lifetime_days)
        .context("Failed to initialize cache")?;

    if args.clear_cache {
        info!("Clearing cache");
        cache.clear().context("Failed to clear cache")?;
    }

    // Display cache statistics
    let cache_stats = cache.stats().context("Failed to get cache stats")?;
    info!(
        cached_lists = cache_stats.total_files,
        cache_size_kb = cache_stats.total_size_bytes / 1_000,
        "Cache statistics"
    );

    // Initialize the site client
    let mut client = MalClient::new(
        config.mal.base_url.clone(),
        Duration::from_secs(config.mal.http.timeout_secs),
        Duration::from_secs_f64(config.mal.rate_limit.request_interval_secs),
        config.mal.http.max_retries,
        config.mal.http.retry_delay_ms,
    )
    .context("Failed to create site client")?;

    // Fetch the user's anime list
    info!(username = %args.username, "Fetching anime list");
    let entries = client
        .anime_list(&args.username, ListFilter::All)
        .await
        .with_context(|| format!("Failed to fetch anime list for {}", args.username))?;
    info!(entries = entries.len(), "Fetched anime list");

    // Collect character lists, cache first
    let settings = PipelineSettings::from_config(&config.mal.rate_limit);
    let mut pipeline = CharacterPipeline::new(client, cache, settings);
    let collected = pipeline
        .run(&entries)
        .await
        .context("Character collection failed")?;

    // Aggregate per voice actor and render the page
    let aggregation = aggregate(&collected, &config.report.target_language);
    let html = report::render(
        &aggregation,
        &config.mal.base_url,
        config.report.name_wrap_width,
    );

    let report_dir = config.report_dir();
    std::fs::create_dir_all(&report_dir).with_context(|| {
        format!("Failed to create report directory: {}", report_dir.display())
    })?;
    let report_path = report_dir.join(format!("{}.html", sanitize_filename(&args.username)));
    std::fs::write(&report_path, &html)
        .with_context(|| format!("Failed to write report: {}", report_path.display()))?;

    // Display final statistics
    let stats = pipeline.stats();
    info!("=== Report Complete ===");
    info!("Anime processed: {}", stats.anime_processed);
    info!("Plan-to-watch skipped: {}", stats.anime_skipped);
    info!("Cache hits: {}", stats.cache_hits);
    info!("Anime fetched: {}", stats.anime_fetched);
    info!("Block retries: {}", stats.block_retries);
    info!("Character page fetches: {}", stats.secondary_fetches);
    info!("Voice actors in report: {}", aggregation.rows.len());
    info!(report = %report_path.display(), "Report written");

    if args.open {
        shared::browser::open(&report_path.to_string_lossy())
            .context("Failed to open report in browser")?;
    }

    info!("Seiyuu report finished successfully");

    Ok(())
}
