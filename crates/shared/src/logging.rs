//! Logging setup shared by the binaries.
//!
//! Console output goes to stderr so a binary's own stdout stays clean;
//! file output rotates daily under the configured log directory.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log directory path
    pub log_dir: String,
    /// Component name, used for log file naming and filter targets
    pub component: String,
    /// Default log level
    pub default_level: Level,
    /// Enable console output
    pub console: bool,
    /// Enable file output
    pub file: bool,
    /// Write file logs as JSON
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "data/logs".to_string(),
            component: "seiyuu-report".to_string(),
            default_level: Level::INFO,
            console: true,
            file: true,
            json_format: false,
        }
    }
}

/// The filter applied when `RUST_LOG` is not set: the component and the
/// workspace crates at the configured level, noisy HTTP internals capped
/// at warn. Binary names carry hyphens but tracing targets use
/// underscores, so the component gets normalized.
fn default_filter(component: &str, level: Level) -> String {
    let target = component.replace('-', "_");
    format!(
        "{target}={level},shared={level},mal_client={level},seiyuu_report={level},hyper=warn,reqwest=warn,h2=warn"
    )
}

/// Initialize the global tracing subscriber from a [`LogConfig`]
pub fn init(config: LogConfig) -> Result<()> {
    let log_dir = Path::new(&config.log_dir);
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", config.log_dir))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(default_filter(&config.component, config.default_level))
    });

    let mut layers = Vec::new();

    if config.console {
        layers.push(fmt::layer().with_writer(std::io::stderr).boxed());
    }

    if config.file {
        let appender = tracing_appender::rolling::daily(log_dir, &config.component);
        let file_layer = if config.json_format {
            fmt::layer().json().with_writer(appender).boxed()
        } else {
            fmt::layer().with_ansi(false).with_writer(appender).boxed()
        };
        layers.push(file_layer);
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::info!(
        component = %config.component,
        log_dir = %config.log_dir,
        "Logging initialized"
    );

    Ok(())
}
