//! Configuration management.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// MyAnimeList access settings
    pub mal: MalConfig,

    /// Report settings
    #[serde(default)]
    pub report: ReportConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// MyAnimeList access configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MalConfig {
    /// Site base URL
    pub base_url: String,

    /// HTTP transport settings
    pub http: HttpConfig,

    /// Request pacing settings
    pub rate_limit: RateLimitConfig,

    /// Character cache settings
    pub cache: CacheConfig,
}

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum retries for failed requests
    pub max_retries: u32,

    /// Retry delay in milliseconds (doubled on each attempt)
    pub retry_delay_ms: u64,
}

/// Request pacing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum spacing between requests in seconds, measured from the
    /// completion of the previous request
    pub request_interval_secs: f64,

    /// Wait before retrying after the site stops serving content, in seconds
    pub block_retry_secs: u64,

    /// Give up after this many blocked attempts per anime (0 = retry forever)
    pub max_block_retries: u32,

    /// Courtesy delay between anime that required a real request, in seconds
    pub anime_interval_secs: u64,
}

/// Character cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory (relative to data directory or absolute)
    pub cache_dir: String,

    /// Days a cached character list stays fresh
    pub lifetime_days: u32,
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report output directory (relative to data directory or absolute)
    pub report_dir: String,

    /// Voice actor language the report groups by
    pub target_language: String,

    /// Character name wrap width in the report, in characters per line
    pub name_wrap_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            report_dir: "reports".to_string(),
            target_language: "Japanese".to_string(),
            name_wrap_width: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                root_dir: "data".to_string(),
            },
            logging: LoggingConfig {
                log_dir: "logs".to_string(),
                default_level: "info".to_string(),
                console: true,
                file: true,
                json_format: false,
            },
            mal: MalConfig {
                base_url: "https://myanimelist.net".to_string(),
                http: HttpConfig {
                    timeout_secs: 30,
                    max_retries: 3,
                    retry_delay_ms: 1000,
                },
                rate_limit: RateLimitConfig {
                    request_interval_secs: 1.0,
                    block_retry_secs: 60,
                    max_block_retries: 0, // Retry forever
                    anime_interval_secs: 3,
                },
                cache: CacheConfig {
                    cache_dir: "cache".to_string(),
                    lifetime_days: 100,
                },
            },
            report: ReportConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Reject values that would panic downstream.
    ///
    /// TOML admits `inf`, `nan` and negative floats; none of them is a
    /// usable request interval.
    fn validate(&self) -> Result<()> {
        let interval = self.mal.rate_limit.request_interval_secs;
        if !interval.is_finite() || interval < 0.0 {
            anyhow::bail!(
                "mal.rate_limit.request_interval_secs must be a non-negative number, got {}",
                interval
            );
        }
        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Get the absolute path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the absolute path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        let log_path = Path::new(&self.logging.log_dir);
        if log_path.is_absolute() {
            log_path.to_path_buf()
        } else {
            self.data_dir().join(log_path)
        }
    }

    /// Get the absolute path for the character cache directory
    pub fn cache_dir(&self) -> PathBuf {
        let cache_path = Path::new(&self.mal.cache.cache_dir);
        if cache_path.is_absolute() {
            cache_path.to_path_buf()
        } else {
            self.data_dir().join(cache_path)
        }
    }

    /// Get the absolute path for the report output directory
    pub fn report_dir(&self) -> PathBuf {
        let report_path = Path::new(&self.report.report_dir);
        if report_path.is_absolute() {
            report_path.to_path_buf()
        } else {
            self.data_dir().join(report_path)
        }
    }
}
