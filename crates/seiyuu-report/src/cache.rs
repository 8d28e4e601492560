//! Character list cache.
//!
//! One JSON file per anime id; each record carries its fetch date so stale
//! lists get refetched once the configured lifetime runs out.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::models::AnimeCharacter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A cached character list together with its fetch date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheRecord {
    pub anime_id: u32,
    pub fetched_at: NaiveDate,
    pub characters: Vec<AnimeCharacter>,
}

/// File-per-anime cache of character lists
pub struct CharacterCache {
    /// Root cache directory
    cache_dir: PathBuf,
    /// Days a record stays fresh
    lifetime_days: u32,
}

impl CharacterCache {
    /// Create a new cache rooted at the given directory
    pub fn new(cache_dir: impl AsRef<Path>, lifetime_days: u32) -> Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();

        std::fs::create_dir_all(&cache_dir).with_context(|| {
            format!("Failed to create cache directory: {}", cache_dir.display())
        })?;
        info!(cache_dir = %cache_dir.display(), "Cache initialized");

        Ok(Self {
            cache_dir,
            lifetime_days,
        })
    }

    /// Look up the cached record for an anime.
    ///
    /// Unreadable or undecodable entries degrade to a miss with a warning;
    /// the caller then refetches and overwrites them.
    pub fn lookup(&self, anime_id: u32) -> Option<CacheRecord> {
        let path = self.record_path(anime_id);
        if !path.exists() {
            debug!(anime_id = anime_id, "Cache miss");
            return None;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    anime_id = anime_id,
                    error = %e,
                    "Unreadable cache entry, treating as miss"
                );
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(record) => {
                debug!(anime_id = anime_id, "Cache hit");
                Some(record)
            }
            Err(e) => {
                warn!(
                    anime_id = anime_id,
                    error = %e,
                    "Corrupt cache entry, treating as miss"
                );
                None
            }
        }
    }

    /// Whether a record's age is within the configured lifetime.
    ///
    /// Age is counted in whole days between the fetch date and today, so a
    /// lifetime of 100 keeps a record fresh through its hundredth day.
    pub fn is_fresh(&self, record: &CacheRecord) -> bool {
        let age_days = Utc::now()
            .date_naive()
            .signed_duration_since(record.fetched_at)
            .num_days();
        age_days <= i64::from(self.lifetime_days)
    }

    /// Store a character list, stamped with today's date.
    ///
    /// The record is written to a sibling temp file and renamed into place,
    /// so an interrupted run never leaves a half-written record behind.
    pub fn store(&self, anime_id: u32, characters: &[AnimeCharacter]) -> Result<()> {
        let record = CacheRecord {
            anime_id,
            fetched_at: Utc::now().date_naive(),
            characters: characters.to_vec(),
        };

        let path = self.record_path(anime_id);
        let tmp_path = path.with_extension("json.tmp");

        let content =
            serde_json::to_string_pretty(&record).context("Failed to serialize cache record")?;

        std::fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write cache file: {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to move cache file into place: {}", path.display()))?;

        debug!(anime_id = anime_id, path = %path.display(), "Cache stored");
        Ok(())
    }

    /// Clear all cached records
    pub fn clear(&self) -> Result<()> {
        if self.cache_dir.exists() {
            std::fs::remove_dir_all(&self.cache_dir).with_context(|| {
                format!("Failed to remove cache directory: {}", self.cache_dir.display())
            })?;
            std::fs::create_dir_all(&self.cache_dir).with_context(|| {
                format!(
                    "Failed to recreate cache directory: {}",
                    self.cache_dir.display()
                )
            })?;
            info!("Cache cleared");
        }

        Ok(())
    }

    /// Get cache statistics
    pub fn stats(&self) -> Result<CacheStats> {
        if !self.cache_dir.exists() {
            return Ok(CacheStats {
                total_files: 0,
                total_size_bytes: 0,
            });
        }

        let mut total_files = 0;
        let mut total_size_bytes = 0;

        for entry in std::fs::read_dir(&self.cache_dir)? {
            let entry = entry?;
            if entry.path().is_file() {
                total_files += 1;
                total_size_bytes += entry.metadata()?.len();
            }
        }

        Ok(CacheStats {
            total_files,
            total_size_bytes,
        })
    }

    /// Cache file path for an anime id
    fn record_path(&self, anime_id: u32) -> PathBuf {
        self.cache_dir.join(format!("{}.json", anime_id))
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_files: usize,
    pub total_size_bytes: u64,
}
