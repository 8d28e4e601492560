//! Anime list page parsing.
//!
//! The list page embeds the entire list as JSON in the `data-items`
//! attribute of its table; no row scraping is involved.

use super::selectors;
use crate::error::ClientError;
use chrono::NaiveDate;
use scraper::Html;
use serde::Deserialize;
use shared::models::{AnimeEntry, WatchStatus};

/// List entry as it appears in the embedded JSON payload
#[derive(Debug, Deserialize)]
struct RawListEntry {
    status: u8,
    score: u8,
    #[serde(default)]
    tags: String,
    is_rewatching: u8,
    num_watched_episodes: u32,
    anime_num_episodes: u32,
    anime_title: String,
    anime_id: u32,
    anime_start_date_string: Option<String>,
    anime_url: String,
}

impl RawListEntry {
    fn into_entry(self) -> Result<AnimeEntry, ClientError> {
        let status = WatchStatus::from_code(self.status).ok_or_else(|| {
            ClientError::shape(format!("unknown watch status code {}", self.status))
        })?;

        let tags = self
            .tags
            .split(", ")
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();

        // Air dates come as day-month-year with a two digit year; entries
        // that never aired carry null
        let air_date = self
            .anime_start_date_string
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s, "%d-%m-%y").ok());

        Ok(AnimeEntry {
            id: self.anime_id,
            title: self.anime_title,
            url: self.anime_url,
            status,
            score: self.score,
            num_watched_episodes: self.num_watched_episodes,
            num_episodes: self.anime_num_episodes,
            tags,
            is_rewatching: self.is_rewatching != 0,
            air_date,
        })
    }
}

/// Parse a user's anime list page
pub fn anime_list(html: &str) -> Result<Vec<AnimeEntry>, ClientError> {
    let document = Html::parse_document(html);

    let table = document
        .select(&selectors::LIST_TABLE)
        .next()
        .ok_or_else(|| ClientError::shape("anime list table not found"))?;

    let payload = table
        .value()
        .attr("data-items")
        .ok_or_else(|| ClientError::shape("anime list table without data-items"))?;

    let raw_entries: Vec<RawListEntry> = serde_json::from_str(payload)?;

    raw_entries
        .into_iter()
        .map(RawListEntry::into_entry)
        .collect()
}
