//! Data models shared across the workspace.
//!
//! This module defines the anime list entries, characters and voice actors
//! that flow from the MyAnimeList pages through the cache and aggregation
//! into the rendered report.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Watch status of an anime on the user's list.
///
/// The numeric values are the codes MyAnimeList uses on the wire
/// (note the gap: 5 is unused).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    Watching,
    Completed,
    OnHold,
    Dropped,
    PlanToWatch,
}

impl WatchStatus {
    /// Parse a MyAnimeList status code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(WatchStatus::Watching),
            2 => Some(WatchStatus::Completed),
            3 => Some(WatchStatus::OnHold),
            4 => Some(WatchStatus::Dropped),
            6 => Some(WatchStatus::PlanToWatch),
            _ => None,
        }
    }

    /// Sort priority for report rows: Completed > Watching > On-hold > Dropped.
    ///
    /// PlanToWatch ranks last; the pipeline never feeds it to the aggregator.
    pub fn sort_rank(&self) -> u8 {
        match self {
            WatchStatus::Completed => 0,
            WatchStatus::Watching => 1,
            WatchStatus::OnHold => 2,
            WatchStatus::Dropped => 3,
            WatchStatus::PlanToWatch => 4,
        }
    }
}

/// List page filter: the watch statuses plus "everything at once".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    Watching,
    Completed,
    OnHold,
    Dropped,
    PlanToWatch,
    All,
}

impl ListFilter {
    /// The `status` query parameter value for the list page
    pub fn query_code(&self) -> u8 {
        match self {
            ListFilter::Watching => 1,
            ListFilter::Completed => 2,
            ListFilter::OnHold => 3,
            ListFilter::Dropped => 4,
            ListFilter::PlanToWatch => 6,
            ListFilter::All => 7,
        }
    }
}

/// One entry of a user's anime list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimeEntry {
    pub id: u32,
    pub title: String,
    /// Site-relative URL of the anime page, e.g. `/anime/5114/...`
    pub url: String,
    pub status: WatchStatus,
    pub score: u8,
    pub num_watched_episodes: u32,
    pub num_episodes: u32,
    pub tags: Vec<String>,
    pub is_rewatching: bool,
    pub air_date: Option<NaiveDate>,
}

/// A voice actor credited on a character
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoiceActor {
    pub id: u32,
    pub name: String,
    pub language: String,
}

/// A character parsed from an anime's character listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimeCharacter {
    pub id: u32,
    pub name: String,
    pub is_main_character: bool,
    pub image_link: String,
    /// Watch status of the anime this character was parsed from.
    ///
    /// Stamped at parse time; the aggregator re-stamps it at insertion so a
    /// cached record from an earlier run cannot carry a stale status into
    /// the report.
    pub associated_anime_status: WatchStatus,
    pub voice_actors: Vec<VoiceActor>,
}
