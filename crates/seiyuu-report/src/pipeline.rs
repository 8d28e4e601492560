//! Character acquisition pipeline.
//!
//! Walks a user's anime list and produces the character list for every
//! watched entry, consulting the cache before the network and pacing the
//! site politely when it does have to fetch.

use crate::cache::CharacterCache;
use anyhow::{Context, Result};
use mal_client::{urls, ClientError, MalClient};
use shared::config::RateLimitConfig;
use shared::models::{AnimeCharacter, AnimeEntry, VoiceActor, WatchStatus};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Where character data comes from.
///
/// The pipeline only ever talks to the site through this trait, so tests
/// can script responses without a server. Futures here are not `Send`;
/// the pipeline runs everything on one task.
#[allow(async_fn_in_trait)]
pub trait CharacterSource {
    /// Fetch the character listing of an anime
    async fn anime_characters(
        &mut self,
        entry: &AnimeEntry,
    ) -> Result<Vec<AnimeCharacter>, ClientError>;

    /// Fetch the voice actors credited on a character's own page
    async fn character_voice_actors(
        &mut self,
        character_id: u32,
    ) -> Result<Vec<VoiceActor>, ClientError>;
}

impl CharacterSource for MalClient {
    async fn anime_characters(
        &mut self,
        entry: &AnimeEntry,
    ) -> Result<Vec<AnimeCharacter>, ClientError> {
        MalClient::anime_characters(self, entry).await
    }

    async fn character_voice_actors(
        &mut self,
        character_id: u32,
    ) -> Result<Vec<VoiceActor>, ClientError> {
        MalClient::character_voice_actors(self, character_id).await
    }
}

/// Pacing knobs the pipeline applies on top of the client's own limiter
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// How long to wait after the site serves an empty page
    pub block_retry: Duration,
    /// Blocked attempts before giving up; zero retries forever
    pub max_block_retries: u32,
    /// Courtesy pause after each anime that needed the network
    pub anime_interval: Duration,
}

impl PipelineSettings {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            block_retry: Duration::from_secs(config.block_retry_secs),
            max_block_retries: config.max_block_retries,
            anime_interval: Duration::from_secs(config.anime_interval_secs),
        }
    }
}

/// Counters accumulated over a pipeline run
#[derive(Debug, Default, Clone, Copy)]
pub struct PipelineStats {
    pub anime_processed: usize,
    pub anime_skipped: usize,
    pub cache_hits: usize,
    pub anime_fetched: usize,
    pub block_retries: usize,
    pub secondary_fetches: usize,
}

/// Collects character lists for an anime list, cache first
pub struct CharacterPipeline<S> {
    source: S,
    cache: CharacterCache,
    settings: PipelineSettings,
    stats: PipelineStats,
}

impl<S: CharacterSource> CharacterPipeline<S> {
    pub fn new(source: S, cache: CharacterCache, settings: PipelineSettings) -> Self {
        Self {
            source,
            cache,
            settings,
            stats: PipelineStats::default(),
        }
    }

    /// Collect the character list for every watched entry, in list order.
    ///
    /// Plan-to-watch entries are skipped outright. After each anime that
    /// caused a request the inter-anime courtesy pause runs; pure cache
    /// hits skip it.
    pub async fn run(
        &mut self,
        entries: &[AnimeEntry],
    ) -> Result<Vec<(AnimeEntry, Vec<AnimeCharacter>)>> {
        let total = entries.len();
        let mut collected = Vec::new();

        for (idx, entry) in entries.iter().enumerate() {
            if entry.status == WatchStatus::PlanToWatch {
                debug!(anime_id = entry.id, title = %entry.title, "Skipping plan-to-watch entry");
                self.stats.anime_skipped += 1;
                continue;
            }

            info!(
                progress = format!("{}/{}", idx + 1, total),
                anime_id = entry.id,
                title = %entry.title,
                "Processing anime"
            );

            let (request_sent, characters) = self
                .characters_for(entry)
                .await
                .with_context(|| format!("Failed to collect characters for: {}", entry.title))?;

            collected.push((entry.clone(), characters));
            self.stats.anime_processed += 1;

            if request_sent {
                sleep(self.settings.anime_interval).await;
            }
        }

        info!(
            anime_processed = self.stats.anime_processed,
            anime_skipped = self.stats.anime_skipped,
            cache_hits = self.stats.cache_hits,
            anime_fetched = self.stats.anime_fetched,
            block_retries = self.stats.block_retries,
            secondary_fetches = self.stats.secondary_fetches,
            "Character collection finished"
        );

        Ok(collected)
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Character list for one anime.
    ///
    /// Returns whether the network was touched alongside the characters.
    /// Cache records are keyed by the id in the anime page URL, not the
    /// list payload's separate numeric field.
    async fn characters_for(&mut self, entry: &AnimeEntry) -> Result<(bool, Vec<AnimeCharacter>)> {
        let anime_id = urls::anime_id_from_url(&entry.url)?;

        if let Some(record) = self.cache.lookup(anime_id) {
            if self.cache.is_fresh(&record) {
                debug!(anime_id, "Using cached character list");
                self.stats.cache_hits += 1;
                return Ok((false, record.characters));
            }
            debug!(
                anime_id,
                fetched_at = %record.fetched_at,
                "Cached record expired, refetching"
            );
        }

        let mut characters = self.fetch_with_block_retry(entry).await?;
        self.fill_missing_voice_actors(&mut characters).await?;
        self.cache.store(anime_id, &characters)?;
        self.stats.anime_fetched += 1;

        Ok((true, characters))
    }

    /// Fetch a character listing, waiting out suspected blocks.
    ///
    /// A zero retry cap waits forever, matching how long the site keeps an
    /// address suspended. Any other error is final; the client has already
    /// retried transport failures internally.
    async fn fetch_with_block_retry(
        &mut self,
        entry: &AnimeEntry,
    ) -> Result<Vec<AnimeCharacter>, ClientError> {
        let mut blocked_attempts = 0u32;
        loop {
            match self.source.anime_characters(entry).await {
                Err(ClientError::SuspectedBlock) => {
                    blocked_attempts += 1;
                    if self.settings.max_block_retries != 0
                        && blocked_attempts >= self.settings.max_block_retries
                    {
                        return Err(ClientError::SuspectedBlock);
                    }
                    self.stats.block_retries += 1;
                    warn!(
                        anime_id = entry.id,
                        blocked_attempts,
                        wait_secs = self.settings.block_retry.as_secs_f64(),
                        "Page served without content, waiting before retry"
                    );
                    sleep(self.settings.block_retry).await;
                }
                other => return other,
            }
        }
    }

    /// Fill in voice actors for characters whose listing panel was empty.
    ///
    /// The listing page omits the panel for some characters even though
    /// their own page carries full credits.
    async fn fill_missing_voice_actors(
        &mut self,
        characters: &mut [AnimeCharacter],
    ) -> Result<(), ClientError> {
        for character in characters.iter_mut() {
            if !character.voice_actors.is_empty() {
                continue;
            }
            debug!(
                character_id = character.id,
                name = %character.name,
                "No voice actors on listing, fetching character page"
            );
            character.voice_actors = self.source.character_voice_actors(character.id).await?;
            self.stats.secondary_fetches += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheRecord;
    use std::collections::VecDeque;
    use std::time::Instant;
    use tempfile::TempDir;

    /// Replays pre-scripted responses and counts calls
    #[derive(Default)]
    struct ScriptedSource {
        character_scripts: VecDeque<Result<Vec<AnimeCharacter>, ClientError>>,
        voice_actor_scripts: VecDeque<Result<Vec<VoiceActor>, ClientError>>,
        characters_calls: usize,
        voice_actor_calls: usize,
    }

    impl CharacterSource for ScriptedSource {
        async fn anime_characters(
            &mut self,
            _entry: &AnimeEntry,
        ) -> Result<Vec<AnimeCharacter>, ClientError> {
            self.characters_calls += 1;
            self.character_scripts
                .pop_front()
                .expect("unscripted anime_characters call")
        }

        async fn character_voice_actors(
            &mut self,
            _character_id: u32,
        ) -> Result<Vec<VoiceActor>, ClientError> {
            self.voice_actor_calls += 1;
            self.voice_actor_scripts
                .pop_front()
                .expect("unscripted character_voice_actors call")
        }
    }

    fn entry(id: u32, title: &str, status: WatchStatus) -> AnimeEntry {
        AnimeEntry {
            id,
            title: title.to_string(),
            url: format!("/anime/{}/{}", id, title.replace(' ', "_")),
            status,
            score: 0,
            num_watched_episodes: 0,
            num_episodes: 0,
            tags: Vec::new(),
            is_rewatching: false,
            air_date: None,
        }
    }

    fn character(id: u32, name: &str, voice_actors: Vec<VoiceActor>) -> AnimeCharacter {
        AnimeCharacter {
            id,
            name: name.to_string(),
            is_main_character: false,
            image_link: format!("/images/characters/{}.jpg", id),
            associated_anime_status: WatchStatus::Watching,
            voice_actors,
        }
    }

    fn voice_actor(id: u32) -> VoiceActor {
        VoiceActor {
            id,
            name: format!("Seiyuu {}", id),
            language: "Japanese".to_string(),
        }
    }

    fn settings() -> PipelineSettings {
        PipelineSettings {
            block_retry: Duration::from_millis(20),
            max_block_retries: 0,
            anime_interval: Duration::from_millis(0),
        }
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_network_and_courtesy_pause() {
        let temp = TempDir::new().unwrap();
        let cache = CharacterCache::new(temp.path(), 100).unwrap();
        let characters = vec![character(1, "Hero", vec![voice_actor(10)])];
        cache.store(5114, &characters).unwrap();

        let mut pipeline = CharacterPipeline::new(
            ScriptedSource::default(),
            cache,
            PipelineSettings {
                anime_interval: Duration::from_millis(200),
                ..settings()
            },
        );

        let entries = vec![entry(5114, "Fullmetal Alchemist", WatchStatus::Completed)];
        let start = Instant::now();
        let collected = pipeline.run(&entries).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].1, characters);
        assert_eq!(pipeline.source.characters_calls, 0);
        assert_eq!(pipeline.stats().cache_hits, 1);
        assert_eq!(pipeline.stats().anime_fetched, 0);
        // No request, so no courtesy pause either
        assert!(
            elapsed < Duration::from_millis(150),
            "cache hit should not pause, took {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn test_expired_record_is_refetched_and_rewritten() {
        let temp = TempDir::new().unwrap();
        let cache = CharacterCache::new(temp.path(), 100).unwrap();

        let old_record = CacheRecord {
            anime_id: 30,
            fetched_at: chrono::Utc::now()
                .date_naive()
                .checked_sub_days(chrono::Days::new(200))
                .unwrap(),
            characters: vec![character(1, "Old Name", vec![voice_actor(10)])],
        };
        std::fs::write(
            temp.path().join("30.json"),
            serde_json::to_string_pretty(&old_record).unwrap(),
        )
        .unwrap();

        let fresh = vec![character(1, "New Name", vec![voice_actor(10)])];
        let source = ScriptedSource {
            character_scripts: VecDeque::from([Ok(fresh.clone())]),
            ..Default::default()
        };
        let mut pipeline = CharacterPipeline::new(source, cache, settings());

        let entries = vec![entry(30, "Show", WatchStatus::Watching)];
        let collected = pipeline.run(&entries).await.unwrap();

        assert_eq!(collected[0].1, fresh);
        assert_eq!(pipeline.source.characters_calls, 1);
        assert_eq!(pipeline.stats().cache_hits, 0);
        assert_eq!(pipeline.stats().anime_fetched, 1);

        let rewritten = pipeline.cache.lookup(30).unwrap();
        assert!(pipeline.cache.is_fresh(&rewritten));
        assert_eq!(rewritten.characters[0].name, "New Name");
    }

    #[tokio::test]
    async fn test_cache_is_keyed_by_the_anime_url_id() {
        let temp = TempDir::new().unwrap();
        let cache = CharacterCache::new(temp.path(), 100).unwrap();

        let characters = vec![character(1, "Hero", vec![voice_actor(10)])];
        let source = ScriptedSource {
            character_scripts: VecDeque::from([Ok(characters.clone())]),
            ..Default::default()
        };
        let mut pipeline = CharacterPipeline::new(source, cache, settings());

        // The payload id disagrees with the page URL; the URL id wins
        let mut mislabeled = entry(5114, "Fullmetal Alchemist", WatchStatus::Completed);
        mislabeled.id = 999;
        let entries = vec![mislabeled];
        pipeline.run(&entries).await.unwrap();

        assert!(temp.path().join("5114.json").exists());
        assert!(!temp.path().join("999.json").exists());

        // The second pass finds the record under the URL id
        let collected = pipeline.run(&entries).await.unwrap();
        assert_eq!(collected[0].1, characters);
        assert_eq!(pipeline.source.characters_calls, 1);
        assert_eq!(pipeline.stats().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_entry_without_an_anime_url_fails_the_run() {
        let temp = TempDir::new().unwrap();
        let cache = CharacterCache::new(temp.path(), 100).unwrap();
        let mut pipeline =
            CharacterPipeline::new(ScriptedSource::default(), cache, settings());

        let mut broken = entry(1, "Show", WatchStatus::Completed);
        broken.url = "/manga/1/Show".to_string();
        let entries = vec![broken];
        let err = pipeline.run(&entries).await.unwrap_err();

        assert!(matches!(
            err.root_cause().downcast_ref::<ClientError>(),
            Some(ClientError::UnexpectedPageShape(_))
        ));
        assert_eq!(pipeline.source.characters_calls, 0);
    }

    #[tokio::test]
    async fn test_blocked_fetch_waits_and_retries_until_content() {
        let temp = TempDir::new().unwrap();
        let cache = CharacterCache::new(temp.path(), 100).unwrap();

        let characters = vec![character(1, "Hero", vec![voice_actor(10)])];
        let source = ScriptedSource {
            character_scripts: VecDeque::from([
                Err(ClientError::SuspectedBlock),
                Err(ClientError::SuspectedBlock),
                Ok(characters.clone()),
            ]),
            ..Default::default()
        };
        let mut pipeline = CharacterPipeline::new(source, cache, settings());

        let entries = vec![entry(7, "Show", WatchStatus::Completed)];
        let start = Instant::now();
        let collected = pipeline.run(&entries).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(collected[0].1, characters);
        assert_eq!(pipeline.source.characters_calls, 3);
        assert_eq!(pipeline.stats().block_retries, 2);
        // Two 20ms block waits must have passed
        assert!(
            elapsed >= Duration::from_millis(30),
            "expected two block waits, took {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn test_block_retry_cap_aborts_the_run() {
        let temp = TempDir::new().unwrap();
        let cache = CharacterCache::new(temp.path(), 100).unwrap();

        let source = ScriptedSource {
            character_scripts: VecDeque::from([
                Err(ClientError::SuspectedBlock),
                Err(ClientError::SuspectedBlock),
            ]),
            ..Default::default()
        };
        let mut pipeline = CharacterPipeline::new(
            source,
            cache,
            PipelineSettings {
                max_block_retries: 2,
                ..settings()
            },
        );

        let entries = vec![entry(7, "Show", WatchStatus::Completed)];
        let err = pipeline.run(&entries).await.unwrap_err();

        assert!(matches!(
            err.root_cause().downcast_ref::<ClientError>(),
            Some(ClientError::SuspectedBlock)
        ));
        assert_eq!(pipeline.source.characters_calls, 2);
        assert_eq!(pipeline.stats().block_retries, 1);
    }

    #[tokio::test]
    async fn test_plan_to_watch_entries_are_skipped() {
        let temp = TempDir::new().unwrap();
        let cache = CharacterCache::new(temp.path(), 100).unwrap();

        let mut pipeline =
            CharacterPipeline::new(ScriptedSource::default(), cache, settings());

        let entries = vec![
            entry(1, "Someday", WatchStatus::PlanToWatch),
            entry(2, "Also Someday", WatchStatus::PlanToWatch),
        ];
        let collected = pipeline.run(&entries).await.unwrap();

        assert!(collected.is_empty());
        assert_eq!(pipeline.stats().anime_skipped, 2);
        assert_eq!(pipeline.stats().anime_processed, 0);
        assert_eq!(pipeline.source.characters_calls, 0);
    }

    #[tokio::test]
    async fn test_empty_voice_actor_panels_trigger_character_page_fetch() {
        let temp = TempDir::new().unwrap();
        let cache = CharacterCache::new(temp.path(), 100).unwrap();

        let source = ScriptedSource {
            character_scripts: VecDeque::from([Ok(vec![
                character(11, "Edward", vec![voice_actor(185)]),
                character(12, "Alphonse", Vec::new()),
            ])]),
            voice_actor_scripts: VecDeque::from([Ok(vec![voice_actor(37)])]),
            ..Default::default()
        };
        let mut pipeline = CharacterPipeline::new(
            source,
            cache,
            PipelineSettings {
                anime_interval: Duration::from_millis(30),
                ..settings()
            },
        );

        let entries = vec![entry(5114, "Fullmetal Alchemist", WatchStatus::Completed)];
        let start = Instant::now();
        let collected = pipeline.run(&entries).await.unwrap();
        let elapsed = start.elapsed();

        let characters = &collected[0].1;
        assert_eq!(characters[1].voice_actors, vec![voice_actor(37)]);
        assert_eq!(pipeline.source.voice_actor_calls, 1);
        assert_eq!(pipeline.stats().secondary_fetches, 1);

        // The cache holds the filled-in list, not the empty panel
        let cached = pipeline.cache.lookup(5114).unwrap();
        assert_eq!(cached.characters[1].voice_actors, vec![voice_actor(37)]);

        // The courtesy pause applies to every fetched anime, the last one
        // included
        assert!(
            elapsed >= Duration::from_millis(25),
            "expected the courtesy pause, took {:?}",
            elapsed
        );
    }
}
