//! Voice actor report library.
//!
//! This library builds the character-per-voice-actor report for a
//! MyAnimeList user: collecting character lists through a local cache,
//! aggregating them per voice actor, and rendering the HTML page.

pub mod aggregate;
pub mod cache;
pub mod pipeline;
pub mod report;

pub use aggregate::{aggregate, Aggregation, VoiceActorRow};
pub use cache::{CacheRecord, CacheStats, CharacterCache};
pub use pipeline::{CharacterPipeline, CharacterSource, PipelineSettings, PipelineStats};
