//! Voice actor aggregation.
//!
//! Folds the per-anime character lists into one row per voice actor, each
//! row holding every character that actor voices in the target language
//! across the whole list, plus an index of which anime each character
//! appeared in.

use shared::models::{AnimeCharacter, AnimeEntry};
use std::collections::HashMap;

/// One report row: a voice actor and the characters they voice
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceActorRow {
    pub voice_actor_id: u32,
    pub characters: Vec<AnimeCharacter>,
}

/// Aggregation output
#[derive(Debug, Default)]
pub struct Aggregation {
    /// One row per voice actor, sorted for the report
    pub rows: Vec<VoiceActorRow>,
    /// Anime titles each character id appears in, in processing order
    pub appearances: HashMap<u32, Vec<String>>,
}

/// Aggregate per-anime character lists into report rows.
///
/// Rows are keyed by voice actor id in first-seen order before sorting, so
/// the whole function is deterministic in its input order. A character
/// credited in several anime enters a row once, from the first anime
/// processed, and is stamped with that anime's current watch status.
pub fn aggregate(
    per_anime: &[(AnimeEntry, Vec<AnimeCharacter>)],
    target_language: &str,
) -> Aggregation {
    let mut rows: Vec<VoiceActorRow> = Vec::new();
    let mut row_index: HashMap<u32, usize> = HashMap::new();
    let mut appearances: HashMap<u32, Vec<String>> = HashMap::new();

    for (anime, characters) in per_anime {
        for character in characters {
            for voice_actor in &character.voice_actors {
                if !voice_actor.language.eq_ignore_ascii_case(target_language) {
                    continue;
                }

                let row_pos = *row_index.entry(voice_actor.id).or_insert_with(|| {
                    rows.push(VoiceActorRow {
                        voice_actor_id: voice_actor.id,
                        characters: Vec::new(),
                    });
                    rows.len() - 1
                });
                let row = &mut rows[row_pos];

                // The same character can come up again under another anime;
                // the first occurrence wins
                if row.characters.iter().any(|seen| seen.id == character.id) {
                    continue;
                }

                let mut credited = character.clone();
                // A cached record may predate a list change; the current
                // list entry's status is authoritative
                credited.associated_anime_status = anime.status;
                row.characters.push(credited);
            }

            // The appearance index counts every occurrence, whatever the
            // language match or dedup outcome
            appearances
                .entry(character.id)
                .or_default()
                .push(anime.title.clone());
        }
    }

    // Within a row: watch status priority first, main characters before
    // supporting ones within the same status
    for row in &mut rows {
        row.characters.sort_by(|a, b| {
            a.associated_anime_status
                .sort_rank()
                .cmp(&b.associated_anime_status.sort_rank())
                .then_with(|| b.is_main_character.cmp(&a.is_main_character))
        });
    }

    // Across rows: bigger rows first, main character count as tiebreak
    rows.sort_by(|a, b| {
        b.characters
            .len()
            .cmp(&a.characters.len())
            .then_with(|| main_character_count(b).cmp(&main_character_count(a)))
    });

    Aggregation { rows, appearances }
}

fn main_character_count(row: &VoiceActorRow) -> usize {
    row.characters
        .iter()
        .filter(|character| character.is_main_character)
        .count()
}
