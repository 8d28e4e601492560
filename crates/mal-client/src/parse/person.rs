//! Character detail page parsing.
//!
//! Consulted when a listing's voice actor panel was empty; the character's
//! own page always carries the full credit list.

use super::{selectors, text_of};
use crate::urls;
use scraper::Html;
use shared::models::VoiceActor;

/// Parse the voice actors credited on a character's own page.
///
/// Cells that do not hold a person link are skipped; a page without the
/// summary table yields an empty list (this page kind has no block
/// heuristic).
pub fn voice_actors(html: &str) -> Vec<VoiceActor> {
    let document = Html::parse_document(html);

    let mut result = Vec::new();

    for cell in document.select(&selectors::PERSON_VA_CELLS) {
        let anchor = match cell.select(&selectors::ANCHOR).next() {
            Some(anchor) => anchor,
            None => continue,
        };
        let id = match anchor.value().attr("href").map(urls::person_id_from_url) {
            Some(Ok(id)) => id,
            _ => continue,
        };
        let language = match cell.select(&selectors::DIV_SMALL).next() {
            Some(small) => text_of(small),
            None => continue,
        };

        result.push(VoiceActor {
            id,
            name: text_of(anchor),
            language,
        });
    }

    result
}
