//! HTML parsing for the three page kinds.
//!
//! All parsing is synchronous over an already-fetched page body; nothing in
//! here touches the network.

pub mod characters;
pub mod list;
pub mod person;
mod selectors;

pub use characters::characters;
pub use list::anime_list;
pub use person::voice_actors as character_voice_actors;

use scraper::ElementRef;

/// Collected, trimmed text content of an element
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
