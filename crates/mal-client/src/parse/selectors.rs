//! CSS selectors for the page shapes this crate understands.
//!
//! Compiled once on first use. The literals are written against the parsed
//! DOM, where every `<table>` has a `<tbody>` even when the source markup
//! omits it.

use once_cell::sync::Lazy;
use scraper::Selector;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: Lazy<Selector> = Lazy::new(|| Selector::parse($css).unwrap());
    };
}

// Anime list page: the table carries the whole list as JSON in `data-items`.
selector!(LIST_TABLE, "table[data-items]");

// Character listing page. The content shell doubles as the block heuristic:
// a served-but-empty page is how the site answers a suspended IP.
selector!(CONTENT_SHELL, "table > tbody > tr > td > div");
selector!(
    CHARACTER_ROWS,
    "table > tbody > tr > td > div > table > tbody > tr"
);
selector!(VA_PANEL, "td:nth-of-type(3) > table");
selector!(VA_PANEL_CELLS, "tr > td:nth-of-type(1)");
selector!(CHARACTER_CELL, "td:nth-of-type(2)");
selector!(CHARACTER_IMAGE, "td:nth-of-type(1) > div > a > img");

// Character detail page: the voice actor summary sits in the second cell of
// the first content table's first row.
selector!(
    PERSON_VA_CELLS,
    "#content > table:nth-of-type(1) > tbody > tr:nth-of-type(1) > td:nth-of-type(2) > table > tbody > tr > td:nth-of-type(2)"
);

selector!(ANCHOR, "a");
selector!(SMALL, "small");
selector!(DIV_SMALL, "div small");
