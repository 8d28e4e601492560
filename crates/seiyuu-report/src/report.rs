//! HTML report rendering.
//!
//! Turns an [`Aggregation`](crate::aggregate::Aggregation) into a single
//! self-contained page: one outer row per voice actor, holding the linked
//! character names above their images, with each image's tooltip listing
//! the anime the character appeared in.

use crate::aggregate::Aggregation;
use mal_client::urls;

/// Page shell the rows are spliced into
const TEMPLATE: &str = include_str!("template.html");

/// Marker line the rendered rows replace
const ROW_MARKER: &str = "<!--ROWS-->";

/// Render the full report page
pub fn render(aggregation: &Aggregation, base_url: &str, name_wrap_width: usize) -> String {
    let mut rows = String::new();

    for row in &aggregation.rows {
        let mut name_cells = String::new();
        let mut image_cells = String::new();

        for character in &row.characters {
            let link = urls::character_url(base_url, character.id);
            name_cells.push_str(&format!(
                "<td><a href=\"{}\">{}</a></td>",
                escape_html(&link),
                wrap_name(&character.name, name_wrap_width)
            ));

            let appearances = aggregation
                .appearances
                .get(&character.id)
                .map(|titles| titles.join("\n"))
                .unwrap_or_default();
            image_cells.push_str(&format!(
                "<td><img src=\"{}\" title=\"{}\"/></td>",
                escape_html(&character.image_link),
                escape_html(&appearances)
            ));
        }

        rows.push_str(&format!(
            "<tr><td><table><tr>{}</tr><tr>{}</tr></table></td></tr>\n",
            name_cells, image_cells
        ));
    }

    TEMPLATE.replace(ROW_MARKER, &rows)
}

/// Break a name into lines of at most `width` characters and join them
/// with `<br/>`. A word longer than the width gets a line of its own.
/// Each line is HTML-escaped, keeping the inserted breaks intact.
fn wrap_name(name: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in name.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        } else {
            current.push(' ');
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
        .iter()
        .map(|line| escape_html(line))
        .collect::<Vec<_>>()
        .join("<br/>")
}

/// Minimal escape for text and attribute positions
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
