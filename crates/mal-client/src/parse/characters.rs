//! Character listing page parsing.

use super::{selectors, text_of};
use crate::error::ClientError;
use crate::urls;
use scraper::{ElementRef, Html};
use shared::models::{AnimeCharacter, VoiceActor, WatchStatus};

/// Parse an anime's character listing page.
///
/// Every parsed character is stamped with `status`, the watch status of the
/// anime the listing belongs to.
///
/// Returns [`ClientError::SuspectedBlock`] when the page arrived without its
/// content shell, which is how the site responds once it has temporarily
/// suspended an IP.
pub fn characters(html: &str, status: WatchStatus) -> Result<Vec<AnimeCharacter>, ClientError> {
    let document = Html::parse_document(html);

    if document.select(&selectors::CONTENT_SHELL).next().is_none() {
        return Err(ClientError::SuspectedBlock);
    }

    let mut result = Vec::new();

    for row in document.select(&selectors::CHARACTER_ROWS) {
        // Staff rows share the listing's format but carry no voice actor
        // panel in the third cell; the first such row ends the character
        // section.
        let va_panel = match row.select(&selectors::VA_PANEL).next() {
            Some(panel) => panel,
            None => break,
        };

        let info_cell = row
            .select(&selectors::CHARACTER_CELL)
            .next()
            .ok_or_else(|| ClientError::shape("character row without an info cell"))?;

        let anchor = info_cell
            .select(&selectors::ANCHOR)
            .next()
            .ok_or_else(|| ClientError::shape("character row without a page link"))?;
        let href = anchor
            .value()
            .attr("href")
            .ok_or_else(|| ClientError::shape("character link without href"))?;

        let role = info_cell
            .select(&selectors::DIV_SMALL)
            .next()
            .map(text_of)
            .ok_or_else(|| ClientError::shape("character row without a role"))?;
        let is_main_character = match role.to_lowercase().as_str() {
            "main" => true,
            "supporting" => false,
            other => {
                return Err(ClientError::shape(format!(
                    "unrecognized character role '{}'",
                    other
                )))
            }
        };

        result.push(AnimeCharacter {
            id: urls::character_id_from_url(href)?,
            name: text_of(anchor),
            is_main_character,
            image_link: largest_srcset_image(row)?,
            associated_anime_status: status,
            // May legitimately be empty: some listings omit the panel's
            // rows and the character's own page has to be consulted
            voice_actors: voice_actors_from_panel(va_panel)?,
        });
    }

    Ok(result)
}

/// Parse the (name, language, person link) triples of a row's voice actor panel
fn voice_actors_from_panel(panel: ElementRef<'_>) -> Result<Vec<VoiceActor>, ClientError> {
    let mut voice_actors = Vec::new();

    for cell in panel.select(&selectors::VA_PANEL_CELLS) {
        let anchor = cell
            .select(&selectors::ANCHOR)
            .next()
            .ok_or_else(|| ClientError::shape("voice actor cell without a link"))?;
        let href = anchor
            .value()
            .attr("href")
            .ok_or_else(|| ClientError::shape("voice actor link without href"))?;
        let language = cell
            .select(&selectors::SMALL)
            .next()
            .map(text_of)
            .ok_or_else(|| ClientError::shape("voice actor cell without a language"))?;

        voice_actors.push(VoiceActor {
            id: urls::person_id_from_url(href)?,
            name: text_of(anchor),
            language,
        });
    }

    Ok(voice_actors)
}

/// Pick the URL with the largest scale factor from the image's `data-srcset`
fn largest_srcset_image(row: ElementRef<'_>) -> Result<String, ClientError> {
    let img = row
        .select(&selectors::CHARACTER_IMAGE)
        .next()
        .ok_or_else(|| ClientError::shape("character row without an image"))?;
    let srcset = img
        .value()
        .attr("data-srcset")
        .ok_or_else(|| ClientError::shape("character image without data-srcset"))?;

    srcset
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split_whitespace();
            let url = parts.next()?;
            let scale = parts.next()?.trim_end_matches('x').parse::<f64>().ok()?;
            Some((url, scale))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(url, _)| url.to_string())
        .ok_or_else(|| ClientError::shape("character image with an unusable data-srcset"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHARACTERS_PAGE: &str = r#"<!DOCTYPE html>
<html><body><div id="content">
<table><tr><td>
<div class="js-scrollfix-bottom-rel">

<table class="js-anime-character-table"><tr>
  <td><div class="picSurround"><a href="/character/11/Edward_Elric"><img
    data-srcset="/images/characters/9/72533.jpg 1x, /images/characters/9/72533@2x.jpg 2x"
    alt="Elric, Edward"></a></div></td>
  <td><a href="/character/11/Edward_Elric">Edward Elric</a>
    <div class="spaceit_pad"><small>Main</small></div></td>
  <td><table><tr>
      <td><a href="/people/185/Park_Romi">Park, Romi</a><br><small>Japanese</small></td>
      <td><img src="/images/voiceactors/1/1.jpg"></td>
    </tr><tr>
      <td><a href="/people/8/Mignogna_Vic">Mignogna, Vic</a><br><small>English</small></td>
      <td><img src="/images/voiceactors/2/2.jpg"></td>
    </tr></table></td>
</tr></table>

<table class="js-anime-character-table"><tr>
  <td><div class="picSurround"><a href="/character/12/Alphonse_Elric"><img
    data-srcset="/images/characters/5/54265.jpg 1x"
    alt="Elric, Alphonse"></a></div></td>
  <td><a href="/character/12/Alphonse_Elric">Alphonse Elric</a>
    <div class="spaceit_pad"><small>Supporting</small></div></td>
  <td><table></table></td>
</tr></table>

<h2>Staff</h2>

<table><tr>
  <td><div class="picSurround"><a href="/people/11081/Yasuhiro_Irie"><img
    src="/images/voiceactors/3/3.jpg" alt="Irie, Yasuhiro"></a></div></td>
  <td><a href="/people/11081/Yasuhiro_Irie">Irie, Yasuhiro</a>
    <div class="spaceit_pad"><small>Director</small></div></td>
</tr></table>

</div>
</td></tr></table>
</div></body></html>"#;

    #[test]
    fn test_parses_characters_until_staff_section() {
        let characters = characters(CHARACTERS_PAGE, WatchStatus::Completed).unwrap();

        // The staff row has no voice actor panel and ends the walk
        assert_eq!(characters.len(), 2);

        let edward = &characters[0];
        assert_eq!(edward.id, 11);
        assert_eq!(edward.name, "Edward Elric");
        assert!(edward.is_main_character);
        assert_eq!(edward.associated_anime_status, WatchStatus::Completed);
        assert_eq!(
            edward.voice_actors,
            vec![
                VoiceActor {
                    id: 185,
                    name: "Park, Romi".to_string(),
                    language: "Japanese".to_string(),
                },
                VoiceActor {
                    id: 8,
                    name: "Mignogna, Vic".to_string(),
                    language: "English".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_largest_srcset_scale_wins() {
        let characters = characters(CHARACTERS_PAGE, WatchStatus::Watching).unwrap();
        assert_eq!(
            characters[0].image_link,
            "/images/characters/9/72533@2x.jpg"
        );
        assert_eq!(characters[1].image_link, "/images/characters/5/54265.jpg");
    }

    #[test]
    fn test_empty_voice_actor_panel_yields_empty_list() {
        let characters = characters(CHARACTERS_PAGE, WatchStatus::Completed).unwrap();

        let alphonse = &characters[1];
        assert_eq!(alphonse.id, 12);
        assert!(!alphonse.is_main_character);
        assert!(alphonse.voice_actors.is_empty());
    }

    #[test]
    fn test_served_but_empty_page_is_a_suspected_block() {
        let blocked = "<html><body><div id=\"content\">Too Many Requests</div></body></html>";
        let err = characters(blocked, WatchStatus::Completed).unwrap_err();
        assert!(matches!(err, ClientError::SuspectedBlock));
    }

    #[test]
    fn test_unrecognized_role_is_a_shape_error() {
        let page = CHARACTERS_PAGE.replace("<small>Main</small>", "<small>Cameo</small>");
        let err = characters(&page, WatchStatus::Completed).unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedPageShape(_)));
    }
}
