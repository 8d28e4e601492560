//! URL construction and id extraction for the site's page kinds.

use crate::error::ClientError;
use shared::models::ListFilter;

/// URL of a user's anime list page
pub fn anime_list_url(base_url: &str, username: &str, filter: ListFilter) -> String {
    format!(
        "{}/animelist/{}?status={}",
        base_url,
        username,
        filter.query_code()
    )
}

/// URL of an anime's character listing page.
///
/// `anime_url` is the site-relative anime page URL as it appears in list
/// payloads, e.g. `/anime/5114/Fullmetal_Alchemist__Brotherhood`.
pub fn anime_characters_url(base_url: &str, anime_url: &str) -> String {
    format!("{}{}/characters", base_url, anime_url)
}

/// URL of a character's own page
pub fn character_url(base_url: &str, character_id: u32) -> String {
    format!("{}/character/{}", base_url, character_id)
}

/// Extract the anime id from a URL like `/anime/5114/Fullmetal_Alchemist`
pub fn anime_id_from_url(url: &str) -> Result<u32, ClientError> {
    id_after_segment(url, "anime")
}

/// Extract the character id from a URL like `/character/11/Edward_Elric`
pub fn character_id_from_url(url: &str) -> Result<u32, ClientError> {
    id_after_segment(url, "character")
}

/// Extract the person id from a URL like `/people/185/Romi_Park`
pub fn person_id_from_url(url: &str) -> Result<u32, ClientError> {
    id_after_segment(url, "people")
}

/// The id lives in the path segment right after the literal marker segment.
/// Works on absolute and site-relative URLs alike.
fn id_after_segment(url: &str, marker: &str) -> Result<u32, ClientError> {
    let mut segments = url.split('/');
    segments
        .by_ref()
        .find(|segment| *segment == marker)
        .and_then(|_| segments.next())
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| {
            ClientError::shape(format!("no numeric id after '{}' in '{}'", marker, url))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_url() {
        assert_eq!(
            anime_list_url("https://myanimelist.net", "Kyoya2", ListFilter::All),
            "https://myanimelist.net/animelist/Kyoya2?status=7"
        );
        assert_eq!(
            anime_list_url("https://myanimelist.net", "Kyoya2", ListFilter::PlanToWatch),
            "https://myanimelist.net/animelist/Kyoya2?status=6"
        );
    }

    #[test]
    fn test_characters_url() {
        assert_eq!(
            anime_characters_url("https://myanimelist.net", "/anime/5114/Fullmetal_Alchemist"),
            "https://myanimelist.net/anime/5114/Fullmetal_Alchemist/characters"
        );
    }

    #[test]
    fn test_id_extraction() {
        assert_eq!(
            anime_id_from_url("/anime/5114/Fullmetal_Alchemist").unwrap(),
            5114
        );
        assert_eq!(
            character_id_from_url("https://myanimelist.net/character/11/Edward_Elric").unwrap(),
            11
        );
        assert_eq!(person_id_from_url("/people/185/Romi_Park").unwrap(), 185);
    }

    #[test]
    fn test_id_extraction_rejects_malformed_urls() {
        assert!(anime_id_from_url("/manga/5114/Some_Manga").is_err());
        assert!(anime_id_from_url("/anime/not_a_number/Title").is_err());
        assert!(person_id_from_url("/people").is_err());
    }
}
