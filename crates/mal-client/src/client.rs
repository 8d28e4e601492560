//! MyAnimeList page client with request pacing and retry logic.

use crate::error::ClientError;
use crate::parse;
use crate::rate_limiter::RequestPacer;
use crate::urls;
use reqwest::Client;
use shared::models::{AnimeCharacter, AnimeEntry, ListFilter, VoiceActor};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Ceiling for the exponential retry backoff
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Client for the MyAnimeList pages the tools consume.
///
/// Owns the request pacer, so every page fetched through one client instance
/// shares the same spacing clock.
pub struct MalClient {
    /// HTTP client
    http: Client,
    /// Site base URL
    base_url: String,
    /// Request pacer
    pacer: RequestPacer,
    /// Maximum retries for failed requests
    max_retries: u32,
    /// Base delay for retry (exponential backoff)
    retry_delay_ms: u64,
}

impl MalClient {
    /// Create a new client
    pub fn new(
        base_url: String,
        timeout: Duration,
        request_interval: Duration,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("seiyuu-report/0.1.0")
            .build()?;

        Ok(Self {
            http,
            base_url,
            pacer: RequestPacer::new(request_interval),
            max_retries,
            retry_delay_ms,
        })
    }

    /// Fetch a user's anime list
    pub async fn anime_list(
        &mut self,
        username: &str,
        filter: ListFilter,
    ) -> Result<Vec<AnimeEntry>, ClientError> {
        let url = urls::anime_list_url(&self.base_url, username, filter);
        let body = self.get_page(&url).await?;
        parse::anime_list(&body)
    }

    /// Fetch an anime's character listing.
    ///
    /// Parsed characters are stamped with the list entry's watch status.
    pub async fn anime_characters(
        &mut self,
        entry: &AnimeEntry,
    ) -> Result<Vec<AnimeCharacter>, ClientError> {
        let url = urls::anime_characters_url(&self.base_url, &entry.url);
        let body = self.get_page(&url).await?;
        parse::characters(&body, entry.status)
    }

    /// Fetch the voice actors credited on a character's own page
    pub async fn character_voice_actors(
        &mut self,
        character_id: u32,
    ) -> Result<Vec<VoiceActor>, ClientError> {
        let url = urls::character_url(&self.base_url, character_id);
        let body = self.get_page(&url).await?;
        Ok(parse::character_voice_actors(&body))
    }

    /// Fetch a page body with pacing and retry.
    ///
    /// Transport failures and non-success statuses are retried with
    /// exponential backoff; each attempt goes through the pacer, whose slot
    /// is held until the response body has been read.
    async fn get_page(&mut self, url: &str) -> Result<String, ClientError> {
        let mut attempt = 0;
        loop {
            let outcome = {
                let _slot = self.pacer.acquire().await;

                debug!(url = %url, attempt = attempt + 1, "Requesting page");

                match self.http.get(url).send().await {
                    Ok(response) => {
                        let status = response.status();
                        if status.is_success() {
                            response.text().await.map_err(ClientError::from)
                        } else {
                            Err(ClientError::Status {
                                status,
                                url: url.to_string(),
                            })
                        }
                    }
                    Err(e) => Err(ClientError::from(e)),
                }
                // `_slot` drops here: the pacing clock starts once the
                // response has been fully read
            };

            match outcome {
                Ok(body) => {
                    debug!(url = %url, bytes = body.len(), "Request successful");
                    return Ok(body);
                }
                Err(e) if attempt < self.max_retries => {
                    let delay = self.backoff_delay(attempt);
                    warn!(
                        url = %url,
                        error = %e,
                        delay_ms = delay.as_millis(),
                        "Request failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Delay before retry `attempt`, doubling each time up to
    /// [`MAX_RETRY_DELAY`]. Saturates instead of overflowing on large
    /// attempt counts.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let millis = self
            .retry_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_millis(millis).min(MAX_RETRY_DELAY)
    }
}
