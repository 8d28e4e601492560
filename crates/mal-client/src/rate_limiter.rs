//! Request pacing for site access.
//!
//! MyAnimeList suspends IPs that hit it too quickly, so every outbound
//! request is spaced from the completion of the previous one.

use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Enforces a minimum interval between requests.
///
/// The interval is measured from the completion of the previous request
/// (the drop of its [`PacerGuard`]), not from its start, so a slow response
/// still earns the full spacing before the next request goes out.
#[derive(Debug)]
pub struct RequestPacer {
    /// Minimum spacing between requests
    interval: Duration,
    /// Completion time of the most recent request
    last_release: Option<Instant>,
}

impl RequestPacer {
    /// Create a new pacer with the given minimum spacing
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_release: None,
        }
    }

    /// Wait until the interval since the previous request's completion has
    /// elapsed, then take the request slot.
    ///
    /// The returned guard must be held across the request; dropping it
    /// records the completion time the next `acquire` is spaced from. The
    /// first call never waits.
    #[must_use = "dropping the guard immediately defeats the pacing"]
    pub async fn acquire(&mut self) -> PacerGuard<'_> {
        if let Some(last) = self.last_release {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                let wait_time = self.interval - elapsed;
                tracing::debug!(
                    wait_ms = wait_time.as_millis(),
                    "Pacing: waiting before next request"
                );
                sleep(wait_time).await;
            }
        }

        PacerGuard { pacer: self }
    }
}

/// Live request slot; dropping it marks the request as completed.
#[derive(Debug)]
pub struct PacerGuard<'a> {
    pacer: &'a mut RequestPacer,
}

impl Drop for PacerGuard<'_> {
    fn drop(&mut self) {
        self.pacer.last_release = Some(Instant::now());
    }
}
