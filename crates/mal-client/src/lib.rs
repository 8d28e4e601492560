//! MyAnimeList site access.
//!
//! This library provides a paced, retry-enabled client for the MyAnimeList
//! pages the tools consume (anime list, character listing, character detail),
//! plus the HTML parsing and URL handling that go with them.

pub mod client;
pub mod error;
pub mod parse;
pub mod rate_limiter;
pub mod urls;

pub use client::MalClient;
pub use error::ClientError;
pub use rate_limiter::{PacerGuard, RequestPacer};
