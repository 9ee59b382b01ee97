//! Lyrics lookup
//!
//! `fetcher` defines the provider contract, `genius` implements it against
//! the Genius search API and song pages, and `extract` holds the page
//! scraping strategies.

pub mod extract;
pub mod fetcher;
pub mod genius;

pub use fetcher::{LyricsProvider, LyricsQuery, LyricsResponse, ProviderConfig, SearchHit};
pub use genius::GeniusLyricsProvider;
