//! Lyrics fetching infrastructure
//!
//! A provider looks lyrics up in two steps: a search that ranks candidate
//! pages, then a fetch of the top-ranked page. Every failure along the way is
//! reported to callers as "not found".

use crate::error::LyricsError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Search query for finding lyrics online
#[derive(Debug, Clone)]
pub struct LyricsQuery {
    /// Track title (required)
    pub title: String,
    /// Primary artist name (optional but recommended for better matching)
    pub artist: Option<String>,
}

impl LyricsQuery {
    /// Create a new lyrics query with just title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: None,
        }
    }

    /// Set the artist name
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Combined free-text search term: `"{title} {artist}"`
    pub fn search_term(&self) -> String {
        match &self.artist {
            Some(artist) if !artist.is_empty() => format!("{} {}", self.title, artist),
            _ => self.title.clone(),
        }
    }
}

/// A ranked search result pointing at a lyrics page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Lyrics page URL
    pub url: String,
    pub title: Option<String>,
    pub artist: Option<String>,
}

/// Lyrics found for a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricsResponse {
    /// The lyrics text, never empty
    pub content: String,
    /// Source provider name
    pub source: String,
    /// Page the lyrics were extracted from
    pub url: String,
    /// Extraction strategy that located the lyrics
    pub strategy: String,
}

/// Configuration for a lyrics provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Bearer token for the search API
    pub api_key: String,
    /// Base URL of the search API
    pub api_base: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Phrases that mark a page as having no real lyrics yet
    pub placeholder_phrases: Vec<String>,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://api.genius.com".to_string(),
            timeout: Duration::from_secs(10),
            placeholder_phrases: super::extract::DEFAULT_PLACEHOLDER_PHRASES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// Main trait for lyrics providers
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Returns the unique name of this provider (e.g., "genius")
    fn name(&self) -> &str;

    /// Search for pages matching the query, best match first
    async fn search(&self, query: &LyricsQuery) -> Result<Vec<SearchHit>, LyricsError>;

    /// Fetch and extract lyrics from a search hit's page
    async fn fetch(&self, hit: &SearchHit) -> Result<LyricsResponse, LyricsError>;

    /// Search, then fetch the top-ranked hit.
    ///
    /// Lower-ranked hits are never consulted. Any fault is logged and turned
    /// into `None`.
    async fn search_and_fetch(&self, query: &LyricsQuery) -> Option<LyricsResponse> {
        let result: Result<LyricsResponse, LyricsError> = async {
            let hits = self.search(query).await?;
            let top = hits
                .into_iter()
                .next()
                .ok_or_else(|| LyricsError::NoHits(query.search_term()))?;

            tracing::debug!("Fetching lyrics from {}: {}", self.name(), top.url);
            self.fetch(&top).await
        }
        .await;

        match result {
            Ok(lyrics) => {
                tracing::info!(
                    "✓ Found lyrics from {} ({} characters)",
                    self.name(),
                    lyrics.content.len()
                );
                Some(lyrics)
            }
            Err(e @ LyricsError::Network(_)) => {
                tracing::warn!("✗ Provider {} failed: {}", self.name(), e);
                None
            }
            Err(e) => {
                tracing::debug!("✗ No lyrics from {}: {}", self.name(), e);
                None
            }
        }
    }

    /// Lyrics for a track name and its primary artist
    async fn fetch_lyrics(&self, track_name: &str, artist: &str) -> Option<LyricsResponse> {
        let query = LyricsQuery::new(track_name).with_artist(artist);
        self.search_and_fetch(&query).await
    }
}
