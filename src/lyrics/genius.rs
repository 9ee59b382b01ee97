//! Genius lyrics provider
//!
//! Searches the Genius API with a bearer token, then scrapes the top hit's
//! song page. Genius does not serve lyrics through its API.

use super::extract::{Extractor, PlaceholderFilter};
use super::fetcher::{LyricsProvider, LyricsQuery, LyricsResponse, ProviderConfig, SearchHit};
use crate::error::LyricsError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    result: HitResult,
}

#[derive(Debug, Deserialize)]
struct HitResult {
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    primary_artist: Option<PrimaryArtist>,
}

#[derive(Debug, Deserialize)]
struct PrimaryArtist {
    name: String,
}

impl From<Hit> for SearchHit {
    fn from(hit: Hit) -> Self {
        SearchHit {
            url: hit.result.url,
            title: hit.result.title,
            artist: hit.result.primary_artist.map(|a| a.name),
        }
    }
}

pub struct GeniusLyricsProvider {
    client: Client,
    config: ProviderConfig,
    extractor: Extractor,
    placeholders: PlaceholderFilter,
}

impl GeniusLyricsProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Self::with_extractor(config, Extractor::default())
    }

    /// Create a provider with a custom set of extraction strategies
    pub fn with_extractor(config: ProviderConfig, extractor: Extractor) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .context("Failed to create Genius HTTP client")?;

        tracing::info!(
            "Genius provider ready (api: {}, strategies: {:?})",
            config.api_base,
            extractor.strategy_names()
        );

        Ok(Self {
            client,
            placeholders: PlaceholderFilter::new(&config.placeholder_phrases),
            config,
            extractor,
        })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.config.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl LyricsProvider for GeniusLyricsProvider {
    fn name(&self) -> &str {
        "genius"
    }

    async fn search(&self, query: &LyricsQuery) -> Result<Vec<SearchHit>, LyricsError> {
        let term = query.search_term();
        tracing::debug!("Genius search query: {}", term);

        let response = self
            .client
            .get(self.search_url())
            .bearer_auth(&self.config.api_key)
            .query(&[("q", term.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LyricsError::Status {
                stage: "search",
                status,
            });
        }

        let envelope: SearchEnvelope = response.json().await?;
        let hits: Vec<SearchHit> = envelope.response.hits.into_iter().map(Into::into).collect();

        tracing::debug!("Genius found {} results", hits.len());
        Ok(hits)
    }

    async fn fetch(&self, hit: &SearchHit) -> Result<LyricsResponse, LyricsError> {
        let response = self.client.get(&hit.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LyricsError::Status {
                stage: "page",
                status,
            });
        }

        let html = response.text().await?;
        let extraction = self
            .extractor
            .extract(&html)
            .ok_or_else(|| LyricsError::NoContainer(hit.url.clone()))?;

        if self.placeholders.is_placeholder(&extraction.text) {
            return Err(LyricsError::Placeholder(hit.url.clone()));
        }

        Ok(LyricsResponse {
            content: extraction.text,
            source: self.name().to_string(),
            url: hit.url.clone(),
            strategy: extraction.strategy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::Query,
        http::{HeaderMap, StatusCode},
        response::{Html, IntoResponse},
        routing::get,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const TOKEN: &str = "test-token";

    #[derive(Clone, Default)]
    struct Calls {
        searches: Arc<AtomicUsize>,
        pages: Arc<AtomicUsize>,
        last_query: Arc<Mutex<Option<String>>>,
    }

    struct Upstream {
        base: String,
        calls: Calls,
    }

    /// Start a fake Genius on a random local port
    async fn spawn_genius(
        search_status: StatusCode,
        hit_count: usize,
        page: &'static str,
        page_delay: Duration,
    ) -> Upstream {
        spawn_genius_with_page_status(search_status, hit_count, StatusCode::OK, page, page_delay)
            .await
    }

    async fn spawn_genius_with_page_status(
        search_status: StatusCode,
        hit_count: usize,
        page_status: StatusCode,
        page: &'static str,
        page_delay: Duration,
    ) -> Upstream {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let calls = Calls::default();

        let search_calls = calls.clone();
        let search_base = base.clone();
        let page_calls = calls.clone();

        let app = Router::new()
            .route(
                "/search",
                get(
                    move |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| async move {
                        search_calls.searches.fetch_add(1, Ordering::SeqCst);
                        *search_calls.last_query.lock().unwrap() = params.get("q").cloned();

                        let authorized = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            == Some("Bearer test-token");
                        if !authorized {
                            return StatusCode::UNAUTHORIZED.into_response();
                        }
                        if !search_status.is_success() {
                            return search_status.into_response();
                        }

                        let hits: Vec<_> = (1..=hit_count)
                            .map(|i| {
                                json!({
                                    "result": {
                                        "url": format!("{}/songs/{}", search_base, i),
                                        "title": format!("Song {}", i),
                                        "primary_artist": { "name": "Queen" }
                                    }
                                })
                            })
                            .collect();
                        Json(json!({ "meta": { "status": 200 }, "response": { "hits": hits } }))
                            .into_response()
                    },
                ),
            )
            .route(
                "/songs/:n",
                get(move || async move {
                    page_calls.pages.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(page_delay).await;
                    (page_status, Html(page))
                }),
            );

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Upstream { base, calls }
    }

    fn provider(base: &str, token: &str, timeout: Duration) -> GeniusLyricsProvider {
        let config = ProviderConfig {
            api_key: token.to_string(),
            api_base: base.to_string(),
            timeout,
            ..ProviderConfig::default()
        };
        GeniusLyricsProvider::new(config).unwrap()
    }

    const QUEEN_PAGE: &str = r#"<html><body>
        <div class="SongHeader">Bohemian Rhapsody</div>
        <div data-lyrics-container="true">Is this the real life?<br>Is this just fantasy?</div>
    </body></html>"#;

    #[tokio::test]
    async fn test_primary_container_lyrics() {
        let upstream = spawn_genius(StatusCode::OK, 1, QUEEN_PAGE, Duration::ZERO).await;
        let genius = provider(&upstream.base, TOKEN, Duration::from_secs(5));

        let lyrics = genius.fetch_lyrics("Bohemian Rhapsody", "Queen").await.unwrap();

        assert_eq!(lyrics.content, "Is this the real life?\nIs this just fantasy?");
        assert_eq!(lyrics.source, "genius");
        assert_eq!(lyrics.url, format!("{}/songs/1", upstream.base));
        assert_eq!(lyrics.strategy, "data-lyrics-container");
        assert_eq!(
            upstream.calls.last_query.lock().unwrap().as_deref(),
            Some("Bohemian Rhapsody Queen")
        );
    }

    #[tokio::test]
    async fn test_search_hits_are_parsed() {
        let upstream = spawn_genius(StatusCode::OK, 3, QUEEN_PAGE, Duration::ZERO).await;
        let genius = provider(&upstream.base, TOKEN, Duration::from_secs(5));

        let hits = genius
            .search(&LyricsQuery::new("Bohemian Rhapsody").with_artist("Queen"))
            .await
            .unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].title.as_deref(), Some("Song 1"));
        assert_eq!(hits[0].artist.as_deref(), Some("Queen"));
    }

    #[tokio::test]
    async fn test_zero_hits_skips_page_fetch() {
        let upstream = spawn_genius(StatusCode::OK, 0, QUEEN_PAGE, Duration::ZERO).await;
        let genius = provider(&upstream.base, TOKEN, Duration::from_secs(5));

        assert!(genius.fetch_lyrics("Obscure", "Nobody").await.is_none());
        assert_eq!(upstream.calls.searches.load(Ordering::SeqCst), 1);
        assert_eq!(upstream.calls.pages.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_success_search_is_not_found() {
        let upstream =
            spawn_genius(StatusCode::SERVICE_UNAVAILABLE, 1, QUEEN_PAGE, Duration::ZERO).await;
        let genius = provider(&upstream.base, TOKEN, Duration::from_secs(5));
        assert!(genius.fetch_lyrics("Bohemian Rhapsody", "Queen").await.is_none());

        let upstream = spawn_genius(StatusCode::OK, 1, QUEEN_PAGE, Duration::ZERO).await;
        let genius = provider(&upstream.base, "wrong-token", Duration::from_secs(5));
        let err = genius
            .search(&LyricsQuery::new("Bohemian Rhapsody"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(upstream.calls.pages.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_page_without_containers_is_not_found() {
        let page = "<html><body><p>Just an article</p></body></html>";
        let upstream = spawn_genius(StatusCode::OK, 1, page, Duration::ZERO).await;
        let genius = provider(&upstream.base, TOKEN, Duration::from_secs(5));

        assert!(genius.fetch_lyrics("Bohemian Rhapsody", "Queen").await.is_none());
        assert_eq!(upstream.calls.pages.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_success_page_is_not_found() {
        for page_status in [StatusCode::NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR] {
            let upstream = spawn_genius_with_page_status(
                StatusCode::OK,
                1,
                page_status,
                QUEEN_PAGE,
                Duration::ZERO,
            )
            .await;
            let genius = provider(&upstream.base, TOKEN, Duration::from_secs(5));

            assert!(genius.fetch_lyrics("Bohemian Rhapsody", "Queen").await.is_none());
            assert_eq!(upstream.calls.pages.load(Ordering::SeqCst), 1);

            let hits = genius
                .search(&LyricsQuery::new("Bohemian Rhapsody"))
                .await
                .unwrap();
            match genius.fetch(&hits[0]).await {
                Err(LyricsError::Status { stage, status }) => {
                    assert_eq!(stage, "page");
                    assert_eq!(status, page_status);
                }
                other => panic!("expected page status error, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_split_containers_are_joined() {
        let page = r#"<div data-lyrics-container="true">[Verse 1]<br>Mama, just killed a man</div>
            <div class="ad">buy things</div>
            <div data-lyrics-container="true">[Verse 2]<br>Too late, my time has come</div>"#;
        let upstream = spawn_genius(StatusCode::OK, 1, page, Duration::ZERO).await;
        let genius = provider(&upstream.base, TOKEN, Duration::from_secs(5));

        let lyrics = genius.fetch_lyrics("Bohemian Rhapsody", "Queen").await.unwrap();
        assert_eq!(
            lyrics.content,
            "[Verse 1]\nMama, just killed a man\n[Verse 2]\nToo late, my time has come"
        );
    }

    #[tokio::test]
    async fn test_placeholder_page_is_not_found() {
        let page = r#"<div data-lyrics-container="true">Lyrics for this song have yet to be released. Please check back once the song has been released.</div>"#;
        let upstream = spawn_genius(StatusCode::OK, 1, page, Duration::ZERO).await;
        let genius = provider(&upstream.base, TOKEN, Duration::from_secs(5));

        assert!(genius.fetch_lyrics("Unreleased", "Queen").await.is_none());
    }

    #[tokio::test]
    async fn test_slow_page_times_out_as_not_found() {
        let upstream = spawn_genius(StatusCode::OK, 1, QUEEN_PAGE, Duration::from_secs(3)).await;
        let genius = provider(&upstream.base, TOKEN, Duration::from_millis(200));

        assert!(genius.fetch_lyrics("Bohemian Rhapsody", "Queen").await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_api_is_not_found() {
        let genius = provider("http://127.0.0.1:9", TOKEN, Duration::from_secs(2));
        assert!(genius.fetch_lyrics("Bohemian Rhapsody", "Queen").await.is_none());
    }
}
