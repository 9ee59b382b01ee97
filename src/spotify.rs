//! Spotify authorization-code handshake and top-tracks lookup
//!
//! Produces the track list a session works with: redirect the user to the
//! authorize page, exchange the returned code for a bearer token, then read
//! the user's top tracks with it.

use crate::track::Track;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

pub const SCOPES: &str = "user-top-read playlist-read-private user-library-read user-follow-read";

/// Source of a user's candidate tracks
#[async_trait]
pub trait TopTracksProvider: Send + Sync {
    /// URL to send the user to, carrying `state` for the callback
    fn authorize_url(&self, state: &str) -> Result<String>;

    /// Exchange an authorization code and return the user's top tracks
    async fn top_tracks_for_code(&self, code: &str) -> Result<Vec<Track>>;
}

#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub accounts_base: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl SpotifyConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            accounts_base: "https://accounts.spotify.com".to_string(),
            api_base: "https://api.spotify.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TopTracksPage {
    #[serde(default)]
    items: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    id: String,
    name: String,
    duration_ms: u64,
    #[serde(default)]
    preview_url: Option<String>,
    album: NamedItem,
    #[serde(default)]
    artists: Vec<NamedItem>,
}

#[derive(Debug, Deserialize)]
struct NamedItem {
    name: String,
}

impl SpotifyTrack {
    /// Flatten to a `Track`; tracks without any artist are unusable for lyrics search
    fn into_track(self) -> Option<Track> {
        let Some(main_artist) = self.artists.into_iter().next() else {
            tracing::warn!("Skipping track {} without artists", self.id);
            return None;
        };

        Some(Track {
            id: self.id,
            album: self.album.name,
            main_artist: main_artist.name,
            track_name: self.name,
            preview_url: self.preview_url,
            duration_ms: self.duration_ms,
        })
    }
}

pub struct SpotifyClient {
    client: Client,
    config: SpotifyConfig,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create Spotify HTTP client")?;
        Ok(Self { client, config })
    }

    /// Exchange an authorization code for an access token
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let url = format!("{}/api/token", self.config.accounts_base.trim_end_matches('/'));
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let token: TokenResponse = self
            .client
            .post(url)
            .form(&form)
            .send()
            .await
            .context("Token request failed")?
            .error_for_status()
            .context("Token endpoint rejected the authorization code")?
            .json()
            .await
            .context("Failed to parse token response")?;

        tracing::debug!(
            "Obtained Spotify token (type: {:?}, expires in: {:?}s, scope: {:?})",
            token.token_type,
            token.expires_in,
            token.scope
        );
        Ok(token)
    }

    /// Fetch the user's top tracks with a bearer token
    pub async fn top_tracks(&self, access_token: &str) -> Result<Vec<Track>> {
        let url = format!("{}/v1/me/top/tracks", self.config.api_base.trim_end_matches('/'));

        let page: TopTracksPage = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .context("Top tracks request failed")?
            .error_for_status()
            .context("Top tracks request was rejected")?
            .json()
            .await
            .context("Failed to parse top tracks response")?;

        let tracks: Vec<Track> = page
            .items
            .into_iter()
            .filter_map(SpotifyTrack::into_track)
            .collect();

        tracing::info!("Fetched {} top tracks", tracks.len());
        Ok(tracks)
    }
}

#[async_trait]
impl TopTracksProvider for SpotifyClient {
    fn authorize_url(&self, state: &str) -> Result<String> {
        let base = format!("{}/authorize", self.config.accounts_base.trim_end_matches('/'));
        let url = Url::parse_with_params(
            &base,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("state", state),
                ("scope", SCOPES),
            ],
        )
        .with_context(|| format!("Invalid authorize URL: {}", base))?;

        Ok(url.to_string())
    }

    async fn top_tracks_for_code(&self, code: &str) -> Result<Vec<Track>> {
        let token = self.exchange_code(code).await?;
        self.top_tracks(&token.access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Form, Json, Router,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, post},
    };
    use serde_json::json;
    use std::collections::HashMap;

    async fn spawn_spotify() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let app = Router::new()
            .route(
                "/api/token",
                post(|Form(form): Form<HashMap<String, String>>| async move {
                    let valid = form.get("grant_type").map(String::as_str) == Some("authorization_code")
                        && form.get("code").map(String::as_str) == Some("good-code")
                        && form.get("client_secret").map(String::as_str) == Some("secret");
                    if !valid {
                        return StatusCode::BAD_REQUEST.into_response();
                    }
                    Json(json!({
                        "access_token": "access-123",
                        "token_type": "Bearer",
                        "expires_in": 3600,
                        "scope": SCOPES
                    }))
                    .into_response()
                }),
            )
            .route(
                "/v1/me/top/tracks",
                get(|headers: HeaderMap| async move {
                    let authorized = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        == Some("Bearer access-123");
                    if !authorized {
                        return StatusCode::UNAUTHORIZED.into_response();
                    }
                    Json(json!({
                        "items": [
                            {
                                "id": "a1",
                                "name": "Bohemian Rhapsody",
                                "duration_ms": 354320,
                                "preview_url": null,
                                "album": { "name": "A Night at the Opera" },
                                "artists": [{ "name": "Queen" }]
                            },
                            {
                                "id": "x9",
                                "name": "Mystery",
                                "duration_ms": 1000,
                                "album": { "name": "Unknown" },
                                "artists": []
                            },
                            {
                                "id": "b2",
                                "name": "Imagine",
                                "duration_ms": 183000,
                                "preview_url": "https://p.scdn.co/mp3-preview/b2",
                                "album": { "name": "Imagine" },
                                "artists": [{ "name": "John Lennon" }, { "name": "Plastic Ono Band" }]
                            }
                        ]
                    }))
                    .into_response()
                }),
            );

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        base
    }

    fn client(base: &str) -> SpotifyClient {
        let mut config = SpotifyConfig::new("client", "secret", "http://localhost:8000/callback");
        config.accounts_base = base.to_string();
        config.api_base = base.to_string();
        SpotifyClient::new(config).unwrap()
    }

    #[test]
    fn test_authorize_url() {
        let spotify = client("https://accounts.spotify.com");
        let url = Url::parse(&spotify.authorize_url("abc123").unwrap()).unwrap();
        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/authorize");
        assert_eq!(params["client_id"], "client");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["state"], "abc123");
        assert_eq!(params["redirect_uri"], "http://localhost:8000/callback");
        assert_eq!(params["scope"], SCOPES);
    }

    #[tokio::test]
    async fn test_handshake_yields_flattened_tracks() {
        let base = spawn_spotify().await;
        let tracks = client(&base).top_tracks_for_code("good-code").await.unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].id, "a1");
        assert_eq!(tracks[0].album, "A Night at the Opera");
        assert_eq!(tracks[0].preview_url, None);
        assert_eq!(tracks[1].main_artist, "John Lennon");
        assert_eq!(
            tracks[1].preview_url.as_deref(),
            Some("https://p.scdn.co/mp3-preview/b2")
        );
    }

    #[tokio::test]
    async fn test_rejected_code_is_an_error() {
        let base = spawn_spotify().await;
        assert!(client(&base).top_tracks_for_code("bad-code").await.is_err());
    }
}
