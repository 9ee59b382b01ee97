use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::lyrics::{LyricsProvider, LyricsQuery};
use crate::resolver::{Selector, resolve};
use crate::session::{SessionStore, expired_session_cookie, session_cookie, session_id};
use crate::spotify::TopTracksProvider;
use crate::track::{Track, TrackList};

/// Track used by the `/test_lyrics` smoke endpoint
const TEST_TRACK: (&str, &str) = ("Bohemian Rhapsody", "Queen");

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub lyrics: Arc<dyn LyricsProvider>,
    pub spotify: Arc<dyn TopTracksProvider>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", post(logout))
        .route("/tracks", get(list_tracks))
        .route("/analyze_track/:track_id", get(analyze_track))
        .route("/chat_analyze", post(chat_analyze))
        .route("/analyze", post(analyze))
        .route("/test_lyrics", get(test_lyrics))
        .route("/debug_genius", get(debug_genius))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// A resolved track together with its lyrics
#[derive(Debug, Serialize, Deserialize)]
pub struct Analysis {
    pub track: Track,
    pub lyrics: String,
    pub source: String,
    pub url: String,
}

/// Root endpoint
async fn root() -> &'static str {
    "Track Lyrics API v0.1.0"
}

// ========== LOGIN ENDPOINTS ==========

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Redirect to the streaming provider's authorize page
async fn login(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let login_state = state.sessions.begin_login().await;
    let url = state.spotify.authorize_url(&login_state).map_err(|e| {
        tracing::error!("Failed to build authorize URL: {:#}", e);
        ApiError::Upstream(e.to_string())
    })?;

    tracing::debug!("Redirecting to authorize page");
    Ok(Redirect::to(&url))
}

/// Finish the handshake: exchange the code, load top tracks, open a session
async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError> {
    if let Some(error) = params.error {
        tracing::warn!("Authorization was denied: {}", error);
    }

    let code = params.code.ok_or(ApiError::MissingAuthCode)?;
    let login_state = params.state.ok_or(ApiError::InvalidState)?;
    if !state.sessions.complete_login(&login_state).await {
        tracing::warn!("Callback with unknown login state");
        return Err(ApiError::InvalidState);
    }

    let tracks = state.spotify.top_tracks_for_code(&code).await.map_err(|e| {
        tracing::error!("Top tracks handshake failed: {:#}", e);
        ApiError::Upstream(format!("{:#}", e))
    })?;

    let tracks = TrackList::new(tracks);
    let body = json!({ "top_tracks": &tracks });
    let session = state.sessions.create(tracks).await;

    tracing::info!("Login complete, session {} opened", session);
    let cookie = session_cookie(&session, state.sessions.ttl());
    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// End the caller's session
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(id) = session_id(&headers) {
        let removed = state.sessions.remove(&id).await;
        tracing::debug!("Logout for session {} (existed: {})", id, removed);
    }
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, expired_session_cookie())],
    )
}

/// List the caller's session tracks
async fn list_tracks(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    let tracks = state.sessions.tracks_for(&headers).await;
    tracing::debug!("Returning {} session tracks", tracks.len());
    Json(json!({ "top_tracks": &*tracks }))
}

// ========== ANALYSIS ENDPOINTS ==========

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    track: Option<Track>,
}

/// Lyrics for a track picked by ID (e.g. a button click)
async fn analyze_track(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(track_id): Path<String>,
) -> Result<Json<Analysis>, ApiError> {
    tracing::debug!("Analyzing track by id: {}", track_id);
    let tracks = state.sessions.tracks_for(&headers).await;
    let track = resolve(&tracks, &Selector::Id(track_id)).cloned();

    lyrics_for(&state, track).await
}

/// Lyrics for a track picked by free text ("track #3", "play imagine")
async fn chat_analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Option<Json<ChatRequest>>,
) -> Result<Json<Analysis>, ApiError> {
    let message = request
        .and_then(|Json(r)| r.message)
        .filter(|m| !m.trim().is_empty())
        .ok_or(ApiError::MissingTrack)?;

    tracing::debug!("Analyzing track from message: {:?}", message);
    let tracks = state.sessions.tracks_for(&headers).await;
    let track = resolve(&tracks, &Selector::Text(message)).cloned();

    lyrics_for(&state, track).await
}

/// Lyrics for a track supplied in the request body
async fn analyze(
    State(state): State<AppState>,
    request: Option<Json<AnalyzeRequest>>,
) -> Result<Json<Analysis>, ApiError> {
    let track = request
        .and_then(|Json(r)| r.track)
        .ok_or(ApiError::MissingTrack)?;

    lyrics_for(&state, Some(track)).await
}

async fn lyrics_for(state: &AppState, track: Option<Track>) -> Result<Json<Analysis>, ApiError> {
    let track = track.ok_or_else(|| {
        tracing::debug!("Selector did not match any session track");
        ApiError::TrackNotFound
    })?;

    let lyrics = state
        .lyrics
        .fetch_lyrics(&track.track_name, &track.main_artist)
        .await
        .ok_or_else(|| {
            tracing::debug!("No lyrics for {} - {}", track.main_artist, track.track_name);
            ApiError::LyricsNotFound
        })?;

    Ok(Json(Analysis {
        track,
        lyrics: lyrics.content,
        source: lyrics.source,
        url: lyrics.url,
    }))
}

// ========== DIAGNOSTIC ENDPOINTS ==========

#[derive(Debug, Deserialize)]
struct DebugQuery {
    q: Option<String>,
}

/// Lyrics for a well-known track, to check the provider end to end
async fn test_lyrics(State(state): State<AppState>) -> Json<Value> {
    let (title, artist) = TEST_TRACK;
    let lyrics = state.lyrics.fetch_lyrics(title, artist).await;
    Json(json!({ "lyrics": lyrics.map(|l| l.content) }))
}

/// Raw search result (or failure detail) from the lyrics provider
async fn debug_genius(
    State(state): State<AppState>,
    Query(params): Query<DebugQuery>,
) -> Json<Value> {
    let (title, artist) = TEST_TRACK;
    let query = match params.q {
        Some(q) if !q.trim().is_empty() => LyricsQuery::new(q),
        _ => LyricsQuery::new(title).with_artist(artist),
    };

    let body = match state.lyrics.search(&query).await {
        Ok(hits) => json!({
            "provider": state.lyrics.name(),
            "query": query.search_term(),
            "status": "ok",
            "hits": hits,
        }),
        Err(e) => {
            tracing::warn!("Debug search failed: {}", e);
            json!({
                "provider": state.lyrics.name(),
                "query": query.search_term(),
                "status": "error",
                "status_code": e.status(),
                "error": e.to_string(),
            })
        }
    };

    Json(body)
}
