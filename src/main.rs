use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use track_lyrics::config::Config;
use track_lyrics::lyrics::GeniusLyricsProvider;
use track_lyrics::server::{self, AppState};
use track_lyrics::session::SessionStore;
use track_lyrics::spotify::SpotifyClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG overrides the default filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,track_lyrics=debug,tower_http=debug")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let config = Config::parse();
    config.validate().context("Invalid configuration")?;

    tracing::info!("Starting Track Lyrics");
    tracing::info!("Genius API: {}", config.genius_api_base);
    tracing::info!("Spotify redirect URI: {}", config.spotify_redirect_uri);

    let lyrics = GeniusLyricsProvider::new(config.lyrics_provider())
        .context("Failed to initialize Genius provider")?;
    let spotify =
        SpotifyClient::new(config.spotify()).context("Failed to initialize Spotify client")?;

    let app = server::create_router(AppState {
        sessions: SessionStore::new(config.session_ttl()),
        lyrics: Arc::new(lyrics),
        spotify: Arc::new(spotify),
    });
    let addr = format!("0.0.0.0:{}", config.port);

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  GET  /login                  - Start Spotify login");
    tracing::info!("  GET  /callback               - Spotify redirect target");
    tracing::info!("  GET  /tracks                 - Session top tracks");
    tracing::info!("  GET  /analyze_track/:id      - Lyrics for a track by ID");
    tracing::info!("  POST /chat_analyze           - Lyrics for a track by message");
    tracing::info!("  POST /analyze                - Lyrics for a supplied track");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
