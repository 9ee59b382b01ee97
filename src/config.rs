use crate::lyrics::ProviderConfig;
use crate::spotify::SpotifyConfig;
use anyhow::Result;
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "track-lyrics")]
#[command(about = "Top tracks and lyrics server", long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Spotify application client ID
    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    pub spotify_client_id: String,

    /// Spotify application client secret
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub spotify_client_secret: String,

    /// Redirect URI registered with Spotify (points at /callback)
    #[arg(long, env = "SPOTIFY_REDIRECT_URI")]
    pub spotify_redirect_uri: String,

    /// Genius API access token
    #[arg(long, env = "GENIUS_ACCESS_TOKEN", hide_env_values = true)]
    pub genius_access_token: String,

    /// Genius API base URL
    #[arg(long, env = "GENIUS_API_BASE", default_value = "https://api.genius.com")]
    pub genius_api_base: String,

    /// Timeout for each outbound HTTP request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// How long a login session keeps its track list, in seconds
    #[arg(long, env = "SESSION_TTL_SECS", default_value_t = 3600)]
    pub session_ttl_secs: u64,

    /// Text that marks a lyrics page as having no lyrics yet (repeatable)
    #[arg(
        long = "placeholder-phrase",
        env = "LYRICS_PLACEHOLDER_PHRASES",
        value_delimiter = ',',
        default_value = "Coming soon,No lyrics found,Lyrics for this song have yet to be released"
    )]
    pub placeholder_phrases: Vec<String>,
}

impl Config {
    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("SPOTIFY_CLIENT_ID", &self.spotify_client_id),
            ("SPOTIFY_CLIENT_SECRET", &self.spotify_client_secret),
            ("SPOTIFY_REDIRECT_URI", &self.spotify_redirect_uri),
            ("GENIUS_ACCESS_TOKEN", &self.genius_access_token),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                anyhow::bail!("{} must not be empty", name);
            }
        }

        if self.request_timeout_secs == 0 {
            anyhow::bail!("Request timeout must be at least one second");
        }
        if self.session_ttl_secs == 0 {
            anyhow::bail!("Session TTL must be at least one second");
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn lyrics_provider(&self) -> ProviderConfig {
        ProviderConfig {
            api_key: self.genius_access_token.clone(),
            api_base: self.genius_api_base.clone(),
            timeout: self.request_timeout(),
            placeholder_phrases: self.placeholder_phrases.clone(),
        }
    }

    pub fn spotify(&self) -> SpotifyConfig {
        let mut config = SpotifyConfig::new(
            &self.spotify_client_id,
            &self.spotify_client_secret,
            &self.spotify_redirect_uri,
        );
        config.timeout = self.request_timeout();
        config
    }
}
