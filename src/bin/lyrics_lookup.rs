use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use track_lyrics::lyrics::{GeniusLyricsProvider, LyricsProvider, LyricsQuery, ProviderConfig};

#[derive(Parser)]
#[command(name = "lyrics-lookup")]
#[command(about = "Look up lyrics for one track on Genius", long_about = None)]
struct Cli {
    /// Track title
    #[arg(short, long)]
    title: String,

    /// Primary artist
    #[arg(short, long)]
    artist: Option<String>,

    /// Genius API access token
    #[arg(long, env = "GENIUS_ACCESS_TOKEN", hide_env_values = true)]
    token: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Only print the search hits
    #[arg(long)]
    search_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ProviderConfig {
        timeout: Duration::from_secs(cli.timeout),
        ..ProviderConfig::new(cli.token)
    };
    let genius = GeniusLyricsProvider::new(config).context("Failed to create Genius provider")?;

    let mut query = LyricsQuery::new(cli.title);
    if let Some(artist) = cli.artist {
        query = query.with_artist(artist);
    }

    if cli.search_only {
        let hits = genius
            .search(&query)
            .await
            .with_context(|| format!("Search failed for '{}'", query.search_term()))?;
        for (i, hit) in hits.iter().enumerate() {
            println!(
                "{:>2}. {} - {}  {}",
                i + 1,
                hit.artist.as_deref().unwrap_or("?"),
                hit.title.as_deref().unwrap_or("?"),
                hit.url
            );
        }
        return Ok(());
    }

    match genius.search_and_fetch(&query).await {
        Some(lyrics) => {
            println!("{}", lyrics.content);
            eprintln!("\n(source: {})", lyrics.url);
            Ok(())
        }
        None => anyhow::bail!("Lyrics not found for '{}'", query.search_term()),
    }
}
