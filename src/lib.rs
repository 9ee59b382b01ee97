//! Track Lyrics - top tracks from a streaming account, lyrics on demand
//!
//! This library resolves a user's selection (an ID, a `#N` position or part
//! of a title) against the tracks of their session and fetches lyrics for the
//! chosen track from Genius.

pub mod config;
pub mod error;
pub mod lyrics;
pub mod resolver;
pub mod server;
pub mod session;
pub mod spotify;
pub mod track;

pub use error::{ApiError, LyricsError};
pub use resolver::{Selector, resolve};
pub use track::{Track, TrackList};
