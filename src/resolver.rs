//! Track selection from user input
//!
//! Maps a selector (an explicit track ID, or free text such as `"track #3"` or
//! `"play imagine please"`) onto a single track of a session's list. Resolution
//! is a pure lookup: no I/O, and every failure is simply "no track".

use crate::track::{Track, TrackList};

/// What the user sent to pick a track
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Exact track ID, e.g. from a button click
    Id(String),
    /// Free-form chat text
    Text(String),
}

impl Selector {
    pub fn id(id: impl Into<String>) -> Self {
        Selector::Id(id.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Selector::Text(text.into())
    }
}

/// Outcome of looking for a `#N` reference in free text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordinal {
    /// No `#` in the text
    Absent,
    /// `#N` with N >= 1
    Position(usize),
    /// A `#` followed by something that is not a positive integer
    Malformed,
}

/// Parse the first `#N` reference in `text`.
///
/// N is the first whitespace-delimited token after the first `#`, cut at any
/// following `#`.
pub fn parse_ordinal(text: &str) -> Ordinal {
    let Some((_, rest)) = text.split_once('#') else {
        return Ordinal::Absent;
    };

    let token = rest
        .split('#')
        .next()
        .and_then(|segment| segment.split_whitespace().next());

    match token.map(str::parse::<usize>) {
        Some(Ok(n)) if n > 0 => Ordinal::Position(n),
        _ => Ordinal::Malformed,
    }
}

/// Resolve `selector` to exactly one track of `tracks`, or `None`.
pub fn resolve<'a>(tracks: &'a TrackList, selector: &Selector) -> Option<&'a Track> {
    match selector {
        Selector::Id(id) => tracks.by_id(id),
        Selector::Text(text) => resolve_text(tracks, text),
    }
}

fn resolve_text<'a>(tracks: &'a TrackList, text: &str) -> Option<&'a Track> {
    if let Some(track) = tracks.by_id(text.trim()) {
        return Some(track);
    }

    match parse_ordinal(text) {
        Ordinal::Position(n) => {
            let track = tracks.by_position(n);
            if track.is_none() {
                tracing::debug!("Track #{} out of range ({} tracks)", n, tracks.len());
            }
            track
        }
        Ordinal::Malformed => {
            tracing::debug!("Ignoring malformed track reference in: {:?}", text);
            None
        }
        Ordinal::Absent => tracks.by_name_in(text),
    }
}
