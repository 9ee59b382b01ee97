use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One candidate song in a session's track list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub album: String,
    pub main_artist: String,
    pub track_name: String,
    #[serde(default)]
    pub preview_url: Option<String>,
    pub duration_ms: u64,
}

/// Ordered, read-only list of tracks owned by a single session.
///
/// Positions are 1-based when presented to the user. IDs are unique: when the
/// upstream list repeats an ID, the first occurrence is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TrackList {
    tracks: Vec<Track>,
}

impl TrackList {
    pub fn new(tracks: Vec<Track>) -> Self {
        let mut seen = HashSet::new();
        let tracks = tracks
            .into_iter()
            .filter(|t| {
                let fresh = seen.insert(t.id.clone());
                if !fresh {
                    tracing::debug!("Dropping duplicate track id: {}", t.id);
                }
                fresh
            })
            .collect();

        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn as_slice(&self) -> &[Track] {
        &self.tracks
    }

    /// Get a track by its exact ID
    pub fn by_id(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Get a track by its 1-based position
    pub fn by_position(&self, position: usize) -> Option<&Track> {
        position.checked_sub(1).and_then(|idx| self.tracks.get(idx))
    }

    /// First track (in list order) whose name appears inside `text`, ignoring case
    pub fn by_name_in(&self, text: &str) -> Option<&Track> {
        let haystack = text.to_lowercase();
        self.tracks.iter().find(|t| {
            !t.track_name.is_empty() && haystack.contains(&t.track_name.to_lowercase())
        })
    }
}

impl From<Vec<Track>> for TrackList {
    fn from(tracks: Vec<Track>) -> Self {
        Self::new(tracks)
    }
}

impl<'a> IntoIterator for &'a TrackList {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

#[cfg(test)]
pub(crate) fn sample_track(id: &str, name: &str, artist: &str) -> Track {
    Track {
        id: id.to_string(),
        album: format!("{} album", name),
        main_artist: artist.to_string(),
        track_name: name.to_string(),
        preview_url: None,
        duration_ms: 180_000,
    }
}
