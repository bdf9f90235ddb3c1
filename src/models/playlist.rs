use super::Track;
use serde::{Deserialize, Serialize};

/// Local, user-created playlist
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Playlist {
    /// Unique id, e.g. `playlist_1678886400000`
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(name: &str, created_at_millis: u128) -> Self {
        Self {
            id: format!("playlist_{}", created_at_millis),
            name: name.to_string(),
            tracks: Vec::new(),
        }
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.tracks.iter().any(|t| t.id == track_id)
    }

    /// Total duration in seconds
    pub fn total_duration(&self) -> f64 {
        self.tracks.iter().map(|t| t.duration).sum()
    }
}
