// Data models for the streaming API and the local library

pub mod playlist;
pub mod responses;
pub mod settings;
pub mod track;

// Re-export commonly used types
pub use playlist::Playlist;
pub use responses::{ApiTrack, LyricsResponse, ReleaseResponse, SearchResponse, StreamUrlResponse};
pub use settings::{RepeatMode, Settings, SettingsPatch};
pub use track::Track;
