pub mod artwork;
pub mod async_helper;
pub mod audio_controller;
pub mod error_handling;
pub mod errors;
pub mod formatting;
pub mod http;
pub mod lrc;
pub mod media;
pub mod mediaplay;
pub mod store;

// Re-export commonly used types
pub use errors::{ApiError, DownloadError, PlaybackError, StoreError};
