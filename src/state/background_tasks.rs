use crate::data::home_data::TrendingUpdate;
use crate::services::UpdateStatus;
use crate::utils::async_helper::AsyncTaskResult;
use crate::utils::lrc::LyricLine;
use egui::ColorImage;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Search results tagged with the query they answer
pub type SearchResult = (String, AsyncTaskResult<Vec<crate::models::Track>>);

/// Lyrics tagged with the track they belong to (`None` = not available)
pub type LyricsResult = (String, Option<Vec<LyricLine>>);

pub struct BackgroundTasks {
    // Search Results
    pub search_rx: Option<Receiver<SearchResult>>,

    // Home Screen
    pub trending_rx: Option<Receiver<TrendingUpdate>>,

    // Now Playing
    pub lyrics_rx: Option<Receiver<LyricsResult>>,
    pub artwork_rx: Option<Receiver<(String, Option<ColorImage>)>>,

    // Thumbnails share one channel
    pub thumb_tx: Sender<(String, Option<ColorImage>)>,
    pub thumb_rx: Receiver<(String, Option<ColorImage>)>,

    // Downloads may overlap
    pub download_tx: Sender<AsyncTaskResult<PathBuf>>,
    pub download_rx: Receiver<AsyncTaskResult<PathBuf>>,

    // About Screen
    pub update_rx: Option<Receiver<AsyncTaskResult<UpdateStatus>>>,
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        let (thumb_tx, thumb_rx) = channel();
        let (download_tx, download_rx) = channel();
        Self {
            search_rx: None,
            trending_rx: None,
            lyrics_rx: None,
            artwork_rx: None,
            thumb_tx,
            thumb_rx,
            download_tx,
            download_rx,
            update_rx: None,
        }
    }
}

impl BackgroundTasks {
    /// Check if any one-shot background task is active
    pub fn has_active_tasks(&self) -> bool {
        self.search_rx.is_some()
            || self.trending_rx.is_some()
            || self.lyrics_rx.is_some()
            || self.artwork_rx.is_some()
            || self.update_rx.is_some()
    }

    /// Drop all receivers (shutdown)
    pub fn clear_all(&mut self) {
        self.search_rx = None;
        self.trending_rx = None;
        self.lyrics_rx = None;
        self.artwork_rx = None;
        self.update_rx = None;
    }
}
