use egui::TextureHandle;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub enum MainTab {
    Home,
    Search,
    LikedSongs,
    RecentlyPlayed,
    Playlist(String),
    Settings,
    About,
    NowPlaying,
}

/// Right-hand panel of the now-playing view
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum NowPlayingPanel {
    #[default]
    Lyrics,
    UpNext,
}

/// Short message shown above the player bar
pub struct Toast {
    pub message: String,
    pub shown_at: Instant,
}

const TOAST_DURATION: Duration = Duration::from_secs(3);

pub struct UIState {
    // Navigation
    pub selected_tab: MainTab,

    // Current Track Artwork
    pub artwork_texture: Option<TextureHandle>,
    pub artwork_url: Option<String>,
    pub artwork_loading: bool,

    // Thumbnail Cache (search results, lists)
    pub thumb_cache: HashMap<String, TextureHandle>,
    pub thumb_pending: HashSet<String>,

    // Now Playing
    pub now_playing_panel: NowPlayingPanel,
    pub last_lyric_line: Option<usize>,

    // Notifications
    pub toast: Option<Toast>,
    pub last_playback_error: Option<String>,

    // New playlist dialog
    pub show_new_playlist: bool,
    pub new_playlist_name: String,

    // UI Controls
    pub is_seeking: bool,
    pub seek_target_secs: f64,
    pub is_shutting_down: bool,
    pub use_gpu: bool,
}

impl Default for UIState {
    fn default() -> Self {
        Self {
            selected_tab: MainTab::Home,
            artwork_texture: None,
            artwork_url: None,
            artwork_loading: false,
            thumb_cache: HashMap::new(),
            thumb_pending: HashSet::new(),
            now_playing_panel: NowPlayingPanel::default(),
            last_lyric_line: None,
            toast: None,
            last_playback_error: None,
            show_new_playlist: false,
            new_playlist_name: String::new(),
            is_seeking: false,
            seek_target_secs: 0.0,
            is_shutting_down: false,
            use_gpu: true,
        }
    }
}

impl UIState {
    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            shown_at: Instant::now(),
        });
    }

    /// Active toast message, expiring old ones
    pub fn current_toast(&mut self) -> Option<&str> {
        if self
            .toast
            .as_ref()
            .is_some_and(|t| t.shown_at.elapsed() > TOAST_DURATION)
        {
            self.toast = None;
        }
        self.toast.as_ref().map(|t| t.message.as_str())
    }
}
