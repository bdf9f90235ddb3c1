use crate::constants::SEARCH_DEBOUNCE_MILLIS;
use crate::data::home_data::HomeContent;
use crate::models::Track;
use crate::services::{Library, UpdateStatus};
use crate::utils::lrc::LyricLine;
use std::time::{Duration, Instant};

/// Live search with debounce
#[derive(Debug, Default)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<Track>,
    pub loading: bool,
    pub error: Option<String>,
    /// Time of the last edit that has not been searched yet
    pending_since: Option<Instant>,
    /// Query the shown results belong to
    pub searched_query: String,
}

impl SearchState {
    pub fn on_query_edited(&mut self, now: Instant) {
        self.pending_since = Some(now);
    }

    /// Query to send once the user stopped typing. A blank query clears the
    /// results without a request.
    pub fn take_due_query(&mut self, now: Instant) -> Option<String> {
        let since = self.pending_since?;
        if now.duration_since(since) < Duration::from_millis(SEARCH_DEBOUNCE_MILLIS) {
            return None;
        }
        self.pending_since = None;

        let query = self.query.trim().to_string();
        if query.is_empty() {
            self.clear();
            return None;
        }
        if query == self.searched_query && self.error.is_none() {
            return None;
        }
        self.searched_query = query.clone();
        self.loading = true;
        self.error = None;
        Some(query)
    }

    pub fn is_debouncing(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Ignores results for a query the user already typed past
    pub fn apply_results(&mut self, query: &str, result: Result<Vec<Track>, String>) {
        if query != self.searched_query {
            return;
        }
        self.loading = false;
        match result {
            Ok(tracks) => {
                self.results = tracks;
                self.error = None;
            }
            Err(e) => {
                self.results.clear();
                self.error = Some(format!("Failed to fetch results: {}", e));
            }
        }
    }

    pub fn clear(&mut self) {
        self.results.clear();
        self.error = None;
        self.loading = false;
        self.searched_query.clear();
    }
}

/// Lyrics of the track shown in the now-playing view
#[derive(Debug, Default)]
pub struct LyricsState {
    pub track_id: Option<String>,
    pub lines: Vec<LyricLine>,
    pub loading: bool,
    pub unavailable: bool,
}

impl LyricsState {
    pub fn needs_fetch(&self, track_id: &str) -> bool {
        self.track_id.as_deref() != Some(track_id)
    }

    pub fn start(&mut self, track_id: &str) {
        self.track_id = Some(track_id.to_string());
        self.lines.clear();
        self.loading = true;
        self.unavailable = false;
    }

    pub fn finish(&mut self, track_id: &str, lines: Option<Vec<LyricLine>>) {
        if self.track_id.as_deref() != Some(track_id) {
            return;
        }
        self.loading = false;
        match lines {
            Some(lines) if !lines.is_empty() => self.lines = lines,
            _ => self.unavailable = true,
        }
    }
}

#[derive(Debug, Default)]
pub enum UpdateCheck {
    #[default]
    NotChecked,
    Checking,
    Done(UpdateStatus),
    Failed(String),
}

pub struct ContentState {
    // Library (liked, recent, playlists, settings)
    pub library: Library,

    // Search Screen
    pub search: SearchState,

    // Home Screen
    pub home: HomeContent,

    // Now Playing
    pub lyrics: LyricsState,

    // About Screen
    pub update_check: UpdateCheck,
}

impl ContentState {
    pub fn new(library: Library) -> Self {
        Self {
            library,
            search: SearchState::default(),
            home: HomeContent::default(),
            lyrics: LyricsState::default(),
            update_check: UpdateCheck::default(),
        }
    }
}

impl Default for ContentState {
    fn default() -> Self {
        Self::new(Library::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn after(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    #[test]
    fn search_waits_for_typing_to_stop() {
        let start = Instant::now();
        let mut search = SearchState::default();
        search.query = "daft".to_string();
        search.on_query_edited(start);
        assert_eq!(search.take_due_query(after(start, 100)), None);

        search.query = "daft punk".to_string();
        search.on_query_edited(after(start, 300));
        assert_eq!(search.take_due_query(after(start, 600)), None);
        assert_eq!(
            search.take_due_query(after(start, 800)).as_deref(),
            Some("daft punk")
        );
        assert!(search.loading);
        assert!(!search.is_debouncing());
    }

    #[test]
    fn blank_query_clears_without_request() {
        let start = Instant::now();
        let mut search = SearchState::default();
        search.results = vec![Track::default()];
        search.query = "   ".to_string();
        search.on_query_edited(start);
        assert_eq!(search.take_due_query(after(start, 600)), None);
        assert!(search.results.is_empty());
    }

    #[test]
    fn stale_results_are_dropped_and_errors_formatted() {
        let start = Instant::now();
        let mut search = SearchState::default();
        search.query = "new".to_string();
        search.on_query_edited(start);
        search.take_due_query(after(start, 500));

        search.apply_results("old", Ok(vec![Track::default()]));
        assert!(search.results.is_empty());
        assert!(search.loading);

        search.apply_results("new", Err("timeout".to_string()));
        assert_eq!(search.error.as_deref(), Some("Failed to fetch results: timeout"));
        assert!(!search.loading);
    }

    #[test]
    fn lyrics_for_another_track_are_ignored() {
        let mut lyrics = LyricsState::default();
        assert!(lyrics.needs_fetch("1"));
        lyrics.start("1");
        assert!(!lyrics.needs_fetch("1"));

        lyrics.finish("2", Some(vec![LyricLine { time: 1.0, text: "x".to_string() }]));
        assert!(lyrics.loading);

        lyrics.finish("1", None);
        assert!(lyrics.unavailable);
        assert!(!lyrics.loading);
    }
}
