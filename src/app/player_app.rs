use eframe::egui;
use log::{debug, info, warn};
use std::sync::mpsc::{channel, TryRecvError};
use std::time::{Duration, Instant};

use crate::app::playback::Playback;
use crate::data::home_data::{self, TrendingUpdate};
use crate::models::{RepeatMode, SettingsPatch, Track};
use crate::services::{downloads, updates, Library};
use crate::state::content_state::UpdateCheck;
use crate::utils::audio_controller::AudioController;
use crate::utils::media::EngineEvent;

// State modules
use crate::state::{AudioState, BackgroundTasks, ContentState, UIState};

// Constants
use crate::constants::*;

pub use crate::state::ui_state::MainTab;

pub struct MusicPlayerApp {
    // Audio state (engine handle, queue, volume)
    pub audio: AudioState,

    // UI state (navigation, artwork, toasts, controls)
    pub ui: UIState,

    // Content state (library, search, home, lyrics, updates)
    pub content: ContentState,

    // Background tasks (receivers for async operations)
    pub tasks: BackgroundTasks,
}

impl MusicPlayerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, use_gpu: bool) -> Self {
        let library = Library::open();
        let settings = library.settings();

        let mut app = Self {
            audio: AudioState::new(library.volume(), settings.crossfade),
            ui: UIState {
                use_gpu,
                ..Default::default()
            },
            content: ContentState::new(library),
            tasks: BackgroundTasks::default(),
        };

        app.refresh_mixed_tracks();
        app.fetch_trending();
        app
    }

    // ---------------------------------------------------------------------
    // Playback
    // ---------------------------------------------------------------------

    pub fn current_track(&self) -> Option<&Track> {
        self.audio.playback_queue.current_track()
    }

    pub fn is_playing(&self) -> bool {
        self.audio.playback_queue.is_playing()
    }

    /// Queue, library and engine handle for one playback action
    fn playback(&mut self) -> Playback<'_, AudioController> {
        Playback {
            queue: &mut self.audio.playback_queue,
            library: &mut self.content.library,
            output: &self.audio.audio_controller,
        }
    }

    fn on_track_started(&mut self, started: Option<Track>) {
        if let Some(track) = started {
            self.ui.last_playback_error = None;
            self.request_artwork_fetch(&track.cover_url);
        }
    }

    /// Play `track` with `list` as the new queue. Playing the current track
    /// again toggles play/pause instead.
    pub fn play_track_from_list(&mut self, track: &Track, list: &[Track]) {
        let started = self.playback().play_from_list(track, list);
        self.on_track_started(started);
    }

    pub fn play_next(&mut self) {
        let started = self.playback().next();
        self.on_track_started(started);
    }

    pub fn play_previous(&mut self) {
        let started = self.playback().previous();
        self.on_track_started(started);
    }

    pub fn toggle_playback(&mut self) {
        self.playback().toggle();
    }

    fn schedule_preload(&mut self) {
        self.playback().schedule_preload();
    }

    pub fn toggle_shuffle(&mut self) {
        self.audio.playback_queue.toggle_shuffle();
        self.schedule_preload();
    }

    pub fn cycle_repeat_mode(&mut self) {
        let mode = self.audio.playback_queue.repeat_mode().cycle();
        self.set_repeat_mode(mode);
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        info!("[Player] {}", mode.label());
        self.audio.playback_queue.set_repeat_mode(mode);
        self.audio.audio_controller.set_repeat_mode(mode);
        self.schedule_preload();
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.audio.volume = volume.clamp(0.0, 1.0);
        self.audio.muted = false;
        self.audio.audio_controller.set_volume(self.audio.volume);
        self.content.library.set_volume(self.audio.volume);
    }

    pub fn toggle_mute(&mut self) {
        self.audio.toggle_mute();
    }

    pub fn seek_to(&mut self, secs: f64) {
        let duration = self.audio.playback_queue.duration();
        let target = if duration > 0.0 {
            secs.clamp(0.0, duration)
        } else {
            secs.max(0.0)
        };
        self.audio.audio_controller.seek(target);
        self.audio.playback_queue.set_current_time(target);
    }

    /// Queue the "made for you" mix and play its first track
    pub fn play_mixed_tracks(&mut self) {
        let mixed = self.content.home.mixed_tracks.clone();
        if let Some(first) = mixed.first() {
            self.play_track_from_list(first, &mixed);
        }
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Advance => {
                debug!("[Player] Engine requested advance");
                self.play_next();
            }
            EngineEvent::Duration(secs) => self.audio.playback_queue.set_duration(secs),
            EngineEvent::PlaybackFailed(msg) => {
                warn!("[Player] Playback failed: {}", msg);
                self.audio.playback_queue.set_is_playing(false);
                self.ui.show_toast(format!("Playback failed: {}", msg));
                self.ui.last_playback_error = Some(msg);
            }
            EngineEvent::LoadStateChanged(state) => self.audio.load_state = state,
            EngineEvent::TimeUpdate(secs) => self.audio.playback_queue.set_current_time(secs),
            EngineEvent::RequestStreamUrl { .. } => {}
        }
    }

    fn check_audio_events(&mut self) {
        for event in self.audio.audio_controller.poll_events() {
            self.handle_engine_event(event);
        }
        if !self.ui.is_seeking && self.current_track().is_some() {
            let position = self.audio.position();
            self.audio.playback_queue.set_current_time(position);
        }
    }

    // ---------------------------------------------------------------------
    // Library
    // ---------------------------------------------------------------------

    pub fn is_liked(&self, track_id: &str) -> bool {
        self.content.library.is_liked(track_id)
    }

    pub fn toggle_like(&mut self, track: &Track) {
        let liked = self.content.library.toggle_like(track);
        for result in self.content.search.results.iter_mut() {
            if result.id == track.id {
                result.liked = liked;
            }
        }
        self.ui.show_toast(if liked {
            "Added to Liked Songs"
        } else {
            "Removed from Liked Songs"
        });
        self.refresh_mixed_tracks();
    }

    pub fn create_playlist(&mut self, name: &str) {
        if name.trim().is_empty() {
            return;
        }
        let id = self.content.library.create_playlist(name);
        self.ui.selected_tab = MainTab::Playlist(id);
    }

    pub fn delete_playlist(&mut self, id: &str) {
        self.content.library.delete_playlist(id);
        if self.ui.selected_tab == MainTab::Playlist(id.to_string()) {
            self.ui.selected_tab = MainTab::Home;
        }
    }

    pub fn add_to_playlist(&mut self, playlist_id: &str, track: &Track) {
        let added = self.content.library.add_track_to_playlist(playlist_id, track);
        let name = self
            .content
            .library
            .playlist(playlist_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        if added {
            self.ui.show_toast(format!("Added to {}", name));
        } else {
            self.ui.show_toast(format!("Already in {}", name));
        }
    }

    pub fn set_crossfade(&mut self, secs: u32) {
        let settings = self.content.library.update_settings(SettingsPatch {
            crossfade: Some(secs),
        });
        self.audio.audio_controller.set_crossfade(settings.crossfade);
    }

    pub fn download_track(&mut self, track: &Track) {
        self.ui.show_toast(format!("Downloading {}", track.display_name()));
        downloads::spawn_download(track.clone(), self.tasks.download_tx.clone());
    }

    fn check_downloads(&mut self) {
        while let Ok(result) = self.tasks.download_rx.try_recv() {
            match result {
                Ok(path) => self.ui.show_toast(format!("Saved to {}", path.display())),
                Err(e) => self.ui.show_toast(format!("Download failed: {}", e)),
            }
        }
    }

    // ---------------------------------------------------------------------
    // Home
    // ---------------------------------------------------------------------

    pub fn refresh_mixed_tracks(&mut self) {
        let library = &self.content.library;
        self.content.home.mixed_tracks = home_data::mixed_tracks(
            library.liked_tracks(),
            library.recently_played(),
            &mut rand::rng(),
        );
    }

    pub fn fetch_trending(&mut self) {
        if self.tasks.trending_rx.is_some() {
            return;
        }
        let country = crate::config::get().country.clone();
        info!("[Home] Loading trending tracks for {}", country);
        let (tx, rx) = channel();
        home_data::spawn_trending_load(country, self.content.library.trending_cache(), tx);
        self.tasks.trending_rx = Some(rx);
        self.content.home.trending_loading = true;
        self.content.home.trending_error = None;
    }

    fn check_trending(&mut self) {
        let Some(rx) = &self.tasks.trending_rx else {
            return;
        };
        let updates: Vec<TrendingUpdate> = rx.try_iter().collect();
        for update in updates {
            match update {
                TrendingUpdate::Region(region) => self.content.home.trending_region = region,
                TrendingUpdate::Tracks(tracks) => {
                    self.content.home.trending_tracks = self.content.library.mark_liked(tracks);
                }
                TrendingUpdate::Error(e) => self.content.home.trending_error = Some(e),
                TrendingUpdate::CacheChanged(cache) => {
                    self.content.library.save_trending_cache(&cache);
                }
                TrendingUpdate::Done => {
                    self.content.home.trending_loading = false;
                    self.content.home.initial_fetch_done = true;
                    self.tasks.trending_rx = None;
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Search
    // ---------------------------------------------------------------------

    pub fn on_search_edited(&mut self) {
        self.content.search.on_query_edited(Instant::now());
    }

    fn check_search(&mut self) {
        if let Some(query) = self.content.search.take_due_query(Instant::now()) {
            info!("[Search] Searching for {:?}", query);
            let (tx, rx) = channel();
            std::thread::spawn(move || {
                let result = match crate::utils::error_handling::create_runtime() {
                    Ok(rt) => rt
                        .block_on(crate::api::search_tracks(&query, 0, SEARCH_LIMIT))
                        .map(|res| res.tracks.into_iter().map(Track::from_api).collect())
                        .map_err(|e| e.to_string()),
                    Err(e) => Err(e),
                };
                let _ = tx.send((query, result));
            });
            self.tasks.search_rx = Some(rx);
        }

        if let Some(rx) = &self.tasks.search_rx {
            if let Ok((query, result)) = rx.try_recv() {
                let result = result.map(|tracks| self.content.library.mark_liked(tracks));
                self.content.search.apply_results(&query, result);
                self.tasks.search_rx = None;
            }
        }
    }

    // ---------------------------------------------------------------------
    // Now playing: lyrics and artwork
    // ---------------------------------------------------------------------

    /// Fetch lyrics for the current track unless already shown
    pub fn ensure_lyrics(&mut self) {
        let Some(track) = self.current_track().cloned() else {
            return;
        };
        if !self.content.lyrics.needs_fetch(&track.id) {
            return;
        }
        self.content.lyrics.start(&track.id);
        let (tx, rx) = channel();
        crate::utils::async_helper::spawn_fire_and_forget(move || {
            Box::pin(async move {
                let lines = match crate::api::get_lyrics(&track.artist, &track.title).await {
                    Ok(Some(text)) => Some(crate::utils::lrc::parse_lrc(&text)),
                    Ok(None) => None,
                    Err(e) => {
                        warn!("[Lyrics] Failed to fetch lyrics for {}: {}", track.id, e);
                        None
                    }
                };
                let _ = tx.send((track.id, lines));
                Ok::<(), String>(())
            })
        });
        self.tasks.lyrics_rx = Some(rx);
    }

    fn check_lyrics(&mut self) {
        if let Some(rx) = &self.tasks.lyrics_rx {
            if let Ok((track_id, lines)) = rx.try_recv() {
                self.content.lyrics.finish(&track_id, lines);
                self.tasks.lyrics_rx = None;
            }
        }
    }

    fn request_artwork_fetch(&mut self, url: &str) {
        if url.is_empty() {
            self.ui.artwork_texture = None;
            self.ui.artwork_url = None;
            return;
        }
        if self.ui.artwork_url.as_deref() == Some(url) {
            return;
        }
        self.ui.artwork_url = Some(url.to_string());
        self.ui.artwork_loading = true;

        let (tx, rx) = channel();
        crate::utils::artwork::spawn_image_fetch(url.to_string(), tx);
        self.tasks.artwork_rx = Some(rx);
    }

    fn check_artwork(&mut self, ctx: &egui::Context) {
        if let Some(rx) = &self.tasks.artwork_rx {
            match rx.try_recv() {
                Ok((url, image)) => {
                    if self.ui.artwork_url.as_deref() == Some(url.as_str()) {
                        self.ui.artwork_texture = image.map(|image| {
                            ctx.load_texture("artwork", image, egui::TextureOptions::LINEAR)
                        });
                    }
                    self.ui.artwork_loading = false;
                    self.tasks.artwork_rx = None;
                }
                Err(TryRecvError::Disconnected) => {
                    self.ui.artwork_loading = false;
                    self.tasks.artwork_rx = None;
                }
                Err(TryRecvError::Empty) => {}
            }
        }
    }

    /// Cached thumbnail for `url`, requesting it on first use
    pub fn thumbnail(&mut self, url: &str) -> Option<egui::TextureHandle> {
        if url.is_empty() {
            return None;
        }
        if let Some(texture) = self.ui.thumb_cache.get(url) {
            return Some(texture.clone());
        }
        if self.ui.thumb_pending.insert(url.to_string()) {
            crate::utils::artwork::spawn_image_fetch(url.to_string(), self.tasks.thumb_tx.clone());
        }
        None
    }

    fn check_thumbnails(&mut self, ctx: &egui::Context) {
        while let Ok((url, image)) = self.tasks.thumb_rx.try_recv() {
            if let Some(image) = image {
                let texture = ctx.load_texture(url.as_str(), image, egui::TextureOptions::LINEAR);
                self.ui.thumb_cache.insert(url.clone(), texture);
            }
            self.ui.thumb_pending.remove(&url);
        }
    }

    // ---------------------------------------------------------------------
    // About: update check
    // ---------------------------------------------------------------------

    pub fn check_for_updates(&mut self) {
        if self.tasks.update_rx.is_some() {
            return;
        }
        let (tx, rx) = channel();
        updates::spawn_update_check(tx);
        self.tasks.update_rx = Some(rx);
        self.content.update_check = UpdateCheck::Checking;
    }

    fn check_update_result(&mut self) {
        if let Some(rx) = &self.tasks.update_rx {
            if let Ok(result) = rx.try_recv() {
                self.content.update_check = match result {
                    Ok(status) => UpdateCheck::Done(status),
                    Err(e) => UpdateCheck::Failed(e),
                };
                self.tasks.update_rx = None;
            }
        }
    }

    // ---------------------------------------------------------------------
    // Frame plumbing
    // ---------------------------------------------------------------------

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        // Space belongs to text fields while one has focus
        if ctx.wants_keyboard_input() {
            return;
        }
        let (space, next, previous, forward, back, louder, quieter) = ctx.input(|i| {
            let ctrl = i.modifiers.ctrl;
            let shift = i.modifiers.shift;
            (
                i.key_pressed(egui::Key::Space),
                ctrl && i.key_pressed(egui::Key::ArrowRight),
                ctrl && i.key_pressed(egui::Key::ArrowLeft),
                shift && i.key_pressed(egui::Key::ArrowRight),
                shift && i.key_pressed(egui::Key::ArrowLeft),
                ctrl && i.key_pressed(egui::Key::ArrowUp),
                ctrl && i.key_pressed(egui::Key::ArrowDown),
            )
        });
        if space {
            self.toggle_playback();
        }
        if next {
            self.play_next();
        }
        if previous {
            self.play_previous();
        }
        if forward || back {
            let position = self.audio.position();
            let target = if forward {
                position + SEEK_STEP_SECS
            } else {
                position - SEEK_STEP_SECS
            };
            self.seek_to(target);
        }
        if louder {
            self.set_volume(self.audio.volume + VOLUME_STEP);
        }
        if quieter {
            self.set_volume(self.audio.volume - VOLUME_STEP);
        }
    }

    /// Gracefully release resources before exit
    fn cleanup_and_exit(&mut self, ctx: &egui::Context) {
        info!("[Shutdown] Starting graceful cleanup...");
        self.audio.audio_controller.shutdown();
        self.content.library.set_volume(self.audio.volume);
        self.tasks.clear_all();
        self.ui.thumb_cache.clear();
        self.ui.artwork_texture = None;
        info!("[Shutdown] Cleanup complete, closing application...");
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn repaint_interval(&self) -> Duration {
        if self.ui.use_gpu {
            return Duration::from_micros(REPAINT_INTERVAL_GPU_MICROS);
        }
        let is_active = self.is_playing()
            || self.audio.is_loading()
            || self.content.search.loading
            || self.content.search.is_debouncing()
            || self.tasks.has_active_tasks()
            || self.ui.toast.is_some();
        if is_active {
            Duration::from_micros(REPAINT_INTERVAL_CPU_ACTIVE)
        } else {
            Duration::from_micros(REPAINT_INTERVAL_CPU_IDLE)
        }
    }
}

impl eframe::App for MusicPlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(self.repaint_interval());

        if ctx.input(|i| i.viewport().close_requested()) && !self.ui.is_shutting_down {
            self.ui.is_shutting_down = true;
            self.cleanup_and_exit(ctx);
        }

        ctx.set_visuals(egui::Visuals::dark());

        self.handle_keyboard_shortcuts(ctx);

        // Poll background work
        self.check_audio_events();
        self.check_search();
        self.check_trending();
        self.check_lyrics();
        self.check_artwork(ctx);
        self.check_thumbnails(ctx);
        self.check_downloads();
        self.check_update_result();

        crate::screens::render_layout(self, ctx);
    }
}
