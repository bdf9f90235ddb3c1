//! Dual-deck playback engine with eased crossfades and next-track preloading.
//!
//! The engine owns two [`MediaEngine`] decks, one active and one standby.
//! It never blocks: stream URLs are requested through [`EngineEvent`]s and
//! handed back with [`DeckEngine::on_stream_resolved`], and every timer
//! (fade ramp, preload delay, failure skip) is advanced by [`DeckEngine::tick`]
//! with an explicit `Instant`, so the whole state machine runs on whatever
//! thread owns it.
//!
//! Outside of a fade exactly one deck is audible.

use super::engine::MediaEngine;
use crate::constants::{
    CROSSFADE_INTERVAL_MILLIS, LOAD_FAILURE_SKIP_MILLIS, MAX_CROSSFADE_SECS,
    PLAYBACK_ERROR_SKIP_MILLIS, PRELOAD_DELAY_MILLIS, SEEK_RATE_LIMIT_MILLIS, SEEK_THRESHOLD_SECS,
};
use crate::models::RepeatMode;
use std::time::{Duration, Instant};

/// How often the owner should call [`DeckEngine::tick`]
pub const TICK_INTERVAL: Duration = Duration::from_millis(CROSSFADE_INTERVAL_MILLIS);

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Error(String),
}

/// Why a stream URL was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvePurpose {
    Load,
    Preload,
}

/// A track as the engine sees it: an id to resolve and the duration the
/// catalogue reports. The hint wins over the decoder's figure, which for
/// MP3 is only a bitrate estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRef {
    pub id: String,
    pub duration_hint: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Position of the active deck in seconds
    TimeUpdate(f64),
    /// Duration of the active track in seconds, once per load
    Duration(f64),
    /// The queue should move to its next track
    Advance,
    /// The active deck refused to start; the player is no longer playing
    PlaybackFailed(String),
    RequestStreamUrl {
        track_id: String,
        purpose: ResolvePurpose,
    },
    LoadStateChanged(LoadState),
}

struct Fade {
    started: Instant,
    length: Duration,
    /// Set while playback is paused mid-fade
    frozen_progress: Option<f64>,
}

struct PreparedStream {
    track: TrackRef,
    url: String,
}

fn ease_out_quad(t: f64) -> f64 {
    t * (2.0 - t)
}

pub struct DeckEngine<D: MediaEngine> {
    decks: [D; 2],
    active: usize,
    fade: Option<Fade>,
    load_state: LoadState,
    current: Option<TrackRef>,
    next_stream: Option<PreparedStream>,
    pending_preload: Option<(Instant, TrackRef)>,
    preload_in_flight: Option<TrackRef>,
    pending_skip: Option<Instant>,
    crossfaded_into: Option<String>,
    volume: f32,
    crossfade_secs: u32,
    repeat_mode: RepeatMode,
    playing: bool,
    last_seek: Option<Instant>,
    duration_reported: bool,
    ended: bool,
    events: Vec<EngineEvent>,
}

impl<D: MediaEngine> DeckEngine<D> {
    pub fn new(first: D, second: D, volume: f32, crossfade_secs: u32) -> Self {
        Self {
            decks: [first, second],
            active: 0,
            fade: None,
            load_state: LoadState::Idle,
            current: None,
            next_stream: None,
            pending_preload: None,
            preload_in_flight: None,
            pending_skip: None,
            crossfaded_into: None,
            volume: volume.clamp(0.0, 1.0),
            crossfade_secs: crossfade_secs.min(MAX_CROSSFADE_SECS),
            repeat_mode: RepeatMode::Off,
            playing: false,
            last_seek: None,
            duration_reported: false,
            ended: false,
            events: Vec::new(),
        }
    }

    /// Events produced since the last call
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn deck(&self, index: usize) -> &D {
        &self.decks[index % 2]
    }

    pub fn current_track_id(&self) -> Option<&str> {
        self.current.as_ref().map(|t| t.id.as_str())
    }

    fn standby(&self) -> usize {
        1 - self.active
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Make `track` the current track
    pub fn load_track(&mut self, track: TrackRef) {
        self.pending_skip = None;

        if self.crossfaded_into.take().as_deref() == Some(track.id.as_str()) {
            log::debug!("[DeckEngine] Track {} is already playing after crossfade", track.id);
            self.current = Some(track);
            self.set_load_state(LoadState::Ready);
            return;
        }

        if self.fade.is_some() {
            log::info!("[DeckEngine] Track change during crossfade, cancelling fade");
            self.cancel_fade();
        }

        let standby = self.standby();
        let preloaded = self
            .next_stream
            .as_ref()
            .filter(|next| next.track.id == track.id)
            .map(|next| next.url.clone());
        if let Some(url) = preloaded {
            if self.decks[standby].loaded_source() == Some(url.as_str()) {
                log::info!("[DeckEngine] Using preloaded stream for track {}", track.id);
                self.next_stream = None;
                self.current = Some(track);
                self.switch_to(standby);
                self.reset_track_flags();
                self.set_load_state(LoadState::Ready);
                self.sync_active();
                return;
            }
        }

        log::info!("[DeckEngine] Loading track {}", track.id);
        let track_id = track.id.clone();
        self.current = Some(track);
        self.set_load_state(LoadState::Loading);
        self.events.push(EngineEvent::RequestStreamUrl {
            track_id,
            purpose: ResolvePurpose::Load,
        });
    }

    /// Feed back the result of a [`EngineEvent::RequestStreamUrl`]
    pub fn on_stream_resolved(
        &mut self,
        track_id: &str,
        purpose: ResolvePurpose,
        result: Result<String, String>,
        now: Instant,
    ) {
        match purpose {
            ResolvePurpose::Load => self.finish_load(track_id, result, now),
            ResolvePurpose::Preload => self.finish_preload(track_id, result),
        }
    }

    fn finish_load(&mut self, track_id: &str, result: Result<String, String>, now: Instant) {
        if self.current_track_id() != Some(track_id) || self.load_state != LoadState::Loading {
            log::debug!("[DeckEngine] Ignoring stale stream URL for track {}", track_id);
            return;
        }

        let url = match result {
            Ok(url) => url,
            Err(e) => {
                self.fail_load(&e, now);
                return;
            }
        };

        let target = self.standby();
        if let Err(e) = self.decks[target].load(&url) {
            self.fail_load(&e.to_string(), now);
            return;
        }
        self.switch_to(target);
        self.reset_track_flags();
        self.set_load_state(LoadState::Ready);
        self.sync_active();
    }

    fn fail_load(&mut self, reason: &str, now: Instant) {
        log::error!("[DeckEngine] Failed to load track: {}", reason);
        self.set_load_state(LoadState::Error("Failed to load track".to_string()));
        self.pending_skip = Some(now + Duration::from_millis(LOAD_FAILURE_SKIP_MILLIS));
    }

    /// Prepare `next` so it can be crossfaded into; `None` forgets any
    /// prepared track
    pub fn schedule_preload(&mut self, next: Option<TrackRef>, now: Instant) {
        self.pending_preload = None;
        self.preload_in_flight = None;

        let Some(track) = next else {
            self.next_stream = None;
            return;
        };

        let already_prepared = self
            .next_stream
            .as_ref()
            .is_some_and(|prepared| prepared.track.id == track.id);
        if already_prepared {
            self.load_standby_for_crossfade();
            return;
        }

        self.next_stream = None;
        self.pending_preload = Some((now + Duration::from_millis(PRELOAD_DELAY_MILLIS), track));
    }

    fn finish_preload(&mut self, track_id: &str, result: Result<String, String>) {
        let expected = self
            .preload_in_flight
            .as_ref()
            .is_some_and(|t| t.id == track_id);
        if !expected {
            log::debug!("[DeckEngine] Ignoring stale preload for track {}", track_id);
            return;
        }
        let Some(track) = self.preload_in_flight.take() else {
            return;
        };

        match result {
            Ok(url) => {
                log::info!("[DeckEngine] Preloaded next track {}", track.id);
                self.next_stream = Some(PreparedStream { track, url });
                self.load_standby_for_crossfade();
            }
            Err(e) => {
                log::error!("[DeckEngine] Failed to preload next track: {}", e);
                self.next_stream = None;
            }
        }
    }

    /// Put the prepared stream on the standby deck (paused) when crossfading
    /// is enabled
    fn load_standby_for_crossfade(&mut self) {
        if self.crossfade_secs == 0 || self.fade.is_some() {
            return;
        }
        let Some(url) = self.next_stream.as_ref().map(|n| n.url.clone()) else {
            return;
        };
        let standby = self.standby();
        if self.decks[standby].loaded_source() == Some(url.as_str()) {
            return;
        }
        if let Err(e) = self.decks[standby].load(&url) {
            log::warn!("[DeckEngine] Standby deck could not load next track: {}", e);
        }
    }

    // ------------------------------------------------------------------
    // Timer
    // ------------------------------------------------------------------

    /// Advance fades and timers; call every [`TICK_INTERVAL`]
    pub fn tick(&mut self, now: Instant) {
        self.step_fade(now);

        let preload_due = matches!(&self.pending_preload, Some((due, _)) if now >= *due);
        if preload_due {
            if let Some((_, track)) = self.pending_preload.take() {
                self.events.push(EngineEvent::RequestStreamUrl {
                    track_id: track.id.clone(),
                    purpose: ResolvePurpose::Preload,
                });
                self.preload_in_flight = Some(track);
            }
        }

        if self.pending_skip.is_some_and(|due| now >= due) {
            self.pending_skip = None;
            log::info!("[DeckEngine] Skipping to next track after failure");
            self.events.push(EngineEvent::Advance);
        }

        self.check_deck_errors(now);

        if self.load_state == LoadState::Ready {
            self.report_progress(now);
        }
    }

    fn step_fade(&mut self, now: Instant) {
        let Some(fade) = &self.fade else {
            return;
        };
        if fade.frozen_progress.is_some() {
            return;
        }

        let elapsed = now.saturating_duration_since(fade.started).as_secs_f64();
        let progress = (elapsed / fade.length.as_secs_f64()).min(1.0);
        let eased = ease_out_quad(progress) as f32;

        let (active, standby) = (self.active, self.standby());
        self.decks[active].set_volume(self.volume * (1.0 - eased));
        self.decks[standby].set_volume(self.volume * eased);

        if progress >= 1.0 {
            self.complete_fade();
        }
    }

    fn start_crossfade(&mut self, now: Instant) {
        let Some(url) = self.next_stream.as_ref().map(|n| n.url.clone()) else {
            return;
        };
        let standby = self.standby();

        if self.decks[standby].loaded_source() != Some(url.as_str()) {
            if let Err(e) = self.decks[standby].load(&url) {
                log::error!("[DeckEngine] Cannot start crossfade: {}", e);
                self.next_stream = None;
                return;
            }
        }
        self.decks[standby].set_volume(0.0);
        if let Err(e) = self.decks[standby].play() {
            log::error!("[DeckEngine] Cannot start crossfade: {}", e);
            return;
        }

        log::info!("[DeckEngine] Starting crossfade ({}s)", self.crossfade_secs);
        self.fade = Some(Fade {
            started: now,
            length: Duration::from_secs(self.crossfade_secs as u64),
            frozen_progress: None,
        });
    }

    fn complete_fade(&mut self) {
        self.fade = None;
        let incoming = self.standby();
        self.switch_to(incoming);

        if let Some(next) = self.next_stream.take() {
            self.crossfaded_into = Some(next.track.id.clone());
            self.current = Some(next.track);
        }
        self.reset_track_flags();
        self.sync_active();

        log::info!("[DeckEngine] Crossfade complete, now on deck {}", self.active);
        self.events.push(EngineEvent::Advance);
    }

    /// Abort a fade: the incoming deck is dropped and the outgoing one
    /// returns to full volume
    fn cancel_fade(&mut self) {
        if self.fade.take().is_none() {
            return;
        }
        let standby = self.standby();
        self.decks[standby].stop();
        self.next_stream = None;
        let volume = self.volume;
        self.decks[self.active].set_volume(volume);
    }

    fn check_deck_errors(&mut self, now: Instant) {
        let active = self.active;
        if let Some(e) = self.decks[active].take_error() {
            log::error!("[DeckEngine] Playback error: {}", e);
            self.set_load_state(LoadState::Error("Playback error occurred".to_string()));
            self.pending_skip = Some(now + Duration::from_millis(PLAYBACK_ERROR_SKIP_MILLIS));
        }

        let standby = self.standby();
        if let Some(e) = self.decks[standby].take_error() {
            log::warn!("[DeckEngine] Standby deck failed, dropping prepared track: {}", e);
            self.cancel_fade();
            self.decks[standby].stop();
            self.next_stream = None;
        }
    }

    fn report_progress(&mut self, now: Instant) {
        let deck = &self.decks[self.active];
        if deck.loaded_source().is_none() {
            return;
        }

        let position = deck.position().as_secs_f64();
        self.events.push(EngineEvent::TimeUpdate(position));

        let duration = self.active_duration();
        if !self.duration_reported {
            if let Some(duration) = duration {
                self.events.push(EngineEvent::Duration(duration));
                self.duration_reported = true;
            }
        }

        if self.fade.is_some() {
            return;
        }

        if self.should_crossfade(position, duration) {
            self.start_crossfade(now);
            return;
        }

        if self.decks[self.active].is_finished() && !self.ended {
            self.ended = true;
            if self.repeat_mode == RepeatMode::Track {
                log::debug!("[DeckEngine] Repeating track");
                self.ended = false;
                let deck = &mut self.decks[self.active];
                if let Err(e) = deck.seek(Duration::ZERO).and_then(|_| deck.play()) {
                    log::error!("[DeckEngine] Failed to restart track: {}", e);
                }
            } else {
                log::debug!("[DeckEngine] Track ended");
                self.events.push(EngineEvent::Advance);
            }
        }
    }

    fn active_duration(&self) -> Option<f64> {
        self.current
            .as_ref()
            .and_then(|t| t.duration_hint)
            .filter(|d| *d > 0.0)
            .or_else(|| {
                self.decks[self.active]
                    .duration()
                    .map(|d| d.as_secs_f64())
                    .filter(|d| *d > 0.0)
            })
    }

    fn should_crossfade(&self, position: f64, duration: Option<f64>) -> bool {
        let deck = &self.decks[self.active];
        self.crossfade_secs > 0
            && self.repeat_mode != RepeatMode::Track
            && self.playing
            && !deck.is_paused()
            && self.next_stream.is_some()
            && duration.is_some_and(|d| position > d - self.crossfade_secs as f64)
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    pub fn set_playing(&mut self, playing: bool, now: Instant) {
        self.playing = playing;

        if self.fade.is_some() {
            self.set_fade_running(playing, now);
            return;
        }
        if playing {
            self.rewind_if_finished();
        }
        self.sync_active();
    }

    /// Playing again after the track ran out starts it over
    fn rewind_if_finished(&mut self) {
        if self.load_state != LoadState::Ready {
            return;
        }
        let deck = &mut self.decks[self.active];
        if deck.loaded_source().is_none() || !deck.is_finished() {
            return;
        }
        match deck.seek(Duration::ZERO) {
            Ok(()) => {
                log::debug!("[DeckEngine] Restarting finished track");
                self.ended = false;
                self.last_seek = None;
            }
            Err(e) => log::warn!("[DeckEngine] Failed to restart finished track: {}", e),
        }
    }

    /// Pausing mid-fade freezes the ramp; resuming continues it
    fn set_fade_running(&mut self, running: bool, now: Instant) {
        let Some(fade) = self.fade.as_mut() else {
            return;
        };

        if running {
            if let Some(progress) = fade.frozen_progress.take() {
                let done = fade.length.mul_f64(progress);
                fade.started = now.checked_sub(done).unwrap_or(now);
            }
            for deck in self.decks.iter_mut() {
                if let Err(e) = deck.play() {
                    log::warn!("[DeckEngine] Failed to resume deck during fade: {}", e);
                }
            }
        } else {
            if fade.frozen_progress.is_none() {
                let elapsed = now.saturating_duration_since(fade.started).as_secs_f64();
                fade.frozen_progress = Some((elapsed / fade.length.as_secs_f64()).min(1.0));
            }
            for deck in self.decks.iter_mut() {
                deck.pause();
            }
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if self.fade.is_none() {
            self.sync_active();
        }
    }

    /// Seek the active deck, ignoring requests close to the current position
    /// and requests arriving faster than the rate limit
    pub fn seek(&mut self, position: f64, now: Instant) {
        if self.load_state == LoadState::Loading || self.fade.is_some() {
            return;
        }
        let rate_limited = self.last_seek.is_some_and(|last| {
            now.saturating_duration_since(last) <= Duration::from_millis(SEEK_RATE_LIMIT_MILLIS)
        });

        let deck = &mut self.decks[self.active];
        if deck.loaded_source().is_none() {
            return;
        }
        let current = deck.position().as_secs_f64();
        if (current - position).abs() <= SEEK_THRESHOLD_SECS || rate_limited {
            return;
        }

        match deck.seek(Duration::from_secs_f64(position.max(0.0))) {
            Ok(()) => {
                log::debug!("[DeckEngine] Seeked to {:.1}s", position);
                self.last_seek = Some(now);
                self.ended = false;
            }
            Err(e) => log::warn!("[DeckEngine] Seek failed: {}", e),
        }
    }

    pub fn set_crossfade(&mut self, secs: u32) {
        self.crossfade_secs = secs.min(MAX_CROSSFADE_SECS);
        self.load_standby_for_crossfade();
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
    }

    /// Stop everything and forget all pending work
    pub fn shutdown(&mut self) {
        log::info!("[DeckEngine] Shutting down");
        self.fade = None;
        self.pending_preload = None;
        self.preload_in_flight = None;
        self.pending_skip = None;
        self.next_stream = None;
        self.crossfaded_into = None;
        for deck in self.decks.iter_mut() {
            deck.stop();
        }
        self.playing = false;
        self.set_load_state(LoadState::Idle);
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Bring the active deck in line with the desired volume and play state
    fn sync_active(&mut self) {
        if self.load_state == LoadState::Loading || self.fade.is_some() {
            return;
        }
        let playing = self.playing;
        let volume = self.volume;
        let deck = &mut self.decks[self.active];
        if deck.loaded_source().is_none() {
            return;
        }

        deck.set_volume(volume);
        if playing && deck.is_paused() {
            if let Err(e) = deck.play() {
                log::error!("[DeckEngine] Playback failed: {}", e);
                self.playing = false;
                self.events.push(EngineEvent::PlaybackFailed(e.to_string()));
            }
        } else if !playing && !deck.is_paused() {
            deck.pause();
        }
    }

    /// Make `target` the active deck, stopping the one it replaces
    fn switch_to(&mut self, target: usize) {
        if target != self.active {
            self.decks[self.active].stop();
            self.active = target;
        }
    }

    fn reset_track_flags(&mut self) {
        self.duration_reported = false;
        self.ended = false;
        self.last_seek = None;
    }

    fn set_load_state(&mut self, state: LoadState) {
        if self.load_state != state {
            self.load_state = state.clone();
            self.events.push(EngineEvent::LoadStateChanged(state));
        }
    }

    #[cfg(test)]
    fn deck_mut(&mut self, index: usize) -> &mut D {
        &mut self.decks[index % 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::PlaybackError;
    use approx::assert_relative_eq;

    struct FakeDeck {
        source: Option<String>,
        paused: bool,
        volume: f32,
        position: Duration,
        duration: Option<Duration>,
        finished: bool,
        error: Option<PlaybackError>,
        fail_play: bool,
        stops: usize,
        seeks: Vec<Duration>,
    }

    impl FakeDeck {
        fn new() -> Self {
            Self {
                source: None,
                paused: true,
                volume: 1.0,
                position: Duration::ZERO,
                duration: None,
                finished: false,
                error: None,
                fail_play: false,
                stops: 0,
                seeks: Vec::new(),
            }
        }
    }

    impl MediaEngine for FakeDeck {
        fn load(&mut self, url: &str) -> Result<(), PlaybackError> {
            self.source = Some(url.to_string());
            self.paused = true;
            self.position = Duration::ZERO;
            self.duration = Some(Duration::from_secs(200));
            self.finished = false;
            Ok(())
        }

        fn play(&mut self) -> Result<(), PlaybackError> {
            if self.fail_play {
                return Err(PlaybackError::Stream("blocked".to_string()));
            }
            if self.source.is_none() {
                return Err(PlaybackError::NothingLoaded);
            }
            self.paused = false;
            Ok(())
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn stop(&mut self) {
            self.source = None;
            self.paused = true;
            self.position = Duration::ZERO;
            self.duration = None;
            self.stops += 1;
        }

        fn seek(&mut self, position: Duration) -> Result<(), PlaybackError> {
            self.position = position;
            self.finished = false;
            self.seeks.push(position);
            Ok(())
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume;
        }

        fn volume(&self) -> f32 {
            self.volume
        }

        fn is_paused(&self) -> bool {
            self.paused
        }

        fn is_finished(&self) -> bool {
            self.finished
        }

        fn take_error(&mut self) -> Option<PlaybackError> {
            self.error.take()
        }

        fn position(&self) -> Duration {
            self.position
        }

        fn duration(&self) -> Option<Duration> {
            self.duration
        }

        fn loaded_source(&self) -> Option<&str> {
            self.source.as_deref()
        }
    }

    fn track(id: &str) -> TrackRef {
        TrackRef {
            id: id.to_string(),
            duration_hint: None,
        }
    }

    fn engine() -> DeckEngine<FakeDeck> {
        DeckEngine::new(FakeDeck::new(), FakeDeck::new(), 0.8, 3)
    }

    fn playing_engine(id: &str, now: Instant) -> DeckEngine<FakeDeck> {
        let mut engine = engine();
        engine.set_playing(true, now);
        engine.load_track(track(id));
        engine.on_stream_resolved(id, ResolvePurpose::Load, Ok(format!("http://cdn/{}", id)), now);
        engine.drain_events();
        engine
    }

    /// Engine playing "a" on deck 1 with "b" preloaded on deck 0
    fn preloaded_engine(now: Instant) -> DeckEngine<FakeDeck> {
        let mut engine = playing_engine("a", now);
        engine.schedule_preload(Some(track("b")), now);
        engine.tick(now + Duration::from_millis(PRELOAD_DELAY_MILLIS));
        engine.on_stream_resolved(
            "b",
            ResolvePurpose::Preload,
            Ok("http://cdn/b".to_string()),
            now,
        );
        engine.drain_events();
        engine
    }

    #[test]
    fn load_requests_url_then_activates_standby() {
        let now = Instant::now();
        let mut engine = engine();
        engine.set_playing(true, now);
        engine.load_track(track("a"));

        assert_eq!(engine.load_state(), &LoadState::Loading);
        let events = engine.drain_events();
        assert!(events.contains(&EngineEvent::RequestStreamUrl {
            track_id: "a".to_string(),
            purpose: ResolvePurpose::Load,
        }));
        assert!(events.contains(&EngineEvent::LoadStateChanged(LoadState::Loading)));

        engine.on_stream_resolved("a", ResolvePurpose::Load, Ok("http://cdn/a".into()), now);
        assert_eq!(engine.load_state(), &LoadState::Ready);
        assert_eq!(engine.active_index(), 1);
        let deck = engine.deck(1);
        assert_eq!(deck.loaded_source(), Some("http://cdn/a"));
        assert!(!deck.is_paused());
        assert_relative_eq!(deck.volume(), 0.8);
    }

    #[test]
    fn manual_track_change_stops_previous_deck() {
        let now = Instant::now();
        let mut engine = playing_engine("a", now);
        let stops_before = engine.deck(1).stops;

        engine.load_track(track("b"));
        engine.on_stream_resolved("b", ResolvePurpose::Load, Ok("http://cdn/b".into()), now);

        assert_eq!(engine.active_index(), 0);
        assert_eq!(engine.deck(0).loaded_source(), Some("http://cdn/b"));
        assert_eq!(engine.deck(1).loaded_source(), None);
        assert_eq!(engine.deck(1).stops, stops_before + 1);
    }

    #[test]
    fn stale_resolution_is_ignored() {
        let now = Instant::now();
        let mut engine = engine();
        engine.load_track(track("a"));
        engine.load_track(track("b"));
        engine.on_stream_resolved("a", ResolvePurpose::Load, Ok("http://cdn/a".into()), now);

        assert_eq!(engine.load_state(), &LoadState::Loading);
        assert_eq!(engine.deck(0).loaded_source(), None);
        assert_eq!(engine.deck(1).loaded_source(), None);
    }

    #[test]
    fn load_failure_skips_after_two_seconds() {
        let now = Instant::now();
        let mut engine = engine();
        engine.load_track(track("a"));
        engine.on_stream_resolved("a", ResolvePurpose::Load, Err("404".into()), now);

        assert_eq!(
            engine.load_state(),
            &LoadState::Error("Failed to load track".to_string())
        );
        engine.drain_events();

        engine.tick(now + Duration::from_millis(1900));
        assert!(!engine.drain_events().contains(&EngineEvent::Advance));

        engine.tick(now + Duration::from_millis(2000));
        assert!(engine.drain_events().contains(&EngineEvent::Advance));
    }

    #[test]
    fn loading_another_track_cancels_pending_skip() {
        let now = Instant::now();
        let mut engine = engine();
        engine.load_track(track("a"));
        engine.on_stream_resolved("a", ResolvePurpose::Load, Err("404".into()), now);
        engine.load_track(track("b"));
        engine.drain_events();

        engine.tick(now + Duration::from_secs(3));
        assert!(!engine.drain_events().contains(&EngineEvent::Advance));
    }

    #[test]
    fn preload_waits_for_delay_and_fills_standby() {
        let now = Instant::now();
        let mut engine = playing_engine("a", now);
        engine.schedule_preload(Some(track("b")), now);

        engine.tick(now + Duration::from_millis(400));
        let early = engine.drain_events();
        assert!(!early
            .iter()
            .any(|e| matches!(e, EngineEvent::RequestStreamUrl { .. })));

        engine.tick(now + Duration::from_millis(500));
        assert!(engine.drain_events().contains(&EngineEvent::RequestStreamUrl {
            track_id: "b".to_string(),
            purpose: ResolvePurpose::Preload,
        }));

        engine.on_stream_resolved("b", ResolvePurpose::Preload, Ok("http://cdn/b".into()), now);
        let standby = engine.deck(0);
        assert_eq!(standby.loaded_source(), Some("http://cdn/b"));
        assert!(standby.is_paused());
    }

    #[test]
    fn preload_without_crossfade_leaves_standby_empty() {
        let now = Instant::now();
        let mut engine = playing_engine("a", now);
        engine.set_crossfade(0);
        engine.schedule_preload(Some(track("b")), now);
        engine.tick(now + Duration::from_millis(500));
        engine.on_stream_resolved("b", ResolvePurpose::Preload, Ok("http://cdn/b".into()), now);

        assert_eq!(engine.deck(0).loaded_source(), None);
    }

    #[test]
    fn next_track_reuses_preloaded_deck() {
        let now = Instant::now();
        let mut engine = preloaded_engine(now);

        engine.load_track(track("b"));
        let events = engine.drain_events();
        assert!(!events
            .iter()
            .any(|e| matches!(e, EngineEvent::RequestStreamUrl { .. })));
        assert_eq!(engine.active_index(), 0);
        assert!(!engine.deck(0).is_paused());
        assert_eq!(engine.deck(1).loaded_source(), None);
    }

    #[test]
    fn crossfade_ramps_volumes_and_advances() {
        let t0 = Instant::now();
        let mut engine = preloaded_engine(t0);
        engine.deck_mut(1).position = Duration::from_secs(198);

        engine.tick(t0);
        assert!(engine.is_fading());
        assert!(!engine.deck(0).is_paused());
        assert_relative_eq!(engine.deck(0).volume(), 0.0);

        engine.tick(t0 + Duration::from_millis(1500));
        // eased progress at the halfway point is 0.75
        assert_relative_eq!(engine.deck(1).volume(), 0.2, epsilon = 1e-5);
        assert_relative_eq!(engine.deck(0).volume(), 0.6, epsilon = 1e-5);
        assert!(!engine.drain_events().contains(&EngineEvent::Advance));

        engine.tick(t0 + Duration::from_secs(3));
        let events = engine.drain_events();
        assert!(events.contains(&EngineEvent::Advance));
        assert!(!engine.is_fading());
        assert_eq!(engine.active_index(), 0);
        assert_eq!(engine.deck(1).loaded_source(), None);
        assert_relative_eq!(engine.deck(0).volume(), 0.8);

        // The queue advancing onto the faded-in track must not reload it
        engine.load_track(track("b"));
        let events = engine.drain_events();
        assert!(!events
            .iter()
            .any(|e| matches!(e, EngineEvent::RequestStreamUrl { .. })));
        assert_eq!(engine.deck(0).loaded_source(), Some("http://cdn/b"));
        assert_eq!(engine.current_track_id(), Some("b"));
    }

    #[test]
    fn no_crossfade_before_window_or_without_next() {
        let t0 = Instant::now();
        let mut engine = preloaded_engine(t0);
        engine.deck_mut(1).position = Duration::from_secs(150);
        engine.tick(t0);
        assert!(!engine.is_fading());

        let mut engine = playing_engine("a", t0);
        engine.deck_mut(1).position = Duration::from_secs(199);
        engine.tick(t0);
        assert!(!engine.is_fading());
    }

    #[test]
    fn pause_freezes_fade_until_resume() {
        let t0 = Instant::now();
        let mut engine = preloaded_engine(t0);
        engine.deck_mut(1).position = Duration::from_secs(198);
        engine.tick(t0);

        engine.set_playing(false, t0 + Duration::from_secs(1));
        assert!(engine.deck(0).is_paused());
        assert!(engine.deck(1).is_paused());

        engine.tick(t0 + Duration::from_secs(10));
        assert!(engine.is_fading());
        assert!(!engine.drain_events().contains(&EngineEvent::Advance));

        engine.set_playing(true, t0 + Duration::from_secs(10));
        assert!(!engine.deck(0).is_paused());
        engine.tick(t0 + Duration::from_secs(12));
        assert!(engine.drain_events().contains(&EngineEvent::Advance));
    }

    #[test]
    fn track_end_repeats_or_advances_once() {
        let now = Instant::now();
        let mut engine = playing_engine("a", now);
        engine.set_repeat_mode(RepeatMode::Track);
        engine.deck_mut(1).finished = true;
        engine.tick(now);
        assert_eq!(engine.deck(1).seeks, vec![Duration::ZERO]);
        assert!(!engine.drain_events().contains(&EngineEvent::Advance));

        engine.set_repeat_mode(RepeatMode::Off);
        engine.deck_mut(1).finished = true;
        engine.tick(now);
        assert!(engine.drain_events().contains(&EngineEvent::Advance));
        engine.tick(now + TICK_INTERVAL);
        assert!(!engine.drain_events().contains(&EngineEvent::Advance));
    }

    #[test]
    fn play_after_queue_end_restarts_track() {
        let now = Instant::now();
        let mut engine = playing_engine("a", now);
        engine.deck_mut(1).position = Duration::from_secs(200);
        engine.deck_mut(1).finished = true;
        engine.tick(now);
        assert!(engine.drain_events().contains(&EngineEvent::Advance));

        // Nothing queued after "a": the app pauses, then the user hits play
        engine.set_playing(false, now);
        engine.set_playing(true, now + Duration::from_secs(5));

        let deck = engine.deck(1);
        assert_eq!(deck.seeks, vec![Duration::ZERO]);
        assert!(!deck.is_finished());
        assert!(!deck.is_paused());

        // The restarted track can end (and advance) again
        engine.deck_mut(1).finished = true;
        engine.tick(now + Duration::from_secs(6));
        assert!(engine.drain_events().contains(&EngineEvent::Advance));
    }

    #[test]
    fn resuming_a_running_track_does_not_rewind() {
        let now = Instant::now();
        let mut engine = playing_engine("a", now);
        engine.deck_mut(1).position = Duration::from_secs(42);
        engine.set_playing(false, now);
        engine.set_playing(true, now);

        assert!(engine.deck(1).seeks.is_empty());
        assert_eq!(engine.deck(1).position(), Duration::from_secs(42));
    }

    #[test]
    fn seek_respects_threshold_and_rate_limit() {
        let t0 = Instant::now();
        let mut engine = playing_engine("a", t0);
        engine.deck_mut(1).position = Duration::from_secs(10);

        engine.seek(11.0, t0);
        assert!(engine.deck(1).seeks.is_empty());

        engine.seek(30.0, t0);
        assert_eq!(engine.deck(1).seeks, vec![Duration::from_secs(30)]);

        engine.seek(60.0, t0 + Duration::from_millis(100));
        assert_eq!(engine.deck(1).seeks.len(), 1);

        engine.seek(60.0, t0 + Duration::from_millis(300));
        assert_eq!(engine.deck(1).seeks.len(), 2);
    }

    #[test]
    fn refused_playback_clears_playing() {
        let now = Instant::now();
        let mut engine = engine();
        engine.deck_mut(1).fail_play = true;
        engine.set_playing(true, now);
        engine.load_track(track("a"));
        engine.on_stream_resolved("a", ResolvePurpose::Load, Ok("http://cdn/a".into()), now);

        assert!(!engine.is_playing());
        assert!(engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, EngineEvent::PlaybackFailed(_))));
    }

    #[test]
    fn deck_error_skips_after_one_second() {
        let now = Instant::now();
        let mut engine = playing_engine("a", now);
        engine.deck_mut(1).error = Some(PlaybackError::Stream("connection reset".into()));

        engine.tick(now);
        assert_eq!(
            engine.load_state(),
            &LoadState::Error("Playback error occurred".to_string())
        );
        engine.drain_events();

        engine.tick(now + Duration::from_millis(1000));
        assert!(engine.drain_events().contains(&EngineEvent::Advance));
    }

    #[test]
    fn progress_reports_time_and_duration_once() {
        let now = Instant::now();
        let mut engine = playing_engine("a", now);
        engine.deck_mut(1).position = Duration::from_secs(5);

        engine.tick(now);
        let events = engine.drain_events();
        assert!(events.contains(&EngineEvent::TimeUpdate(5.0)));
        assert!(events.contains(&EngineEvent::Duration(200.0)));

        engine.tick(now + TICK_INTERVAL);
        assert!(!engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, EngineEvent::Duration(_))));
    }

    #[test]
    fn catalogue_duration_beats_decoder_estimate() {
        let now = Instant::now();
        let mut engine = engine();
        engine.set_playing(true, now);
        engine.load_track(TrackRef {
            id: "a".to_string(),
            duration_hint: Some(180.0),
        });
        engine.on_stream_resolved("a", ResolvePurpose::Load, Ok("http://cdn/a".into()), now);
        engine.schedule_preload(Some(track("b")), now);
        engine.tick(now + Duration::from_millis(PRELOAD_DELAY_MILLIS));
        engine.on_stream_resolved("b", ResolvePurpose::Preload, Ok("http://cdn/b".into()), now);
        assert!(engine.drain_events().contains(&EngineEvent::Duration(180.0)));

        // The decoder guesses 200s; the crossfade window follows the 180s hint
        engine.deck_mut(1).position = Duration::from_secs(178);
        engine.tick(now + Duration::from_secs(1));
        assert!(engine.is_fading());
    }

    #[test]
    fn manual_load_during_fade_cancels_it() {
        let t0 = Instant::now();
        let mut engine = preloaded_engine(t0);
        engine.deck_mut(1).position = Duration::from_secs(198);
        engine.tick(t0);
        engine.tick(t0 + Duration::from_millis(1500));
        assert!(engine.is_fading());

        engine.load_track(track("c"));
        assert!(!engine.is_fading());
        assert_eq!(engine.deck(0).loaded_source(), None);
        assert_relative_eq!(engine.deck(1).volume(), 0.8);
        assert!(engine.drain_events().contains(&EngineEvent::RequestStreamUrl {
            track_id: "c".to_string(),
            purpose: ResolvePurpose::Load,
        }));

        engine.on_stream_resolved("c", ResolvePurpose::Load, Ok("http://cdn/c".into()), t0);
        assert_eq!(engine.active_index(), 0);
        assert_eq!(engine.deck(0).loaded_source(), Some("http://cdn/c"));
        assert_eq!(engine.deck(1).loaded_source(), None);
    }

    #[test]
    fn repeat_track_never_crossfades() {
        let t0 = Instant::now();
        let mut engine = preloaded_engine(t0);
        engine.set_repeat_mode(RepeatMode::Track);
        engine.deck_mut(1).position = Duration::from_secs(199);

        engine.tick(t0);
        assert!(!engine.is_fading());
        assert!(engine.deck(0).is_paused());
    }

    #[test]
    fn standby_error_cancels_fade() {
        let t0 = Instant::now();
        let mut engine = preloaded_engine(t0);
        engine.deck_mut(1).position = Duration::from_secs(198);
        engine.tick(t0);
        assert!(engine.is_fading());

        engine.deck_mut(0).error = Some(PlaybackError::Stream("cdn timeout".into()));
        engine.tick(t0 + Duration::from_millis(500));

        assert!(!engine.is_fading());
        assert_eq!(engine.active_index(), 1);
        assert_eq!(engine.deck(0).loaded_source(), None);
        assert_relative_eq!(engine.deck(1).volume(), 0.8);
        assert_eq!(engine.load_state(), &LoadState::Ready);
        assert!(!engine.drain_events().contains(&EngineEvent::Advance));
    }

    #[test]
    fn matching_preload_is_kept() {
        let t0 = Instant::now();
        let mut engine = preloaded_engine(t0);

        engine.schedule_preload(Some(track("b")), t0);
        engine.tick(t0 + Duration::from_millis(PRELOAD_DELAY_MILLIS));

        assert!(!engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, EngineEvent::RequestStreamUrl { .. })));
        assert_eq!(engine.deck(0).loaded_source(), Some("http://cdn/b"));
    }

    #[test]
    fn shutdown_stops_both_decks() {
        let now = Instant::now();
        let mut engine = preloaded_engine(now);
        engine.shutdown();

        assert_eq!(engine.load_state(), &LoadState::Idle);
        assert_eq!(engine.deck(0).loaded_source(), None);
        assert_eq!(engine.deck(1).loaded_source(), None);
    }
}
