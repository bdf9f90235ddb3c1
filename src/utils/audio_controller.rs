use crate::models::{RepeatMode, Track};
use crate::utils::error_handling::{load_f64_atomic, store_f64_atomic};
use crate::utils::media::deck_engine::TICK_INTERVAL;
use crate::utils::media::{DeckEngine, EngineEvent, ResolvePurpose, TrackRef};
use crate::utils::mediaplay::{open_output, AudioPlayer};
use std::sync::atomic::AtomicU64;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Instant;

pub enum AudioCommand {
    LoadTrack(TrackRef),
    Preload(Option<TrackRef>),
    Play,
    Pause,
    SetVolume(f32),
    Seek(f64),
    SetCrossfade(u32),
    SetRepeatMode(RepeatMode),
    Shutdown,
}

/// Stream URL lookup finished on a worker thread
struct ResolvedStream {
    track_id: String,
    purpose: ResolvePurpose,
    result: Result<String, String>,
}

impl From<&Track> for TrackRef {
    fn from(track: &Track) -> Self {
        TrackRef {
            id: track.id.clone(),
            duration_hint: (track.duration > 0.0).then_some(track.duration),
        }
    }
}

/// Handle to the audio thread. The thread owns the output device and the
/// dual-deck engine; the UI sends commands and drains events once per frame.
pub struct AudioController {
    command_tx: Sender<AudioCommand>,
    event_rx: Receiver<EngineEvent>,
    position: Arc<AtomicU64>,
}

impl AudioController {
    pub fn new(volume: f32, crossfade_secs: u32) -> Self {
        let (command_tx, command_rx) = channel::<AudioCommand>();
        let (event_tx, event_rx) = channel::<EngineEvent>();
        let position = Arc::new(AtomicU64::new(0));
        let position_clone = Arc::clone(&position);

        std::thread::spawn(move || {
            let (_stream, handle) = match open_output() {
                Ok(output) => output,
                Err(e) => {
                    log::error!("[AudioController] {}", e);
                    let _ = event_tx.send(EngineEvent::PlaybackFailed(e.to_string()));
                    return;
                }
            };

            let mut engine = DeckEngine::new(
                AudioPlayer::new(handle.clone()),
                AudioPlayer::new(handle),
                volume,
                crossfade_secs,
            );
            let (resolved_tx, resolved_rx) = channel::<ResolvedStream>();
            log::info!("[AudioController] Audio thread started");

            loop {
                // Handle commands
                loop {
                    match command_rx.try_recv() {
                        Ok(AudioCommand::Shutdown) | Err(TryRecvError::Disconnected) => {
                            engine.shutdown();
                            log::info!("[AudioController] Audio thread stopped");
                            return;
                        }
                        Ok(cmd) => handle_command(&mut engine, cmd),
                        Err(TryRecvError::Empty) => break,
                    }
                }

                while let Ok(resolved) = resolved_rx.try_recv() {
                    engine.on_stream_resolved(
                        &resolved.track_id,
                        resolved.purpose,
                        resolved.result,
                        Instant::now(),
                    );
                }

                engine.tick(Instant::now());

                for event in engine.drain_events() {
                    match event {
                        EngineEvent::RequestStreamUrl { track_id, purpose } => {
                            spawn_resolve(track_id, purpose, resolved_tx.clone());
                        }
                        EngineEvent::TimeUpdate(secs) => store_f64_atomic(&position_clone, secs),
                        other => {
                            if event_tx.send(other).is_err() {
                                engine.shutdown();
                                return;
                            }
                        }
                    }
                }

                std::thread::sleep(TICK_INTERVAL);
            }
        });

        Self {
            command_tx,
            event_rx,
            position,
        }
    }

    fn send(&self, command: AudioCommand) {
        if self.command_tx.send(command).is_err() {
            log::warn!("[AudioController] Audio thread is not running");
        }
    }

    pub fn load_track(&self, track: &Track) {
        store_f64_atomic(&self.position, 0.0);
        self.send(AudioCommand::LoadTrack(track.into()));
    }

    /// Prepare the track that will play next (`None` clears it)
    pub fn preload(&self, next: Option<&Track>) {
        self.send(AudioCommand::Preload(next.map(TrackRef::from)));
    }

    pub fn play(&self) {
        self.send(AudioCommand::Play);
    }

    pub fn pause(&self) {
        self.send(AudioCommand::Pause);
    }

    pub fn set_playing(&self, playing: bool) {
        if playing {
            self.play();
        } else {
            self.pause();
        }
    }

    pub fn set_volume(&self, volume: f32) {
        self.send(AudioCommand::SetVolume(volume));
    }

    pub fn seek(&self, position_secs: f64) {
        store_f64_atomic(&self.position, position_secs);
        self.send(AudioCommand::Seek(position_secs));
    }

    pub fn set_crossfade(&self, secs: u32) {
        self.send(AudioCommand::SetCrossfade(secs));
    }

    pub fn set_repeat_mode(&self, mode: RepeatMode) {
        self.send(AudioCommand::SetRepeatMode(mode));
    }

    pub fn shutdown(&self) {
        self.send(AudioCommand::Shutdown);
    }

    /// Playback position of the audible deck in seconds
    pub fn position(&self) -> f64 {
        load_f64_atomic(&self.position)
    }

    /// Engine events since the last poll
    pub fn poll_events(&self) -> Vec<EngineEvent> {
        self.event_rx.try_iter().collect()
    }
}

impl Drop for AudioController {
    fn drop(&mut self) {
        let _ = self.command_tx.send(AudioCommand::Shutdown);
    }
}

fn handle_command(engine: &mut DeckEngine<AudioPlayer>, command: AudioCommand) {
    let now = Instant::now();
    match command {
        AudioCommand::LoadTrack(track) => engine.load_track(track),
        AudioCommand::Preload(next) => engine.schedule_preload(next, now),
        AudioCommand::Play => engine.set_playing(true, now),
        AudioCommand::Pause => engine.set_playing(false, now),
        AudioCommand::SetVolume(volume) => engine.set_volume(volume),
        AudioCommand::Seek(secs) => engine.seek(secs, now),
        AudioCommand::SetCrossfade(secs) => engine.set_crossfade(secs),
        AudioCommand::SetRepeatMode(mode) => engine.set_repeat_mode(mode),
        AudioCommand::Shutdown => engine.shutdown(),
    }
}

/// Look up a stream URL without blocking the audio thread
fn spawn_resolve(track_id: String, purpose: ResolvePurpose, tx: Sender<ResolvedStream>) {
    std::thread::spawn(move || {
        let result = match crate::utils::error_handling::create_runtime() {
            Ok(rt) => rt
                .block_on(crate::api::get_stream_url(&track_id))
                .map_err(|e| e.to_string()),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            log::warn!("[AudioController] Stream URL lookup failed for {}: {}", track_id, e);
        }
        let _ = tx.send(ResolvedStream {
            track_id,
            purpose,
            result,
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_ref_carries_duration_hint() {
        let track = Track {
            id: "7".to_string(),
            duration: 215.0,
            ..Default::default()
        };
        assert_eq!(
            TrackRef::from(&track),
            TrackRef {
                id: "7".to_string(),
                duration_hint: Some(215.0),
            }
        );

        let unknown = Track {
            id: "8".to_string(),
            ..Default::default()
        };
        assert_eq!(TrackRef::from(&unknown).duration_hint, None);
    }
}
