//! What the audio engine is told when the user picks a track or the queue moves

use crate::app::queue::{PlaybackQueue, QueueStep};
use crate::models::Track;
use crate::services::Library;
use crate::utils::audio_controller::AudioController;
use log::{debug, info, warn};

/// Commands the queue logic sends to whatever plays the audio
pub trait PlayerOutput {
    fn load_track(&self, track: &Track);
    fn set_playing(&self, playing: bool);
    /// `None` clears the prepared next track
    fn preload(&self, next: Option<&Track>);
}

impl PlayerOutput for AudioController {
    fn load_track(&self, track: &Track) {
        AudioController::load_track(self, track);
    }

    fn set_playing(&self, playing: bool) {
        AudioController::set_playing(self, playing);
    }

    fn preload(&self, next: Option<&Track>) {
        AudioController::preload(self, next);
    }
}

/// Queue, library and output borrowed together for one playback action.
/// Methods that start a track return it so the caller can refresh artwork.
pub struct Playback<'a, O: PlayerOutput> {
    pub queue: &'a mut PlaybackQueue,
    pub library: &'a mut Library,
    pub output: &'a O,
}

impl<O: PlayerOutput> Playback<'_, O> {
    /// Play `track` with `list` as the new queue. Picking the current track
    /// again toggles play/pause instead.
    pub fn play_from_list(&mut self, track: &Track, list: &[Track]) -> Option<Track> {
        if self.queue.current_track().is_some_and(|t| t.id == track.id) {
            self.toggle();
            return None;
        }

        info!("[Player] Playing {} from a list of {}", track.id, list.len());
        self.queue.set_queue(list.to_vec());
        self.queue.set_current_track(track.clone());
        self.queue.set_is_playing(true);
        self.start_current()
    }

    /// Send the queue's current track to the output
    pub fn start_current(&mut self) -> Option<Track> {
        let track = self.queue.current_track().cloned()?;
        self.queue.set_current_time(0.0);
        self.queue.set_duration(track.duration.max(0.0));

        self.output.load_track(&track);
        self.output.set_playing(true);
        self.library.add_recently_played(&track);
        self.schedule_preload();
        Some(track)
    }

    /// Tell the output which track comes next
    pub fn schedule_preload(&self) {
        let upcoming = self.queue.upcoming();
        debug!("[Player] Preload target: {:?}", upcoming.map(|t| t.id.as_str()));
        self.output.preload(upcoming);
    }

    pub fn next(&mut self) -> Option<Track> {
        let step = self.queue.next();
        self.apply(step)
    }

    pub fn previous(&mut self) -> Option<Track> {
        let step = self.queue.previous();
        self.apply(step)
    }

    fn apply(&mut self, step: QueueStep) -> Option<Track> {
        match step {
            QueueStep::Moved(_) => self.start_current(),
            QueueStep::Ended => {
                info!("[Player] Queue finished");
                self.output.set_playing(false);
                None
            }
            QueueStep::Unchanged => None,
        }
    }

    pub fn toggle(&mut self) {
        if self.queue.current_track().is_none() {
            warn!("[Player] Ignoring toggle - no track loaded");
            return;
        }
        self.queue.toggle_play_pause();
        self.output.set_playing(self.queue.is_playing());
    }
}
