use crate::app::queue::PlaybackQueue;
use crate::utils::audio_controller::AudioController;
use crate::utils::media::LoadState;

pub struct AudioState {
    // Controllers
    pub audio_controller: AudioController,
    pub playback_queue: PlaybackQueue,

    // Engine status as last reported
    pub load_state: LoadState,

    // Volume
    pub volume: f32,
    pub muted: bool,
    pub volume_before_mute: f32,
}

impl AudioState {
    pub fn new(volume: f32, crossfade_secs: u32) -> Self {
        Self {
            audio_controller: AudioController::new(volume, crossfade_secs),
            playback_queue: PlaybackQueue::new(),
            load_state: LoadState::Idle,
            volume,
            muted: false,
            volume_before_mute: volume,
        }
    }

    /// Current playback position in seconds
    pub fn position(&self) -> f64 {
        self.audio_controller.position()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.load_state, LoadState::Loading)
    }

    pub fn load_error(&self) -> Option<&str> {
        match &self.load_state {
            LoadState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Volume actually sent to the engine
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.muted = false;
            self.volume = self.volume_before_mute;
        } else {
            self.volume_before_mute = self.volume;
            self.muted = true;
        }
        self.audio_controller.set_volume(self.effective_volume());
    }
}
