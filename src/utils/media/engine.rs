use crate::utils::errors::PlaybackError;
use std::time::Duration;

/// One playback handle ("deck"). The crossfade engine drives two of these.
pub trait MediaEngine {
    /// Replace the current source with `url`, paused at the start
    fn load(&mut self, url: &str) -> Result<(), PlaybackError>;
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    /// Stop and unload; the deck is idle afterwards
    fn stop(&mut self);
    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError>;
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;
    fn is_paused(&self) -> bool;
    /// True once a loaded source has played to its end
    fn is_finished(&self) -> bool;
    /// Asynchronous failure since the last call (download, decode)
    fn take_error(&mut self) -> Option<PlaybackError>;
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    /// URL of the loaded source, if any
    fn loaded_source(&self) -> Option<&str>;
}
