pub mod playback;
pub mod player_app;
pub mod queue;

pub use player_app::MusicPlayerApp;
