use crate::constants::{DEFAULT_CROSSFADE_SECS, MAX_CROSSFADE_SECS};
use serde::{Deserialize, Serialize};

/// User-facing playback settings (persisted under the `settings` key)
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Crossfade duration in seconds, 0 = off
    pub crossfade: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            crossfade: DEFAULT_CROSSFADE_SECS,
        }
    }
}

/// Partial update; `None` fields keep their current value
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsPatch {
    pub crossfade: Option<u32>,
}

impl Settings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(crossfade) = patch.crossfade {
            self.crossfade = crossfade.min(MAX_CROSSFADE_SECS);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Off,
    Track,
    Playlist,
}

impl RepeatMode {
    /// Off -> Playlist -> Track -> Off
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::Playlist,
            RepeatMode::Playlist => RepeatMode::Track,
            RepeatMode::Track => RepeatMode::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RepeatMode::Off => "Repeat off",
            RepeatMode::Track => "Repeat track",
            RepeatMode::Playlist => "Repeat playlist",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_settings_merge_over_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());

        let settings: Settings = serde_json::from_str(r#"{"crossfade":0}"#).unwrap();
        assert_eq!(settings.crossfade, 0);
    }

    #[test]
    fn patch_clamps_crossfade() {
        let mut settings = Settings::default();
        settings.apply(SettingsPatch { crossfade: Some(40) });
        assert_eq!(settings.crossfade, MAX_CROSSFADE_SECS);
        settings.apply(SettingsPatch::default());
        assert_eq!(settings.crossfade, MAX_CROSSFADE_SECS);
    }

    #[test]
    fn repeat_mode_serializes_lowercase_and_cycles() {
        assert_eq!(serde_json::to_string(&RepeatMode::Playlist).unwrap(), "\"playlist\"");
        assert_eq!(RepeatMode::Off.cycle(), RepeatMode::Playlist);
        assert_eq!(RepeatMode::Playlist.cycle(), RepeatMode::Track);
        assert_eq!(RepeatMode::Track.cycle(), RepeatMode::Off);
    }
}
