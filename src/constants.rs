//! Application constants and configuration values

// === UI & Layout ===
pub const SEARCH_DEBOUNCE_MILLIS: u64 = 500;
pub const SIDEBAR_WIDTH: f32 = 240.0;
pub const PLAYER_BAR_HEIGHT: f32 = 90.0;

// Frame rate settings (performance optimization based on renderer)
pub const REPAINT_INTERVAL_GPU_MICROS: u64 = 16666;  // 60 FPS - GPU renderer
pub const REPAINT_INTERVAL_CPU_ACTIVE: u64 = 33333;  // 30 FPS (33ms per frame) - CPU mode when loading/playing
pub const REPAINT_INTERVAL_CPU_IDLE: u64 = 100000;   // 10 FPS - CPU mode when idle

// === Branding ===
pub const ACCENT_COLOR_RGB: (u8, u8, u8) = (29, 185, 84);

// === Audio Playback ===
pub const DEFAULT_VOLUME: f32 = 0.7;
pub const VOLUME_STEP: f32 = 0.1;
pub const SEEK_STEP_SECS: f64 = 10.0;

// === Crossfade Engine ===
pub const CROSSFADE_STEPS_PER_SECOND: u64 = 20;
pub const CROSSFADE_INTERVAL_MILLIS: u64 = 1000 / CROSSFADE_STEPS_PER_SECOND;
pub const SEEK_THRESHOLD_SECS: f64 = 1.5;
pub const SEEK_RATE_LIMIT_MILLIS: u64 = 250;
pub const PRELOAD_DELAY_MILLIS: u64 = 500;
pub const LOAD_FAILURE_SKIP_MILLIS: u64 = 2000;
pub const PLAYBACK_ERROR_SKIP_MILLIS: u64 = 1000;
pub const DEFAULT_CROSSFADE_SECS: u32 = 3;
pub const MAX_CROSSFADE_SECS: u32 = 12;

// === Streaming ===
pub const STREAM_STALL_TIMEOUT_SECS: u64 = 5;
pub const DECODE_CHUNK_SAMPLES: usize = 4096;

// === Library ===
pub const RECENTLY_PLAYED_LIMIT: usize = 50;
pub const MIXED_TRACKS_LIMIT: usize = 20;

// === API & Content ===
pub const SEARCH_LIMIT: u32 = 20;
pub const HTTP_TIMEOUT_SECS: u64 = 30;
pub const HTTP_MAX_ATTEMPTS: u32 = 3;

// === Storage keys ===
pub const STORE_KEY_SETTINGS: &str = "settings";
pub const STORE_KEY_PLAYLISTS: &str = "playlists";
pub const STORE_KEY_LIKED_TRACKS: &str = "likedTracks";
pub const STORE_KEY_RECENTLY_PLAYED: &str = "recentlyPlayed";
pub const STORE_KEY_TRENDING_CACHE: &str = "trendingTracksCache";
pub const STORE_KEY_VOLUME: &str = "volume";
