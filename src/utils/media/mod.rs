pub mod buffer;
pub mod core;
pub mod deck_engine;
pub mod decode;
pub mod engine;

pub use deck_engine::{DeckEngine, EngineEvent, LoadState, ResolvePurpose, TrackRef};
pub use engine::MediaEngine;
