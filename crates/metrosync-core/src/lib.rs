//! metrosync Core - Tempo model and beat-cursor primitives
//!
//! This crate contains the pure, synchronous parts of the metronome:
//! - Tempo model with clamped mutators and subdivision presets
//! - Playback-rate calculation
//! - Beat cursor
//! - Error types
//! - Configuration and logging settings
//!
//! Everything that talks to an audio player lives in `metrosync-control`.

#![warn(missing_docs)]

pub mod config;
pub mod cursor;
pub mod error;
pub mod logging;
pub mod rate;
pub mod tempo;

pub use config::{MetronomeConfig, TempoChangePolicy, TrackConfig, TICK_TRACK_ID};
pub use cursor::{BeatCursor, INACTIVE};
pub use error::{MetronomeError, Result};
pub use logging::LogConfig;
pub use rate::compute_rate;
pub use tempo::{
    SubdivisionPreset, TempoSetting, DEFAULT_BPM, MAX_BPM, MAX_SUBDIVISIONS, MIN_BPM,
    MIN_SUBDIVISIONS,
};
