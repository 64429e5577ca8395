//! Metronome configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file is a valid
//! configuration.

use crate::error::Result;
use crate::logging::LogConfig;
use crate::tempo::{SubdivisionPreset, TempoSetting, DEFAULT_BPM};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Id of the looping click track
pub const TICK_TRACK_ID: &str = "tick";

/// What happens to playback when the tempo changes while running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TempoChangePolicy {
    /// Stop, then start again with the new rate
    #[default]
    Restart,
    /// Stop and stay stopped
    Stop,
}

/// Click sample registered with the audio player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Track id; loop boundaries of this track re-trigger the click
    pub id: String,
    /// Sample location handed to the player
    pub source: PathBuf,
    /// Player loop count, `-1` for endless
    pub loop_count: i32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            id: TICK_TRACK_ID.to_string(),
            source: PathBuf::from("assets/tick.mp3"),
            loop_count: -1,
        }
    }
}

/// Top-level metronome configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetronomeConfig {
    /// Tempo at startup (clamped to 30..=300)
    pub default_bpm: u32,
    /// Subdivision preset at startup
    pub default_preset: SubdivisionPreset,
    /// Behaviour on tempo change while running
    pub tempo_change: TempoChangePolicy,
    /// Click track
    pub track: TrackConfig,
    /// Logging
    pub log: LogConfig,
}

impl Default for MetronomeConfig {
    fn default() -> Self {
        Self {
            default_bpm: DEFAULT_BPM,
            default_preset: SubdivisionPreset::default(),
            tempo_change: TempoChangePolicy::default(),
            track: TrackConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl MetronomeConfig {
    /// Parse a configuration from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// Initial tempo setting, clamped to the valid ranges
    pub fn initial_tempo(&self) -> TempoSetting {
        TempoSetting::new(self.default_bpm, self.default_preset.count())
    }
}
