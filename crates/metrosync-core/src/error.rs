//! Error types for the metronome engine
use thiserror::Error;

/// Metronome errors
///
/// Every variant is recoverable: the engine resets to a stopped state and
/// reports the error for display instead of aborting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetronomeError {
    /// Tempo or subdivision count that cannot produce a playback rate
    #[error("Invalid tempo: {bpm} BPM with {subdivisions} subdivisions")]
    InvalidTempo {
        /// Requested beats per minute
        bpm: u32,
        /// Requested subdivision count
        subdivisions: u32,
    },

    /// The audio engine failed during setup or while executing a command
    #[error("Playback unavailable: {0}")]
    PlaybackUnavailable(String),

    /// A playback command arrived before the audio engine finished setup
    #[error("Audio engine is not ready")]
    EngineNotReady,

    /// The engine task has exited and no longer accepts commands
    #[error("Metronome engine has stopped")]
    EngineStopped,

    /// Configuration parse or validation error
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for MetronomeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<toml::de::Error> for MetronomeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for metronome operations
pub type Result<T> = std::result::Result<T, MetronomeError>;
