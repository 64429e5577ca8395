//! Audio player contract
//!
//! The metronome treats the audio engine as a black box that can play,
//! pause and seek a single looping sample at a settable rate, and that
//! reports what it is doing through a broadcast event stream.

use async_trait::async_trait;
use metrosync_core::{MetronomeError, TrackConfig};
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::broadcast;

/// A track queued on the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub source: PathBuf,
    /// `-1` loops forever
    pub loop_count: i32,
}

impl From<&TrackConfig> for Track {
    fn from(config: &TrackConfig) -> Self {
        Self {
            id: config.id.clone(),
            source: config.source.clone(),
            loop_count: config.loop_count,
        }
    }
}

/// Remote-control capabilities advertised to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Play,
    Pause,
    Stop,
    SeekTo,
}

/// Capabilities the metronome needs
pub const METRONOME_CAPABILITIES: [Capability; 4] = [
    Capability::Play,
    Capability::Pause,
    Capability::Stop,
    Capability::SeekTo,
];

/// Playback state reported by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    None,
    Ready,
    Buffering,
    Playing,
    Paused,
    Stopped,
}

/// Notifications emitted by the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The player changed playback state
    PlaybackStateChanged { state: PlayerState },
    /// The player moved on to another track (or looped to the same one)
    PlaybackTrackChanged { next_track_id: Option<String> },
    /// The queue ran out
    QueueEnded,
}

/// Player errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    /// A command was issued before `setup` completed
    #[error("Player not initialized")]
    NotInitialized,

    /// No track has been queued
    #[error("No track queued")]
    NoTrack,

    /// A command was rejected by the player
    #[error("{command} failed: {reason}")]
    Command {
        command: &'static str,
        reason: String,
    },

    /// The output device is unavailable
    #[error("Audio device error: {0}")]
    Device(String),
}

impl From<PlayerError> for MetronomeError {
    fn from(err: PlayerError) -> Self {
        MetronomeError::PlaybackUnavailable(err.to_string())
    }
}

/// Result type for player commands
pub type PlayerResult<T> = std::result::Result<T, PlayerError>;

/// Asynchronous audio player.
///
/// Every command suspends until the player acknowledges it. Events are
/// delivered after the command that caused them has completed.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn setup(&self) -> PlayerResult<()>;

    async fn add(&self, track: Track) -> PlayerResult<()>;

    async fn update_options(&self, capabilities: &[Capability]) -> PlayerResult<()>;

    async fn seek_to(&self, seconds: f64) -> PlayerResult<()>;

    async fn set_rate(&self, rate: f64) -> PlayerResult<()>;

    async fn play(&self) -> PlayerResult<()>;

    async fn pause(&self) -> PlayerResult<()>;

    /// Stop playback and clear the queue
    async fn reset(&self) -> PlayerResult<()>;

    /// Subscribe to player events. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent>;
}
