//! Metrosync Control - Beat synchronization engine
//!
//! This crate drives an asynchronous audio player so that a looping click
//! sample plays at the selected tempo, and turns the player's events into a
//! beat cursor for display:
//! - **Player**: the [`AudioPlayer`] contract and a [`SimulatedPlayer`]
//! - **Sequencer**: serialized start/stop transitions with deferral
//! - **Bridge**: player events to beat cursor
//! - **Engine**: the actor owning all state, and its [`MetronomeHandle`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use metrosync_control::{Metronome, SimulatedPlayer};
//! use metrosync_core::MetronomeConfig;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn demo() -> metrosync_core::Result<()> {
//! let player = Arc::new(SimulatedPlayer::new(Duration::from_secs(1)));
//! let (handle, task) = Metronome::spawn(player, &MetronomeConfig::default());
//! handle.toggle().await?;
//! handle.wait_for(|s| s.active_index >= 0).await?;
//! handle.shutdown().await?;
//! let _ = task.await;
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]

/// Player events to beat cursor
pub mod bridge;
/// Metronome actor
pub mod engine;
/// Handle used by the presentation layer
pub mod handle;
/// Audio player contract
pub mod player;
/// Start/stop sequencing
pub mod sequencer;
/// Simulated audio player
pub mod sim;
/// Engine state and snapshots
pub mod state;

pub use bridge::{BridgeAction, EventBridge};
pub use engine::Metronome;
pub use handle::{Command, MetronomeHandle};
pub use player::{
    AudioPlayer, Capability, PlayerError, PlayerEvent, PlayerResult, PlayerState, Track,
    METRONOME_CAPABILITIES,
};
pub use sequencer::{Request, Sequencer, TempoChange, TransportState, Transition};
pub use sim::SimulatedPlayer;
pub use state::{EngineState, Snapshot};
