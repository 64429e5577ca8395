//! Presentation-side handle to the metronome actor

use crate::state::Snapshot;
use metrosync_core::{MetronomeError, Result, SubdivisionPreset};
use tokio::sync::{mpsc, watch};

/// Commands accepted by the actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    IncreaseBpm,
    DecreaseBpm,
    SetSubdivisions(SubdivisionPreset),
    Shutdown,
}

/// Cloneable handle used by the presentation layer.
///
/// Reads come from the latest published [`Snapshot`]; commands are queued to
/// the actor. Command methods only fail with
/// [`MetronomeError::EngineStopped`]; player failures show up in
/// [`Snapshot::status`].
#[derive(Debug, Clone)]
pub struct MetronomeHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Snapshot>,
}

impl MetronomeHandle {
    pub(crate) fn new(commands: mpsc::Sender<Command>, snapshots: watch::Receiver<Snapshot>) -> Self {
        Self {
            commands,
            snapshots,
        }
    }

    pub async fn toggle(&self) -> Result<()> {
        self.send(Command::Toggle).await
    }

    pub async fn increase_bpm(&self) -> Result<()> {
        self.send(Command::IncreaseBpm).await
    }

    pub async fn decrease_bpm(&self) -> Result<()> {
        self.send(Command::DecreaseBpm).await
    }

    pub async fn set_subdivisions(&self, preset: SubdivisionPreset) -> Result<()> {
        self.send(Command::SetSubdivisions(preset)).await
    }

    /// Ask the actor to tear down and exit
    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| MetronomeError::EngineStopped)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn bpm(&self) -> u32 {
        self.snapshots.borrow().bpm
    }

    pub fn subdivisions(&self) -> u32 {
        self.snapshots.borrow().subdivisions
    }

    pub fn active_index(&self) -> i32 {
        self.snapshots.borrow().active_index
    }

    pub fn is_running(&self) -> bool {
        self.snapshots.borrow().running
    }

    /// Receiver notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`
    pub async fn wait_for(&self, predicate: impl FnMut(&Snapshot) -> bool) -> Result<Snapshot> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(predicate)
            .await
            .map_err(|_| MetronomeError::EngineStopped)?;
        Ok(snapshot.clone())
    }
}
