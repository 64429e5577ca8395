#![allow(dead_code)]

use async_trait::async_trait;
use metrosync_control::{
    AudioPlayer, Capability, Metronome, MetronomeHandle, PlayerError, PlayerEvent, PlayerResult,
    PlayerState, Snapshot, Track,
};
use metrosync_core::MetronomeConfig;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Setup,
    Add(String),
    UpdateOptions(usize),
    SeekTo(f64),
    SetRate(f64),
    Play,
    Pause,
    Reset,
}

/// Player that records every command and emits the events a real player would
pub struct RecordingPlayer {
    events: broadcast::Sender<PlayerEvent>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashSet<&'static str>>,
    gates: Mutex<HashMap<&'static str, Arc<Notify>>>,
}

impl RecordingPlayer {
    pub fn new() -> Arc<Self> {
        Self::with_capacity(64)
    }

    /// Player whose event channel holds at most `capacity` undelivered events
    pub fn with_capacity(capacity: usize) -> Arc<Self> {
        let (events, _) = broadcast::channel(capacity);
        Arc::new(Self {
            events,
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashSet::new()),
            gates: Mutex::new(HashMap::new()),
        })
    }

    /// Make `command` fail from now on
    pub fn fail(&self, command: &'static str) {
        self.failures.lock().insert(command);
    }

    /// Block `command` until the returned gate is notified
    pub fn hold(&self, command: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().insert(command, Arc::clone(&gate));
        gate
    }

    pub fn emit(&self, event: PlayerEvent) {
        let _ = self.events.send(event);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Calls issued after setup
    pub fn transport_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Setup | Call::Add(_) | Call::UpdateOptions(_)))
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    async fn command(&self, name: &'static str, call: Call) -> PlayerResult<()> {
        self.calls.lock().push(call);
        let gate = self.gates.lock().remove(name);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failures.lock().contains(name) {
            return Err(PlayerError::Command {
                command: name,
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AudioPlayer for RecordingPlayer {
    async fn setup(&self) -> PlayerResult<()> {
        self.command("setup", Call::Setup).await
    }

    async fn add(&self, track: Track) -> PlayerResult<()> {
        self.command("add", Call::Add(track.id)).await
    }

    async fn update_options(&self, capabilities: &[Capability]) -> PlayerResult<()> {
        self.command("update_options", Call::UpdateOptions(capabilities.len()))
            .await
    }

    async fn seek_to(&self, seconds: f64) -> PlayerResult<()> {
        self.command("seek_to", Call::SeekTo(seconds)).await
    }

    async fn set_rate(&self, rate: f64) -> PlayerResult<()> {
        self.command("set_rate", Call::SetRate(rate)).await
    }

    async fn play(&self) -> PlayerResult<()> {
        self.command("play", Call::Play).await?;
        self.emit(PlayerEvent::PlaybackStateChanged {
            state: PlayerState::Playing,
        });
        Ok(())
    }

    async fn pause(&self) -> PlayerResult<()> {
        self.command("pause", Call::Pause).await?;
        self.emit(PlayerEvent::PlaybackStateChanged {
            state: PlayerState::Paused,
        });
        Ok(())
    }

    async fn reset(&self) -> PlayerResult<()> {
        self.command("reset", Call::Reset).await
    }

    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }
}

pub fn spawn(
    player: &Arc<RecordingPlayer>,
    config: &MetronomeConfig,
) -> (MetronomeHandle, JoinHandle<()>) {
    Metronome::spawn(Arc::clone(player) as Arc<dyn AudioPlayer>, config)
}

/// Spawn with defaults and wait for setup to finish
pub async fn spawn_ready(player: &Arc<RecordingPlayer>) -> (MetronomeHandle, JoinHandle<()>) {
    let (handle, task) = spawn(player, &MetronomeConfig::default());
    wait(&handle, |s| s.ready).await;
    (handle, task)
}

pub async fn wait(handle: &MetronomeHandle, predicate: impl FnMut(&Snapshot) -> bool) -> Snapshot {
    tokio::time::timeout(Duration::from_secs(2), handle.wait_for(predicate))
        .await
        .expect("timed out waiting for snapshot")
        .expect("engine stopped")
}

pub fn rate_close(call: &Call, expected: f64) -> bool {
    matches!(call, Call::SetRate(rate) if (rate - expected).abs() < 1e-9)
}
