//! Audio command sequencer
//!
//! Serializes start/stop commands to the audio player. At most one
//! transition is in flight. Requests that arrive meanwhile only update the
//! playback intent and a deferred target tempo; once the transition settles
//! the target tempo is applied and the transport is reconciled with the
//! latest intent.

use crate::player::{AudioPlayer, PlayerResult};
use metrosync_core::{Result, SubdivisionPreset, TempoSetting};
use tracing::debug;

/// Transport state of the audio player as seen by the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Idle,
    Starting,
    Running,
    Stopping,
}

impl TransportState {
    /// A transition is waiting for the player
    pub fn is_transitioning(self) -> bool {
        matches!(self, Self::Starting | Self::Stopping)
    }
}

/// Playback request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Start,
    Stop,
}

/// Tempo edit from the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempoChange {
    IncreaseBpm,
    DecreaseBpm,
    SetSubdivisions(SubdivisionPreset),
}

impl TempoChange {
    /// Apply to `tempo`; `false` if the value saturated or was already set
    pub fn apply(self, tempo: &mut TempoSetting) -> bool {
        match self {
            Self::IncreaseBpm => tempo.increase_bpm(),
            Self::DecreaseBpm => tempo.decrease_bpm(),
            Self::SetSubdivisions(preset) => tempo.set_subdivisions(preset),
        }
    }
}

/// Command sequence issued to the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// seek to zero, set rate, play
    Start { rate: f64 },
    /// pause
    Stop,
}

impl Transition {
    /// Issue this transition's commands, each awaited before the next.
    pub async fn run(self, player: &dyn AudioPlayer) -> PlayerResult<()> {
        match self {
            Self::Start { rate } => {
                debug!("Start sequence: seek 0, rate {:.3}, play", rate);
                player.seek_to(0.0).await?;
                player.set_rate(rate).await?;
                player.play().await
            }
            Self::Stop => {
                debug!("Stop sequence: pause");
                player.pause().await
            }
        }
    }
}

/// Start/stop state machine with deferral.
///
/// While a transition is in flight, start/stop requests collapse into the
/// intent flag and tempo edits fold into one target tempo, so deferred work
/// stays constant-size however long the player takes.
#[derive(Debug, Default)]
pub struct Sequencer {
    state: TransportState,
    /// The user's desired state; may run ahead of `state`
    intent: bool,
    in_flight: Option<Transition>,
    deferred_tempo: Option<TempoSetting>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Desired play state (the playback intent)
    pub fn is_running(&self) -> bool {
        self.intent
    }

    pub fn in_flight(&self) -> Option<Transition> {
        self.in_flight
    }

    /// Tempo edits waiting for the in-flight transition, folded into one value
    pub fn deferred_tempo(&self) -> Option<TempoSetting> {
        self.deferred_tempo
    }

    /// What a start/stop toggle means right now
    pub fn toggle_request(&self) -> Request {
        if self.intent {
            Request::Stop
        } else {
            Request::Start
        }
    }

    /// Request playback at the rate derived from `tempo`.
    ///
    /// Returns the transition to execute, `None` if the request was a no-op
    /// or was deferred behind an in-flight transition.
    pub fn request_start(&mut self, tempo: &TempoSetting) -> Result<Option<Transition>> {
        match self.state {
            TransportState::Idle => {
                let rate = tempo.playback_rate()?;
                let transition = Transition::Start { rate };
                self.state = TransportState::Starting;
                self.intent = true;
                self.in_flight = Some(transition);
                Ok(Some(transition))
            }
            TransportState::Running => Ok(None),
            TransportState::Starting | TransportState::Stopping => {
                debug!("Deferring start behind {:?}", self.state);
                self.intent = true;
                Ok(None)
            }
        }
    }

    /// Request playback to stop.
    ///
    /// Returns the transition to execute, `None` if the request was a no-op
    /// or was deferred behind an in-flight transition.
    pub fn request_stop(&mut self) -> Option<Transition> {
        self.intent = false;
        match self.state {
            TransportState::Running => {
                self.state = TransportState::Stopping;
                self.in_flight = Some(Transition::Stop);
                self.in_flight
            }
            TransportState::Idle => None,
            TransportState::Starting | TransportState::Stopping => {
                debug!("Deferring stop behind {:?}", self.state);
                None
            }
        }
    }

    /// Fold a tempo edit into the deferred target, starting from `current`.
    ///
    /// `stops_playback` edits cancel any start requested before them.
    pub fn defer_tempo(&mut self, current: TempoSetting, change: TempoChange, stops_playback: bool) {
        let target = self.deferred_tempo.get_or_insert(current);
        change.apply(target);
        if stops_playback {
            self.intent = false;
        }
    }

    /// Take the deferred target tempo, once no transition is in flight
    pub fn take_deferred_tempo(&mut self) -> Option<TempoSetting> {
        if self.state.is_transitioning() {
            return None;
        }
        self.deferred_tempo.take()
    }

    /// Record the outcome of the in-flight transition.
    ///
    /// A failed start falls back to `Idle` and clears the intent so that
    /// nothing retries the player on its own. A stop always ends in `Idle`.
    pub fn settle(&mut self, outcome: &PlayerResult<()>) -> TransportState {
        match (self.in_flight.take(), outcome) {
            (Some(Transition::Start { .. }), Ok(())) => {
                self.state = TransportState::Running;
            }
            (Some(Transition::Start { .. }), Err(_)) => {
                self.state = TransportState::Idle;
                self.intent = false;
            }
            (Some(Transition::Stop), _) => {
                self.state = TransportState::Idle;
            }
            (None, _) => {}
        }
        self.state
    }

    /// Next transition that brings the transport in line with the intent.
    ///
    /// `restart` asks a running transport to stop and start again, e.g. after
    /// the rate changed.
    pub fn reconcile(&mut self, tempo: &TempoSetting, restart: bool) -> Result<Option<Transition>> {
        match (self.state, self.intent) {
            (TransportState::Running, false) => Ok(self.request_stop()),
            (TransportState::Running, true) if restart => {
                let stop = self.request_stop();
                self.intent = true;
                Ok(stop)
            }
            (TransportState::Idle, true) => {
                self.intent = false;
                self.request_start(tempo)
            }
            _ => Ok(None),
        }
    }

    /// Drop everything and return to `Idle` (teardown)
    pub fn force_idle(&mut self) {
        self.state = TransportState::Idle;
        self.intent = false;
        self.in_flight = None;
        self.deferred_tempo = None;
    }
}
