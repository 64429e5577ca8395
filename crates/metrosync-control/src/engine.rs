//! Metronome actor
//!
//! A single task owns the [`EngineState`] and the player. It prepares the
//! player, serves commands from [`MetronomeHandle`]s, drives start/stop
//! transitions through the [`Sequencer`](crate::sequencer::Sequencer) and
//! feeds player events to the [`EventBridge`]. Every state change is
//! published as a [`Snapshot`].

use crate::bridge::{retrigger, BridgeAction, EventBridge};
use crate::handle::{Command, MetronomeHandle};
use crate::player::{
    AudioPlayer, PlayerEvent, PlayerResult, Track, METRONOME_CAPABILITIES,
};
use crate::sequencer::{Request, TempoChange, TransportState, Transition};
use crate::state::{EngineState, Snapshot};
use metrosync_core::{MetronomeConfig, MetronomeError, TempoChangePolicy};
use std::sync::Arc;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

const COMMAND_CAPACITY: usize = 64;

pub struct Metronome {
    player: Arc<dyn AudioPlayer>,
    state: EngineState,
    bridge: EventBridge,
    policy: TempoChangePolicy,
    track: Track,
    commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<Snapshot>,
    events: Option<broadcast::Receiver<PlayerEvent>>,
    shutdown: bool,
}

impl Metronome {
    /// Spawn the actor on the current runtime.
    ///
    /// The task exits after [`MetronomeHandle::shutdown`] or once every
    /// handle has been dropped, releasing the player on the way out.
    pub fn spawn(
        player: Arc<dyn AudioPlayer>,
        config: &MetronomeConfig,
    ) -> (MetronomeHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let state = EngineState::new(config.initial_tempo());
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());

        let engine = Self {
            player,
            state,
            bridge: EventBridge::new(config.track.id.clone()),
            policy: config.tempo_change,
            track: Track::from(&config.track),
            commands: command_rx,
            snapshots: snapshot_tx,
            events: None,
            shutdown: false,
        };

        let task = tokio::spawn(engine.run());
        (MetronomeHandle::new(command_tx, snapshot_rx), task)
    }

    async fn run(mut self) {
        info!(
            "Metronome starting at {} BPM x{}",
            self.state.tempo.bpm(),
            self.state.tempo.subdivisions()
        );

        if self.prepare().await {
            self.serve().await;
        }
        self.teardown().await;
    }

    /// Set up the player while still accepting commands.
    ///
    /// Returns `false` if shutdown was requested before setup finished.
    async fn prepare(&mut self) -> bool {
        let player = Arc::clone(&self.player);
        let setup = setup_player(player, self.track.clone());
        tokio::pin!(setup);

        loop {
            tokio::select! {
                biased;

                result = &mut setup => {
                    match result {
                        Ok(events) => {
                            self.events = Some(events);
                            self.state.ready = true;
                            info!("Audio player ready");
                        }
                        Err(e) => {
                            error!("Audio player setup failed: {}", e);
                            self.state.report(e.into());
                        }
                    }
                    self.publish();
                    return true;
                }

                command = self.commands.recv() => {
                    let Some(command) = command else { return false };
                    // Starts are refused until ready, so nothing reaches the player here.
                    let planned = self.plan_command(command);
                    debug_assert!(planned.is_none());
                    self.publish();
                    if self.shutdown {
                        return false;
                    }
                }
            }
        }
    }

    async fn serve(&mut self) {
        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    if let Some(transition) = self.plan_command(command) {
                        self.drive(transition).await;
                    }
                    self.publish();
                }

                event = next_event(&mut self.events) => {
                    self.on_event(event).await;
                }
            }

            if self.shutdown {
                break;
            }
        }
    }

    fn plan_command(&mut self, command: Command) -> Option<Transition> {
        match command {
            Command::Toggle => self.plan_request(self.state.sequencer.toggle_request()),
            Command::IncreaseBpm => self.plan_tempo(TempoChange::IncreaseBpm),
            Command::DecreaseBpm => self.plan_tempo(TempoChange::DecreaseBpm),
            Command::SetSubdivisions(preset) => {
                self.plan_tempo(TempoChange::SetSubdivisions(preset))
            }
            Command::Shutdown => {
                debug!("Shutdown requested");
                self.shutdown = true;
                None
            }
        }
    }

    fn plan_request(&mut self, request: Request) -> Option<Transition> {
        match request {
            Request::Start => {
                if !self.state.ready {
                    warn!("Start requested before the audio player is ready");
                    self.state.report(MetronomeError::EngineNotReady);
                    return None;
                }
                match self.state.sequencer.request_start(&self.state.tempo) {
                    Ok(transition) => {
                        if transition.is_some() {
                            self.state.cursor.reset();
                        }
                        transition
                    }
                    Err(e) => {
                        warn!("Refusing to start: {}", e);
                        self.state.report(e);
                        None
                    }
                }
            }
            Request::Stop => self.state.sequencer.request_stop(),
        }
    }

    fn plan_tempo(&mut self, change: TempoChange) -> Option<Transition> {
        if self.state.sequencer.state().is_transitioning() {
            debug!("Deferring {:?} behind in-flight transition", change);
            let stops = self.stops_playback(change);
            self.state
                .sequencer
                .defer_tempo(self.state.tempo, change, stops);
            return None;
        }

        self.state.apply_tempo_change(change);
        info!(
            "Tempo set to {} BPM x{}",
            self.state.tempo.bpm(),
            self.state.tempo.subdivisions()
        );

        if self.state.sequencer.state() != TransportState::Running {
            return None;
        }

        let stop = self.state.sequencer.request_stop();
        if !self.stops_playback(change) {
            // Started again at the new rate once the pause settles.
            if let Err(e) = self.state.sequencer.request_start(&self.state.tempo) {
                self.state.report(e);
            }
        }
        stop
    }

    /// Whether `change` leaves playback stopped rather than restarting it
    fn stops_playback(&self, change: TempoChange) -> bool {
        match change {
            TempoChange::SetSubdivisions(_) => true,
            TempoChange::IncreaseBpm | TempoChange::DecreaseBpm => {
                self.policy == TempoChangePolicy::Stop
            }
        }
    }

    /// Run `first` and every transition that deferred work produces after it.
    async fn drive(&mut self, first: Transition) {
        let mut next = Some(first);

        while let Some(transition) = next.take() {
            self.discard_stale_events();
            self.publish();

            let player = Arc::clone(&self.player);
            let outcome = {
                let run = transition.run(player.as_ref());
                tokio::pin!(run);

                loop {
                    tokio::select! {
                        biased;

                        outcome = &mut run => break outcome,

                        command = self.commands.recv(), if !self.shutdown => {
                            match command {
                                Some(command) => {
                                    // In-flight transition: everything is deferred.
                                    let planned = self.plan_command(command);
                                    debug_assert!(planned.is_none());
                                    self.publish();
                                }
                                None => self.shutdown = true,
                            }
                        }
                    }
                }
            };

            self.settle(transition, outcome);
            if self.shutdown {
                return;
            }

            next = self.reconcile();
        }
    }

    /// Apply deferred tempo edits, then pick the transition the intent needs
    fn reconcile(&mut self) -> Option<Transition> {
        let mut restart = false;
        if let Some(tempo) = self.state.sequencer.take_deferred_tempo() {
            restart = tempo != self.state.tempo;
            self.state.tempo = tempo;
            self.state.cursor.reset();
            info!(
                "Tempo set to {} BPM x{}",
                self.state.tempo.bpm(),
                self.state.tempo.subdivisions()
            );
        }

        match self.state.sequencer.reconcile(&self.state.tempo, restart) {
            Ok(transition) => {
                if matches!(transition, Some(Transition::Start { .. })) {
                    self.state.cursor.reset();
                }
                transition
            }
            Err(e) => {
                warn!("Refusing to start: {}", e);
                self.state.report(e);
                None
            }
        }
    }

    /// Drop events still buffered from a run that is about to end.
    ///
    /// Players deliver events after the command that caused them, so anything
    /// queued before a new transition belongs to the previous run.
    fn discard_stale_events(&mut self) {
        let Some(events) = self.events.as_mut() else {
            return;
        };

        let mut discarded = 0u64;
        let closed = loop {
            match events.try_recv() {
                Ok(_) => discarded += 1,
                Err(TryRecvError::Lagged(n)) => discarded += n,
                Err(TryRecvError::Empty) => break false,
                Err(TryRecvError::Closed) => break true,
            }
        };

        if discarded > 0 {
            trace!("Discarded {} stale player events", discarded);
        }
        if closed {
            warn!("Player event stream closed");
            self.events = None;
        }
    }

    fn settle(&mut self, transition: Transition, outcome: PlayerResult<()>) {
        let transport = self.state.sequencer.settle(&outcome);

        match outcome {
            Ok(()) => {
                if matches!(transition, Transition::Start { .. }) {
                    self.state.status = None;
                }
            }
            Err(e) => {
                error!("Player rejected {:?}: {}", transition, e);
                self.state.report(e.into());
            }
        }

        if transport != TransportState::Running {
            self.state.cursor.reset();
        }
        debug!("Transport settled in {:?}", transport);
        self.publish();
    }

    async fn on_event(&mut self, event: Result<PlayerEvent, RecvError>) {
        match event {
            Ok(event) => match self.bridge.handle(&event, &mut self.state) {
                BridgeAction::Ignored => {}
                BridgeAction::Advanced(index) => {
                    trace!("Beat {}", index);
                    self.publish();
                }
                BridgeAction::Retrigger => self.retrigger().await,
            },
            Err(RecvError::Lagged(n)) => {
                warn!("Player event stream lagged, skipped {} events", n);
            }
            Err(RecvError::Closed) => {
                warn!("Player event stream closed");
                self.events = None;
            }
        }
    }

    async fn retrigger(&mut self) {
        let player = Arc::clone(&self.player);
        if let Err(e) = retrigger(player.as_ref()).await {
            error!("Failed to retrigger click: {}", e);
            self.state.report(e.into());
            if let Some(transition) = self.state.sequencer.request_stop() {
                self.drive(transition).await;
            }
            self.publish();
        }
    }

    async fn teardown(&mut self) {
        if self.state.sequencer.state() == TransportState::Running {
            if let Err(e) = self.player.pause().await {
                warn!("Pause during teardown failed: {}", e);
            }
        }

        self.events = None;
        if let Err(e) = self.player.reset().await {
            warn!("Player reset failed: {}", e);
        }

        self.state.sequencer.force_idle();
        self.state.cursor.reset();
        self.state.ready = false;
        self.publish();
        info!("Metronome stopped");
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.state.snapshot());
    }
}

async fn setup_player(
    player: Arc<dyn AudioPlayer>,
    track: Track,
) -> PlayerResult<broadcast::Receiver<PlayerEvent>> {
    player.setup().await?;
    player.add(track).await?;
    player.update_options(&METRONOME_CAPABILITIES).await?;
    Ok(player.subscribe())
}

/// Next player event, or never if there is no subscription
async fn next_event(
    events: &mut Option<broadcast::Receiver<PlayerEvent>>,
) -> Result<PlayerEvent, RecvError> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
