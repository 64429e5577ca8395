//! Simulated audio player
//!
//! Stands in for a device-backed player. A "sample" lasts `sample_length` at
//! rate 1.0; while playing, a timer task reports the end of every pass as a
//! track change, the way a looping native player does.

use crate::player::{
    AudioPlayer, Capability, PlayerError, PlayerEvent, PlayerResult, PlayerState, Track,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

const EVENT_CAPACITY: usize = 256;

#[derive(Default)]
struct SimState {
    initialized: bool,
    track: Option<Track>,
    capabilities: Vec<Capability>,
    rate: f64,
    position: f64,
    playing: bool,
    timer: Option<JoinHandle<()>>,
}

impl SimState {
    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

pub struct SimulatedPlayer {
    events: broadcast::Sender<PlayerEvent>,
    state: Arc<Mutex<SimState>>,
    sample_length: Duration,
    fail_play: AtomicBool,
}

impl SimulatedPlayer {
    pub fn new(sample_length: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            events,
            state: Arc::new(Mutex::new(SimState {
                rate: 1.0,
                ..Default::default()
            })),
            sample_length,
            fail_play: AtomicBool::new(false),
        }
    }

    /// Make subsequent `play` calls fail, as an unavailable device would
    pub fn set_failing(&self, failing: bool) {
        self.fail_play.store(failing, Ordering::SeqCst);
    }

    pub fn rate(&self) -> f64 {
        self.state.lock().rate
    }

    pub fn position(&self) -> f64 {
        self.state.lock().position
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        self.state.lock().capabilities.clone()
    }

    /// Time between loop ends at `rate`
    fn period(&self, rate: f64) -> Duration {
        Duration::try_from_secs_f64(self.sample_length.as_secs_f64() / rate)
            .unwrap_or(self.sample_length)
    }

    fn emit(&self, event: PlayerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn require_initialized(state: &SimState) -> PlayerResult<()> {
        if state.initialized {
            Ok(())
        } else {
            Err(PlayerError::NotInitialized)
        }
    }
}

#[async_trait]
impl AudioPlayer for SimulatedPlayer {
    async fn setup(&self) -> PlayerResult<()> {
        self.state.lock().initialized = true;
        info!("Simulated player ready ({:?} sample)", self.sample_length);
        self.emit(PlayerEvent::PlaybackStateChanged {
            state: PlayerState::Ready,
        });
        Ok(())
    }

    async fn add(&self, track: Track) -> PlayerResult<()> {
        let mut state = self.state.lock();
        Self::require_initialized(&state)?;
        debug!("Queued track '{}' from {}", track.id, track.source.display());
        state.track = Some(track);
        Ok(())
    }

    async fn update_options(&self, capabilities: &[Capability]) -> PlayerResult<()> {
        let mut state = self.state.lock();
        Self::require_initialized(&state)?;
        state.capabilities = capabilities.to_vec();
        Ok(())
    }

    async fn seek_to(&self, seconds: f64) -> PlayerResult<()> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(PlayerError::Command {
                command: "seek_to",
                reason: format!("invalid position {}", seconds),
            });
        }
        let mut state = self.state.lock();
        Self::require_initialized(&state)?;
        state.position = seconds;
        Ok(())
    }

    async fn set_rate(&self, rate: f64) -> PlayerResult<()> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(PlayerError::Command {
                command: "set_rate",
                reason: format!("invalid rate {}", rate),
            });
        }
        let mut state = self.state.lock();
        Self::require_initialized(&state)?;
        state.rate = rate;
        Ok(())
    }

    async fn play(&self) -> PlayerResult<()> {
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(PlayerError::Device("output device unavailable".to_string()));
        }

        let mut state = self.state.lock();
        Self::require_initialized(&state)?;
        let track = state.track.clone().ok_or(PlayerError::NoTrack)?;

        state.stop_timer();
        state.playing = true;
        self.emit(PlayerEvent::PlaybackStateChanged {
            state: PlayerState::Playing,
        });

        let period = self.period(state.rate);
        let events = self.events.clone();
        let shared = Arc::clone(&self.state);
        state.timer = Some(tokio::spawn(async move {
            let mut remaining = track.loop_count;
            loop {
                tokio::time::sleep(period).await;
                shared.lock().position = 0.0;
                let event = if remaining != 0 {
                    if remaining > 0 {
                        remaining -= 1;
                    }
                    PlayerEvent::PlaybackTrackChanged {
                        next_track_id: Some(track.id.clone()),
                    }
                } else {
                    shared.lock().playing = false;
                    PlayerEvent::QueueEnded
                };
                let ended = event == PlayerEvent::QueueEnded;
                let _ = events.send(event);
                if ended {
                    break;
                }
            }
        }));
        Ok(())
    }

    async fn pause(&self) -> PlayerResult<()> {
        let mut state = self.state.lock();
        Self::require_initialized(&state)?;
        state.stop_timer();
        if state.playing {
            state.playing = false;
            self.emit(PlayerEvent::PlaybackStateChanged {
                state: PlayerState::Paused,
            });
        }
        Ok(())
    }

    async fn reset(&self) -> PlayerResult<()> {
        let mut state = self.state.lock();
        state.stop_timer();
        state.track = None;
        state.position = 0.0;
        state.playing = false;
        self.emit(PlayerEvent::PlaybackStateChanged {
            state: PlayerState::Stopped,
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }
}

impl Drop for SimulatedPlayer {
    fn drop(&mut self) {
        self.state.lock().stop_timer();
    }
}
