//! Event bridge: turns player notifications into beat-cursor updates
//!
//! The bridge holds no copy of the subdivision count. It reads the count from
//! [`EngineState`] every time an event is handled, so a single long-lived
//! subscription stays correct across subdivision changes.

use crate::player::{AudioPlayer, PlayerEvent, PlayerResult, PlayerState};
use crate::sequencer::TransportState;
use crate::state::EngineState;
use tracing::trace;

/// What the actor must do after an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeAction {
    /// Nothing to do
    Ignored,
    /// The cursor moved to this index
    Advanced(i32),
    /// The click sample ended; seek to zero and play again
    Retrigger,
}

#[derive(Debug, Clone)]
pub struct EventBridge {
    tick_track_id: String,
}

impl EventBridge {
    pub fn new(tick_track_id: impl Into<String>) -> Self {
        Self {
            tick_track_id: tick_track_id.into(),
        }
    }

    pub fn tick_track_id(&self) -> &str {
        &self.tick_track_id
    }

    /// Filter one event against the current engine state.
    ///
    /// Events are honored only while the sequencer is `Running`; anything
    /// arriving while idle or mid-transition is stale.
    pub fn handle(&self, event: &PlayerEvent, state: &mut EngineState) -> BridgeAction {
        if state.sequencer.state() != TransportState::Running {
            trace!(?event, "Ignoring player event while not running");
            return BridgeAction::Ignored;
        }

        match event {
            PlayerEvent::PlaybackStateChanged {
                state: PlayerState::Playing,
            } => {
                let subdivisions = state.tempo.subdivisions();
                BridgeAction::Advanced(state.cursor.advance(subdivisions))
            }
            PlayerEvent::PlaybackStateChanged { .. } => BridgeAction::Ignored,
            PlayerEvent::PlaybackTrackChanged {
                next_track_id: Some(id),
            } if *id == self.tick_track_id => BridgeAction::Retrigger,
            PlayerEvent::PlaybackTrackChanged { .. } => BridgeAction::Ignored,
            PlayerEvent::QueueEnded => BridgeAction::Retrigger,
        }
    }
}

impl Default for EventBridge {
    fn default() -> Self {
        Self::new(metrosync_core::TICK_TRACK_ID)
    }
}

/// Restart the click sample from the beginning
pub async fn retrigger(player: &dyn AudioPlayer) -> PlayerResult<()> {
    player.seek_to(0.0).await?;
    player.play().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrosync_core::{SubdivisionPreset, TempoSetting, INACTIVE};

    fn running_state(subdivisions: u32) -> EngineState {
        let mut state = EngineState::new(TempoSetting::new(60, subdivisions));
        let tempo = state.tempo;
        state.sequencer.request_start(&tempo).unwrap();
        state.sequencer.settle(&Ok(()));
        state
    }

    fn playing() -> PlayerEvent {
        PlayerEvent::PlaybackStateChanged {
            state: PlayerState::Playing,
        }
    }

    #[test]
    fn test_playing_advances_cursor() {
        let bridge = EventBridge::default();
        let mut state = running_state(3);
        let seen: Vec<BridgeAction> = (0..4).map(|_| bridge.handle(&playing(), &mut state)).collect();
        assert_eq!(
            seen,
            vec![
                BridgeAction::Advanced(0),
                BridgeAction::Advanced(1),
                BridgeAction::Advanced(2),
                BridgeAction::Advanced(0),
            ]
        );
    }

    #[test]
    fn test_reads_subdivisions_at_handling_time() {
        let bridge = EventBridge::default();
        let mut state = running_state(4);
        bridge.handle(&playing(), &mut state);
        bridge.handle(&playing(), &mut state);
        assert_eq!(state.cursor.active_index(), 1);

        state.tempo.set_subdivisions(SubdivisionPreset::Eight);
        state.cursor.reset();
        assert_eq!(bridge.handle(&playing(), &mut state), BridgeAction::Advanced(0));
        assert_eq!(bridge.handle(&playing(), &mut state), BridgeAction::Advanced(1));
        assert_eq!(bridge.handle(&playing(), &mut state), BridgeAction::Advanced(0));
    }

    #[test]
    fn test_events_ignored_unless_running() {
        let bridge = EventBridge::default();
        let mut state = EngineState::default();
        assert_eq!(bridge.handle(&playing(), &mut state), BridgeAction::Ignored);
        assert_eq!(state.cursor.active_index(), INACTIVE);

        let tempo = state.tempo;
        state.sequencer.request_start(&tempo).unwrap();
        assert_eq!(bridge.handle(&playing(), &mut state), BridgeAction::Ignored);
        assert_eq!(
            bridge.handle(&PlayerEvent::QueueEnded, &mut state),
            BridgeAction::Ignored
        );
    }

    #[test]
    fn test_tick_track_change_retriggers() {
        let bridge = EventBridge::default();
        let mut state = running_state(1);

        let tick = PlayerEvent::PlaybackTrackChanged {
            next_track_id: Some("tick".to_string()),
        };
        let other = PlayerEvent::PlaybackTrackChanged {
            next_track_id: Some("song".to_string()),
        };
        let none = PlayerEvent::PlaybackTrackChanged {
            next_track_id: None,
        };

        assert_eq!(bridge.handle(&tick, &mut state), BridgeAction::Retrigger);
        assert_eq!(bridge.handle(&other, &mut state), BridgeAction::Ignored);
        assert_eq!(bridge.handle(&none, &mut state), BridgeAction::Ignored);
        assert_eq!(
            bridge.handle(&PlayerEvent::QueueEnded, &mut state),
            BridgeAction::Retrigger
        );
        assert_eq!(state.cursor.active_index(), INACTIVE);
    }

    #[test]
    fn test_paused_state_does_not_advance() {
        let bridge = EventBridge::new("click");
        let mut state = running_state(2);
        let paused = PlayerEvent::PlaybackStateChanged {
            state: PlayerState::Paused,
        };
        assert_eq!(bridge.handle(&paused, &mut state), BridgeAction::Ignored);
        assert_eq!(bridge.tick_track_id(), "click");
    }
}
