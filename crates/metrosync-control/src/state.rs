//! Engine state owned by the metronome actor

use crate::sequencer::{Sequencer, TempoChange, TransportState};
use metrosync_core::{BeatCursor, MetronomeError, SubdivisionPreset, TempoSetting};

/// Everything the metronome actor mutates.
///
/// Owned by exactly one task and passed by reference to the sequencer and
/// the event bridge.
#[derive(Debug, Default)]
pub struct EngineState {
    pub tempo: TempoSetting,
    pub cursor: BeatCursor,
    pub sequencer: Sequencer,
    /// Player setup has completed
    pub ready: bool,
    /// Last error surfaced for display
    pub status: Option<MetronomeError>,
}

impl EngineState {
    pub fn new(tempo: TempoSetting) -> Self {
        Self {
            tempo,
            ..Default::default()
        }
    }

    /// Apply a tempo edit to the model. Always clears the cursor, even when
    /// the value saturated and did not change.
    pub fn apply_tempo_change(&mut self, change: TempoChange) -> bool {
        let changed = change.apply(&mut self.tempo);
        self.cursor.reset();
        changed
    }

    /// Surface an error for display
    pub fn report(&mut self, err: MetronomeError) {
        self.status = Some(err);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            bpm: self.tempo.bpm(),
            subdivisions: self.tempo.subdivisions(),
            preset: self.tempo.preset(),
            active_index: self.cursor.active_index(),
            running: self.sequencer.is_running(),
            transport: self.sequencer.state(),
            ready: self.ready,
            status: self.status.clone(),
        }
    }
}

/// Read-only view published to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub bpm: u32,
    pub subdivisions: u32,
    pub preset: SubdivisionPreset,
    pub active_index: i32,
    /// Playback intent
    pub running: bool,
    pub transport: TransportState,
    pub ready: bool,
    pub status: Option<MetronomeError>,
}

impl Default for Snapshot {
    fn default() -> Self {
        EngineState::default().snapshot()
    }
}
