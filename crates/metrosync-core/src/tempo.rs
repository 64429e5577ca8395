//! Tempo model: beats per minute and beat subdivisions

use crate::error::{MetronomeError, Result};
use crate::rate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Slowest supported tempo
pub const MIN_BPM: u32 = 30;
/// Fastest supported tempo
pub const MAX_BPM: u32 = 300;
/// Tempo used when nothing else is configured
pub const DEFAULT_BPM: u32 = 60;

/// Smallest subdivision count
pub const MIN_SUBDIVISIONS: u32 = 1;
/// Largest subdivision count
pub const MAX_SUBDIVISIONS: u32 = 4;

/// The four fixed subdivision presets offered to the user.
///
/// The labels are what the button row shows; [`SubdivisionPreset::count`] is
/// what the rate math uses. The labels do not describe the counts (`8` means
/// two subdivisions, `16` means four), so only the counts are authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SubdivisionPreset {
    /// Label `4`, one subdivision per beat
    #[default]
    #[serde(rename = "4")]
    Four,
    /// Label `3`, three subdivisions per beat
    #[serde(rename = "3")]
    Three,
    /// Label `8`, two subdivisions per beat
    #[serde(rename = "8")]
    Eight,
    /// Label `16`, four subdivisions per beat
    #[serde(rename = "16")]
    Sixteen,
}

impl SubdivisionPreset {
    /// Presets in button order
    pub const ALL: [Self; 4] = [Self::Four, Self::Three, Self::Eight, Self::Sixteen];

    /// Number of subdivision boxes this preset lights up per beat
    pub const fn count(self) -> u32 {
        match self {
            Self::Four => 1,
            Self::Three => 3,
            Self::Eight => 2,
            Self::Sixteen => 4,
        }
    }

    /// Button label
    pub const fn label(self) -> &'static str {
        match self {
            Self::Four => "4",
            Self::Three => "3",
            Self::Eight => "8",
            Self::Sixteen => "16",
        }
    }

    /// Preset whose count matches `count` after clamping to the valid range
    pub fn from_count(count: u32) -> Self {
        match count.clamp(MIN_SUBDIVISIONS, MAX_SUBDIVISIONS) {
            1 => Self::Four,
            2 => Self::Eight,
            3 => Self::Three,
            _ => Self::Sixteen,
        }
    }

    /// Preset for a button label, if any
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label.trim())
    }
}

impl fmt::Display for SubdivisionPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for SubdivisionPreset {
    type Err = MetronomeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s).ok_or_else(|| {
            MetronomeError::Config(format!(
                "Unknown subdivision preset '{}', expected one of 4, 3, 8, 16",
                s
            ))
        })
    }
}

/// Current tempo and subdivision count.
///
/// Both fields are kept inside their valid ranges by every mutator; out of
/// range requests saturate at the nearest bound instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoSetting {
    bpm: u32,
    subdivisions: u32,
}

impl Default for TempoSetting {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            subdivisions: SubdivisionPreset::default().count(),
        }
    }
}

impl TempoSetting {
    /// Create a tempo setting, clamping both values
    pub fn new(bpm: u32, subdivisions: u32) -> Self {
        Self {
            bpm: clamp_bpm(bpm),
            subdivisions: clamp_subdivisions(subdivisions),
        }
    }

    /// Current beats per minute
    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    /// Current subdivision count (1..=4)
    pub fn subdivisions(&self) -> u32 {
        self.subdivisions
    }

    /// Preset matching the current subdivision count
    pub fn preset(&self) -> SubdivisionPreset {
        SubdivisionPreset::from_count(self.subdivisions)
    }

    /// Raise the tempo by one BPM. Returns `true` if the value changed.
    pub fn increase_bpm(&mut self) -> bool {
        self.set_bpm(self.bpm.saturating_add(1))
    }

    /// Lower the tempo by one BPM. Returns `true` if the value changed.
    pub fn decrease_bpm(&mut self) -> bool {
        self.set_bpm(self.bpm.saturating_sub(1))
    }

    /// Set the tempo, saturating at [`MIN_BPM`] and [`MAX_BPM`].
    /// Returns `true` if the value changed.
    pub fn set_bpm(&mut self, bpm: u32) -> bool {
        let bpm = clamp_bpm(bpm);
        let changed = bpm != self.bpm;
        self.bpm = bpm;
        changed
    }

    /// Select a subdivision preset. Returns `true` if the count changed.
    pub fn set_subdivisions(&mut self, preset: SubdivisionPreset) -> bool {
        self.set_subdivision_count(preset.count())
    }

    /// Set the subdivision count directly, clamped to 1..=4.
    /// Returns `true` if the count changed.
    pub fn set_subdivision_count(&mut self, count: u32) -> bool {
        let count = clamp_subdivisions(count);
        let changed = count != self.subdivisions;
        self.subdivisions = count;
        changed
    }

    /// Playback-rate multiplier for the audio engine
    pub fn playback_rate(&self) -> Result<f64> {
        rate::compute_rate(self.bpm, self.subdivisions)
    }
}

fn clamp_bpm(bpm: u32) -> u32 {
    bpm.clamp(MIN_BPM, MAX_BPM)
}

fn clamp_subdivisions(count: u32) -> u32 {
    count.clamp(MIN_SUBDIVISIONS, MAX_SUBDIVISIONS)
}
