//! Playback-rate calculation
//!
//! The click sample is one second long at rate 1.0, so playing it
//! `subdivisions * bpm / 60` times faster yields one click per subdivision.

use crate::error::{MetronomeError, Result};

/// Seconds in one minute
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Map a tempo and subdivision count to a playback-rate multiplier.
///
/// Returns [`MetronomeError::InvalidTempo`] when either input is zero rather
/// than dividing by zero.
pub fn compute_rate(bpm: u32, subdivisions: u32) -> Result<f64> {
    let invalid = || MetronomeError::InvalidTempo { bpm, subdivisions };
    if bpm == 0 || subdivisions == 0 {
        return Err(invalid());
    }

    let beat_duration = SECONDS_PER_MINUTE / f64::from(bpm);
    let tick_interval = beat_duration / f64::from(subdivisions);
    let rate = 1.0 / tick_interval;

    if !rate.is_finite() || rate <= 0.0 {
        return Err(invalid());
    }
    Ok(rate)
}
