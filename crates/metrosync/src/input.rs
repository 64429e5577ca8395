//! Line-oriented command input

use metrosync_core::SubdivisionPreset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Toggle,
    Faster,
    Slower,
    Preset(SubdivisionPreset),
    /// Flip the simulated device failure switch
    ToggleFailure,
    Quit,
}

/// Parse one line typed by the user. Empty lines toggle playback.
pub fn parse(line: &str) -> Option<Input> {
    let line = line.trim();
    match line {
        "" | "t" | "T" => Some(Input::Toggle),
        "+" | "=" => Some(Input::Faster),
        "-" | "_" => Some(Input::Slower),
        "f" | "F" => Some(Input::ToggleFailure),
        "q" | "Q" | "quit" | "exit" => Some(Input::Quit),
        other => other.parse().ok().map(Input::Preset),
    }
}

pub const HELP: &str =
    "Enter: start/stop | + / - : tempo | 4 3 8 16 : subdivisions | f : fail device | q : quit";
