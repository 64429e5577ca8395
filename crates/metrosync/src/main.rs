//! metrosync - terminal metronome
//!
//! Plays a simulated click loop and prints a beat indicator that follows the
//! player's events. Commands are read line by line from stdin.

mod display;
mod input;
mod logging_setup;

use anyhow::{Context, Result};
use clap::Parser;
use input::Input;
use metrosync_control::{AudioPlayer, Metronome, SimulatedPlayer, Snapshot};
use metrosync_core::{MetronomeConfig, SubdivisionPreset};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "metrosync", version, about = "Visual metronome synchronized to audio playback")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial tempo (30-300)
    #[arg(long)]
    bpm: Option<u32>,

    /// Initial subdivision preset (4, 3, 8 or 16)
    #[arg(long)]
    preset: Option<SubdivisionPreset>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Length of the simulated click sample at rate 1.0
    #[arg(long, default_value_t = 1000)]
    sample_length_ms: u64,
}

impl Cli {
    fn load_config(&self) -> Result<MetronomeConfig> {
        let mut config = match &self.config {
            Some(path) => MetronomeConfig::load(path)
                .with_context(|| format!("Failed to load config {:?}", path))?,
            None => MetronomeConfig::default(),
        };

        if let Some(bpm) = self.bpm {
            config.default_bpm = bpm;
        }
        if let Some(preset) = self.preset {
            config.default_preset = preset;
        }
        if let Some(level) = &self.log_level {
            config.log.level = level.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    let _log_guard = logging_setup::init(&config.log)?;

    info!("metrosync {} starting", env!("CARGO_PKG_VERSION"));
    debug!("Config: {:?}", config);

    let sample_length = Duration::from_millis(cli.sample_length_ms.max(1));
    let player = Arc::new(SimulatedPlayer::new(sample_length));
    let (handle, engine) = Metronome::spawn(Arc::clone(&player) as Arc<dyn AudioPlayer>, &config);
    let renderer = tokio::spawn(render_loop(handle.subscribe()));

    println!("{}", input::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut failing = false;
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                None
            }
        };
        let Some(line) = line else { break };

        let Some(command) = input::parse(&line) else {
            warn!("Unknown command {:?}", line.trim());
            println!("{}", input::HELP);
            continue;
        };

        let sent = match command {
            Input::Toggle => handle.toggle().await,
            Input::Faster => handle.increase_bpm().await,
            Input::Slower => handle.decrease_bpm().await,
            Input::Preset(preset) => handle.set_subdivisions(preset).await,
            Input::ToggleFailure => {
                failing = !failing;
                player.set_failing(failing);
                info!("Simulated device failure {}", if failing { "on" } else { "off" });
                Ok(())
            }
            Input::Quit => break,
        };

        if let Err(e) = sent {
            error!("{}", e);
            break;
        }
    }

    if let Err(e) = handle.shutdown().await {
        debug!("Engine already gone: {}", e);
    }
    engine.await.context("Metronome task failed")?;
    renderer.await.context("Renderer task failed")?;

    info!("metrosync exited");
    Ok(())
}

/// Print a line whenever the indicator changes; ends with the engine.
async fn render_loop(mut snapshots: watch::Receiver<Snapshot>) {
    let mut last = String::new();
    loop {
        let line = display::render(&snapshots.borrow_and_update());
        if line != last {
            println!("{}", line);
            last = line;
        }
        if snapshots.changed().await.is_err() {
            break;
        }
    }
}
