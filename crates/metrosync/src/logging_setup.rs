use anyhow::{Context, Result};
use metrosync_core::LogConfig;
use std::fs::File;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Handle to keep the logging worker thread alive
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` overrides the configured level. Console output goes to stderr
/// so it does not interleave with the beat display on stdout.
pub fn init(config: &LogConfig) -> Result<Option<LogGuard>> {
    config
        .ensure_log_directory()
        .context("Failed to create log directory")?;

    if config.file_output {
        if let Err(e) = config.cleanup_old_logs() {
            eprintln!("Warning: could not prune old metrosync logs: {}", e);
        }
    }

    let filter = EnvFilter::builder()
        .with_default_directive(config.parse_level().into())
        .from_env_lossy();

    let console_layer = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
            .with_filter(filter.clone())
    });

    let mut guard = None;
    let file_layer = if config.file_output {
        let path = config.current_log_path();
        let file = File::create(&path)
            .with_context(|| format!("Failed to create log file: {:?}", path))?;
        let (writer, worker) = tracing_appender::non_blocking(file);
        guard = Some(LogGuard { _guard: worker });

        Some(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::debug!("Logging initialized at level {}", config.level);
    if config.file_output {
        tracing::info!("Writing log to {:?}", config.current_log_path());
    }

    Ok(guard)
}
