//! Logging initialization for reportflow.
//!
//! Logs go to stderr unless `logging.to_file` is set, in which case they are
//! written to `{state}/logs/reportflow-{datetime}.log`.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Result of logging initialization
pub struct LoggingHandle {
    /// Flushes buffered file logs when dropped; keep alive until exit
    pub _guard: Option<WorkerGuard>,

    /// Path to the log file (only set with file logging enabled)
    pub log_file_path: Option<PathBuf>,
}

/// Build the log file name for a start time
pub fn log_file_name(timestamp: chrono::DateTime<chrono::Utc>) -> String {
    format!("reportflow-{}.log", timestamp.format("%Y%m%dT%H%M%SZ"))
}

/// Filter directive: `RUST_LOG`, then `--debug`, then `logging.level`
pub fn filter_directive(config: &Config, debug_override: bool, rust_log: Option<String>) -> String {
    match rust_log {
        Some(directive) if !directive.trim().is_empty() => directive,
        _ if debug_override => "debug".to_string(),
        _ => config.logging.level.clone(),
    }
}

fn file_writer(config: &Config) -> Result<(NonBlocking, WorkerGuard, PathBuf)> {
    let logs_dir = config.logs_path();
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let log_filename = log_file_name(chrono::Utc::now());
    let log_file_path = logs_dir.join(&log_filename);
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&logs_dir, &log_filename));
    Ok((writer, guard, log_file_path))
}

/// Install the global subscriber
pub fn init_logging(config: &Config, debug_override: bool) -> Result<LoggingHandle> {
    let directive = filter_directive(config, debug_override, std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter '{}'", directive))?;

    let (file_layer, guard, log_file_path) = if config.logging.to_file {
        let (writer, guard, path) = file_writer(config)?;
        let layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer);
        (Some(layer), Some(guard), Some(path))
    } else {
        (None, None, None)
    };

    let stderr_layer = file_layer.is_none().then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(LoggingHandle {
        _guard: guard,
        log_file_path,
    })
}
