// src/log.rs
use std::path::Path;

use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::file::ensure_directory;

/// Log file for today's date: `<log_dir>/YYYYMMDD.log`.
/// All subcommands of one day append to the same file.
pub fn log_file_name() -> String {
    format!("{}.log", Local::now().format("%Y%m%d"))
}

/// Install stderr + daily file logging. `component` tags every line
/// (`fetch`, `month`, `transcribe`, `run`).
///
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init(log_dir: &Path, component: &'static str) -> crate::Result<WorkerGuard> {
    ensure_directory(log_dir)?;
    let appender = tracing_appender::rolling::never(log_dir, log_file_name());
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    // A second init in the same process keeps the first subscriber.
    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
    {
        tracing::debug!("subscriber not installed: {e}");
    }

    tracing::info!(component, "logging to {}", log_dir.join(log_file_name()).display());
    Ok(guard)
}
