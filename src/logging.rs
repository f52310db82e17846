use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Opens `log_file` for appending, creating its directory if needed.
///
/// The file is never rotated or truncated; each run adds to the end.
pub fn open_log_file(log_file: &Path) -> Result<RollingFileAppender> {
    let directory = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = log_file
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", log_file.display()))?;

    if !directory.exists() {
        fs::create_dir_all(directory)
            .with_context(|| format!("Failed to create log directory: {}", directory.display()))?;
    }

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))
}

/// Setup logging to an append-only file.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` with
/// `verbose`. The returned guard must be held until the program exits so
/// buffered lines get flushed.
pub fn setup_logging(log_file: &Path, verbose: bool) -> Result<WorkerGuard> {
    let file_appender = open_log_file(log_file)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    tracing::info!(
        "Logging initialized: file={}, verbose={}",
        log_file.display(),
        verbose
    );

    Ok(guard)
}
