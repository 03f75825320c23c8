// src/logging.rs
// =============================================================================
// Logging setup: every event goes both to stdout and to a date-stamped file
// (log-<d>-<m>-<yyyy>.log) that is appended to across runs on the same day.
//
// RUST_LOG overrides the default filter, e.g. RUST_LOG=app_frontier=debug.
// =============================================================================

use crate::store::date_stamp;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "app_frontier=info";

pub fn log_file_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("log-{}.log", date_stamp(date)))
}

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer when dropped, so keep it alive
/// until the program exits.
pub fn init(dir: &Path, date: NaiveDate, verbose: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let path = log_file_path(dir, date);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    let env_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if verbose {
                EnvFilter::new("app_frontier=debug")
            } else {
                EnvFilter::new(DEFAULT_FILTER)
            }
        })
    };

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(env_filter());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_filter(env_filter());

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(guard)
}
