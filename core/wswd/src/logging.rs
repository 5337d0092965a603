//! Logging setup.
//!
//! Errors and warnings go to stderr (filter from `WSWD_LOG`, default `warn`).
//! With `WSWD_DEBUG_LOG=1`, debug output is also appended to a daily log file
//! under the user state directory. Never inside the store: `clean` would
//! delete it.

use std::env;
use std::io;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_ENV: &str = "WSWD_LOG";
const DEBUG_LOG_ENV: &str = "WSWD_DEBUG_LOG";
const LOG_DIR_NAME: &str = "wswd-logs";
const LOG_FILE_NAME: &str = "wswd.log";

/// Installs the global subscriber. Keep the guard alive until exit so
/// buffered file output is flushed.
pub fn init() -> Option<WorkerGuard> {
    let stderr_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .with_filter(stderr_filter);

    let (file_layer, guard) = match debug_log_dir() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new("debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    guard
}

fn debug_enabled() -> bool {
    env::var(DEBUG_LOG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false)
}

fn debug_log_dir() -> Option<PathBuf> {
    if !debug_enabled() {
        return None;
    }
    let dir = dirs::state_dir()
        .or_else(dirs::cache_dir)?
        .join(LOG_DIR_NAME);
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}
