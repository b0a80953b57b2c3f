//! Tracing setup.
//!
//! The TUI owns the terminal, so interactive runs log to a file; listing
//! modes log to stderr. `RUST_LOG` overrides the default `info` filter.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// `<data_local_dir>/user-admin/user-admin.log`, falling back to the temp dir.
pub fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("user-admin")
        .join("user-admin.log")
}

/// Non-blocking appender for `path`, creating its directory first.
fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let name = path
        .file_name()
        .with_context(|| format!("log path {} has no file name", path.display()))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create log directory {}", dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .with_context(|| format!("open log file {}", path.display()))?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber. The returned guard flushes the log file
/// when dropped and must live until the program ends.
pub fn init(interactive: bool, log_file: Option<PathBuf>) -> Result<Option<WorkerGuard>> {
    if !interactive {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("init logging: {e}"))?;
        return Ok(None);
    }

    let path = log_file.unwrap_or_else(default_log_path);
    let (writer, guard) = match file_writer(&path) {
        Ok(pair) => pair,
        Err(e) => {
            // Printed before the TUI takes the screen, so it is still visible on exit.
            eprintln!("warning: logging disabled: {e:#}");
            return Ok(None);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("init logging: {e}"))?;
    tracing::info!(path = %path.display(), "logging to file");
    Ok(Some(guard))
}
