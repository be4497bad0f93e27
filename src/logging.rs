use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::persistence::log_file_path;

const LOG_ENV: &str = "LOCATOR_LOG";

/// Route tracing output to the log file; the terminal belongs to the UI.
pub(crate) fn init_logging() -> io::Result<()> {
    match log_file_path() {
        Some(path) => init_logging_to(&path),
        None => Ok(()),
    }
}

fn init_logging_to(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| io::Error::other(format!("install log subscriber: {e}")))?;
    tracing::info!(log = %path.display(), "logging initialized");
    Ok(())
}
