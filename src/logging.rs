//! File logging. The terminal belongs to the UI, so events go to
//! `<data_dir>/journal.log` instead of stderr.

use crate::error::LoggingError;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "journal.log";

/// Installs the global subscriber. `RUST_LOG` overrides `level` when set.
pub fn init_logging(log_dir: &Path, level: &str) -> Result<PathBuf, LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    let path = log_dir.join(LOG_FILE_NAME);
    let file = fs::create_dir_all(log_dir)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(&path))
        .map_err(|source| LoggingError::Io {
            path: path.clone(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| LoggingError::AlreadyInitialized(err.to_string()))?;

    Ok(path)
}
