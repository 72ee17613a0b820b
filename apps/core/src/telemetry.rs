//! Logging setup.
//!
//! Human-readable events go to stderr; the same events are written as
//! bunyan JSON to `app.log` in the configured log directory. The log file
//! is rotated by size when the process starts, keeping a bounded number of
//! numbered backups (`app.log.1` is the most recent).

use crate::config::AppConfig;
use crate::error::AppError;
use crate::fs_manager::PortablePathManager;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Name of the active log file
pub const LOG_FILENAME: &str = "app.log";

const APP_NAME: &str = "stresschat";

/// Installs the global subscriber. Returns the path of the active log file.
pub fn init(config: &AppConfig) -> Result<PathBuf, AppError> {
    PortablePathManager::ensure_dirs(&[&config.log_dir])?;

    let log_path = config.log_dir.join(LOG_FILENAME);
    rotate_if_needed(&log_path, config.log_max_bytes, config.log_backups)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    Registry::default()
        .with(filter)
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(APP_NAME.to_string(), Mutex::new(file)))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to install tracing subscriber: {}", e)))?;

    info!(log_file = %log_path.display(), "Application started successfully.");
    Ok(log_path)
}

/// Shifts `app.log` -> `app.log.1` -> ... when it has grown past `max_bytes`.
///
/// Backups beyond `backups` are deleted. With `backups == 0` an oversized log
/// is simply truncated away.
pub fn rotate_if_needed(log_path: &Path, max_bytes: u64, backups: usize) -> Result<bool, AppError> {
    let size = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    if size < max_bytes {
        return Ok(false);
    }

    if backups == 0 {
        fs::remove_file(log_path)?;
        return Ok(true);
    }

    let oldest = backup_path(log_path, backups);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }

    for index in (1..backups).rev() {
        let from = backup_path(log_path, index);
        if from.exists() {
            fs::rename(&from, backup_path(log_path, index + 1))?;
        }
    }

    fs::rename(log_path, backup_path(log_path, 1))?;
    Ok(true)
}

fn backup_path(log_path: &Path, index: usize) -> PathBuf {
    let mut name = log_path.as_os_str().to_owned();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, bytes: usize) {
        fs::write(path, vec![b'x'; bytes]).unwrap();
    }

    #[test]
    fn test_small_log_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join(LOG_FILENAME);
        write(&log, 10);

        assert!(!rotate_if_needed(&log, 100, 5).unwrap());
        assert!(log.exists());
        assert!(!dir.path().join("app.log.1").exists());
    }

    #[test]
    fn test_missing_log_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!rotate_if_needed(&dir.path().join(LOG_FILENAME), 100, 5).unwrap());
    }

    #[test]
    fn test_rotation_shifts_backups_and_drops_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join(LOG_FILENAME);
        write(&log, 200);
        write(&dir.path().join("app.log.1"), 1);
        write(&dir.path().join("app.log.2"), 2);

        assert!(rotate_if_needed(&log, 100, 2).unwrap());

        assert!(!log.exists());
        assert_eq!(fs::metadata(dir.path().join("app.log.1")).unwrap().len(), 200);
        assert_eq!(fs::metadata(dir.path().join("app.log.2")).unwrap().len(), 1);
        assert!(!dir.path().join("app.log.3").exists());
    }

    #[test]
    fn test_zero_backups_discards_oversized_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join(LOG_FILENAME);
        write(&log, 200);

        assert!(rotate_if_needed(&log, 100, 0).unwrap());
        assert!(!log.exists());
        assert!(!dir.path().join("app.log.1").exists());
    }
}
