//! Runtime configuration.
//!
//! Values come from the environment (optionally seeded from a `.env` file)
//! and fall back to the portable data layout.

use crate::error::AppError;
use crate::fs_manager::PortablePathManager;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use validator::Validate;

pub const ENV_MODEL_DIR: &str = "STRESSCHAT_MODEL_DIR";
pub const ENV_LOG_DIR: &str = "STRESSCHAT_LOG_DIR";
pub const ENV_ESCALATION_WINDOW: &str = "STRESSCHAT_ESCALATION_WINDOW";
pub const ENV_ESCALATION_THRESHOLD: &str = "STRESSCHAT_ESCALATION_THRESHOLD";
pub const ENV_LOG_MAX_BYTES: &str = "STRESSCHAT_LOG_MAX_BYTES";
pub const ENV_LOG_BACKUPS: &str = "STRESSCHAT_LOG_BACKUPS";

/// Application configuration shared by the binary and the pipeline components.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// Directory scanned for `stress_model_*.json` artifacts.
    pub model_dir: PathBuf,
    /// Directory holding `app.log` and its rotated siblings.
    pub log_dir: PathBuf,
    /// Number of most recent user messages inspected for escalation.
    #[validate(range(min = 1, max = 50))]
    pub escalation_window: usize,
    /// Negative messages within the window that trigger escalation.
    #[validate(range(min = 1, max = 50))]
    pub escalation_threshold: usize,
    /// Size at which `app.log` is rotated on startup.
    #[validate(range(min = 1024))]
    pub log_max_bytes: u64,
    /// Rotated log files kept.
    #[validate(range(max = 100))]
    pub log_backups: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_dir: PortablePathManager::models_dir(),
            log_dir: PortablePathManager::logs_dir(),
            escalation_window: 6,
            escalation_threshold: 3,
            log_max_bytes: 10 * 1024,
            log_backups: 5,
        }
    }
}

impl AppConfig {
    /// Loads `.env` (if any) and then reads the environment.
    pub fn load() -> Result<Self, AppError> {
        // A missing .env file is the normal case
        let _ = dotenv::dotenv();
        Self::from_env()
    }

    /// Builds the configuration from environment variables over the defaults.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let config = Self {
            model_dir: env_path(ENV_MODEL_DIR).unwrap_or(defaults.model_dir),
            log_dir: env_path(ENV_LOG_DIR).unwrap_or(defaults.log_dir),
            escalation_window: env_parse(ENV_ESCALATION_WINDOW)?
                .unwrap_or(defaults.escalation_window),
            escalation_threshold: env_parse(ENV_ESCALATION_THRESHOLD)?
                .unwrap_or(defaults.escalation_threshold),
            log_max_bytes: env_parse(ENV_LOG_MAX_BYTES)?.unwrap_or(defaults.log_max_bytes),
            log_backups: env_parse(ENV_LOG_BACKUPS)?.unwrap_or(defaults.log_backups),
        };

        config.check()?;
        Ok(config)
    }

    /// Validates ranges and cross-field constraints.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        if self.escalation_threshold > self.escalation_window {
            return Err(AppError::Config(format!(
                "escalation threshold ({}) cannot exceed the escalation window ({})",
                self.escalation_threshold, self.escalation_window
            )));
        }
        Ok(())
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

fn env_parse<T>(key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::Config(format!("{} = {:?}: {}", key, raw, e))),
        _ => Ok(None),
    }
}
