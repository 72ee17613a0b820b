use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// User-facing text shown when the classifier cannot be used.
pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "The stress analysis service is currently unavailable. Please try again later.";

/// Application-wide error type, consolidating all possible errors into a single enum.
#[derive(Debug, Error)]
pub enum AppError {
    /// No trained classifier artifact exists in the configured model directory.
    #[error("No trained stress model found in {}", dir.display())]
    ModelNotFound { dir: PathBuf },

    /// An artifact was found but could not be read or deserialized.
    #[error("Failed to load model artifact {}: {reason}", path.display())]
    ArtifactLoad { path: PathBuf, reason: String },

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Represents data validation errors (e.g., invalid input format).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents configuration-related errors (e.g., malformed environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Training could not produce a model from the supplied samples.
    #[error("Training error: {0}")]
    Training(String),
}

impl AppError {
    /// Whether the error means the classifier itself is unusable.
    pub fn is_model_unavailable(&self) -> bool {
        matches!(
            self,
            AppError::ModelNotFound { .. } | AppError::ArtifactLoad { .. }
        )
    }

    /// Text suitable for showing to the person chatting.
    pub fn user_message(&self) -> String {
        if self.is_model_unavailable() {
            SERVICE_UNAVAILABLE_MESSAGE.to_string()
        } else {
            match self {
                AppError::Validation(msg) => msg.clone(),
                _ => "Something went wrong. Please try again.".to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Config(format!("Validation errors: {}", err))
    }
}

impl From<glob::PatternError> for AppError {
    fn from(err: glob::PatternError) -> Self {
        AppError::Config(format!("Invalid model file pattern: {}", err))
    }
}
