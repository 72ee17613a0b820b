//! Model Loader - finds and caches the newest stress model artifact.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::SystemTime;
use tracing::{info, instrument};

use super::artifact::{ClassifierArtifact, StressModel};
use crate::error::AppError;

/// File name pattern of versioned artifacts
pub const MODEL_FILE_PATTERN: &str = "stress_model_*.json";

/// Source of the artifact used by the classifier.
pub trait ArtifactProvider: Send + Sync {
    fn artifact(&self) -> Result<Arc<dyn ClassifierArtifact>, AppError>;
}

/// Loads the newest artifact from a directory once and keeps it for the
/// lifetime of the loader.
pub struct ModelLoader {
    model_dir: PathBuf,
    cached: OnceLock<Arc<StressModel>>,
    /// Serializes the check-then-load so concurrent first callers share one load
    init_guard: Mutex<()>,
}

impl ModelLoader {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            cached: OnceLock::new(),
            init_guard: Mutex::new(()),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Whether an artifact has already been loaded.
    pub fn is_loaded(&self) -> bool {
        self.cached.get().is_some()
    }

    /// Returns the cached model, loading the newest artifact on first use.
    ///
    /// Failures are not cached: a later call scans the directory again.
    pub fn load_latest(&self) -> Result<Arc<StressModel>, AppError> {
        if let Some(model) = self.cached.get() {
            return Ok(Arc::clone(model));
        }

        // A poisoned guard only means another loader thread panicked; the cell is still consistent
        let _guard = self
            .init_guard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(model) = self.cached.get() {
            return Ok(Arc::clone(model));
        }

        let model = Arc::new(self.load_from_disk()?);
        Ok(Arc::clone(self.cached.get_or_init(|| model)))
    }

    #[instrument(skip(self), fields(model_dir = %self.model_dir.display()))]
    fn load_from_disk(&self) -> Result<StressModel, AppError> {
        let path = find_latest_artifact(&self.model_dir)?;
        info!(
            "Loading model: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );
        let model = StressModel::read_from(&path)?;
        info!(
            version = %model.model_version,
            features = model.vectorizer.n_features(),
            "Model loaded"
        );
        Ok(model)
    }
}

impl ArtifactProvider for ModelLoader {
    fn artifact(&self) -> Result<Arc<dyn ClassifierArtifact>, AppError> {
        let model: Arc<dyn ClassifierArtifact> = self.load_latest()?;
        Ok(model)
    }
}

/// Provider over an artifact that is already in memory.
pub struct PreloadedArtifact(pub Arc<dyn ClassifierArtifact>);

impl ArtifactProvider for PreloadedArtifact {
    fn artifact(&self) -> Result<Arc<dyn ClassifierArtifact>, AppError> {
        Ok(Arc::clone(&self.0))
    }
}

/// Picks the artifact with the newest creation time in `dir`.
///
/// Falls back to modification time where the filesystem does not record
/// creation time; equal timestamps are ordered by file name.
pub fn find_latest_artifact(dir: &Path) -> Result<PathBuf, AppError> {
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped_dir).join(MODEL_FILE_PATTERN);
    let pattern = pattern.to_string_lossy();

    let mut candidates: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in glob::glob(&pattern)? {
        // Unreadable or vanished entries are skipped like missing ones
        let Ok(path) = entry else { continue };
        let Ok(meta) = std::fs::metadata(&path) else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let stamp = meta
            .created()
            .or_else(|_| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        candidates.push((stamp, path));
    }

    candidates
        .into_iter()
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, path)| path)
        .ok_or_else(|| AppError::ModelNotFound {
            dir: dir.to_path_buf(),
        })
}
