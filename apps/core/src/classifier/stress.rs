//! Stress Classifier - normalized text in, stress level and confidence out.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::loader::{ArtifactProvider, ModelLoader, PreloadedArtifact};
use super::ClassifierArtifact;
use crate::brain::normalize;
use crate::error::AppError;
use crate::models::{ClassificationResult, StressLevel};

/// Estimates a stress level from free text using a trained artifact.
#[derive(Clone)]
pub struct StressClassifier {
    provider: Arc<dyn ArtifactProvider>,
}

impl StressClassifier {
    /// Classifier backed by the newest artifact in the loader's directory
    pub fn new(loader: ModelLoader) -> Self {
        Self {
            provider: Arc::new(loader),
        }
    }

    pub fn with_provider(provider: Arc<dyn ArtifactProvider>) -> Self {
        Self { provider }
    }

    /// Classifier over an in-memory artifact (tests, embedding hosts)
    pub fn with_artifact(artifact: Arc<dyn ClassifierArtifact>) -> Self {
        Self::with_provider(Arc::new(PreloadedArtifact(artifact)))
    }

    /// Forces the artifact to load now rather than on the first prediction.
    pub fn warm_up(&self) -> Result<(), AppError> {
        self.provider.artifact().map(|_| ())
    }

    /// Predicts the stress level of `text`.
    ///
    /// Loader failures propagate unchanged. A label outside 0-2 yields
    /// `StressLevel::Unknown` rather than an error.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn predict(&self, text: &str) -> Result<ClassificationResult, AppError> {
        let artifact = self.provider.artifact()?;

        let processed = normalize(text);
        let label = artifact.predict(&processed);
        let probabilities = artifact.predict_proba(&processed);

        let level = StressLevel::from_label(label);
        if level == StressLevel::Unknown {
            warn!(label, "Classifier returned an unknown label");
        }

        let confidence = confidence_percent(&probabilities);
        info!("Prediction: {} ({}%)", level, confidence);

        Ok(ClassificationResult { level, confidence })
    }
}

/// Highest class probability as a percentage, rounded to two decimals.
pub fn confidence_percent(probabilities: &[f64]) -> f64 {
    let top = probabilities
        .iter()
        .copied()
        .filter(|p| p.is_finite())
        .fold(None, |best: Option<f64>, p| Some(best.map_or(p, |b| b.max(p))));

    match top {
        Some(p) => (p * 100.0 * 100.0).round() / 100.0,
        None => 0.0,
    }
}
