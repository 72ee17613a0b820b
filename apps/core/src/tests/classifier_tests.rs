//! Classifier Module Tests
//!
//! Loader selection and caching against real directories, and the
//! classifier wrapper driven by stub artifacts.

use crate::classifier::artifact::tests::toy_model;
use crate::classifier::{ArtifactProvider, ClassifierArtifact, ModelLoader, StressClassifier};
use crate::error::AppError;
use crate::models::StressLevel;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Artifact returning fixed outputs and recording what it was asked about.
struct StubArtifact {
    label: i64,
    probabilities: Vec<f64>,
    seen: Mutex<Vec<String>>,
}

impl StubArtifact {
    fn new(label: i64, probabilities: &[f64]) -> Self {
        Self {
            label,
            probabilities: probabilities.to_vec(),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl ClassifierArtifact for StubArtifact {
    fn predict(&self, text: &str) -> i64 {
        self.seen.lock().unwrap().push(text.to_string());
        self.label
    }

    fn predict_proba(&self, text: &str) -> Vec<f64> {
        self.seen.lock().unwrap().push(text.to_string());
        self.probabilities.clone()
    }
}

fn write_model(dir: &Path, name: &str) {
    let mut model = toy_model();
    model.model_version = name.to_string();
    model.write_to(&dir.join(name)).unwrap();
}

#[cfg(test)]
mod loader_tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_newest_artifact_is_loaded_and_cached() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), "stress_model_20230101_0000.json");
        thread::sleep(Duration::from_millis(50));
        write_model(dir.path(), "stress_model_20240101_0000.json");

        let loader = ModelLoader::new(dir.path());
        let first = loader.load_latest().unwrap();
        assert_eq!(first.model_version, "stress_model_20240101_0000.json");

        // The cache must not go back to storage
        std::fs::remove_file(dir.path().join("stress_model_20240101_0000.json")).unwrap();
        let second = loader.load_latest().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_provider_hands_out_cached_artifact() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), "stress_model_20240101_0000.json");

        let loader = ModelLoader::new(dir.path());
        let a = loader.artifact().unwrap();
        let b = loader.artifact().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_empty_directory_reports_service_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelLoader::new(dir.path()).load_latest().unwrap_err();
        assert!(matches!(err, AppError::ModelNotFound { .. }));
        assert_eq!(
            err.user_message(),
            "The stress analysis service is currently unavailable. Please try again later."
        );
    }
}

#[cfg(test)]
mod stress_classifier_tests {
    use super::*;

    #[test]
    fn test_stub_label_one_is_moderate_85() {
        let stub = Arc::new(StubArtifact::new(1, &[0.1, 0.85, 0.05]));
        let classifier = StressClassifier::with_artifact(stub.clone());

        let result = classifier.predict("i feel great today").unwrap();
        assert_eq!(result.level, StressLevel::Moderate);
        assert!((result.confidence - 85.0).abs() < 1e-9);
        assert_eq!(stub.seen(), vec!["i feel great today", "i feel great today"]);
    }

    #[test]
    fn test_raw_text_is_normalized_before_prediction() {
        let stub = Arc::new(StubArtifact::new(0, &[0.9, 0.05, 0.05]));
        let classifier = StressClassifier::with_artifact(stub.clone());

        classifier.predict("  I feel GREAT today!!! https://t.co/x 100%").unwrap();
        assert!(stub.seen().iter().all(|t| t == "i feel great today"));
    }

    #[test]
    fn test_out_of_range_label_is_unknown() {
        let stub = Arc::new(StubArtifact::new(7, &[0.2, 0.3, 0.5]));
        let classifier = StressClassifier::with_artifact(stub);

        let result = classifier.predict("whatever this is").unwrap();
        assert_eq!(result.level, StressLevel::Unknown);
        assert!((result.confidence - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_classifier_is_shareable_across_threads() {
        let classifier = StressClassifier::with_artifact(Arc::new(toy_model()));
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let classifier = classifier.clone();
                scope.spawn(move || {
                    assert_eq!(classifier.predict("panic").unwrap().level, StressLevel::High);
                });
            }
        });
    }
}
