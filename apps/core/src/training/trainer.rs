//! Model fitting and versioned persistence.
//!
//! Fits a TF-IDF vocabulary and a class-balanced multinomial logistic
//! regression with full-batch gradient descent, then writes the artifact and
//! its metrics record into the model directory.

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use validator::Validate;

use super::dataset::{class_counts, stratified_split, LabeledText};
use super::evaluation::{evaluate, EvaluationReport, MetricsRecord};
use crate::classifier::artifact::{analyze_terms, softmax, SparseRow};
use crate::classifier::{LogisticRegression, StressModel, TfidfVectorizer};
use crate::error::AppError;
use crate::fs_manager::PortablePathManager;

/// Name of the metrics record written next to the artifacts
pub const METRICS_FILENAME: &str = "metrics.json";

const MODEL_NAME: &str = "stress_model";

/// Hyper-parameters for a training run
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrainingConfig {
    /// Vocabulary size cap, most frequent terms kept
    #[validate(range(min = 1))]
    pub max_features: usize,
    /// Smallest and largest n-gram size
    pub ngram_range: (usize, usize),
    /// Drop English stop words
    pub stop_words: bool,
    /// Inverse regularization strength
    #[validate(range(min = 0.000001))]
    pub c: f64,
    #[validate(range(min = 1))]
    pub max_iter: usize,
    #[validate(range(min = 0.000001, max = 10.0))]
    pub learning_rate: f64,
    /// Stop once every gradient component is below this
    #[validate(range(min = 0.0))]
    pub tolerance: f64,
    /// Share of each class held out for evaluation
    #[validate(range(min = 0.01, max = 0.99))]
    pub test_ratio: f64,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_features: 10_000,
            ngram_range: (1, 2),
            stop_words: true,
            c: 1.0,
            max_iter: 1000,
            learning_rate: 0.5,
            tolerance: 1e-5,
            test_ratio: 0.2,
            seed: 42,
        }
    }
}

/// Paths written by [`save_versioned`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedModel {
    pub model_path: PathBuf,
    pub metrics_path: PathBuf,
}

/// Result of [`Trainer::train_and_save`]
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub saved: SavedModel,
    pub report: EvaluationReport,
}

/// Fits stress models from labelled text.
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Result<Self, AppError> {
        config
            .validate()
            .map_err(|e| AppError::Training(format!("invalid training config: {}", e)))?;
        let (min_n, max_n) = config.ngram_range;
        if min_n == 0 || max_n < min_n {
            return Err(AppError::Training(format!(
                "invalid n-gram range ({}, {})",
                min_n, max_n
            )));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Fits vectorizer and classifier on all of `samples`.
    #[instrument(skip(self, samples), fields(samples = samples.len()))]
    pub fn fit(&self, samples: &[LabeledText]) -> Result<StressModel, AppError> {
        if samples.is_empty() {
            return Err(AppError::Training("no training samples".to_string()));
        }

        let counts = class_counts(samples);
        if counts.len() < 2 {
            return Err(AppError::Training(format!(
                "need at least two classes, found {:?}",
                counts.keys().collect::<Vec<_>>()
            )));
        }

        let vectorizer = self.fit_vectorizer(samples);
        if vectorizer.n_features() == 0 {
            return Err(AppError::Training(
                "no usable terms in training samples".to_string(),
            ));
        }

        let rows: Vec<SparseRow> = samples.iter().map(|s| vectorizer.transform(&s.text)).collect();
        let labels: Vec<i64> = samples.iter().map(|s| s.label).collect();
        let classifier = self.fit_classifier(&rows, &labels, &counts, vectorizer.n_features());

        info!(
            features = vectorizer.n_features(),
            classes = classifier.classes.len(),
            "Model fitted"
        );

        Ok(StressModel {
            model_version: String::new(),
            trained_at: Utc::now(),
            vectorizer,
            classifier,
        })
    }

    fn fit_vectorizer(&self, samples: &[LabeledText]) -> TfidfVectorizer {
        let range = self.config.ngram_range;
        let mut term_frequency: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for sample in samples {
            let terms = analyze_terms(&sample.text, range, self.config.stop_words);
            let mut seen = HashSet::new();
            for term in terms {
                *term_frequency.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.clone()) {
                    *document_frequency.entry(term).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(String, usize)> = term_frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.config.max_features);

        let selected: BTreeSet<String> = ranked.into_iter().map(|(term, _)| term).collect();
        let n_docs = samples.len() as f64;

        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(selected.len());
        for (column, term) in selected.into_iter().enumerate() {
            let df = document_frequency.get(&term).copied().unwrap_or(0) as f64;
            idf.push(((1.0 + n_docs) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term, column);
        }

        TfidfVectorizer {
            ngram_range: range,
            stop_words: self.config.stop_words,
            vocabulary,
            idf,
        }
    }

    fn fit_classifier(
        &self,
        rows: &[SparseRow],
        labels: &[i64],
        counts: &BTreeMap<i64, usize>,
        n_features: usize,
    ) -> LogisticRegression {
        let classes: Vec<i64> = counts.keys().copied().collect();
        let class_index: HashMap<i64, usize> =
            classes.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        let n_samples = rows.len() as f64;
        let n_classes = classes.len();

        // Balanced weights: n_samples / (n_classes * count)
        let sample_weights: Vec<f64> = labels
            .iter()
            .map(|label| n_samples / (n_classes as f64 * counts[label] as f64))
            .collect();
        let weight_total: f64 = sample_weights.iter().sum();
        let l2 = 1.0 / (self.config.c * n_samples);

        let mut model = LogisticRegression {
            classes: classes.clone(),
            coef: vec![vec![0.0; n_features]; n_classes],
            intercept: vec![0.0; n_classes],
        };

        for iteration in 0..self.config.max_iter {
            let mut grad_coef = vec![vec![0.0; n_features]; n_classes];
            let mut grad_intercept = vec![0.0; n_classes];

            for ((row, label), weight) in rows.iter().zip(labels).zip(&sample_weights) {
                let probabilities = softmax(&model.decision_function(row));
                let target = class_index[label];
                for (k, p) in probabilities.iter().enumerate() {
                    let indicator = if k == target { 1.0 } else { 0.0 };
                    let delta = weight * (p - indicator) / weight_total;
                    grad_intercept[k] += delta;
                    for &(column, value) in row {
                        grad_coef[k][column] += delta * value;
                    }
                }
            }

            let mut max_gradient: f64 = 0.0;
            for k in 0..n_classes {
                for j in 0..n_features {
                    let g = grad_coef[k][j] + l2 * model.coef[k][j];
                    max_gradient = max_gradient.max(g.abs());
                    model.coef[k][j] -= self.config.learning_rate * g;
                }
                max_gradient = max_gradient.max(grad_intercept[k].abs());
                model.intercept[k] -= self.config.learning_rate * grad_intercept[k];
            }

            if max_gradient < self.config.tolerance {
                debug!(iteration, "Gradient descent converged");
                break;
            }
        }

        model
    }

    /// Split, fit, evaluate and save into `model_dir`.
    pub fn train_and_save(
        &self,
        samples: &[LabeledText],
        model_dir: &Path,
    ) -> Result<TrainingOutcome, AppError> {
        let (train, test) = stratified_split(samples, self.config.test_ratio, self.config.seed)?;
        info!(train = train.len(), test = test.len(), "Training model...");

        let model = self.fit(&train)?;
        let report = evaluate(&model, &test);
        info!(accuracy = report.accuracy, "Model evaluated");

        let saved = save_versioned(model, &report, model_dir)?;
        Ok(TrainingOutcome { saved, report })
    }
}

/// Writes `stress_model_<timestamp>.json` and `metrics.json` into `model_dir`.
///
/// The artifact's `model_version` is set to the chosen file name.
pub fn save_versioned(
    mut model: StressModel,
    report: &EvaluationReport,
    model_dir: &Path,
) -> Result<SavedModel, AppError> {
    let model_dir = model_dir.to_path_buf();
    PortablePathManager::ensure_dirs(&[&model_dir])?;

    let version = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let mut file_name = format!("{}_{}.json", MODEL_NAME, version);
    let mut suffix = 1;
    while model_dir.join(&file_name).exists() {
        file_name = format!("{}_{}_{}.json", MODEL_NAME, version, suffix);
        suffix += 1;
    }

    model.model_version = file_name.clone();
    let model_path = model_dir.join(&file_name);
    model.write_to(&model_path)?;
    info!("Model saved at: {}", model_path.display());

    let record = MetricsRecord {
        accuracy: report.accuracy,
        report: report.clone(),
        model_version: file_name,
    };
    let metrics_path = model_dir.join(METRICS_FILENAME);
    std::fs::write(&metrics_path, serde_json::to_vec_pretty(&record)?)?;
    info!("Metrics saved at: {}", metrics_path.display());

    Ok(SavedModel {
        model_path,
        metrics_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassifierArtifact, ModelLoader};

    const CONTEXT: &[&str] = &["morning", "evening", "weekend", "family", "office"];

    fn corpus() -> Vec<LabeledText> {
        let markers = [(0, "calm"), (1, "busy"), (2, "hopeless")];
        markers
            .iter()
            .flat_map(|&(label, marker)| {
                (0..12).map(move |i| {
                    LabeledText::new(
                        format!(
                            "{} {} {}",
                            CONTEXT[i % CONTEXT.len()],
                            marker,
                            CONTEXT[(i + 2) % CONTEXT.len()]
                        ),
                        label,
                    )
                })
            })
            .collect()
    }

    fn trainer() -> Trainer {
        Trainer::new(TrainingConfig {
            max_iter: 400,
            ..TrainingConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_fit_learns_marker_words() {
        let data = corpus();
        let model = trainer().fit(&data).unwrap();

        assert!(model.validate().is_ok());
        assert_eq!(model.classifier.classes, vec![0, 1, 2]);
        assert_eq!(model.predict("calm"), 0);
        assert_eq!(model.predict("so busy"), 1);
        assert_eq!(model.predict("hopeless"), 2);

        let report = evaluate(&model, &data);
        assert!(report.accuracy >= 0.9, "accuracy {}", report.accuracy);
    }

    #[test]
    fn test_vocabulary_is_capped_and_sorted() {
        let trainer = Trainer::new(TrainingConfig {
            max_features: 3,
            max_iter: 10,
            ..TrainingConfig::default()
        })
        .unwrap();
        let model = trainer.fit(&corpus()).unwrap();

        assert_eq!(model.vectorizer.n_features(), 3);
        let columns: Vec<usize> = model.vectorizer.vocabulary.values().copied().collect();
        assert_eq!(columns, vec![0, 1, 2]);
    }

    #[test]
    fn test_idf_is_smoothed() {
        let data = vec![
            LabeledText::new("alpha beta", 0),
            LabeledText::new("alpha gamma", 1),
        ];
        let trainer = Trainer::new(TrainingConfig {
            ngram_range: (1, 1),
            max_iter: 1,
            ..TrainingConfig::default()
        })
        .unwrap();
        let model = trainer.fit(&data).unwrap();

        let alpha = model.vectorizer.vocabulary["alpha"];
        let beta = model.vectorizer.vocabulary["beta"];
        assert!((model.vectorizer.idf[alpha] - 1.0).abs() < 1e-12);
        assert!((model.vectorizer.idf[beta] - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_fit_rejects_degenerate_input() {
        let trainer = trainer();
        assert!(matches!(trainer.fit(&[]), Err(AppError::Training(_))));

        let one_class = vec![
            LabeledText::new("calm morning", 0),
            LabeledText::new("calm evening", 0),
        ];
        assert!(matches!(trainer.fit(&one_class), Err(AppError::Training(_))));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let bad_ratio = TrainingConfig {
            test_ratio: 1.5,
            ..TrainingConfig::default()
        };
        assert!(Trainer::new(bad_ratio).is_err());

        let bad_ngrams = TrainingConfig {
            ngram_range: (2, 1),
            ..TrainingConfig::default()
        };
        assert!(Trainer::new(bad_ngrams).is_err());
    }

    #[test]
    fn test_save_versioned_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer();
        let model = trainer.fit(&corpus()).unwrap();
        let report = evaluate(&model, &corpus());

        let first = save_versioned(model.clone(), &report, dir.path()).unwrap();
        let second = save_versioned(model, &report, dir.path()).unwrap();

        assert_ne!(first.model_path, second.model_path);
        assert!(first.model_path.exists());
        assert!(second.model_path.exists());

        let name = second.model_path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("stress_model_") && name.ends_with(".json"));
        assert_eq!(StressModel::read_from(&second.model_path).unwrap().model_version, name);
    }

    #[test]
    fn test_train_and_save_feeds_the_loader() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = trainer().train_and_save(&corpus(), dir.path()).unwrap();

        let metrics: MetricsRecord =
            serde_json::from_slice(&std::fs::read(&outcome.saved.metrics_path).unwrap()).unwrap();
        assert_eq!(metrics.accuracy, outcome.report.accuracy);
        assert_eq!(
            metrics.model_version,
            outcome.saved.model_path.file_name().unwrap().to_string_lossy()
        );

        let loaded = ModelLoader::new(dir.path()).load_latest().unwrap();
        assert_eq!(loaded.model_version, metrics.model_version);
        assert_eq!(loaded.predict("hopeless"), 2);
    }
}
