//! Serialized stress classifier: TF-IDF features feeding a multinomial
//! logistic regression.
//!
//! Artifacts are plain JSON so the serving side never executes anything it
//! loads.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::AppError;

/// A trained text classifier as seen by inference code.
pub trait ClassifierArtifact: Send + Sync {
    /// Raw class label for `text`.
    fn predict(&self, text: &str) -> i64;

    /// Class probabilities for `text`, in the artifact's class order.
    fn predict_proba(&self, text: &str) -> Vec<f64>;
}

/// Sparse feature row: (column, value), columns ascending.
pub type SparseRow = Vec<(usize, f64)>;

// NOTE: expect() is acceptable here: the pattern is a constant
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("Invalid regex: token pattern"));

/// English stop words removed before building n-grams
const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "me", "more", "most", "my", "myself", "nor", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

static STOP_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH_STOP_WORDS.iter().copied().collect());

/// Term-frequency / inverse-document-frequency vectorizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Smallest and largest n-gram size
    pub ngram_range: (usize, usize),
    /// Whether English stop words are dropped
    pub stop_words: bool,
    /// Term -> column index
    pub vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency per column
    pub idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Splits text into the n-gram terms the vocabulary is keyed by.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        analyze_terms(text, self.ngram_range, self.stop_words)
    }

    /// Number of feature columns
    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    /// TF-IDF row for `text`, L2-normalized. Unknown terms are ignored.
    pub fn transform(&self, text: &str) -> SparseRow {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.analyze(text) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseRow = counts
            .into_iter()
            .map(|(column, tf)| (column, tf * self.idf[column]))
            .collect();

        let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in row.iter_mut() {
                *v /= norm;
            }
        }
        row
    }
}

/// Tokenize, drop stop words and build n-grams in `range`.
pub(crate) fn analyze_terms(text: &str, range: (usize, usize), stop_words: bool) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| !stop_words || !STOP_WORDS.contains(t))
        .collect();

    let (min_n, max_n) = (range.0.max(1), range.1.max(range.0.max(1)));
    let mut terms = Vec::new();
    for n in min_n..=max_n {
        if n > tokens.len() {
            break;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

/// Multinomial logistic regression over sparse rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Class label per output row
    pub classes: Vec<i64>,
    /// One weight row per class
    pub coef: Vec<Vec<f64>>,
    /// One bias per class
    pub intercept: Vec<f64>,
}

impl LogisticRegression {
    /// Raw class scores
    pub fn decision_function(&self, row: &[(usize, f64)]) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(weights, bias)| {
                bias + row
                    .iter()
                    .map(|&(column, value)| weights.get(column).copied().unwrap_or(0.0) * value)
                    .sum::<f64>()
            })
            .collect()
    }

    /// Softmax over the class scores
    pub fn predict_proba_row(&self, row: &[(usize, f64)]) -> Vec<f64> {
        softmax(&self.decision_function(row))
    }

    /// Label of the most probable class (first one on ties)
    pub fn predict_row(&self, row: &[(usize, f64)]) -> i64 {
        let probabilities = self.predict_proba_row(row);
        argmax(&probabilities)
            .and_then(|i| self.classes.get(i).copied())
            .unwrap_or(-1)
    }
}

pub(crate) fn softmax(scores: &[f64]) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Complete versioned stress model as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressModel {
    /// File name the model was saved under (e.g. `stress_model_20240101_120000.json`)
    pub model_version: String,
    pub trained_at: DateTime<Utc>,
    pub vectorizer: TfidfVectorizer,
    pub classifier: LogisticRegression,
}

impl StressModel {
    /// Checks that vectorizer and classifier dimensions agree.
    pub fn validate(&self) -> Result<(), String> {
        let n_features = self.vectorizer.n_features();
        let n_classes = self.classifier.classes.len();

        if n_classes == 0 {
            return Err("classifier has no classes".to_string());
        }
        if self.classifier.coef.len() != n_classes || self.classifier.intercept.len() != n_classes {
            return Err(format!(
                "expected {} coefficient rows and intercepts, found {} and {}",
                n_classes,
                self.classifier.coef.len(),
                self.classifier.intercept.len()
            ));
        }
        if let Some(row) = self.classifier.coef.iter().find(|r| r.len() != n_features) {
            return Err(format!(
                "coefficient row has {} weights for {} features",
                row.len(),
                n_features
            ));
        }
        if self.vectorizer.vocabulary.len() != n_features
            || self.vectorizer.vocabulary.values().any(|&c| c >= n_features)
        {
            return Err("vocabulary does not match idf table".to_string());
        }
        Ok(())
    }

    /// Reads and validates an artifact.
    pub fn read_from(path: &Path) -> Result<Self, AppError> {
        let load_error = |reason: String| AppError::ArtifactLoad {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = fs::read(path).map_err(|e| load_error(e.to_string()))?;
        let model: StressModel =
            serde_json::from_slice(&bytes).map_err(|e| load_error(e.to_string()))?;
        model.validate().map_err(load_error)?;
        Ok(model)
    }

    /// Writes the artifact as JSON.
    pub fn write_to(&self, path: &Path) -> Result<(), AppError> {
        let json = serde_json::to_vec(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl ClassifierArtifact for StressModel {
    fn predict(&self, text: &str) -> i64 {
        self.classifier.predict_row(&self.vectorizer.transform(text))
    }

    fn predict_proba(&self, text: &str) -> Vec<f64> {
        self.classifier
            .predict_proba_row(&self.vectorizer.transform(text))
    }
}
