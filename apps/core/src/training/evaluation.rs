//! Held-out evaluation and the metrics record saved next to each model.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::dataset::LabeledText;
use crate::classifier::ClassifierArtifact;

/// Precision / recall / F1 for one class or an average
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class breakdown plus macro and support-weighted averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Fraction of correct predictions (0.0 - 1.0)
    pub accuracy: f64,
    /// Keyed by the class label rendered as a string
    #[serde(flatten)]
    pub per_class: BTreeMap<String, ClassMetrics>,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

/// Contents of `metrics.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub accuracy: f64,
    pub report: EvaluationReport,
    pub model_version: String,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Scores `artifact` against already-normalized labelled texts.
pub fn evaluate(artifact: &dyn ClassifierArtifact, test: &[LabeledText]) -> EvaluationReport {
    let predictions: Vec<i64> = test.iter().map(|s| artifact.predict(&s.text)).collect();
    evaluate_predictions(test, &predictions)
}

/// Builds the report from true labels and predictions.
pub fn evaluate_predictions(test: &[LabeledText], predictions: &[i64]) -> EvaluationReport {
    let pairs: Vec<(i64, i64)> = test
        .iter()
        .map(|s| s.label)
        .zip(predictions.iter().copied())
        .collect();

    let correct = pairs.iter().filter(|(truth, pred)| truth == pred).count();
    let labels: BTreeSet<i64> = pairs.iter().flat_map(|&(t, p)| [t, p]).collect();

    let mut per_class = BTreeMap::new();
    for &label in &labels {
        let true_positive = pairs.iter().filter(|&&(t, p)| t == label && p == label).count();
        let predicted = pairs.iter().filter(|&&(_, p)| p == label).count();
        let support = pairs.iter().filter(|&&(t, _)| t == label).count();

        let precision = ratio(true_positive, predicted);
        let recall = ratio(true_positive, support);
        per_class.insert(
            label.to_string(),
            ClassMetrics {
                precision,
                recall,
                f1_score: f1(precision, recall),
                support,
            },
        );
    }

    let total_support: usize = per_class.values().map(|m| m.support).sum();
    let n_classes = per_class.len();

    let (mp, mr, mf) = weighted_mean(&per_class, |_| 1.0, n_classes as f64);
    let (wp, wr, wf) = weighted_mean(&per_class, |m| m.support as f64, total_support as f64);

    EvaluationReport {
        accuracy: ratio(correct, pairs.len()),
        macro_avg: ClassMetrics {
            precision: mp,
            recall: mr,
            f1_score: mf,
            support: total_support,
        },
        weighted_avg: ClassMetrics {
            precision: wp,
            recall: wr,
            f1_score: wf,
            support: total_support,
        },
        per_class,
    }
}

fn weighted_mean(
    per_class: &BTreeMap<String, ClassMetrics>,
    weight: impl Fn(&ClassMetrics) -> f64,
    denominator: f64,
) -> (f64, f64, f64) {
    if denominator == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let (p, r, f) = per_class.values().fold((0.0, 0.0, 0.0), |(p, r, f), m| {
        let w = weight(m);
        (p + w * m.precision, r + w * m.recall, f + w * m.f1_score)
    });
    (p / denominator, r / denominator, f / denominator)
}
