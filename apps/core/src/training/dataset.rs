//! Dataset preparation: label mapping, cleaning, balancing and splitting.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::brain::normalize;
use crate::error::AppError;

/// Texts at or below this length after normalization carry too little signal
pub const MIN_TEXT_LEN: usize = 5;

/// One normalized training example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledText {
    pub text: String,
    pub label: i64,
}

impl LabeledText {
    pub fn new(text: impl Into<String>, label: i64) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Maps the various dataset status labels onto 0 = Low, 1 = Moderate, 2 = High.
///
/// Anything not recognised as low or moderate counts as high.
pub fn normalize_label(raw: &str) -> i64 {
    match raw.trim().to_lowercase().as_str() {
        "0" | "low" | "normal" | "no stress" => 0,
        "1" | "moderate" | "medium" => 1,
        _ => 2,
    }
}

/// Normalizes text and labels and drops texts that end up too short.
pub fn prepare_samples<I, T, L>(raw: I) -> Vec<LabeledText>
where
    I: IntoIterator<Item = (T, L)>,
    T: AsRef<str>,
    L: AsRef<str>,
{
    raw.into_iter()
        .map(|(text, label)| LabeledText {
            text: normalize(text.as_ref()),
            label: normalize_label(label.as_ref()),
        })
        .filter(|s| s.text.len() > MIN_TEXT_LEN)
        .collect()
}

/// Number of samples per label
pub fn class_counts(samples: &[LabeledText]) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for sample in samples {
        *counts.entry(sample.label).or_insert(0) += 1;
    }
    counts
}

fn group_by_label(samples: &[LabeledText]) -> BTreeMap<i64, Vec<LabeledText>> {
    let mut groups: BTreeMap<i64, Vec<LabeledText>> = BTreeMap::new();
    for sample in samples {
        groups.entry(sample.label).or_default().push(sample.clone());
    }
    groups
}

/// Downsamples every class to the size of the smallest one.
pub fn balance(samples: &[LabeledText], seed: u64) -> Vec<LabeledText> {
    let mut rng = StdRng::seed_from_u64(seed);
    let groups = group_by_label(samples);
    let min_count = groups.values().map(Vec::len).min().unwrap_or(0);

    groups
        .into_values()
        .flat_map(|mut group| {
            group.shuffle(&mut rng);
            group.truncate(min_count);
            group
        })
        .collect()
}

/// Splits into (train, test) keeping each class's proportion.
///
/// Every class keeps at least one training example.
pub fn stratified_split(
    samples: &[LabeledText],
    test_ratio: f64,
    seed: u64,
) -> Result<(Vec<LabeledText>, Vec<LabeledText>), AppError> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(AppError::Training(format!(
            "test ratio must be between 0 and 1, got {}",
            test_ratio
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for (_, mut group) in group_by_label(samples) {
        group.shuffle(&mut rng);
        let n_test = ((group.len() as f64 * test_ratio).round() as usize)
            .min(group.len().saturating_sub(1));
        let rest = group.split_off(n_test);
        test.extend(group);
        train.extend(rest);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    Ok((train, test))
}
