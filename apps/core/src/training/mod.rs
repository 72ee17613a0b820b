//! # Training Module
//!
//! Offline pipeline producing the artifacts the classifier serves.
//!
//! ## Components
//! - `dataset`: Label mapping, cleaning, balancing and stratified splits
//! - `trainer`: TF-IDF + logistic regression fitting and versioned saves
//! - `evaluation`: Held-out metrics and the `metrics.json` record

pub mod dataset;
pub mod evaluation;
pub mod trainer;

pub use dataset::{balance, normalize_label, prepare_samples, stratified_split, LabeledText};
pub use evaluation::{evaluate, ClassMetrics, EvaluationReport, MetricsRecord};
pub use trainer::{save_versioned, SavedModel, Trainer, TrainingConfig, TrainingOutcome};
