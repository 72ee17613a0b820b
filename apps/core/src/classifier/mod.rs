//! # Classifier Module
//!
//! Model-backed stress estimation.
//!
//! ## Components
//! - `artifact`: Serialized TF-IDF + logistic regression model
//! - `loader`: Newest-artifact discovery and process-lifetime caching
//! - `stress`: Prediction wrapper producing `ClassificationResult`

pub mod artifact;
pub mod loader;
pub mod stress;

pub use artifact::{ClassifierArtifact, LogisticRegression, StressModel, TfidfVectorizer};
pub use loader::{ArtifactProvider, ModelLoader, PreloadedArtifact, MODEL_FILE_PATTERN};
pub use stress::StressClassifier;
