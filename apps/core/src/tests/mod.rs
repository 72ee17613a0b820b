//! Test Module
//!
//! Scenario tests spanning several components.
//!
//! ## Test Categories
//! - `brain_tests`: Emotion intensity, normalizer properties, dialogue scenarios
//! - `classifier_tests`: Loader selection and caching, classifier with stub artifacts
//! - `integration_tests`: Train, save, load and chat end to end

pub mod brain_tests;
pub mod classifier_tests;
