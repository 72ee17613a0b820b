//! # Brain Module
//!
//! Rule-based conversation analysis for StressChat.
//! Runs on every user turn without touching the classifier model.
//!
//! ## Components
//! - `normalizer`: Text cleaning shared with training and inference
//! - `emotion`: Emotion intensity keyword tables
//! - `topic`: Topic keyword tables
//! - `signals`: Output data structure
//! - `policy`: Reply selection, escalation and anti-repetition

pub mod emotion;
pub mod normalizer;
pub mod policy;
pub mod signals;
pub mod topic;

pub use emotion::{detect_emotion_intensity, EmotionIntensity};
pub use normalizer::normalize;
pub use policy::{DialoguePolicy, EscalationPolicy, FALLBACK_REPLY, REPETITION_SUFFIX};
pub use signals::TurnSignals;
pub use topic::{detect_topic, Topic};
