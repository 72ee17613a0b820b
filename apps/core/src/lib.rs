//! StressChat core.
//!
//! Estimates a stress level from free text with a trained classifier and
//! keeps a supportive conversation going with a rule-based dialogue policy.

pub mod brain;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fs_manager;
pub mod models;
pub mod session;
pub mod telemetry;
pub mod training;

pub use error::AppError;
pub use session::ConversationState;

#[cfg(test)]
mod tests;
