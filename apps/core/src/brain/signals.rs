//! Turn Signals - what the policy engine extracted from one user turn.

use serde::{Deserialize, Serialize};

use super::emotion::EmotionIntensity;
use super::topic::Topic;

/// Signals extracted from the current message and the prior history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSignals {
    /// Topic of the current message
    pub topic: Topic,
    /// Emotion intensity of the current message
    pub emotion: EmotionIntensity,
    /// Negative (High or Moderate) user messages inside the escalation window
    pub recent_negative: usize,
    /// User messages in the prior history
    pub user_turns: usize,
}
