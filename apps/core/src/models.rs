use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal stress estimate produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StressLevel {
    Low,
    Moderate,
    High,
    /// The artifact produced a label outside the known range.
    Unknown,
}

impl StressLevel {
    /// Maps a raw classifier label (0/1/2) to a level.
    pub fn from_label(label: i64) -> Self {
        match label {
            0 => StressLevel::Low,
            1 => StressLevel::Moderate,
            2 => StressLevel::High,
            _ => StressLevel::Unknown,
        }
    }

    /// Returns a human-readable label for the level
    pub fn label(&self) -> &'static str {
        match self {
            StressLevel::Low => "Low",
            StressLevel::Moderate => "Moderate",
            StressLevel::High => "High",
            StressLevel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Outcome of a single stress analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub level: StressLevel,
    /// Probability of the predicted class as a percentage (0.0 - 100.0).
    pub confidence: f64,
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Represents a single message within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender.
    pub role: Role,
    /// The text content of the message.
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Age hint supplied with the first analysis; only changes the wording of
/// the professional-support recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AgeGroup {
    Teen,
    Senior,
    #[default]
    Other,
}

impl AgeGroup {
    /// Lenient parse of a form value; anything unrecognised is `Other`.
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint.map(|h| h.trim().to_lowercase()).as_deref() {
            Some("teen") => AgeGroup::Teen,
            Some("senior") => AgeGroup::Senior,
            _ => AgeGroup::Other,
        }
    }
}
