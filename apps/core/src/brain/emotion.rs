//! Emotion intensity detection using keyword tables.
//!
//! Fast substring matching over two ordered word lists. The High list is
//! always checked before the Moderate list.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Detected emotional intensity of a single message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmotionIntensity {
    Low,
    Moderate,
    High,
}

impl EmotionIntensity {
    /// Returns a human-readable label for the intensity
    pub fn label(&self) -> &'static str {
        match self {
            EmotionIntensity::Low => "Low",
            EmotionIntensity::Moderate => "Moderate",
            EmotionIntensity::High => "High",
        }
    }

    /// High and Moderate both count towards escalation.
    pub fn is_negative(&self) -> bool {
        matches!(self, EmotionIntensity::High | EmotionIntensity::Moderate)
    }
}

impl fmt::Display for EmotionIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

const HIGH_INTENSITY_WORDS: &[&str] = &[
    "hopeless",
    "worthless",
    "suicidal",
    "can't go on",
    "panic attack",
    "extremely anxious",
    "give up",
    "overwhelmed",
    "broken",
    "no point",
    "depressed",
    "crying all the time",
    "nothing matters",
];

const MODERATE_INTENSITY_WORDS: &[&str] = &[
    "stressed",
    "tired",
    "worried",
    "pressure",
    "sad",
    "anxious",
    "frustrated",
    "confused",
    "burnout",
    "exhausted",
    "overthinking",
];

/// Intensity table in precedence order
const INTENSITY_TABLE: &[(EmotionIntensity, &[&str])] = &[
    (EmotionIntensity::High, HIGH_INTENSITY_WORDS),
    (EmotionIntensity::Moderate, MODERATE_INTENSITY_WORDS),
];

/// Lowercases and folds typographic apostrophes so "can’t" matches "can't".
pub(crate) fn fold_for_matching(message: &str) -> String {
    message.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

/// Classifies the emotional intensity of a message.
pub fn detect_emotion_intensity(message: &str) -> EmotionIntensity {
    let folded = fold_for_matching(message);

    INTENSITY_TABLE
        .iter()
        .find(|(_, words)| words.iter().any(|w| folded.contains(*w)))
        .map(|(intensity, _)| *intensity)
        .unwrap_or(EmotionIntensity::Low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_intensity_any_case_and_context() {
        for message in [
            "suicidal",
            "I feel SUICIDAL tonight",
            "honestly i'm hopeless.",
            "I just can’t go on like this",
            "had a Panic Attack at work",
        ] {
            assert_eq!(
                detect_emotion_intensity(message),
                EmotionIntensity::High,
                "Expected High for '{}'",
                message
            );
        }
    }

    #[test]
    fn test_high_wins_over_moderate() {
        assert_eq!(
            detect_emotion_intensity("tired, stressed and completely overwhelmed"),
            EmotionIntensity::High
        );
    }

    #[test]
    fn test_moderate_only() {
        for message in ["So stressed", "kind of worried", "Burnout is real", "I'm TIRED"] {
            assert_eq!(
                detect_emotion_intensity(message),
                EmotionIntensity::Moderate,
                "Expected Moderate for '{}'",
                message
            );
        }
    }

    #[test]
    fn test_low_by_default() {
        assert_eq!(detect_emotion_intensity("hello there"), EmotionIntensity::Low);
        assert_eq!(detect_emotion_intensity(""), EmotionIntensity::Low);
    }

    #[test]
    fn test_negative_flags() {
        assert!(EmotionIntensity::High.is_negative());
        assert!(EmotionIntensity::Moderate.is_negative());
        assert!(!EmotionIntensity::Low.is_negative());
    }
}
