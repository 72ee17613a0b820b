//! Topic detection using an ordered keyword table.

use super::emotion::fold_for_matching;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse subject of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Sleep,
    Work,
    Academics,
    Relationships,
    Fatigue,
    General,
}

impl Topic {
    /// Returns a human-readable label for the topic
    pub fn label(&self) -> &'static str {
        match self {
            Topic::Sleep => "sleep",
            Topic::Work => "work",
            Topic::Academics => "academics",
            Topic::Relationships => "relationships",
            Topic::Fatigue => "fatigue",
            Topic::General => "general",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Topic keywords, first match wins
const TOPIC_TABLE: &[(Topic, &[&str])] = &[
    (Topic::Sleep, &["sleep", "insomnia", "not sleeping"]),
    (
        Topic::Work,
        &["work", "office", "deadline", "boss", "workload"],
    ),
    (Topic::Academics, &["exam", "college", "study", "marks"]),
    (
        Topic::Relationships,
        &["relationship", "partner", "breakup", "family"],
    ),
    (Topic::Fatigue, &["tired", "exhausted", "burnout"]),
];

/// Detects the topic of a message, `General` when nothing matches.
pub fn detect_topic(message: &str) -> Topic {
    let folded = fold_for_matching(message);

    TOPIC_TABLE
        .iter()
        .find(|(_, words)| words.iter().any(|w| folded.contains(*w)))
        .map(|(topic, _)| *topic)
        .unwrap_or(Topic::General)
}
