//! Dialogue Policy - chooses the assistant reply for one user turn.
//!
//! Decision order:
//! 1. Blank input gets a clarifying fallback
//! 2. Escalation when distress peaks or accumulates
//! 3. Topic-specific prompt
//! 4. Turn-progression prompt
//!
//! The chosen reply is then checked against the previous assistant message
//! so the same text is never sent twice in a row.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::emotion::{detect_emotion_intensity, EmotionIntensity};
use super::signals::TurnSignals;
use super::topic::{detect_topic, Topic};
use crate::models::{AgeGroup, ChatMessage, Role, StressLevel};

/// Reply for input that cannot be interpreted
pub const FALLBACK_REPLY: &str = "Can you tell me more about that?";

/// Suffix appended when a reply would repeat the previous one verbatim
pub const REPETITION_SUFFIX: &str = " I want to understand this better.";

const SUPPORT_TEEN: &str = "It might really help to talk to a trusted adult, school counselor, \
                            or a licensed mental health professional.";
const SUPPORT_SENIOR: &str = "Reaching out to a healthcare provider or a support group \
                              could provide structured and meaningful support.";
const SUPPORT_DEFAULT: &str = "Speaking with a licensed therapist or counselor \
                               could provide additional support and clarity.";

const SLEEP_REPLY: &str = "Sleep issues can deeply affect both mood and energy levels. \
                           Do you find it hard to fall asleep, or do you wake up frequently?";
const WORK_REPLY: &str = "Work pressure can slowly build up and feel exhausting. \
                          Is it workload, expectations, or lack of balance that's affecting you most?";
const ACADEMICS_REPLY: &str = "Academic stress can feel overwhelming, especially with expectations. \
                               Are upcoming exams or performance pressure contributing to this?";
const RELATIONSHIPS_REPLY: &str = "Relationships can strongly impact emotional well-being. \
                                   Would you like to share what’s been happening in that area?";
const FATIGUE_REPLY: &str = "Constant fatigue can sometimes be linked to stress or emotional strain. \
                             Do you feel mentally drained as well?";

pub const TURN_ONE_REPLY: &str = "Thank you for sharing that with me. \
                              Can you tell me a little more about what has been happening recently?";
const TURN_TWO_REPLY: &str = "That gives me more context. How long have you been feeling this way?";
const TURN_THREE_REPLY: &str = "It sounds like this has been ongoing. \
                                What do you think has contributed most to this situation?";
const TURN_FOUR_REPLY: &str =
    "What do you feel would help you most right now — rest, structure, or someone to talk to?";
const TURN_LATER_REPLY: &str = "It might help to take a small practical step today. \
                                What is one small action you feel comfortable taking right now?";
pub const LISTENING_REPLY: &str = "I'm here to listen. Tell me more.";

/// When accumulated distress should trigger the escalation reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    /// Number of most recent user messages inspected
    pub window: usize,
    /// Negative messages within the window needed to escalate
    pub threshold: usize,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            window: 6,
            threshold: 3,
        }
    }
}

/// Professional-support recommendation worded for the age group.
pub fn professional_support_message(age_group: AgeGroup) -> &'static str {
    match age_group {
        AgeGroup::Teen => SUPPORT_TEEN,
        AgeGroup::Senior => SUPPORT_SENIOR,
        AgeGroup::Other => SUPPORT_DEFAULT,
    }
}

/// Fixed prompt for a non-general topic.
pub fn topic_reply(topic: Topic) -> Option<&'static str> {
    match topic {
        Topic::Sleep => Some(SLEEP_REPLY),
        Topic::Work => Some(WORK_REPLY),
        Topic::Academics => Some(ACADEMICS_REPLY),
        Topic::Relationships => Some(RELATIONSHIPS_REPLY),
        Topic::Fatigue => Some(FATIGUE_REPLY),
        Topic::General => None,
    }
}

/// Prompt that moves a general conversation forward, keyed by turn count.
pub fn turn_progression_reply(user_turns: usize) -> &'static str {
    match user_turns {
        1 => TURN_ONE_REPLY,
        2 => TURN_TWO_REPLY,
        3 => TURN_THREE_REPLY,
        4 => TURN_FOUR_REPLY,
        n if n >= 5 => TURN_LATER_REPLY,
        _ => LISTENING_REPLY,
    }
}

fn escalation_reply(age_group: AgeGroup) -> String {
    format!(
        "I’m really concerned about how intense this feels for you. {} \
         Would you like to tell me what feels most overwhelming right now?",
        professional_support_message(age_group)
    )
}

/// Stateless reply selector; everything it needs is passed in per call.
#[derive(Debug, Clone, Default)]
pub struct DialoguePolicy {
    escalation: EscalationPolicy,
}

impl DialoguePolicy {
    /// Create a policy with default escalation settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy with custom escalation settings
    pub fn with_escalation(escalation: EscalationPolicy) -> Self {
        Self { escalation }
    }

    pub fn escalation(&self) -> EscalationPolicy {
        self.escalation
    }

    /// Number of negative messages among the last `window` user messages.
    pub fn count_recent_negative(&self, history: &[ChatMessage]) -> usize {
        history
            .iter()
            .rev()
            .filter(|m| m.is_user())
            .take(self.escalation.window)
            .filter(|m| detect_emotion_intensity(&m.text).is_negative())
            .count()
    }

    /// Extracts the decision signals for `message` given the history.
    pub fn signals(&self, message: &str, history: &[ChatMessage]) -> TurnSignals {
        TurnSignals {
            topic: detect_topic(message),
            emotion: detect_emotion_intensity(message),
            recent_negative: self.count_recent_negative(history),
            user_turns: history.iter().filter(|m| m.is_user()).count(),
        }
    }

    fn should_escalate(&self, signals: &TurnSignals) -> bool {
        signals.recent_negative >= self.escalation.threshold
            || signals.emotion == EmotionIntensity::High
    }

    /// Selects the assistant reply for `message`.
    ///
    /// `history` is the conversation as the caller holds it. Sessions append
    /// `message` before calling, so it counts as a turn and falls inside the
    /// escalation window. It is only read; the caller appends the reply.
    #[instrument(skip(self, message, history), fields(history_len = history.len()))]
    pub fn respond(
        &self,
        message: &str,
        stress_level: StressLevel,
        history: &[ChatMessage],
        age_group: AgeGroup,
    ) -> String {
        if message.trim().is_empty() {
            return FALLBACK_REPLY.to_string();
        }

        let signals = self.signals(message, history);
        debug!(
            topic = %signals.topic,
            emotion = %signals.emotion,
            recent_negative = signals.recent_negative,
            user_turns = signals.user_turns,
            "Extracted turn signals"
        );

        let reply = if self.should_escalate(&signals) {
            escalation_reply(age_group)
        } else if let Some(prompt) = topic_reply(signals.topic) {
            prompt.to_string()
        } else {
            turn_progression_reply(signals.user_turns).to_string()
        };

        avoid_repetition(reply, history)
    }
}

fn last_assistant_message(history: &[ChatMessage]) -> Option<&str> {
    history
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
        .map(|m| m.text.as_str())
}

fn avoid_repetition(mut reply: String, history: &[ChatMessage]) -> String {
    if last_assistant_message(history) == Some(reply.as_str()) {
        reply.push_str(REPETITION_SUFFIX);
    }
    reply
}
