//! Conversation Session - the state one user's chat carries between turns.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::brain::{DialoguePolicy, FALLBACK_REPLY};
use crate::classifier::StressClassifier;
use crate::error::AppError;
use crate::models::{AgeGroup, ChatMessage, StressLevel};

/// Classification outcome and transcript of one conversation.
///
/// The stress level is fixed when the conversation begins; later turns only
/// run the dialogue policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    id: Uuid,
    history: Vec<ChatMessage>,
    stress_level: StressLevel,
    confidence: f64,
    age_group: AgeGroup,
}

impl ConversationState {
    /// Classifies `text` and produces the opening reply.
    ///
    /// The opening message is the first user turn.
    #[instrument(skip_all, fields(age_group = ?age_group))]
    pub fn begin(
        text: &str,
        age_group: AgeGroup,
        classifier: &StressClassifier,
        policy: &DialoguePolicy,
    ) -> Result<Self, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("text must not be empty".to_string()));
        }

        let result = classifier.predict(text)?;

        let mut state = Self {
            id: Uuid::new_v4(),
            history: Vec::new(),
            stress_level: result.level,
            confidence: result.confidence,
            age_group,
        };
        state.record_turn(text, policy);
        info!(
            conversation = %state.id,
            stress_level = %state.stress_level,
            confidence = state.confidence,
            "Conversation started"
        );
        Ok(state)
    }

    /// Answers a follow-up message and records both sides of the turn.
    ///
    /// A blank message gets the clarifying fallback and leaves the history
    /// as it was.
    pub fn reply(&mut self, message: &str, policy: &DialoguePolicy) -> String {
        if message.trim().is_empty() {
            return FALLBACK_REPLY.to_string();
        }

        self.record_turn(message, policy)
    }

    /// Appends the user message, then answers it with that message already
    /// counted as a turn and inside the escalation window.
    fn record_turn(&mut self, message: &str, policy: &DialoguePolicy) -> String {
        self.history.push(ChatMessage::user(message));
        let reply = policy.respond(message, self.stress_level, &self.history, self.age_group);
        self.history.push(ChatMessage::assistant(reply.clone()));
        reply
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn stress_level(&self) -> StressLevel {
        self.stress_level
    }

    /// Confidence of the opening classification (0.0 - 100.0)
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn age_group(&self) -> AgeGroup {
        self.age_group
    }

    /// Number of messages the user has sent so far
    pub fn user_turns(&self) -> usize {
        self.history.iter().filter(|m| m.is_user()).count()
    }
}
