//! Advisor chat transcript.
//!
//! A linear list of turns. Failures from the advisor never surface to the
//! caller: the turn is answered with the configured fallback instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::backend::traits::Message;
use crate::service::AdvisorService;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Who spoke a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Ai,
}

/// One entry in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    fn to_message(&self) -> Message {
        match self.role {
            TurnRole::User => Message::user(&self.text),
            TurnRole::Ai => Message::assistant(&self.text),
        }
    }
}

/// Conversation with the advisor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Start a conversation with the AI's welcome turn.
    pub fn new(welcome: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::new(TurnRole::Ai, welcome)],
        }
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Most recent turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Send a message and append the advisor's reply.
    ///
    /// Blank input is ignored and returns `None`. Otherwise the reply turn
    /// is returned, which is the fallback message if the advisor failed.
    pub async fn send(&mut self, advisor: &AdvisorService, text: &str) -> Option<&Turn> {
        if text.trim().is_empty() {
            return None;
        }

        let history: Vec<Message> = self.turns.iter().map(Turn::to_message).collect();
        self.turns.push(Turn::new(TurnRole::User, text));

        let reply = match advisor.advise(history, text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Advisor request failed, answering with fallback");
                advisor.config().fallback_message.clone()
            }
        };

        self.turns.push(Turn::new(TurnRole::Ai, reply));
        self.turns.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::backend::traits::MessageRole;
    use crate::config::DEFAULT_FALLBACK_MESSAGE;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_send_appends_both_turns() {
        let backend = Arc::new(MockBackend::default().with_response("Never sign a 360 deal blind."));
        let advisor = AdvisorService::new(vec![backend.clone()]);
        let mut conversation = Conversation::new("Welcome");

        let reply = conversation.send(&advisor, "Should I sign?").await.unwrap();
        assert_eq!(reply.role, TurnRole::Ai);
        assert_eq!(reply.text, "Never sign a 360 deal blind.");

        let roles: Vec<TurnRole> = conversation.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![TurnRole::Ai, TurnRole::User, TurnRole::Ai]);

        // Prior history plus the new message
        let request = backend.last_request().unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, MessageRole::Assistant);
        assert_eq!(request.messages[1].content, "Should I sign?");
    }

    #[tokio::test]
    async fn test_failure_becomes_fallback_turn() {
        let backend = Arc::new(MockBackend::default().with_failure("network down"));
        let advisor = AdvisorService::new(vec![backend]);
        let mut conversation = Conversation::new("Welcome");

        let reply = conversation.send(&advisor, "Hello?").await.unwrap();
        assert_eq!(reply.text, DEFAULT_FALLBACK_MESSAGE);
        assert_eq!(conversation.turns().len(), 3);
    }

    #[tokio::test]
    async fn test_blank_message_ignored() {
        let advisor = AdvisorService::new(vec![Arc::new(MockBackend::default())]);
        let mut conversation = Conversation::new("Welcome");

        assert!(conversation.send(&advisor, "  ").await.is_none());
        assert_eq!(conversation.turns().len(), 1);
    }
}
