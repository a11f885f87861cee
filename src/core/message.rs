use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_model(self) -> bool {
        self == Role::Model
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// One transcript entry. A user message is final at creation; a model
/// message starts as a streaming placeholder and is mutated in place as
/// chunks arrive, then finalized exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub text: String,
    /// Monotonic per session, including across department switches.
    pub seq: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_invoked: Option<String>,
    /// True only while the message is still being assembled.
    pub streaming: bool,
}

impl ConversationMessage {
    pub fn user(seq: u64, text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            seq,
            created_at: Utc::now(),
            action_invoked: None,
            streaming: false,
        }
    }

    /// Empty model message awaiting stream chunks.
    pub fn model_placeholder(seq: u64) -> Self {
        Self {
            role: Role::Model,
            text: String::new(),
            seq,
            created_at: Utc::now(),
            action_invoked: None,
            streaming: true,
        }
    }

    /// Finalized model message, used for bot greetings.
    pub fn greeting(seq: u64, text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
            seq,
            created_at: Utc::now(),
            action_invoked: None,
            streaming: false,
        }
    }

    pub fn is_final(&self) -> bool {
        !self.streaming
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_final_at_creation() {
        let message = ConversationMessage::user(1, "hello");
        assert!(message.role.is_user());
        assert!(message.is_final());
        assert!(message.action_invoked.is_none());
    }

    #[test]
    fn placeholders_start_empty_and_streaming() {
        let message = ConversationMessage::model_placeholder(2);
        assert!(message.role.is_model());
        assert!(message.text.is_empty());
        assert!(message.streaming);
        assert!(!message.is_final());
    }

    #[test]
    fn greetings_are_final_model_messages() {
        let message = ConversationMessage::greeting(1, "Hi, how can I help?");
        assert!(message.role.is_model());
        assert!(message.is_final());
        assert_eq!(message.text, "Hi, how can I help?");
    }

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Model).unwrap(), "\"model\"");
    }
}
