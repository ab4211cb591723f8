use std::fmt;

use serde::{Deserialize, Serialize};

/// Role type for a chat message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System role.
    System,

    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single role-tagged message in a conversation.
///
/// Messages are immutable once appended to a conversation; the assistant
/// message currently being streamed exists only as a local buffer until the
/// stream ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message.
    pub role: MessageRole,

    /// The content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Create a new `ChatMessage` with the given role and content.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new system `ChatMessage`.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a new user `ChatMessage`.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create a new assistant `ChatMessage`.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn message_serialization() {
        let message = ChatMessage::user("Hello!");
        let json = to_value(&message).unwrap();

        assert_eq!(
            json,
            json!({
                "role": "user",
                "content": "Hello!"
            })
        );
    }

    #[test]
    fn role_serialization() {
        assert_eq!(to_value(MessageRole::System).unwrap(), json!("system"));
        assert_eq!(to_value(MessageRole::User).unwrap(), json!("user"));
        assert_eq!(
            to_value(MessageRole::Assistant).unwrap(),
            json!("assistant")
        );
    }

    #[test]
    fn message_deserialization() {
        let json = json!({
            "role": "assistant",
            "content": "Hi there"
        });

        let message: ChatMessage = serde_json::from_value(json).unwrap();
        assert_eq!(message.role, MessageRole::Assistant);
        assert_eq!(message.content, "Hi there");
    }

    #[test]
    fn role_display() {
        assert_eq!(MessageRole::System.to_string(), "system");
        assert_eq!(MessageRole::User.to_string(), "user");
        assert_eq!(MessageRole::Assistant.to_string(), "assistant");
    }
}
