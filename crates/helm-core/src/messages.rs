//! Message types for the model conversation.
//!
//! A conversation is an ordered sequence of [`Message`]s, each with a closed
//! [`Role`] and plain-text content. The orchestrator never reorders messages
//! it did not insert itself.

use serde::{Deserialize, Serialize};

/// Author of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// End-user (or orchestrator acting on the user's behalf).
    User,
    /// Model output.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    /// Author role.
    pub role: Role,
    /// Text content.
    pub content: String,
}

impl Message {
    /// Create a message with an explicit role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Whether this is a system message.
    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }

    /// Whether this is a user message.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Whether this is an assistant message.
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }

    /// Whether the content starts with `marker` (ignoring leading whitespace).
    pub fn has_marker(&self, marker: &str) -> bool {
        self.content.trim_start().starts_with(marker)
    }
}

/// Index of the first user message, if any.
pub fn first_user_index(messages: &[Message]) -> Option<usize> {
    messages.iter().position(Message::is_user)
}

/// Index of the last user message, if any.
pub fn last_user_index(messages: &[Message]) -> Option<usize> {
    messages.iter().rposition(Message::is_user)
}
