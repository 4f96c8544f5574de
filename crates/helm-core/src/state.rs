//! State entries: the append-only log of prior agent, tool and conversation
//! outputs for a session.
//!
//! The host application writes entries; the orchestrator only reads them and
//! derives projections from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::CONVERSATION_ROLE;

/// One durable record of a prior output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    /// When the entry was written.
    pub timestamp: DateTime<Utc>,
    /// The recorded output.
    pub response: String,
    /// `"conversation"` for turn-boundary entries, absent otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Role of the agent that produced the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_role: Option<String>,
    /// Task the agent was working on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,
}

impl StateEntry {
    /// Create an entry stamped with the current time.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            response: response.into(),
            role: None,
            agent_role: None,
            task_description: None,
        }
    }

    /// Mark the entry as a conversation boundary.
    #[must_use]
    pub fn conversation(mut self) -> Self {
        self.role = Some(CONVERSATION_ROLE.to_owned());
        self
    }

    /// Set the producing agent's role.
    #[must_use]
    pub fn with_agent_role(mut self, agent_role: impl Into<String>) -> Self {
        self.agent_role = Some(agent_role.into());
        self
    }

    /// Set the task description.
    #[must_use]
    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task_description = Some(task.into());
        self
    }

    /// Whether this entry marks a conversation boundary.
    pub fn is_conversation(&self) -> bool {
        self.role.as_deref() == Some(CONVERSATION_ROLE)
    }

    /// Whether this entry was written by an agent with the given role.
    pub fn is_authored_by(&self, agent_role: &str) -> bool {
        self.agent_role.as_deref() == Some(agent_role)
    }
}
