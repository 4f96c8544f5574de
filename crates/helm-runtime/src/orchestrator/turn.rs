//! Inputs and outputs of one orchestration pass.

use serde::{Deserialize, Serialize};

use helm_core::coworkers::Coworker;
use helm_core::ids::{AgentId, SessionId};
use helm_core::messages::Message;
use helm_llm::ModelOutput;

/// One inbound request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationRequest {
    /// Session the request belongs to.
    pub session_id: SessionId,
    /// Agent whose message history this is.
    pub agent_id: AgentId,
    /// Conversation so far, oldest first.
    pub messages: Vec<Message>,
    /// Delegates plan steps may be assigned to.
    #[serde(default)]
    pub coworkers: Vec<Coworker>,
}

impl OrchestrationRequest {
    /// Create a request without coworkers.
    pub fn new(
        session_id: impl Into<SessionId>,
        agent_id: impl Into<AgentId>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            agent_id: agent_id.into(),
            messages,
            coworkers: Vec::new(),
        }
    }

    /// Attach the coworker directory.
    #[must_use]
    pub fn with_coworkers(mut self, coworkers: Vec<Coworker>) -> Self {
        self.coworkers = coworkers;
        self
    }
}

/// What the planning gate did this turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "answer")]
pub enum DecisionRecord {
    /// Not consulted (plan exists, planning off, or session downgraded).
    #[default]
    Skipped,
    /// The model answered directly.
    Answered(String),
    /// A plan was requested.
    NeedsPlanning,
}

/// Everything that happened during a pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Chunks replaced by summaries.
    pub compacted_chunks: usize,
    /// Whether compaction was attempted and fell back.
    pub compaction_fell_back: bool,
    /// Planning gate result.
    pub decision: DecisionRecord,
    /// Whether a new plan was created and persisted.
    pub plan_created: bool,
    /// Whether an existing plan was replaced by an evaluated one.
    pub plan_evaluated: bool,
    /// Step chosen by the selector, when a plan is in play.
    pub next_step: Option<String>,
    /// Kind of status note injected, when a plan is in play.
    pub status_note: Option<String>,
    /// User-visible notices appended to the request.
    pub notices: Vec<String>,
}

/// The outbound request, ready to submit.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedTurn {
    /// Messages to send.
    pub messages: Vec<Message>,
    /// What happened while preparing them.
    pub outcome: TurnOutcome,
}

/// A submitted pass.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnResult {
    /// The model's reply to the prepared messages.
    pub output: ModelOutput,
    /// The messages that were sent.
    pub messages: Vec<Message>,
    /// What happened while preparing them.
    pub outcome: TurnOutcome,
}
