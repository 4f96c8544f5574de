//! Plan model: ordered delegated steps and their execution status.
//!
//! A [`Plan`] is an ordered array of [`PlanStep`]s. The `step_number` is a
//! display label the model reads and writes; ordering is always derived from
//! its numeric value, never from array positions held across edits.
//!
//! ## Status lifecycle
//!
//! ```text
//! NOT_STARTED ──► IN_PROGRESS ──► COMPLETED
//!      │               │
//!      └───────┬───────┘
//!              ▼
//!   FAILED | HUMAN_INPUT_REQUIRED
//! ```
//!
//! `COMPLETED`, `FAILED` and `HUMAN_INPUT_REQUIRED` are *locked*: once set, a
//! step's status, description and coworker never change again.

use serde::{Deserialize, Serialize};

/// Execution status of a plan step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    /// Not yet picked up.
    NotStarted,
    /// Work observed but not finished.
    InProgress,
    /// Finished successfully.
    Completed,
    /// Finished unsuccessfully.
    Failed,
    /// Cannot continue without an answer from the user.
    HumanInputRequired,
}

impl StepStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Completed,
        Self::Failed,
        Self::HumanInputRequired,
    ];

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::HumanInputRequired => "HUMAN_INPUT_REQUIRED",
        }
    }

    /// Parse an exact wire name. No case folding.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Whether the status is terminal (immutable once set).
    #[must_use]
    pub const fn is_locked(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::HumanInputRequired
        )
    }

    /// Whether a step may move from `from` to `to` in one evaluation.
    ///
    /// Carrying a status over unchanged is always allowed. Locked statuses
    /// never move. `IN_PROGRESS` never goes back to `NOT_STARTED`.
    #[must_use]
    pub const fn can_transition(from: Self, to: Self) -> bool {
        match (from, to) {
            (Self::NotStarted, _) => true,
            (Self::InProgress, to) => !matches!(to, Self::NotStarted),
            (Self::Completed, Self::Completed)
            | (Self::Failed, Self::Failed)
            | (Self::HumanInputRequired, Self::HumanInputRequired) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One delegated step of a plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Positive integer label, serialized as a string (`"1"`, `"2"`, ...).
    pub step_number: String,
    /// What the step accomplishes.
    pub description: String,
    /// Current status.
    pub status: StepStatus,
    /// Delegate id, or [`NO_COWORKER`](crate::constants::NO_COWORKER).
    pub coworker: String,
}

impl PlanStep {
    /// Create a step.
    pub fn new(
        step_number: impl Into<String>,
        description: impl Into<String>,
        status: StepStatus,
        coworker: impl Into<String>,
    ) -> Self {
        Self {
            step_number: step_number.into(),
            description: description.into(),
            status,
            coworker: coworker.into(),
        }
    }

    /// Numeric value of the step label, if it is a positive integer.
    #[must_use]
    pub fn number(&self) -> Option<u32> {
        parse_step_number(&self.step_number)
    }

    /// Whether the step's status is terminal.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.status.is_locked()
    }

    /// Whether two steps agree on every field a locked step must keep.
    #[must_use]
    pub fn same_locked_fields(&self, other: &Self) -> bool {
        self.status == other.status
            && self.description == other.description
            && self.coworker == other.coworker
    }
}

/// Parse a step label as a positive integer (`"0"`, `"-1"`, `"1.5"`, `" 2"` are rejected).
#[must_use]
pub fn parse_step_number(label: &str) -> Option<u32> {
    if label.is_empty() || !label.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    label.parse::<u32>().ok().filter(|n| *n > 0)
}

/// A task decomposition plus the step to resume next.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Steps, ordered by numeric `step_number`.
    pub steps: Vec<PlanStep>,
    /// Label of the step to resume next, or `""` when nothing should run.
    #[serde(default)]
    pub next_step: String,
}

impl Plan {
    /// Create a plan.
    pub fn new(steps: Vec<PlanStep>, next_step: impl Into<String>) -> Self {
        Self {
            steps,
            next_step: next_step.into(),
        }
    }

    /// Find a step by its label.
    #[must_use]
    pub fn step(&self, step_number: &str) -> Option<&PlanStep> {
        self.steps.iter().find(|s| s.step_number == step_number)
    }

    /// Steps sorted by numeric label. Unparseable labels sort last, stably.
    #[must_use]
    pub fn sorted_steps(&self) -> Vec<&PlanStep> {
        let mut steps: Vec<&PlanStep> = self.steps.iter().collect();
        steps.sort_by_key(|s| s.number().unwrap_or(u32::MAX));
        steps
    }

    /// Sort steps in place by numeric label.
    pub fn sort_steps(&mut self) {
        self.steps.sort_by_key(|s| s.number().unwrap_or(u32::MAX));
    }

    /// Whether the plan has steps and every one of them is completed.
    #[must_use]
    pub fn all_completed(&self) -> bool {
        !self.steps.is_empty()
            && self
                .steps
                .iter()
                .all(|s| s.status == StepStatus::Completed)
    }

    /// Whether any step has the given status.
    #[must_use]
    pub fn has_status(&self, status: StepStatus) -> bool {
        self.steps.iter().any(|s| s.status == status)
    }

    /// Lowest-numbered step with the given status.
    #[must_use]
    pub fn first_with_status(&self, status: StepStatus) -> Option<&PlanStep> {
        self.sorted_steps().into_iter().find(|s| s.status == status)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
