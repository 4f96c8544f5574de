//! Plan rendering and the per-turn status note.
//!
//! The rendered block lists steps by number, one per line, followed by a
//! focus line for the step chosen by the selector. Exactly one status note
//! accompanies it, chosen by priority:
//!
//! | Priority | Condition                          | Note                         |
//! |----------|------------------------------------|------------------------------|
//! | 1        | every step COMPLETED               | produce the final answer now |
//! | 2        | any HUMAN_INPUT_REQUIRED           | stop and name the blocker    |
//! | 3        | any FAILED and no next step        | report the critical failure  |
//! | 4        | otherwise                          | keep working, do not finish  |

use std::fmt::Write as _;

use helm_core::constants::{PLAN_BLOCK_HEADER, PLAN_STATUS_PREFIX};
use helm_core::messages::Message;
use helm_core::plan::{Plan, StepStatus};

/// Note telling the model the plan is not finished.
pub const KEEP_WORKING_NOTE: &str = "[PLAN STATUS] The plan is not finished. Keep working on the \
focus step and do not give a final answer yet.";

/// Note telling the model every step is done.
pub const FINAL_ANSWER_NOTE: &str =
    "[PLAN STATUS] All plan steps are completed. Produce the final answer now.";

/// Note telling the model a step failed and nothing else can run.
pub const CRITICAL_FAILURE_NOTE: &str = "[PLAN STATUS] A plan step failed and no remaining step \
can run. Stop calling tools, report the critical failure, and summarize the partial progress made.";

/// The status note chosen for a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusNote {
    /// Every step is completed.
    FinalAnswer,
    /// A step awaits the user.
    HumanInput {
        /// Blocked step label.
        step_number: String,
        /// Blocked step description.
        description: String,
    },
    /// A step failed and no step can be resumed.
    CriticalFailure,
    /// Work remains.
    KeepWorking,
}

impl StatusNote {
    /// Choose the note for `plan` given the selected `next_step`.
    pub fn for_plan(plan: &Plan, next_step: &str) -> Self {
        if plan.all_completed() {
            return Self::FinalAnswer;
        }
        if let Some(step) = plan.first_with_status(StepStatus::HumanInputRequired) {
            return Self::HumanInput {
                step_number: step.step_number.clone(),
                description: step.description.clone(),
            };
        }
        if plan.has_status(StepStatus::Failed) && next_step.is_empty() {
            return Self::CriticalFailure;
        }
        Self::KeepWorking
    }

    /// Text of the note as sent to the model.
    pub fn text(&self) -> String {
        match self {
            Self::FinalAnswer => FINAL_ANSWER_NOTE.to_owned(),
            Self::HumanInput {
                step_number,
                description,
            } => format!(
                "{PLAN_STATUS_PREFIX} Step {step_number} ({description}) needs input from the \
                 user. Stop calling tools and answer now, naming this blocked step and what is \
                 needed to continue."
            ),
            Self::CriticalFailure => CRITICAL_FAILURE_NOTE.to_owned(),
            Self::KeepWorking => KEEP_WORKING_NOTE.to_owned(),
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FinalAnswer => "final_answer",
            Self::HumanInput { .. } => "human_input",
            Self::CriticalFailure => "critical_failure",
            Self::KeepWorking => "keep_working",
        }
    }
}

/// Render the plan block.
pub fn render_plan_block(plan: &Plan, next_step: &str) -> String {
    let mut out = String::from(PLAN_BLOCK_HEADER);
    for step in plan.sorted_steps() {
        let _ = write!(
            out,
            "\n{}. {} | coworker: {} | status: {}",
            step.step_number,
            step.description,
            step.coworker,
            step.status.as_str()
        );
    }
    if let Some(focus) = (!next_step.is_empty()).then(|| plan.step(next_step)).flatten() {
        let _ = write!(out, "\nFocus: {}", focus.description);
    }
    out
}

/// Add the plan block and status note to `messages`.
///
/// Normally one new user message carries both. If an identical block is
/// already present, only the note is appended (and not repeated if the
/// sequence already ends with it). A final-answer note first removes every
/// earlier keep-working note so the two never coexist.
pub fn inject_plan(messages: &mut Vec<Message>, plan: &Plan, next_step: &str) -> StatusNote {
    let block = render_plan_block(plan, next_step);
    let note = StatusNote::for_plan(plan, next_step);
    let note_text = note.text();

    if note == StatusNote::FinalAnswer {
        strip_keep_working(messages);
    }

    if messages.iter().any(|m| m.content.contains(&block)) {
        let already = messages
            .last()
            .is_some_and(|m| m.content.trim_end().ends_with(&note_text));
        if !already {
            messages.push(Message::user(note_text));
        }
    } else {
        messages.push(Message::user(format!("{block}\n\n{note_text}")));
    }

    note
}

fn strip_keep_working(messages: &mut Vec<Message>) {
    for message in messages.iter_mut() {
        if message.content.contains(KEEP_WORKING_NOTE) {
            message.content = message
                .content
                .replace(KEEP_WORKING_NOTE, "")
                .trim_end()
                .to_owned();
        }
    }
    messages.retain(|m| !m.content.trim().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
