//! Instruction texts appended to planning-related model calls.
//!
//! The wording is the contract with the model; the parsing side lives in
//! [`crate::response`] and [`crate::schema`].

use crate::schema::SchemaError;

/// Default number of planner attempts before planning is disabled.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Appended to the working sequence for the planning-needed gate.
pub const DECISION_INSTRUCTION: &str = "\
Decide whether the request above can be answered directly from the conversation \
and the context you already have, without delegating any work.

If it can, reply with exactly one JSON object: {\"result\": \"<the complete answer>\"}
If any work must be delegated or any tool must be used, reply with exactly: {\"needs_planning\": true}

Reply with the JSON object only.";

/// Appended to the latest user request when asking for a fresh plan.
pub const PLANNING_INSTRUCTION: &str = "\
Break the request above into an ordered plan of delegated steps. Assign each step \
to exactly one coworker by id, or \"NONE\" if no coworker fits.

Reply with one JSON object and nothing else:
{
  \"steps\": [
    {\"step_number\": \"1\", \"description\": \"<what the step achieves>\", \"status\": \"NOT_STARTED\", \"coworker\": \"<coworker id or NONE>\"}
  ],
  \"next_step\": \"1\"
}

Rules:
- step_number values are strings holding consecutive integers starting at \"1\".
- Every status is \"NOT_STARTED\".
- next_step is the step_number of the first step.";

/// Correction appended after a rejected planner reply.
pub fn correction_instruction(error: &SchemaError, attempt: u32, max_attempts: u32) -> String {
    let urgency = if attempt + 1 >= max_attempts {
        "This is the final attempt. "
    } else {
        ""
    };
    format!(
        "Your previous reply was rejected: {error}.\n\n{urgency}Reply again with only the \
         corrected JSON object. Keep the exact shape: a \"steps\" list whose items have string fields \
         step_number, description, status and coworker, plus a string \"next_step\". \
         Do not add commentary or code fences."
    )
}

/// Rulebook embedded in every evaluation request.
pub const EVALUATION_RULES: &str = "\
Rules:
1. COMPLETED, FAILED and HUMAN_INPUT_REQUIRED are locked. Never change a locked step's \
status, description or coworker, and never remove it. If the scope changed, add new steps instead.
2. Unlocked steps move NOT_STARTED -> IN_PROGRESS -> COMPLETED only on evidence in the \
new context. Without new evidence, keep the status unchanged.
3. FAILED and HUMAN_INPUT_REQUIRED are mutually exclusive for a step and are never \
derived from past context alone.
4. A step cannot become IN_PROGRESS or COMPLETED while any lower-numbered step is not \
COMPLETED, unless new evidence shows that dependency was bypassed.
5. HUMAN_INPUT_REQUIRED never cascades to later steps.
6. If the user changed the scope of the task, unlocked steps may be added, reordered, \
modified or removed even without new evidence. Renumber steps consecutively from \"1\" \
and keep locked steps verbatim.";

/// Appended to the evaluation message set, embedding the current plan.
pub fn evaluation_instruction(plan_json: &str) -> String {
    format!(
        "Re-assess the current plan against the new context above.\n\n\
         Current plan:\n{plan_json}\n\n\
         {EVALUATION_RULES}\n\n\
         Allowed statuses: NOT_STARTED, IN_PROGRESS, COMPLETED, FAILED, HUMAN_INPUT_REQUIRED.\n\
         Reply with the full updated plan as one JSON object with the same shape \
         (\"steps\" and \"next_step\") and nothing else."
    )
}
