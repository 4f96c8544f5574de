//! The planning-needed gate.
//!
//! Asked once per turn while a session has no plan. The model either answers
//! outright (`{"result": ...}`) or asks for a plan. Every failure mode
//! (model error, no JSON, neither key) falls toward planning.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use helm_context::Projections;
use helm_core::constants::{FINAL_ANSWER_CRITERIA_MARKER, PLANNING_DECISION_HEADER};
use helm_core::messages::{Message, last_user_index};
use helm_core::text::{preview, splice_before_marker};
use helm_llm::ModelClient;

use crate::prompts::DECISION_INSTRUCTION;
use crate::response::output_json;

/// What the gate concluded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// The model answered directly; planning is skipped this turn.
    Answered(String),
    /// A plan is needed.
    NeedsPlanning,
}

/// Single-shot planning gate.
pub struct Decision {
    model: Arc<dyn ModelClient>,
}

impl Decision {
    /// Create a gate over `model`.
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// Ask whether `messages` need a plan.
    pub async fn decide(&self, messages: &[Message], projections: &Projections) -> DecisionOutcome {
        let mut request = messages.to_vec();
        projections.insert_for_decision(&mut request);
        request.push(Message::user(DECISION_INSTRUCTION));

        let output = match self.model.call(&request).await {
            Ok(output) => output,
            Err(error) => {
                warn!(
                    error = %error,
                    category = error.category(),
                    "decision call failed, assuming planning is needed"
                );
                return DecisionOutcome::NeedsPlanning;
            }
        };

        let outcome = output_json(&output)
            .as_ref()
            .and_then(answer_from)
            .map_or(DecisionOutcome::NeedsPlanning, DecisionOutcome::Answered);
        if outcome == DecisionOutcome::NeedsPlanning {
            debug!(reply = %preview(&output.into_text(), 200), "decision requires planning");
        } else {
            debug!("decision answered directly");
        }
        outcome
    }
}

fn answer_from(value: &Value) -> Option<String> {
    match value.get("result")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Splice the direct answer into the outbound request.
///
/// The block goes into the last user message, before its final-answer
/// criteria if it has any; with no user message a new one is appended.
pub fn apply_answer(messages: &mut Vec<Message>, answer: &str) {
    let block = format!("{PLANNING_DECISION_HEADER}\n{answer}");
    match last_user_index(messages) {
        Some(i) => {
            let content =
                splice_before_marker(&messages[i].content, FINAL_ANSWER_CRITERIA_MARKER, &block);
            messages[i].content = content;
        }
        None => messages.push(Message::user(block)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
