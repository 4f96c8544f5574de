//! Re-assessment of an existing plan.
//!
//! The evaluation request is: system messages, one summary per coworker,
//! the ordinary messages bracketed by the past and new projections, and an
//! instruction embedding the current plan plus the rulebook. A reply must
//! validate as an evaluated plan and, when lock enforcement is on, pass
//! [`audit_evaluation`]. Anything else leaves the current plan untouched.
//! There is a single attempt per turn.

use std::sync::Arc;

use tracing::{debug, info, warn};

use helm_context::Projections;
use helm_core::coworkers::Coworker;
use helm_core::messages::Message;
use helm_core::plan::Plan;
use helm_core::text::preview;
use helm_llm::{ModelClient, ModelError};

use crate::audit::{RuleViolation, audit_evaluation};
use crate::prompts::evaluation_instruction;
use crate::response::output_json;
use crate::schema::{SchemaError, ValidationMode, validate_plan};
use crate::selector::select_next_step;

/// What an evaluation pass produced.
#[derive(Debug)]
pub enum EvaluationOutcome {
    /// A valid replacement plan, with `next_step` chosen by the selector.
    Updated(Plan),
    /// The reply was not a valid plan.
    Invalid(SchemaError),
    /// The reply broke the lock rules.
    Violations(Vec<RuleViolation>),
    /// The model call failed.
    Failed(ModelError),
}

/// Existing-plan evaluator.
pub struct Evaluator {
    model: Arc<dyn ModelClient>,
    enforce_locks: bool,
}

impl Evaluator {
    /// Create an evaluator. With `enforce_locks` a reply that breaks the lock
    /// rules is rejected; without it violations are only logged.
    pub fn new(model: Arc<dyn ModelClient>, enforce_locks: bool) -> Self {
        Self {
            model,
            enforce_locks,
        }
    }

    /// Re-assess `current` against the conversation and state entries.
    pub async fn evaluate(
        &self,
        messages: &[Message],
        coworkers: &[Coworker],
        projections: &Projections,
        current: &Plan,
    ) -> EvaluationOutcome {
        let request = match evaluation_messages(messages, coworkers, projections, current) {
            Ok(request) => request,
            Err(error) => {
                warn!(error = %error, "could not serialize current plan, skipping evaluation");
                return EvaluationOutcome::Failed(ModelError::call_failed(error.to_string()));
            }
        };

        let output = match self.model.call(&request).await {
            Ok(output) => output,
            Err(error) => {
                warn!(error = %error, "evaluator call failed, keeping current plan");
                return EvaluationOutcome::Failed(error);
            }
        };

        let mut plan = match output_json(&output)
            .ok_or(SchemaError::NotJson)
            .and_then(|value| validate_plan(value, ValidationMode::Evaluation))
        {
            Ok(plan) => plan,
            Err(error) => {
                warn!(
                    error = %error,
                    reply = %preview(&output.into_text(), 200),
                    "evaluator reply rejected, keeping current plan"
                );
                return EvaluationOutcome::Invalid(error);
            }
        };

        let violations = audit_evaluation(current, &plan);
        if !violations.is_empty() {
            for v in &violations {
                warn!(
                    violation = %v,
                    enforced = self.enforce_locks,
                    "evaluation broke a plan rule"
                );
            }
            if self.enforce_locks {
                return EvaluationOutcome::Violations(violations);
            }
        }

        let selected = select_next_step(&plan);
        if selected != plan.next_step {
            debug!(
                model = %plan.next_step,
                selected = %selected,
                "next step overridden by selector"
            );
        }
        plan.next_step = selected;
        info!(steps = plan.steps.len(), next_step = %plan.next_step, "plan evaluated");
        EvaluationOutcome::Updated(plan)
    }
}

/// Build the evaluation request.
pub fn evaluation_messages(
    messages: &[Message],
    coworkers: &[Coworker],
    projections: &Projections,
    current: &Plan,
) -> Result<Vec<Message>, serde_json::Error> {
    let plan_json = serde_json::to_string_pretty(current)?;

    let mut out: Vec<Message> = messages.iter().filter(|m| m.is_system()).cloned().collect();
    out.extend(coworkers.iter().map(|c| Message::system(c.summary())));

    let mut ordinary: Vec<Message> = messages.iter().filter(|m| !m.is_system()).cloned().collect();
    projections.insert_for_evaluation(&mut ordinary);
    out.extend(ordinary);

    out.push(Message::user(evaluation_instruction(&plan_json)));
    Ok(out)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
