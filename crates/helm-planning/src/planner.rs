//! First-time plan generation.
//!
//! The planner sees a reduced request: the deduplicated system messages
//! (without any coworkers overview), one summary per coworker, the last
//! output projection, and the latest user message trimmed of its final
//! answer criteria with the planning instruction appended.
//!
//! A reply that fails validation is retried with the rejected reply and a
//! correction instruction appended, up to `max_attempts` in total. A model
//! call error aborts planning for the turn without counting as an attempt.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use helm_context::Projections;
use helm_core::constants::{COWORKERS_OVERVIEW_MARKER, FINAL_ANSWER_CRITERIA_MARKER};
use helm_core::coworkers::Coworker;
use helm_core::messages::Message;
use helm_core::plan::Plan;
use helm_core::text::{before_marker, preview};
use helm_llm::{ModelClient, ModelError};

use crate::prompts::{DEFAULT_MAX_ATTEMPTS, PLANNING_INSTRUCTION, correction_instruction};
use crate::response::output_json;
use crate::schema::{SchemaError, ValidationMode, validate_plan};

/// What a planning pass produced.
#[derive(Debug)]
pub enum PlannerOutcome {
    /// A valid fresh plan.
    Created {
        /// The plan.
        plan: Plan,
        /// Attempts used, starting at 1.
        attempts: u32,
    },
    /// Every attempt was rejected.
    Exhausted {
        /// Attempts used.
        attempts: u32,
        /// Why the last reply was rejected.
        last_error: SchemaError,
    },
    /// A model call failed; planning was abandoned for this turn.
    Aborted(ModelError),
}

/// Fresh-plan generator.
pub struct Planner {
    model: Arc<dyn ModelClient>,
    max_attempts: u32,
}

impl Planner {
    /// Create a planner allowing `max_attempts` replies (minimum 1).
    pub fn new(model: Arc<dyn ModelClient>, max_attempts: u32) -> Self {
        Self {
            model,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Create a planner with the default attempt budget.
    pub fn with_defaults(model: Arc<dyn ModelClient>) -> Self {
        Self::new(model, DEFAULT_MAX_ATTEMPTS)
    }

    /// Attempt budget.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Generate a plan for the latest request in `messages`.
    pub async fn plan(
        &self,
        messages: &[Message],
        coworkers: &[Coworker],
        projections: &Projections,
    ) -> PlannerOutcome {
        let mut request = planning_messages(messages, coworkers, projections);
        let mut last_error = SchemaError::NotJson;

        for attempt in 1..=self.max_attempts {
            let output = match self.model.call(&request).await {
                Ok(output) => output,
                Err(error) => {
                    warn!(
                        attempt,
                        error = %error,
                        "planner call failed, continuing without a plan"
                    );
                    return PlannerOutcome::Aborted(error);
                }
            };

            let result = output_json(&output)
                .ok_or(SchemaError::NotJson)
                .and_then(|value| validate_plan(value, ValidationMode::Fresh));

            match result {
                Ok(plan) => {
                    info!(attempt, steps = plan.steps.len(), "plan created");
                    return PlannerOutcome::Created { plan, attempts: attempt };
                }
                Err(error) => {
                    let raw = output.into_text();
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %error,
                        reply = %preview(&raw, 200),
                        "planner reply rejected"
                    );
                    if attempt < self.max_attempts {
                        request.push(Message::assistant(raw));
                        request.push(Message::user(correction_instruction(
                            &error,
                            attempt,
                            self.max_attempts,
                        )));
                    }
                    last_error = error;
                }
            }
        }

        PlannerOutcome::Exhausted {
            attempts: self.max_attempts,
            last_error,
        }
    }
}

/// Build the reduced planning request.
pub fn planning_messages(
    messages: &[Message],
    coworkers: &[Coworker],
    projections: &Projections,
) -> Vec<Message> {
    let mut out = Vec::new();

    let mut seen = HashSet::new();
    for msg in messages.iter().filter(|m| m.is_system()) {
        if msg.content.contains(COWORKERS_OVERVIEW_MARKER) {
            continue;
        }
        if seen.insert(msg.content.as_str()) {
            out.push(msg.clone());
        }
    }

    out.extend(coworkers.iter().map(|c| Message::system(c.summary())));

    if let Some(last) = projections.last_output_message() {
        out.push(last);
    }

    let request = messages
        .iter()
        .rev()
        .find(|m| m.is_user())
        .map(|m| before_marker(&m.content, FINAL_ANSWER_CRITERIA_MARKER))
        .unwrap_or_default();
    let content = if request.is_empty() {
        PLANNING_INSTRUCTION.to_owned()
    } else {
        format!("{request}\n\n{PLANNING_INSTRUCTION}")
    };
    out.push(Message::user(content));

    debug!(messages = out.len(), coworkers = coworkers.len(), "planning request built");
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use helm_core::plan::StepStatus;
    use helm_core::state::StateEntry;
    use helm_llm::scripted::ScriptedModel;

    const GOOD: &str = r#"{"steps":[{"step_number":"1","description":"Fetch data","status":"NOT_STARTED","coworker":"SQL Agent"}],"next_step":"1"}"#;

    fn conversation() -> Vec<Message> {
        vec![
            Message::system("You are helpful."),
            Message::system("## Coworkers overview\n- SQL Agent"),
            Message::system("You are helpful."),
            Message::user("old question"),
            Message::assistant("old answer"),
            Message::user("Show monthly sales.\n\n## Final answer criteria\nA table."),
        ]
    }

    fn coworkers() -> Vec<Coworker> {
        vec![Coworker::new("SQL Agent", "Analyst", "Query the warehouse")]
    }

    #[test]
    fn request_is_reduced() {
        let entries = [StateEntry::new("rows: 12")];
        let projections = Projections::from_entries(&entries, "orchestrator");
        let msgs = planning_messages(&conversation(), &coworkers(), &projections);

        assert_eq!(msgs.len(), 4);
        assert_eq!(msgs[0].content, "You are helpful.");
        assert!(msgs[1].is_system());
        assert!(msgs[1].content.starts_with("Coworker `SQL Agent`"));
        assert!(msgs[2].content.contains("rows: 12"));
        let last = &msgs[3];
        assert!(last.content.starts_with("Show monthly sales.\n\n"));
        assert!(!last.content.contains("Final answer criteria"));
        assert!(last.content.ends_with(PLANNING_INSTRUCTION));
        assert!(msgs.iter().all(|m| !m.content.contains("old question")));
    }

    #[tokio::test]
    async fn first_valid_reply_creates_plan() {
        let model = Arc::new(ScriptedModel::with_texts([GOOD]));
        let outcome = Planner::with_defaults(model.clone())
            .plan(&conversation(), &coworkers(), &Projections::default())
            .await;
        assert_matches!(
            outcome,
            PlannerOutcome::Created { ref plan, attempts: 1 }
                if plan.steps[0].status == StepStatus::NotStarted
        );
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn retries_with_correction_then_succeeds() {
        let model = Arc::new(ScriptedModel::with_texts(["not json", r#"{"steps": []}"#, GOOD]));
        let outcome = Planner::with_defaults(model.clone())
            .plan(&conversation(), &coworkers(), &Projections::default())
            .await;
        assert_matches!(outcome, PlannerOutcome::Created { attempts: 3, .. });

        let calls = model.calls();
        assert_eq!(calls.len(), 3);
        let second = &calls[1];
        assert_eq!(second[second.len() - 2], Message::assistant("not json"));
        assert!(second[second.len() - 1].content.contains("does not contain JSON"));
        let third = &calls[2];
        assert!(third.last().unwrap().content.contains("final attempt"));
    }

    #[tokio::test]
    async fn exhausts_after_max_attempts() {
        let model = Arc::new(ScriptedModel::with_texts(["a", "b", "c", GOOD]));
        let outcome = Planner::with_defaults(model.clone())
            .plan(&conversation(), &coworkers(), &Projections::default())
            .await;
        assert_matches!(
            outcome,
            PlannerOutcome::Exhausted { attempts: 3, last_error: SchemaError::NotJson }
        );
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn model_error_aborts_without_retry() {
        let model = Arc::new(ScriptedModel::new());
        model.push_error("503");
        model.push_text(GOOD);
        let outcome = Planner::with_defaults(model.clone())
            .plan(&conversation(), &coworkers(), &Projections::default())
            .await;
        assert_matches!(outcome, PlannerOutcome::Aborted(_));
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn bare_list_reply_is_accepted() {
        let model = Arc::new(ScriptedModel::with_texts([
            r#"[{"step_number":"1","description":"d","status":"NOT_STARTED","coworker":"NONE"}]"#,
        ]));
        let outcome = Planner::new(model, 1)
            .plan(&conversation(), &[], &Projections::default())
            .await;
        assert_matches!(outcome, PlannerOutcome::Created { .. });
    }
}
