//! Deterministic audit of an evaluated plan against the lock rules.
//!
//! The evaluation prompt asks the model to follow the rules; this checks the
//! two that can be verified without interpreting evidence:
//!
//! - every locked step of the old plan reappears, as its own step, with
//!   identical status, description and coworker
//! - a step that keeps its number, description and coworker only moves along
//!   an allowed [`StepStatus::can_transition`] edge
//!
//! Whether violations reject the evaluation is the caller's choice.

use helm_core::plan::{Plan, PlanStep, StepStatus};

/// One broken rule.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    /// A locked step is missing from the new plan.
    #[error("locked step {step_number} ({description:?}) was removed")]
    LockedStepRemoved {
        /// Old label.
        step_number: String,
        /// Old description.
        description: String,
    },

    /// A locked step reappears with a different status, description or coworker.
    #[error("locked step {step_number} ({description:?}) was modified")]
    LockedStepModified {
        /// Old label.
        step_number: String,
        /// Old description.
        description: String,
    },

    /// A step moved along a forbidden edge.
    #[error("step {step_number} cannot move from {from} to {to}")]
    ForbiddenTransition {
        /// Label.
        step_number: String,
        /// Old status.
        from: &'static str,
        /// New status.
        to: &'static str,
    },
}

/// Audit `new` against `old`.
///
/// Each locked step claims one distinct step of the new plan. An exact copy
/// under the same number wins, then an exact copy under any number (repair
/// may renumber), then a changed step with the same number, description and
/// coworker, then any step with the same description and coworker, then any
/// step with the same number. A locked step left without a claim was removed.
pub fn audit_evaluation(old: &Plan, new: &Plan) -> Vec<RuleViolation> {
    let mut violations = Vec::new();
    let mut taken = vec![false; new.steps.len()];
    let mut reported = vec![false; new.steps.len()];

    for locked in old.sorted_steps().into_iter().filter(|s| s.is_locked()) {
        let same_number = |s: &PlanStep| s.step_number == locked.step_number;
        let same_content =
            |s: &PlanStep| s.description == locked.description && s.coworker == locked.coworker;

        let kept = claim(new, &mut taken, |s| same_number(s) && s.same_locked_fields(locked))
            .or_else(|| claim(new, &mut taken, |s| s.same_locked_fields(locked)));
        if kept.is_some() {
            continue;
        }

        let changed = claim(new, &mut taken, |s| same_number(s) && same_content(s))
            .or_else(|| claim(new, &mut taken, same_content))
            .or_else(|| claim(new, &mut taken, same_number));
        violations.push(match changed {
            Some(index) => {
                reported[index] = true;
                RuleViolation::LockedStepModified {
                    step_number: locked.step_number.clone(),
                    description: locked.description.clone(),
                }
            }
            None => RuleViolation::LockedStepRemoved {
                step_number: locked.step_number.clone(),
                description: locked.description.clone(),
            },
        });
    }

    for (index, step) in new.steps.iter().enumerate() {
        if reported[index] {
            continue;
        }
        let Some(before) = old.steps.iter().find(|o| {
            o.step_number == step.step_number
                && o.description == step.description
                && o.coworker == step.coworker
        }) else {
            continue;
        };
        if !StepStatus::can_transition(before.status, step.status) {
            violations.push(RuleViolation::ForbiddenTransition {
                step_number: step.step_number.clone(),
                from: before.status.as_str(),
                to: step.status.as_str(),
            });
        }
    }

    violations
}

/// Mark and return the first untaken step of `plan` matching `matches`.
fn claim(plan: &Plan, taken: &mut [bool], matches: impl Fn(&PlanStep) -> bool) -> Option<usize> {
    let index = plan
        .steps
        .iter()
        .enumerate()
        .position(|(i, s)| !taken[i] && matches(s))?;
    taken[index] = true;
    Some(index)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use StepStatus::{Completed, Failed, InProgress, NotStarted};

    fn step(n: &str, desc: &str, status: StepStatus) -> PlanStep {
        PlanStep::new(n, desc, status, "SQL Agent")
    }

    fn old() -> Plan {
        Plan::new(
            vec![
                step("1", "Fetch data", Completed),
                step("2", "Build chart", InProgress),
                step("3", "Write summary", NotStarted),
            ],
            "2",
        )
    }

    #[test]
    fn carried_over_plan_is_clean() {
        assert!(audit_evaluation(&old(), &old()).is_empty());
    }

    #[test]
    fn forward_progress_is_clean() {
        let mut new = old();
        new.steps[1].status = Completed;
        new.steps[2].status = InProgress;
        assert!(audit_evaluation(&old(), &new).is_empty());
    }

    #[test]
    fn reopening_a_locked_step_is_flagged() {
        let mut new = old();
        new.steps[0].status = InProgress;
        let v = audit_evaluation(&old(), &new);
        assert_eq!(v.len(), 1);
        assert_matches!(
            &v[0],
            RuleViolation::LockedStepModified { step_number, .. } if step_number == "1"
        );
    }

    #[test]
    fn removing_a_locked_step_is_flagged() {
        let mut new = old();
        let _ = new.steps.remove(0);
        let v = audit_evaluation(&old(), &new);
        assert_matches!(&v[..], [RuleViolation::LockedStepRemoved { .. }]);
    }

    #[test]
    fn renumbered_locked_step_is_accepted() {
        // repair inserted a new step before the locked one
        let new = Plan::new(
            vec![
                step("1", "Confirm scope", NotStarted),
                step("2", "Fetch data", Completed),
            ],
            "1",
        );
        let old = Plan::new(vec![step("1", "Fetch data", Completed)], "");
        assert!(audit_evaluation(&old, &new).is_empty());
    }

    #[test]
    fn backward_transition_is_flagged() {
        let mut new = old();
        new.steps[1].status = NotStarted;
        let v = audit_evaluation(&old(), &new);
        assert_eq!(
            v,
            vec![RuleViolation::ForbiddenTransition {
                step_number: "2".into(),
                from: "IN_PROGRESS",
                to: "NOT_STARTED",
            }]
        );
    }

    #[test]
    fn repaired_unlocked_step_is_not_a_transition() {
        let mut new = old();
        new.steps[2] = step("3", "Write a shorter summary", NotStarted);
        new.steps[1].status = Failed;
        assert!(audit_evaluation(&old(), &new).is_empty());
    }

    #[test]
    fn one_copy_cannot_stand_in_for_two_locked_twins() {
        let old = Plan::new(
            vec![
                step("1", "Run query", Completed),
                step("2", "Run query", Completed),
                step("3", "Plot results", NotStarted),
            ],
            "3",
        );
        let new = Plan::new(
            vec![
                step("1", "Run query", Completed),
                step("2", "Plot results", NotStarted),
            ],
            "2",
        );
        let v = audit_evaluation(&old, &new);
        assert_eq!(v.len(), 1);
        assert_matches!(
            &v[0],
            RuleViolation::LockedStepModified { step_number, .. } if step_number == "2"
        );
    }

    #[test]
    fn dropping_a_locked_twin_entirely_is_flagged() {
        let old = Plan::new(
            vec![step("1", "Run query", Completed), step("2", "Run query", Completed)],
            "",
        );
        let new = Plan::new(vec![step("1", "Run query", Completed)], "");
        assert_matches!(
            &audit_evaluation(&old, &new)[..],
            [RuleViolation::LockedStepRemoved { step_number, .. }] if step_number == "2"
        );
    }

    #[test]
    fn reopened_step_cannot_hide_behind_a_lookalike() {
        let old = Plan::new(
            vec![step("1", "Run query", Completed), step("2", "Run query", NotStarted)],
            "2",
        );
        let new = Plan::new(
            vec![step("1", "Run query", InProgress), step("2", "Run query", Completed)],
            "",
        );
        assert_eq!(
            audit_evaluation(&old, &new),
            vec![RuleViolation::ForbiddenTransition {
                step_number: "1".into(),
                from: "COMPLETED",
                to: "IN_PROGRESS",
            }]
        );
    }
}
