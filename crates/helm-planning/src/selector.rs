//! Next-step selection.
//!
//! A pure function of the plan. The evaluator's own `next_step` is never
//! trusted; the selector's answer is what gets persisted and injected.
//!
//! Definitions, over steps ordered by number:
//!
//! - a FAILED or HUMAN_INPUT_REQUIRED step is *blocking* when some later step
//!   is still NOT_STARTED and no later step is IN_PROGRESS or COMPLETED
//! - a NOT_STARTED step is *independent* when no HUMAN_INPUT_REQUIRED step
//!   precedes it
//!
//! Evaluation order: blocking FAILED forces `""`; otherwise the smallest
//! IN_PROGRESS; otherwise, with a non-blocking FAILED, the smallest
//! independent NOT_STARTED; otherwise a blocking HUMAN_INPUT_REQUIRED forces
//! `""`; otherwise the smallest NOT_STARTED, or `""`.

use helm_core::plan::{Plan, PlanStep, StepStatus};

/// Choose the step to resume next, or `""` when nothing should run.
#[must_use]
pub fn select_next_step(plan: &Plan) -> String {
    let steps = plan.sorted_steps();

    if steps
        .iter()
        .enumerate()
        .any(|(i, s)| s.status == StepStatus::Failed && is_blocking(&steps, i))
    {
        return String::new();
    }

    if let Some(step) = first(&steps, StepStatus::InProgress) {
        return step.step_number.clone();
    }

    let has_failed = steps.iter().any(|s| s.status == StepStatus::Failed);
    if has_failed {
        if let Some(step) = first_independent_not_started(&steps) {
            return step.step_number.clone();
        }
    }

    if steps
        .iter()
        .enumerate()
        .any(|(i, s)| s.status == StepStatus::HumanInputRequired && is_blocking(&steps, i))
    {
        return String::new();
    }

    first(&steps, StepStatus::NotStarted)
        .map(|s| s.step_number.clone())
        .unwrap_or_default()
}

fn first<'a>(steps: &[&'a PlanStep], status: StepStatus) -> Option<&'a PlanStep> {
    steps.iter().copied().find(|s| s.status == status)
}

fn is_blocking(steps: &[&PlanStep], index: usize) -> bool {
    let later = &steps[index + 1..];
    let pending = later.iter().any(|s| s.status == StepStatus::NotStarted);
    let bypassed = later
        .iter()
        .any(|s| matches!(s.status, StepStatus::InProgress | StepStatus::Completed));
    pending && !bypassed
}

fn first_independent_not_started<'a>(steps: &[&'a PlanStep]) -> Option<&'a PlanStep> {
    steps
        .iter()
        .copied()
        .take_while(|s| s.status != StepStatus::HumanInputRequired)
        .find(|s| s.status == StepStatus::NotStarted)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use StepStatus::{Completed, Failed, HumanInputRequired, InProgress, NotStarted};

    fn plan(statuses: &[StepStatus]) -> Plan {
        let steps = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| PlanStep::new((i + 1).to_string(), format!("step {}", i + 1), *s, "NONE"))
            .collect();
        Plan::new(steps, "")
    }

    #[test]
    fn fresh_plan_starts_at_one() {
        assert_eq!(select_next_step(&plan(&[NotStarted])), "1");
    }

    #[test]
    fn skips_completed() {
        assert_eq!(select_next_step(&plan(&[Completed, NotStarted])), "2");
    }

    #[test]
    fn in_progress_wins() {
        assert_eq!(select_next_step(&plan(&[Completed, InProgress, NotStarted])), "2");
        assert_eq!(select_next_step(&plan(&[NotStarted, InProgress, InProgress])), "2");
    }

    #[test]
    fn all_completed_is_empty() {
        assert_eq!(select_next_step(&plan(&[Completed, Completed])), "");
    }

    #[test]
    fn blocking_failure_forces_empty() {
        // nothing after the failure has moved, so it blocks
        assert_eq!(select_next_step(&plan(&[Completed, Failed, NotStarted])), "");
    }

    #[test]
    fn failure_bypassed_by_later_progress_is_not_blocking() {
        assert_eq!(select_next_step(&plan(&[Failed, InProgress, NotStarted])), "2");
    }

    #[test]
    fn blocking_failure_beats_in_progress_elsewhere() {
        assert_eq!(select_next_step(&plan(&[InProgress, Failed, NotStarted])), "");
    }

    #[test]
    fn bypassed_failure_resumes_independent_step() {
        assert_eq!(select_next_step(&plan(&[Failed, Completed, NotStarted])), "3");
    }

    #[test]
    fn failure_at_the_end_is_not_blocking() {
        assert_eq!(select_next_step(&plan(&[Completed, Failed])), "");
    }

    #[test]
    fn blocking_human_input_forces_empty() {
        assert_eq!(select_next_step(&plan(&[Completed, HumanInputRequired, NotStarted])), "");
    }

    #[test]
    fn bypassed_human_input_continues() {
        assert_eq!(
            select_next_step(&plan(&[HumanInputRequired, Completed, NotStarted])),
            "3"
        );
    }

    #[test]
    fn non_blocking_failure_skips_steps_behind_human_input() {
        // step 1 failed but step 2 completed; step 3 awaits the user, so step 4
        // is not independent and nothing remains runnable
        let p = plan(&[Failed, Completed, HumanInputRequired, NotStarted]);
        assert_eq!(select_next_step(&p), "");
    }

    #[test]
    fn unsorted_plan_is_ordered_by_number() {
        let mut p = plan(&[Completed, NotStarted, NotStarted]);
        p.steps.reverse();
        assert_eq!(select_next_step(&p), "2");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn status() -> impl Strategy<Value = StepStatus> {
            prop::sample::select(StepStatus::ALL.to_vec())
        }

        proptest! {
            #[test]
            fn deterministic_and_order_independent(
                statuses in prop::collection::vec(status(), 1..10),
            ) {
                let p = plan(&statuses);
                let mut shuffled = p.clone();
                shuffled.steps.reverse();
                let a = select_next_step(&p);
                prop_assert_eq!(&a, &select_next_step(&p));
                prop_assert_eq!(&a, &select_next_step(&shuffled));
            }

            #[test]
            fn result_is_empty_or_runnable(statuses in prop::collection::vec(status(), 1..10)) {
                let p = plan(&statuses);
                let next = select_next_step(&p);
                if !next.is_empty() {
                    let step = p.step(&next).unwrap();
                    prop_assert!(matches!(step.status, NotStarted | InProgress));
                }
            }
        }
    }
}
