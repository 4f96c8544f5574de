//! # helm-planning
//!
//! The planner/evaluator control loop, minus the wiring.
//!
//! - **Response**: permissive JSON extraction from free-form model text
//! - **Schema**: plan shape validation for fresh and evaluated plans
//! - **Store**: session-keyed plan persistence (memory and JSON file)
//! - **Decision**: single-shot "is planning needed" gate
//! - **Planner**: first-time plan generation with bounded, corrective retries
//! - **Evaluator**: re-assessment of an existing plan against new evidence
//! - **Audit**: deterministic check of the lock and transition rules
//! - **Selector**: pure choice of the step to resume next
//! - **Injector**: renders the plan and one status note into the request

#![deny(unsafe_code)]

pub mod audit;
pub mod decision;
pub mod evaluator;
pub mod injector;
pub mod planner;
pub mod prompts;
pub mod response;
pub mod schema;
pub mod selector;
pub mod store;

pub use audit::{RuleViolation, audit_evaluation};
pub use decision::{Decision, DecisionOutcome, apply_answer};
pub use evaluator::{EvaluationOutcome, Evaluator};
pub use injector::{StatusNote, inject_plan, render_plan_block};
pub use planner::{Planner, PlannerOutcome};
pub use response::{extract_json, output_json};
pub use schema::{SchemaError, ValidationMode, validate_plan};
pub use selector::select_next_step;
pub use store::{FilePlanStore, MemoryPlanStore, PlanStore};
