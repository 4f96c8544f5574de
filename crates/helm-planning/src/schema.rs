//! Plan shape validation.
//!
//! Model replies are validated as untyped JSON first so that every defect
//! gets a precise [`SchemaError`] the planner can feed back in its
//! correction prompt. Only a reply that passes every check becomes a
//! [`Plan`].

use std::collections::HashSet;

use serde_json::{Map, Value};

use helm_core::plan::{Plan, PlanStep, StepStatus, parse_step_number};

/// Which plan is being validated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationMode {
    /// A brand-new plan: every step `NOT_STARTED`, `next_step` (if given)
    /// names the first step.
    Fresh,
    /// An evaluated plan: any status. `next_step` is only type-checked; the
    /// selector recomputes it.
    Evaluation,
}

/// Why a reply is not a valid plan.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// No JSON could be extracted from the reply.
    #[error("the response does not contain JSON")]
    NotJson,

    /// The JSON is neither an object nor a list of steps.
    #[error("the response must be a JSON object with a \"steps\" list")]
    NotObject,

    /// `steps` is absent or not a list.
    #[error("\"steps\" is missing or is not a list")]
    MissingSteps,

    /// `steps` is an empty list.
    #[error("\"steps\" must contain at least one step")]
    EmptySteps,

    /// A step is not an object.
    #[error("step at position {index} is not an object")]
    StepNotObject {
        /// Zero-based position in the list.
        index: usize,
    },

    /// A required step field is missing or has the wrong type.
    #[error("step at position {index}: \"{field}\" is missing or is not a string")]
    BadField {
        /// Zero-based position in the list.
        index: usize,
        /// Field name.
        field: &'static str,
    },

    /// A step number is not a positive integer label.
    #[error("step at position {index}: step_number {value:?} is not a positive integer")]
    BadStepNumber {
        /// Zero-based position in the list.
        index: usize,
        /// Offending label.
        value: String,
    },

    /// A status is not one of the known names.
    #[error("step {step}: unknown status {value:?}")]
    UnknownStatus {
        /// Step label.
        step: String,
        /// Offending status.
        value: String,
    },

    /// A status is known but not allowed in this mode.
    #[error("step {step}: status {status} is not allowed in a new plan, use NOT_STARTED")]
    StatusNotAllowed {
        /// Step label.
        step: String,
        /// Offending status.
        status: &'static str,
    },

    /// Two steps share a number.
    #[error("step_number {0} appears more than once")]
    DuplicateStep(String),

    /// Step numbers do not run 1, 2, 3, ...
    #[error("step numbers must be consecutive starting at 1, found {found:?}")]
    NonConsecutive {
        /// Sorted numbers found.
        found: Vec<u32>,
    },

    /// `next_step` is present but not a string.
    #[error("\"next_step\" must be a string")]
    BadNextStep,

    /// A fresh plan's `next_step` does not name the first step.
    #[error("\"next_step\" must be {expected:?} (the first step), found {found:?}")]
    NextStepNotFirst {
        /// First step label.
        expected: String,
        /// Value given.
        found: String,
    },
}

/// Validate `value` as a plan.
///
/// A bare list is accepted as `{"steps": list}`. Steps are returned sorted
/// by number.
pub fn validate_plan(value: Value, mode: ValidationMode) -> Result<Plan, SchemaError> {
    let object = match value {
        Value::Object(map) => map,
        Value::Array(steps) => {
            let mut map = Map::new();
            let _ = map.insert("steps".to_owned(), Value::Array(steps));
            map
        }
        _ => return Err(SchemaError::NotObject),
    };

    let raw_steps = object
        .get("steps")
        .and_then(Value::as_array)
        .ok_or(SchemaError::MissingSteps)?;
    if raw_steps.is_empty() {
        return Err(SchemaError::EmptySteps);
    }

    let mut steps = Vec::with_capacity(raw_steps.len());
    for (index, raw) in raw_steps.iter().enumerate() {
        steps.push(validate_step(index, raw, mode)?);
    }

    let mut seen = HashSet::new();
    for step in &steps {
        if !seen.insert(step.step_number.as_str()) {
            return Err(SchemaError::DuplicateStep(step.step_number.clone()));
        }
    }

    let mut numbers: Vec<u32> = steps.iter().filter_map(PlanStep::number).collect();
    numbers.sort_unstable();
    if numbers.iter().zip(1u32..).any(|(n, want)| *n != want) {
        return Err(SchemaError::NonConsecutive { found: numbers });
    }

    let next_step = match object.get("next_step") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(SchemaError::BadNextStep),
    };

    let mut plan = Plan::new(steps, next_step);
    plan.sort_steps();

    if mode == ValidationMode::Fresh {
        let first = &plan.steps[0].step_number;
        if !plan.next_step.is_empty() && &plan.next_step != first {
            return Err(SchemaError::NextStepNotFirst {
                expected: first.clone(),
                found: plan.next_step,
            });
        }
    }

    Ok(plan)
}

fn validate_step(index: usize, raw: &Value, mode: ValidationMode) -> Result<PlanStep, SchemaError> {
    let obj = raw.as_object().ok_or(SchemaError::StepNotObject { index })?;
    let field = |name: &'static str| {
        obj.get(name)
            .and_then(Value::as_str)
            .ok_or(SchemaError::BadField { index, field: name })
    };

    let step_number = field("step_number")?;
    let description = field("description")?;
    let status = field("status")?;
    let coworker = field("coworker")?;

    if parse_step_number(step_number).is_none() {
        return Err(SchemaError::BadStepNumber {
            index,
            value: step_number.to_owned(),
        });
    }

    let status = StepStatus::parse(status).ok_or_else(|| SchemaError::UnknownStatus {
        step: step_number.to_owned(),
        value: status.to_owned(),
    })?;
    if mode == ValidationMode::Fresh && status != StepStatus::NotStarted {
        return Err(SchemaError::StatusNotAllowed {
            step: step_number.to_owned(),
            status: status.as_str(),
        });
    }

    Ok(PlanStep::new(step_number, description, status, coworker))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
