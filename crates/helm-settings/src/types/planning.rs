//! Decision, planner and evaluator settings.

use serde::{Deserialize, Serialize};

/// Planning behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanningSettings {
    /// Master switch. When off every turn is an unplanned pass-through.
    pub enabled: bool,
    /// Planner attempts before planning is disabled for the session.
    pub max_attempts: u32,
    /// Reject evaluator output that alters a locked step or performs a
    /// forbidden status transition. When off, only JSON shape is validated
    /// and violations are merely logged.
    pub enforce_locks: bool,
}

impl Default for PlanningSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            enforce_locks: true,
        }
    }
}
