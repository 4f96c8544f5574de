//! The read-only delegate ("coworker") directory.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool a coworker can use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoworkerTool {
    /// Tool name.
    pub name: String,
    /// What the tool does.
    #[serde(default)]
    pub description: String,
    /// Tool-specific payload schema or defaults.
    #[serde(default)]
    pub payload: Value,
}

/// A delegate agent plan steps can be assigned to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coworker {
    /// Delegate id, as used in [`PlanStep::coworker`](crate::plan::PlanStep::coworker).
    pub id: String,
    /// Role title.
    #[serde(default)]
    pub role: String,
    /// Background.
    #[serde(default)]
    pub backstory: String,
    /// What the coworker is for.
    #[serde(default)]
    pub goal: String,
    /// Tools available to the coworker.
    #[serde(default)]
    pub tools: Vec<CoworkerTool>,
}

impl Coworker {
    /// Create a coworker without tools.
    pub fn new(id: impl Into<String>, role: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            backstory: String::new(),
            goal: goal.into(),
            tools: Vec::new(),
        }
    }

    /// Render the summary shown to the planner and evaluator.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = format!("Coworker `{}`", self.id);
        if !self.role.is_empty() {
            out.push_str(&format!(" ({})", self.role));
        }
        if !self.goal.is_empty() {
            out.push_str(&format!("\nGoal: {}", self.goal));
        }
        if !self.backstory.is_empty() {
            out.push_str(&format!("\nBackstory: {}", self.backstory));
        }
        if !self.tools.is_empty() {
            out.push_str("\nTools:");
            for tool in &self.tools {
                if tool.description.is_empty() {
                    out.push_str(&format!("\n- {}", tool.name));
                } else {
                    out.push_str(&format!("\n- {}: {}", tool.name, tool.description));
                }
            }
        }
        out
    }
}
