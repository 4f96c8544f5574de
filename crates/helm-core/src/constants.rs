//! Package-level constants and the content markers shared across crates.
//!
//! Markers are plain-text prefixes or headers the orchestrator writes into
//! message content and later detects again. Changing one changes the wire
//! contract with every prompt that mentions it.

/// Current version of Helm (sourced from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name.
pub const NAME: &str = "helm";

/// Prefix of synthetic messages that carry state-entry projections.
///
/// Messages starting with this marker are never counted or summarized by
/// the compactor.
pub const STATE_CONTEXT_MARKER: &str = "[STATE CONTEXT]";

/// Prefix of the assistant message that replaces a summarized chunk.
pub const CHUNK_SUMMARY_MARKER: &str = "[CHUNK SUMMARY]";

/// Header that starts the "final-answer criteria" suffix of a user message.
pub const FINAL_ANSWER_CRITERIA_MARKER: &str = "## Final answer criteria";

/// Header of the system block that lists coworkers for the main agent.
pub const COWORKERS_OVERVIEW_MARKER: &str = "## Coworkers overview";

/// Header of the rendered plan block.
pub const PLAN_BLOCK_HEADER: &str = "## Current plan";

/// Header of the block spliced in when the decision step answers directly.
pub const PLANNING_DECISION_HEADER: &str = "## Planning decision";

/// Prefix of every plan status note.
pub const PLAN_STATUS_PREFIX: &str = "[PLAN STATUS]";

/// Prefix of orchestrator notices shown to the user.
pub const NOTICE_PREFIX: &str = "[NOTICE]";

/// `role` value that marks a state entry as a conversation boundary.
pub const CONVERSATION_ROLE: &str = "conversation";

/// Default `agent_role` of state entries written by the orchestrator itself.
pub const DEFAULT_ORCHESTRATOR_ROLE: &str = "orchestrator";

/// Coworker sentinel for steps nobody is delegated to.
pub const NO_COWORKER: &str = "NONE";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_semver() {
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert_eq!(parts.len(), 3, "VERSION must be semver (MAJOR.MINOR.PATCH)");
        for part in parts {
            let _: u32 = part.parse().expect("each semver segment must be a number");
        }
    }

    #[test]
    fn markers_are_distinct() {
        let markers = [
            STATE_CONTEXT_MARKER,
            CHUNK_SUMMARY_MARKER,
            FINAL_ANSWER_CRITERIA_MARKER,
            COWORKERS_OVERVIEW_MARKER,
            PLAN_BLOCK_HEADER,
            PLANNING_DECISION_HEADER,
            PLAN_STATUS_PREFIX,
            NOTICE_PREFIX,
        ];
        for (i, a) in markers.iter().enumerate() {
            for b in &markers[i + 1..] {
                assert!(!a.starts_with(b) && !b.starts_with(a), "{a} overlaps {b}");
            }
        }
    }
}
