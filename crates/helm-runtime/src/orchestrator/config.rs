//! Orchestrator configuration.

use helm_context::constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_COMPACTION_WINDOW};
use helm_core::constants::DEFAULT_ORCHESTRATOR_ROLE;
use helm_planning::prompts::DEFAULT_MAX_ATTEMPTS;
use helm_settings::HelmSettings;

/// Knobs for one [`Orchestrator`](super::orchestrator::Orchestrator).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Whether old assistant messages are summarized.
    pub compaction_enabled: bool,
    /// Recent window and chunk size.
    pub compaction_window: usize,
    /// Summary cache capacity.
    pub cache_capacity: usize,
    /// `agent_role` of orchestrator-authored state entries.
    pub orchestrator_role: String,
    /// Whether decision, planning, and evaluation run at all.
    pub planning_enabled: bool,
    /// Planner attempts before planning is disabled for the session.
    pub max_attempts: u32,
    /// Whether evaluated plans that break the lock rules are rejected.
    pub enforce_locks: bool,
}

impl OrchestratorConfig {
    /// Build from loaded settings.
    pub fn from_settings(settings: &HelmSettings) -> Self {
        Self {
            compaction_enabled: settings.context.compaction.enabled,
            compaction_window: settings.context.compaction.window,
            cache_capacity: settings.context.cache.capacity,
            orchestrator_role: settings.context.orchestrator_role.clone(),
            planning_enabled: settings.planning.enabled,
            max_attempts: settings.planning.max_attempts,
            enforce_locks: settings.planning.enforce_locks,
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            compaction_enabled: true,
            compaction_window: DEFAULT_COMPACTION_WINDOW,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            orchestrator_role: DEFAULT_ORCHESTRATOR_ROLE.to_owned(),
            planning_enabled: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            enforce_locks: true,
        }
    }
}
