//! Context management settings.

use serde::{Deserialize, Serialize};

use helm_core::constants::DEFAULT_ORCHESTRATOR_ROLE;

/// Container for context compaction, summary cache and projection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextSettings {
    /// Assistant-message compaction.
    pub compaction: CompactionSettings,
    /// Summary cache.
    pub cache: CacheSettings,
    /// `agent_role` of state entries written by the orchestrator itself;
    /// such entries are excluded from the past/new projections.
    pub orchestrator_role: String,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            compaction: CompactionSettings::default(),
            cache: CacheSettings::default(),
            orchestrator_role: DEFAULT_ORCHESTRATOR_ROLE.to_string(),
        }
    }
}

/// Assistant-message compaction settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompactionSettings {
    /// Whether compaction runs at all.
    pub enabled: bool,
    /// Recent-window size and chunk size, in assistant messages.
    pub window: usize,
}

impl Default for CompactionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            window: 4,
        }
    }
}

/// Summary cache settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheSettings {
    /// Maximum number of cached chunk summaries before FIFO eviction.
    pub capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}
