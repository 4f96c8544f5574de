//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so a partial
//! JSON file only needs the keys it overrides.

mod context;
mod planning;

pub use context::*;
pub use planning::*;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "context": { "compaction": { "window": 6 } },
///   "planning": { "maxAttempts": 2 }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HelmSettings {
    /// Settings schema version.
    pub version: String,
    /// Application name.
    pub name: String,
    /// Context compaction, cache and projection settings.
    pub context: ContextSettings,
    /// Decision, planner and evaluator settings.
    pub planning: PlanningSettings,
    /// File-backed store locations.
    pub storage: StorageSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for HelmSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: "helm".to_string(),
            context: ContextSettings::default(),
            planning: PlanningSettings::default(),
            storage: StorageSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl HelmSettings {
    /// Reject values the orchestrator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.context.compaction.window == 0 {
            return Err(SettingsError::InvalidValue(
                "context.compaction.window must be at least 1".into(),
            ));
        }
        if self.context.cache.capacity == 0 {
            return Err(SettingsError::InvalidValue(
                "context.cache.capacity must be at least 1".into(),
            ));
        }
        if self.planning.max_attempts == 0 {
            return Err(SettingsError::InvalidValue(
                "planning.maxAttempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Locations of the file-backed stores.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    /// Directory holding one `<session>.plan.json` per session.
    pub plans_dir: String,
    /// Directory holding one `<session>.jsonl` state-entry log per session.
    pub context_dir: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            plans_dir: "~/.helm/plans".to_string(),
            context_dir: "~/.helm/context".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}
