//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`HelmSettings::default()`]
//! 2. If `~/.helm/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `HELM_*` environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::HelmSettings;

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string()))
}

/// Resolve the path to the settings file (`~/.helm/settings.json`).
pub fn settings_path() -> PathBuf {
    home_dir().join(".helm").join("settings.json")
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => home_dir().join(rest),
        None if path == "~" => home_dir(),
        None => PathBuf::from(path),
    }
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<HelmSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, defaults are used. Invalid JSON or an invalid
/// final value is an error.
pub fn load_settings_from_path(path: &Path) -> Result<HelmSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Defaults deep-merged with the file at `path`, without env overrides.
pub fn load_file_layer(path: &Path) -> Result<HelmSettings> {
    let defaults = serde_json::to_value(HelmSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `HELM_*` environment variable overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut HelmSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup` (an env var reader in production).
///
/// Each variable has strict parsing rules; invalid values are ignored with a
/// warning and the file/default value is kept.
pub fn apply_overrides_from(settings: &mut HelmSettings, lookup: impl Fn(&str) -> Option<String>) {
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    // ── Context ─────────────────────────────────────────────────────
    if let Some(v) = read_usize(&read, "HELM_COMPACTION_WINDOW", 1, 64) {
        settings.context.compaction.window = v;
    }
    if let Some(v) = read_bool(&read, "HELM_COMPACTION_ENABLED") {
        settings.context.compaction.enabled = v;
    }
    if let Some(v) = read_usize(&read, "HELM_CACHE_CAPACITY", 1, 100_000) {
        settings.context.cache.capacity = v;
    }
    if let Some(v) = read("HELM_ORCHESTRATOR_ROLE") {
        settings.context.orchestrator_role = v;
    }

    // ── Planning ────────────────────────────────────────────────────
    if let Some(v) = read_bool(&read, "HELM_PLANNING_ENABLED") {
        settings.planning.enabled = v;
    }
    if let Some(v) = read_usize(&read, "HELM_PLANNER_MAX_ATTEMPTS", 1, 10) {
        #[allow(clippy::cast_possible_truncation)]
        {
            settings.planning.max_attempts = v as u32;
        }
    }
    if let Some(v) = read_bool(&read, "HELM_ENFORCE_LOCKS") {
        settings.planning.enforce_locks = v;
    }

    // ── Storage / logging ───────────────────────────────────────────
    if let Some(v) = read("HELM_PLANS_DIR") {
        settings.storage.plans_dir = v;
    }
    if let Some(v) = read("HELM_CONTEXT_DIR") {
        settings.storage.context_dir = v;
    }
    if let Some(v) = read("HELM_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_bool(&read, "HELM_LOG_JSON") {
        settings.logging.json = v;
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `usize` within an inclusive range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

fn read_bool(read: &impl Fn(&str) -> Option<String>, name: &str) -> Option<bool> {
    let val = read(name)?;
    let result = parse_bool(&val);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_usize(
    read: &impl Fn(&str) -> Option<String>,
    name: &str,
    min: usize,
    max: usize,
) -> Option<usize> {
    let val = read(name)?;
    let result = parse_usize_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid integer env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
