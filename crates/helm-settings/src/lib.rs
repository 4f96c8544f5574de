//! # helm-settings
//!
//! Configuration with layered sources for the Helm orchestrator.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`HelmSettings::default()`]
//! 2. **User file**: `~/.helm/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `HELM_*` overrides (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use helm_settings::get_settings;
//!
//! let settings = get_settings();
//! println!("compaction window: {}", settings.context.compaction.window);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, expand_home, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::sync::OnceLock;

/// Global settings singleton.
static SETTINGS: OnceLock<HelmSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.helm/settings.json` with env var
/// overrides. If loading fails, compiled defaults are used.
pub fn get_settings() -> &'static HelmSettings {
    SETTINGS.get_or_init(|| {
        load_settings().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            HelmSettings::default()
        })
    })
}

/// Initialize the global settings with a specific value.
///
/// Returns the provided settings back if the global was already initialized.
#[allow(clippy::result_large_err)]
pub fn init_settings(settings: HelmSettings) -> std::result::Result<(), HelmSettings> {
    SETTINGS.set(settings)
}
