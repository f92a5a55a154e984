//! Application configuration
//!
//! This module re-exports the shared config type from tabtimer-types and
//! provides its persistence and path resolution.

use std::path::PathBuf;

pub use tabtimer_types::AppConfig;

use crate::storage::default_store_dir;

use super::ConfigError;

pub const CONFIG_APP_NAME: &str = "tabtimer";
pub const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for AppConfig persistence and derived settings
pub trait AppConfigExt: Sized {
    /// Load the stored config, falling back to defaults on any error
    fn load() -> Self;
    fn try_load() -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;

    /// Directory the tab store lives in
    fn store_dir(&self) -> PathBuf;
    /// Tick period, never below 10ms
    fn tick_interval(&self) -> std::time::Duration;
}

impl AppConfigExt for AppConfig {
    fn load() -> Self {
        Self::try_load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Using default configuration");
            Self::default()
        })
    }

    fn try_load() -> Result<Self, ConfigError> {
        confy::load(CONFIG_APP_NAME, CONFIG_NAME).map_err(ConfigError::Load)
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(CONFIG_APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn store_dir(&self) -> PathBuf {
        self.storage_dir
            .as_ref()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_store_dir)
    }

    fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms.max(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_storage_dir_wins() {
        let config = AppConfig {
            storage_dir: Some("/tmp/tabs".to_string()),
            ..Default::default()
        };
        assert_eq!(config.store_dir(), PathBuf::from("/tmp/tabs"));
    }

    #[test]
    fn blank_storage_dir_uses_platform_default() {
        let config = AppConfig {
            storage_dir: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.store_dir(), default_store_dir());
    }

    #[test]
    fn tick_interval_has_a_floor() {
        let config = AppConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.tick_interval().as_millis(), 10);
    }
}
