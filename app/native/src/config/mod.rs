//! Configuration module for ZoneSnap.
//!
//! This module provides configuration types, loading functionality, and file watching
//! for hot-reloading configuration changes.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod settings;
pub mod template;
pub mod types;
mod watcher;

use std::path::{Path, PathBuf};

pub use settings::Settings;
pub use types::{
    CONFIG_ENV_VAR, ConfigError, DefaultMonitor, DragBehaviorConfig, HotkeysConfig,
    LayoutConfig, LayoutSwitchConfig, MonitorMode, MonitorZonesConfig, OverlayConfig,
    StateTrackingConfig, ZoneConfig, ZoneHotkeyConfig, ZoneSnapConfig, config_paths,
    find_config_file, load_config_from_path, parse_config,
    seconds,
};
pub use watcher::watch_config_file;

/// Resolves the configuration file to use.
///
/// An explicit path (from `--config`) wins; otherwise `ZONESNAP_CONFIG` and the
/// search paths are consulted.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] when no file can be located.
pub fn resolve_config_path(custom: Option<&Path>) -> Result<PathBuf, ConfigError> {
    custom.map(Path::to_path_buf).or_else(find_config_file).ok_or(ConfigError::NotFound)
}

/// Loads and validates the configuration.
///
/// Returns the settings together with the path they were read from, so the
/// caller can watch that file for changes.
///
/// # Errors
///
/// Returns any discovery, read, parse or validation error.
pub fn load_settings(custom: Option<&Path>) -> Result<(Settings, PathBuf), ConfigError> {
    let path = resolve_config_path(custom)?;
    let settings = Settings::load(&path)?;
    tracing::info!(
        path = %path.display(),
        layouts = settings.layouts.len(),
        initial_layout = %settings.initial_layout,
        "configuration loaded"
    );
    Ok((settings, path))
}

/// Returns the path a new configuration file should be created at.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> { config_paths().into_iter().next() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_path_wins() {
        let path = PathBuf::from("/tmp/zonesnap-custom.jsonc");
        assert_eq!(resolve_config_path(Some(&path)).unwrap(), path);
    }

    #[test]
    fn test_load_settings_from_custom_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.jsonc");
        template::create_config_file(&path).unwrap();

        let (settings, loaded_from) = load_settings(Some(&path)).unwrap();
        assert_eq!(loaded_from, path);
        assert!(settings.layouts.contains("default"));
    }

    #[test]
    fn test_load_settings_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(Some(&dir.path().join("nope.jsonc"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_default_config_path_is_jsonc() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("zonesnap/config.jsonc"));
        }
    }
}
