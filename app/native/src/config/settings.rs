//! Validated, canonical configuration.
//!
//! [`Settings`] is what the engine runs on: every default applied, layouts
//! converted to their canonical shape and the startup layout picked. It is
//! built once per load and replaced wholesale on reload.

use std::collections::HashSet;
use std::path::Path;

use super::types::{
    ConfigError, HotkeysConfig, OverlayConfig, ZoneSnapConfig, load_config_from_path,
    parse_config,
};
use crate::platform::keys::parse_key;
use crate::zones::LayoutSet;

/// Validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub hotkeys: HotkeysConfig,
    pub overlay: OverlayConfig,
    pub layouts: LayoutSet,
    /// Layout active after loading.
    pub initial_layout: String,
}

impl Settings {
    /// Validates a parsed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoLayouts`] when no layout is defined, and a
    /// layout or zone error for malformed layouts. A missing layout set is
    /// never replaced by a built-in default.
    pub fn from_config(config: ZoneSnapConfig) -> Result<Self, ConfigError> {
        if config.layouts.is_empty() {
            return Err(ConfigError::NoLayouts);
        }

        let mut names = HashSet::new();
        let mut layouts = Vec::with_capacity(config.layouts.len());
        for layout in config.layouts {
            if !names.insert(layout.name.clone()) {
                return Err(ConfigError::DuplicateLayout(layout.name));
            }
            layouts.push(layout.into_layout()?);
        }
        let layouts = LayoutSet::new(layouts);

        if let Some(name) = &config.default_layout
            && !layouts.contains(name)
        {
            tracing::warn!(layout = %name, "default_layout does not exist, ignoring");
        }

        let initial_layout = layouts
            .initial_name(config.default_layout.as_deref())
            .ok_or(ConfigError::NoLayouts)?
            .to_string();

        warn_unknown_zone_keys(&layouts);

        Ok(Self {
            hotkeys: config.hotkeys,
            overlay: config.overlay,
            layouts,
            initial_layout,
        })
    }

    /// Parses and validates configuration text (JSONC).
    ///
    /// # Errors
    ///
    /// Returns any parse or validation error.
    pub fn parse(text: &str) -> Result<Self, ConfigError> { Self::from_config(parse_config(text)?) }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns any read, parse or validation error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_config(load_config_from_path(path)?)
    }
}

fn warn_unknown_zone_keys(layouts: &LayoutSet) {
    for layout in layouts.iter() {
        for zone in layout.all_zones() {
            if let Some(key) = zone.key()
                && parse_key(key).is_none()
            {
                tracing::warn!(
                    layout = %layout.name,
                    zone = %zone.name,
                    key = %key,
                    "unknown zone key, the zone can only be selected by hover or number"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALVES: &str = r#"{
        "layouts": [
            {
                "name": "halves",
                "zones": [
                    {"name": "left", "x_percent": 0, "y_percent": 0, "width_percent": 50, "height_percent": 100, "key": "q"},
                    {"name": "right", "x_percent": 50, "y_percent": 0, "width_percent": 50, "height_percent": 100, "key": "w"}
                ]
            },
            {
                "name": "default",
                "zones": [
                    {"name": "full", "x_percent": 0, "y_percent": 0, "width_percent": 100, "height_percent": 100}
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_picks_default_layout() {
        let settings = Settings::parse(HALVES).unwrap();
        assert_eq!(settings.initial_layout, "default");
        assert_eq!(settings.layouts.len(), 2);
        assert_eq!(settings.hotkeys, HotkeysConfig::default());
    }

    #[test]
    fn test_default_layout_field_wins() {
        let text = HALVES.replacen('{', r#"{"default_layout": "halves","#, 1);
        let settings = Settings::parse(&text).unwrap();
        assert_eq!(settings.initial_layout, "halves");
    }

    #[test]
    fn test_unknown_default_layout_falls_back() {
        let text = HALVES.replacen('{', r#"{"default_layout": "missing","#, 1);
        let settings = Settings::parse(&text).unwrap();
        assert_eq!(settings.initial_layout, "default");
    }

    #[test]
    fn test_missing_layouts_is_fatal() {
        let err = Settings::parse("{}").unwrap_err();
        assert!(matches!(err, ConfigError::NoLayouts));

        let err = Settings::parse(r#"{"layouts": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::NoLayouts));
    }

    #[test]
    fn test_duplicate_layouts_are_rejected() {
        let text = r#"{"layouts": [{"name": "a", "zones": []}, {"name": "a", "zones": []}]}"#;
        let err = Settings::parse(text).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateLayout(name) if name == "a"));
    }

    #[test]
    fn test_unknown_zone_key_is_not_fatal() {
        let text = r#"{"layouts": [{"name": "a", "zones": [
            {"name": "left", "x_percent": 0, "y_percent": 0, "width_percent": 50, "height_percent": 100, "key": "hyper"}
        ]}]}"#;
        assert!(Settings::parse(text).is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.jsonc");
        std::fs::write(&path, HALVES).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert!(settings.layouts.contains("halves"));
    }
}
