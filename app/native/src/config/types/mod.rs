//! Configuration types for ZoneSnap.
//!
//! This module provides all configuration types organized by domain.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod hotkeys;
pub mod layouts;
pub mod overlay;
pub mod root;

use std::time::Duration;

pub use hotkeys::{
    DefaultMonitor, DragBehaviorConfig, HotkeysConfig, LayoutSwitchConfig, MonitorMode,
    StateTrackingConfig, ZoneHotkeyConfig,
};
pub use layouts::{LayoutConfig, MonitorZonesConfig, ZoneConfig};
pub use overlay::OverlayConfig;
pub use root::{
    CONFIG_ENV_VAR, ConfigError, ZoneSnapConfig, config_paths, find_config_file,
    load_config_from_path, parse_config,
};

/// Converts a seconds value from the configuration file into a duration,
/// rounded to whole milliseconds. Negative and non-finite values become zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn seconds(value: f64) -> Duration {
    if !value.is_finite() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_millis((value * 1000.0).round() as u64)
}
