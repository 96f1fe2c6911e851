//! Hotkey, drag and state tracking configuration types.

use std::collections::BTreeMap;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::seconds;

/// A hotkey that moves the foreground window into a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ZoneHotkeyConfig {
    /// Key combination, for example `"ctrl+alt+left"`.
    pub keys: String,

    /// Target monitor id.
    pub monitor: u32,

    /// Target zone name.
    pub zone: String,
}

/// A hotkey that switches the active layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LayoutSwitchConfig {
    /// Key combination.
    pub keys: String,

    /// Layout to activate.
    pub layout: String,
}

/// Named strategies for picking the monitor of a zone key pressed without a
/// monitor key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MonitorMode {
    /// The cursor's monitor while dragging, else the active window's monitor.
    #[default]
    ContextAware,
    /// The primary monitor.
    Primary,
}

/// Which monitor a zone key targets when no monitor key is held.
///
/// Either `"context_aware"`, `"primary"`, or a monitor id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum DefaultMonitor {
    /// Always this monitor id.
    Fixed(u32),
    /// A named strategy.
    Mode(MonitorMode),
}

impl Default for DefaultMonitor {
    fn default() -> Self { Self::Mode(MonitorMode::ContextAware) }
}

/// Drag gesture behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DragBehaviorConfig {
    /// Key that shows the zone overlay when pressed during a window drag.
    /// Default: "shift"
    pub show_zones_key: String,

    /// Scroll while dragging to cycle the layout of the monitor under the cursor.
    /// Default: true
    pub scroll_layout_switch_enabled: bool,

    /// Minimum seconds between two scroll-driven layout switches.
    /// Default: 0.3
    pub scroll_cooldown_seconds: f64,

    /// Seconds after a key-driven snap during which no new drag is captured.
    /// Default: 0.5
    pub number_snap_cooldown_seconds: f64,

    /// Pixels trimmed from each zone edge when hit-testing the cursor.
    /// Default: 6
    pub zone_hover_margin_pixels: i32,

    /// Skip full-screen zones when hit-testing the cursor.
    /// Default: true
    pub ignore_fullscreen_zone: bool,
}

impl Default for DragBehaviorConfig {
    fn default() -> Self {
        Self {
            show_zones_key: "shift".to_string(),
            scroll_layout_switch_enabled: true,
            scroll_cooldown_seconds: 0.3,
            number_snap_cooldown_seconds: 0.5,
            zone_hover_margin_pixels: 6,
            ignore_fullscreen_zone: true,
        }
    }
}

impl DragBehaviorConfig {
    #[must_use]
    pub fn scroll_cooldown(&self) -> Duration { seconds(self.scroll_cooldown_seconds) }

    #[must_use]
    pub fn number_snap_cooldown(&self) -> Duration { seconds(self.number_snap_cooldown_seconds) }
}

/// Saved-geometry tracking and drift restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StateTrackingConfig {
    /// Restore a snapped window's original geometry when it is moved by hand.
    /// Default: true
    pub auto_restore_enabled: bool,

    /// Pixels a snapped window may drift before it counts as moved.
    /// Default: 10
    pub movement_threshold_pixels: i32,

    /// Seconds between two drift checks.
    /// Default: 0.1
    pub monitoring_interval_seconds: f64,

    /// Seconds a window is ignored by the drift check after a programmatic move.
    /// Default: 2.0
    pub operation_exempt_delay_seconds: f64,
}

impl Default for StateTrackingConfig {
    fn default() -> Self {
        Self {
            auto_restore_enabled: true,
            movement_threshold_pixels: 10,
            monitoring_interval_seconds: 0.1,
            operation_exempt_delay_seconds: 2.0,
        }
    }
}

impl StateTrackingConfig {
    #[must_use]
    pub fn monitoring_interval(&self) -> Duration { seconds(self.monitoring_interval_seconds) }

    #[must_use]
    pub fn operation_exempt_delay(&self) -> Duration {
        seconds(self.operation_exempt_delay_seconds)
    }
}

fn default_monitor_keys() -> BTreeMap<u32, String> {
    BTreeMap::from([(0, "`".to_string()), (1, "1".to_string()), (2, "2".to_string())])
}

/// Hotkey configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HotkeysConfig {
    /// Toggles the zone overlay.
    /// Default: "ctrl+alt+`"
    pub overlay_hotkey: String,

    /// Restores the foreground window to its pre-snap geometry.
    /// Default: "ctrl+alt+r"
    pub restore_hotkey: String,

    /// Reloads the configuration file.
    /// Default: "ctrl+alt+shift+r"
    pub reload_config_hotkey: String,

    /// Moves the foreground window to the next zone on its monitor.
    /// Default: "ctrl+alt+]"
    pub cycle_next_hotkey: String,

    /// Moves the foreground window to the previous zone on its monitor.
    /// Default: "ctrl+alt+["
    pub cycle_prev_hotkey: String,

    /// Moves the foreground window to the next zone across all monitors.
    /// Default: "ctrl+alt+shift+]"
    pub cycle_all_next_hotkey: String,

    /// Moves the foreground window to the previous zone across all monitors.
    /// Default: "ctrl+alt+shift+["
    pub cycle_all_prev_hotkey: String,

    /// Hotkeys that move the foreground window into a specific zone.
    pub zone_hotkeys: Vec<ZoneHotkeyConfig>,

    /// Hotkeys that switch the active layout.
    pub layout_switches: Vec<LayoutSwitchConfig>,

    /// Keys that select a monitor before pressing a zone key.
    /// Default: {"0": "`", "1": "1", "2": "2"}
    #[serde(default = "default_monitor_keys")]
    pub monitor_keys: BTreeMap<u32, String>,

    /// Monitor used by zone keys when no monitor key is held.
    /// Default: "context_aware"
    pub default_monitor_for_zone_keys: DefaultMonitor,

    /// Drag gesture behavior.
    pub drag_behavior: DragBehaviorConfig,

    /// Saved-geometry tracking and drift restore.
    pub state_tracking: StateTrackingConfig,
}

impl Default for HotkeysConfig {
    fn default() -> Self {
        Self {
            overlay_hotkey: "ctrl+alt+`".to_string(),
            restore_hotkey: "ctrl+alt+r".to_string(),
            reload_config_hotkey: "ctrl+alt+shift+r".to_string(),
            cycle_next_hotkey: "ctrl+alt+]".to_string(),
            cycle_prev_hotkey: "ctrl+alt+[".to_string(),
            cycle_all_next_hotkey: "ctrl+alt+shift+]".to_string(),
            cycle_all_prev_hotkey: "ctrl+alt+shift+[".to_string(),
            zone_hotkeys: Vec::new(),
            layout_switches: Vec::new(),
            monitor_keys: default_monitor_keys(),
            default_monitor_for_zone_keys: DefaultMonitor::default(),
            drag_behavior: DragBehaviorConfig::default(),
            state_tracking: StateTrackingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotkeys_defaults() {
        let config = HotkeysConfig::default();
        assert_eq!(config.overlay_hotkey, "ctrl+alt+`");
        assert_eq!(config.cycle_all_prev_hotkey, "ctrl+alt+shift+[");
        assert_eq!(config.monitor_keys.get(&0).map(String::as_str), Some("`"));
        assert_eq!(config.default_monitor_for_zone_keys, DefaultMonitor::default());
    }

    #[test]
    fn test_empty_object_uses_all_defaults() {
        let config: HotkeysConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, HotkeysConfig::default());
    }

    #[test]
    fn test_present_monitor_keys_replace_defaults() {
        let config: HotkeysConfig =
            serde_json::from_str(r#"{"monitor_keys": {"1": "f1"}}"#).unwrap();
        assert_eq!(config.monitor_keys.len(), 1);
        assert_eq!(config.monitor_keys.get(&1).map(String::as_str), Some("f1"));
    }

    #[test]
    fn test_default_monitor_variants() {
        let parse = |json: &str| -> DefaultMonitor {
            serde_json::from_str::<HotkeysConfig>(&format!(
                r#"{{"default_monitor_for_zone_keys": {json}}}"#
            ))
            .unwrap()
            .default_monitor_for_zone_keys
        };

        assert_eq!(parse(r#""context_aware""#), DefaultMonitor::Mode(MonitorMode::ContextAware));
        assert_eq!(parse(r#""primary""#), DefaultMonitor::Mode(MonitorMode::Primary));
        assert_eq!(parse("2"), DefaultMonitor::Fixed(2));
    }

    #[test]
    fn test_unknown_default_monitor_is_rejected() {
        let result = serde_json::from_str::<HotkeysConfig>(
            r#"{"default_monitor_for_zone_keys": "leftmost"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_drag_behavior_durations() {
        let drag = DragBehaviorConfig::default();
        assert_eq!(drag.scroll_cooldown(), Duration::from_millis(300));
        assert_eq!(drag.number_snap_cooldown(), Duration::from_millis(500));

        let tracking = StateTrackingConfig::default();
        assert_eq!(tracking.monitoring_interval(), Duration::from_millis(100));
        assert_eq!(tracking.operation_exempt_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_drag_behavior() {
        let config: HotkeysConfig = serde_json::from_str(
            r#"{"drag_behavior": {"show_zones_key": "ctrl", "zone_hover_margin_pixels": 0}}"#,
        )
        .unwrap();
        assert_eq!(config.drag_behavior.show_zones_key, "ctrl");
        assert_eq!(config.drag_behavior.zone_hover_margin_pixels, 0);
        assert!(config.drag_behavior.scroll_layout_switch_enabled);
    }
}
