//! Configuration template generation.
//!
//! Generates a commented starter configuration. Unlike most options, layouts
//! are required, so the template ships with working layouts and leaves the
//! remaining options commented out at their default values.

use std::fs;
use std::path::Path;

/// Generates the starter configuration file contents.
#[must_use]
pub fn generate_config_template() -> String {
    r##"// ZoneSnap Configuration File
// ===========================
// This file uses JSONC format (JSON with comments).
// Layouts are required. Every other option is shown commented out with its
// default value; uncomment and modify the options you want to change.

{
  // ============================================================================
  // Layouts
  // ============================================================================
  // Zone rectangles are percentages of the monitor's work area (or of the full
  // monitor when "respect_taskbar" is false). "key" snaps the dragged window
  // into the zone while the overlay is shown.
  "layouts": [
    {
      "name": "default",
      "zones": [
        { "name": "left", "x_percent": 0, "y_percent": 0, "width_percent": 50, "height_percent": 100, "key": "q" },
        { "name": "right", "x_percent": 50, "y_percent": 0, "width_percent": 50, "height_percent": 100, "key": "w" },
        { "name": "full", "x_percent": 0, "y_percent": 0, "width_percent": 100, "height_percent": 100, "key": "e" }
      ]
    },
    {
      "name": "thirds",
      "zones": [
        { "name": "left", "x_percent": 0, "y_percent": 0, "width_percent": 33.33, "height_percent": 100, "key": "a" },
        { "name": "center", "x_percent": 33.33, "y_percent": 0, "width_percent": 33.34, "height_percent": 100, "key": "s" },
        { "name": "right", "x_percent": 66.67, "y_percent": 0, "width_percent": 33.33, "height_percent": 100, "key": "d" }
      ]
    }
  ],

  // Layout active at startup (falls back to "default", then to the first layout)
  "default_layout": "default"

  // ============================================================================
  // Hotkeys
  // ============================================================================
  // Uncommenting a section below requires a comma after the previous entry.
  //
  // "hotkeys": {
  //   "overlay_hotkey": "ctrl+alt+`",
  //   "restore_hotkey": "ctrl+alt+r",
  //   "reload_config_hotkey": "ctrl+alt+shift+r",
  //   "cycle_next_hotkey": "ctrl+alt+]",
  //   "cycle_prev_hotkey": "ctrl+alt+[",
  //   "cycle_all_next_hotkey": "ctrl+alt+shift+]",
  //   "cycle_all_prev_hotkey": "ctrl+alt+shift+[",
  //
  //   // Move the foreground window into a zone
  //   "zone_hotkeys": [
  //     { "keys": "ctrl+alt+left", "monitor": 0, "zone": "left" }
  //   ],
  //
  //   // Switch the active layout
  //   "layout_switches": [
  //     { "keys": "ctrl+alt+t", "layout": "thirds" }
  //   ],
  //
  //   // Hold a monitor key, then press a zone key, to target that monitor
  //   "monitor_keys": { "0": "`", "1": "1", "2": "2" },
  //
  //   // Monitor for zone keys pressed without a monitor key:
  //   // "context_aware", "primary", or a monitor id
  //   "default_monitor_for_zone_keys": "context_aware",
  //
  //   "drag_behavior": {
  //     "show_zones_key": "shift",
  //     "scroll_layout_switch_enabled": true,
  //     "scroll_cooldown_seconds": 0.3,
  //     "number_snap_cooldown_seconds": 0.5,
  //     "zone_hover_margin_pixels": 6,
  //     "ignore_fullscreen_zone": true
  //   },
  //
  //   "state_tracking": {
  //     "auto_restore_enabled": true,
  //     "movement_threshold_pixels": 10,
  //     "monitoring_interval_seconds": 0.1,
  //     "operation_exempt_delay_seconds": 2.0
  //   }
  // },

  // ============================================================================
  // Overlay
  // ============================================================================
  // "overlay": {
  //   "color": "cyan",
  //   "opacity": 0.3,
  //   "alpha": 180,
  //   "auto_hide_seconds": 3
  // }
}
"##
    .to_string()
}

/// Creates a configuration file with the template content.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn test_template_is_valid_configuration() {
        let settings = Settings::parse(&generate_config_template()).unwrap();
        assert_eq!(settings.initial_layout, "default");
        assert_eq!(settings.layouts.len(), 2);
    }

    #[test]
    fn test_template_documents_all_sections() {
        let template = generate_config_template();
        assert!(template.contains("\"hotkeys\""));
        assert!(template.contains("\"overlay\""));
        assert!(template.contains("drag_behavior"));
        assert!(template.contains("state_tracking"));
        assert!(template.contains("monitor_keys"));
    }

    #[test]
    fn test_create_config_file_makes_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.jsonc");

        create_config_file(&path).unwrap();
        assert!(path.exists());
    }
}
