//! Offline inspection commands: zones, layouts, hotkeys and check.
//!
//! These commands load the configuration and resolve it against a monitor
//! list without touching any window.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use serde::Serialize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::cli::output::{self, format_bool, format_rect};
use crate::config::{self, Settings};
use crate::error::ZoneSnapError;
use crate::platform::monitors::normalize;
use crate::platform::{Monitor, Rect};
use crate::snap::HotkeyMap;
use crate::snap::hotkeys::HotkeyAction;
use crate::zones::{LayoutSelection, ZoneSnapshot};

/// Height reserved for the taskbar on the default monitor.
const DEFAULT_TASKBAR_HEIGHT: i32 = 40;

/// The monitor zones are resolved against when no monitor file is given:
/// 1920x1080 with a bottom taskbar.
#[must_use]
pub const fn default_monitor() -> Monitor {
    Monitor::new(
        0,
        Rect::new(0, 0, 1920, 1080),
        Rect::new(0, 0, 1920, 1080 - DEFAULT_TASKBAR_HEIGHT),
        true,
    )
}

/// Reads a JSON list of monitors, or returns the default monitor.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or lists no monitor.
pub fn load_monitors(path: Option<&Path>) -> Result<Vec<Monitor>, ZoneSnapError> {
    let Some(path) = path else {
        return Ok(vec![default_monitor()]);
    };

    let text = std::fs::read_to_string(path)?;
    let monitors: Vec<Monitor> = serde_json::from_str(&text)?;
    if monitors.is_empty() {
        return Err(ZoneSnapError::InvalidArguments(format!(
            "No monitors listed in {}",
            path.display()
        )));
    }

    Ok(normalize(monitors))
}

/// Resolves `layout` (or the startup layout) on every monitor.
///
/// # Errors
///
/// Returns [`ZoneSnapError::UnknownLayout`] if `layout` is not configured.
pub fn build_snapshot(
    settings: &Settings,
    monitors: Vec<Monitor>,
    layout: Option<&str>,
) -> Result<ZoneSnapshot, ZoneSnapError> {
    let name = layout.unwrap_or(&settings.initial_layout);
    if !settings.layouts.contains(name) {
        return Err(ZoneSnapError::UnknownLayout(name.to_string()));
    }

    Ok(ZoneSnapshot::build(
        monitors,
        Arc::new(settings.layouts.clone()),
        LayoutSelection::new(name),
    ))
}

/// One resolved zone, as printed by `zonesnap zones`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneReport {
    pub monitor: u32,
    pub zone: String,
    pub number: Option<u8>,
    pub label: Option<String>,
    pub rect: Rect,
    pub base: Rect,
}

/// Lists every zone in monitor order, then layout order.
#[must_use]
pub fn zone_reports(snapshot: &ZoneSnapshot) -> Vec<ZoneReport> {
    snapshot
        .all_zones()
        .map(|zone| ZoneReport {
            monitor: zone.monitor,
            zone: zone.name.clone(),
            number: snapshot.numbering.number(zone.monitor, &zone.name),
            label: snapshot.numbering.label(zone.monitor, &zone.name).map(str::to_string),
            rect: zone.rect,
            base: zone.base,
        })
        .collect()
}

#[derive(Tabled)]
struct MonitorRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Bounds")]
    bounds: String,
    #[tabled(rename = "Work Area")]
    work_area: String,
    #[tabled(rename = "Primary")]
    primary: String,
}

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "Monitor")]
    monitor: u32,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "#")]
    number: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Rect")]
    rect: String,
}

impl From<&ZoneReport> for ZoneRow {
    fn from(report: &ZoneReport) -> Self {
        Self {
            monitor: report.monitor,
            zone: report.zone.clone(),
            number: report.number.map(|n| n.to_string()).unwrap_or_default(),
            label: report.label.clone().unwrap_or_default(),
            rect: format_rect(&report.rect),
        }
    }
}

fn print_table<T: Tabled>(title: &str, rows: Vec<T>) {
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .to_string();
    println!("{}", title.bold());
    println!("{table}");
}

/// `zonesnap zones`.
///
/// # Errors
///
/// Returns configuration, monitor file and unknown layout errors.
pub fn show_zones(
    config_path: Option<&Path>,
    monitors_path: Option<&Path>,
    layout: Option<&str>,
    json: bool,
) -> Result<(), ZoneSnapError> {
    let (settings, _) = config::load_settings(config_path)?;
    let monitors = load_monitors(monitors_path)?;
    let snapshot = build_snapshot(&settings, monitors, layout)?;
    let reports = zone_reports(&snapshot);

    if json {
        let value = serde_json::json!({
            "layout": snapshot.selection.active,
            "monitors": serde_json::to_value(&snapshot.monitors)?,
            "zones": serde_json::to_value(&reports)?,
        });
        output::print_highlighted_json(&value);
        return Ok(());
    }

    let monitor_rows = snapshot
        .monitors
        .iter()
        .map(|m| MonitorRow {
            id: m.id,
            bounds: format_rect(&m.bounds),
            work_area: format_rect(&m.work_area),
            primary: format_bool(m.is_primary),
        })
        .collect();
    print_table("Monitors", monitor_rows);
    println!();

    if reports.is_empty() {
        println!("Layout '{}' has no zones on these monitors.", snapshot.selection.active);
        return Ok(());
    }

    let title = format!("Zones ({})", snapshot.selection.active);
    print_table(&title, reports.iter().map(ZoneRow::from).collect());
    Ok(())
}

#[derive(Tabled)]
struct LayoutRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Shape")]
    shape: &'static str,
    #[tabled(rename = "Zones")]
    zones: usize,
    #[tabled(rename = "Startup")]
    startup: String,
}

/// `zonesnap layouts`.
///
/// # Errors
///
/// Returns configuration errors.
pub fn show_layouts(config_path: Option<&Path>) -> Result<(), ZoneSnapError> {
    let (settings, _) = config::load_settings(config_path)?;

    let rows = settings
        .layouts
        .iter()
        .map(|layout| LayoutRow {
            name: layout.name.clone(),
            shape: if layout.is_per_monitor() { "per-monitor" } else { "flat" },
            zones: layout.zone_count(),
            startup: format_bool(layout.name == settings.initial_layout),
        })
        .collect();
    print_table("Layouts", rows);
    Ok(())
}

/// One hotkey binding, as printed by `zonesnap hotkeys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HotkeyReport {
    pub keys: String,
    pub action: HotkeyAction,
}

/// Lists the bindings that parsed, in configuration order.
#[must_use]
pub fn hotkey_reports(settings: &Settings) -> Vec<HotkeyReport> {
    HotkeyMap::from_config(&settings.hotkeys)
        .bindings()
        .iter()
        .map(|binding| HotkeyReport {
            keys: binding.combo.normalized().to_string(),
            action: binding.action.clone(),
        })
        .collect()
}

#[derive(Tabled)]
struct HotkeyRow {
    #[tabled(rename = "Keys")]
    keys: String,
    #[tabled(rename = "Action")]
    action: String,
}

#[derive(Tabled)]
struct MonitorKeyRow {
    #[tabled(rename = "Monitor")]
    monitor: u32,
    #[tabled(rename = "Key")]
    key: String,
}

/// `zonesnap hotkeys`.
///
/// # Errors
///
/// Returns configuration errors.
pub fn show_hotkeys(config_path: Option<&Path>, json: bool) -> Result<(), ZoneSnapError> {
    let (settings, _) = config::load_settings(config_path)?;
    let reports = hotkey_reports(&settings);

    if json {
        let value = serde_json::json!({
            "hotkeys": serde_json::to_value(&reports)?,
            "monitor_keys": serde_json::to_value(&settings.hotkeys.monitor_keys)?,
            "show_zones_key": settings.hotkeys.drag_behavior.show_zones_key,
        });
        output::print_highlighted_json(&value);
        return Ok(());
    }

    let rows = reports
        .iter()
        .map(|r| HotkeyRow { keys: r.keys.clone(), action: r.action.to_string() })
        .collect();
    print_table("Hotkeys", rows);
    println!();

    let monitor_rows = settings
        .hotkeys
        .monitor_keys
        .iter()
        .map(|(&monitor, key)| MonitorKeyRow { monitor, key: key.clone() })
        .collect();
    print_table("Monitor keys", monitor_rows);
    println!(
        "\nHold {} while dragging to show zones.",
        settings.hotkeys.drag_behavior.show_zones_key.bold()
    );
    Ok(())
}

/// `zonesnap check`.
///
/// # Errors
///
/// Returns the first configuration error found.
pub fn check(config_path: Option<&Path>) -> Result<(), ZoneSnapError> {
    let (settings, path) = config::load_settings(config_path)?;
    let hotkeys = hotkey_reports(&settings);

    println!("{} {}", format_bool(true), path.display());
    println!(
        "  {} layouts, startup layout '{}', {} hotkeys",
        settings.layouts.len(),
        settings.initial_layout,
        hotkeys.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "hotkeys": {
            "zone_hotkeys": [{ "keys": "ctrl+alt+left", "monitor": 0, "zone": "left" }],
            "layout_switches": [{ "keys": "ctrl+alt+bogus", "layout": "thirds" }]
        },
        "layouts": [
            {
                "name": "default",
                "zones": [
                    { "name": "left", "x_percent": 0, "y_percent": 0, "width_percent": 50, "height_percent": 100, "key": "q" },
                    { "name": "right", "x_percent": 50, "y_percent": 0, "width_percent": 50, "height_percent": 100 }
                ]
            },
            {
                "name": "thirds",
                "zones": [
                    { "name": "a", "x_percent": 0, "y_percent": 0, "width_percent": 33.333, "height_percent": 100 },
                    { "name": "b", "x_percent": 33.333, "y_percent": 0, "width_percent": 33.333, "height_percent": 100 },
                    { "name": "c", "x_percent": 66.666, "y_percent": 0, "width_percent": 33.334, "height_percent": 100 }
                ]
            }
        ]
    }"#;

    fn settings() -> Settings { Settings::parse(CONFIG).unwrap() }

    #[test]
    fn test_default_monitor_reserves_taskbar() {
        let monitor = default_monitor();
        assert_eq!(monitor.work_area, Rect::new(0, 0, 1920, 1040));
        assert!(monitor.is_primary);
    }

    #[test]
    fn test_zone_reports_on_default_monitor() {
        let snapshot = build_snapshot(&settings(), vec![default_monitor()], None).unwrap();
        let reports = zone_reports(&snapshot);

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].zone, "left");
        assert_eq!(reports[0].rect, Rect::new(0, 0, 960, 1040));
        assert_eq!(reports[0].number, Some(1));
        assert_eq!(reports[0].label.as_deref(), Some("Q"));
        assert_eq!(reports[1].rect, Rect::new(960, 0, 960, 1040));
        assert_eq!(reports[1].label.as_deref(), Some("2"));
    }

    #[test]
    fn test_build_snapshot_with_named_layout() {
        let snapshot = build_snapshot(&settings(), vec![default_monitor()], Some("thirds")).unwrap();
        assert_eq!(snapshot.selection.active, "thirds");
        assert_eq!(snapshot.zone_count(), 3);
    }

    #[test]
    fn test_build_snapshot_unknown_layout() {
        let result = build_snapshot(&settings(), vec![default_monitor()], Some("grid"));
        assert!(matches!(result, Err(ZoneSnapError::UnknownLayout(name)) if name == "grid"));
    }

    #[test]
    fn test_load_monitors_normalizes_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitors.json");
        std::fs::write(
            &path,
            r#"[
                { "bounds": { "x": 1920, "y": 0, "width": 1920, "height": 1080 },
                  "work_area": { "x": 1920, "y": 0, "width": 1920, "height": 1080 } },
                { "bounds": { "x": 0, "y": 0, "width": 1920, "height": 1080 },
                  "work_area": { "x": 0, "y": 0, "width": 1920, "height": 1040 },
                  "is_primary": true }
            ]"#,
        )
        .unwrap();

        let monitors = load_monitors(Some(&path)).unwrap();
        assert_eq!(monitors.len(), 2);
        assert_eq!(monitors[0].id, 0);
        assert!(monitors[0].is_primary);
        assert_eq!(monitors[1].bounds.x, 1920);
    }

    #[test]
    fn test_load_monitors_rejects_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitors.json");
        std::fs::write(&path, "[]").unwrap();

        assert!(matches!(load_monitors(Some(&path)), Err(ZoneSnapError::InvalidArguments(_))));
    }

    #[test]
    fn test_hotkey_reports_skip_invalid_combos() {
        let reports = hotkey_reports(&settings());

        assert!(reports.iter().any(|r| r.action
            == HotkeyAction::MoveToZone { monitor: 0, zone: "left".to_string() }));
        assert!(!reports.iter().any(|r| matches!(r.action, HotkeyAction::SwitchLayout { .. })));
    }
}
