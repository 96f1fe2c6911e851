//! Percentage zones to absolute pixel rectangles.

use std::collections::BTreeMap;

use super::registry::LayoutSelection;
use super::{LayoutSet, ResolvedZone};
use crate::config::ZoneConfig;
use crate::platform::{Monitor, Rect};

/// Resolved zones per monitor id. Monitors without zones have no entry.
pub type ZoneMap = BTreeMap<u32, Vec<ResolvedZone>>;

/// Resolves the effective layout of every monitor.
///
/// Each monitor uses its override layout if one is selected, else the global
/// active layout. A monitor whose layout has no zones for it is skipped.
#[must_use]
pub fn resolve(monitors: &[Monitor], layouts: &LayoutSet, selection: &LayoutSelection) -> ZoneMap {
    let mut map = ZoneMap::new();

    for monitor in monitors {
        let layout_name = selection.effective(monitor.id);
        let Some(layout) = layouts.get(layout_name) else {
            tracing::debug!(monitor = monitor.id, layout = %layout_name, "layout not found, skipping monitor");
            continue;
        };

        let zones: Vec<ResolvedZone> =
            layout.zones_for(monitor.id).iter().map(|zone| resolve_zone(monitor, zone)).collect();

        if zones.is_empty() {
            tracing::debug!(monitor = monitor.id, layout = %layout.name, "no zones for monitor");
            continue;
        }

        map.insert(monitor.id, zones);
    }

    map
}

/// Resolves one zone against a monitor.
#[must_use]
pub fn resolve_zone(monitor: &Monitor, zone: &ZoneConfig) -> ResolvedZone {
    let base = monitor.base_rect(zone.respect_taskbar);

    let x_offset = scale(base.width, zone.x_percent);
    let y_offset = scale(base.height, zone.y_percent);
    let width = scale(base.width, zone.width_percent).min(base.width - x_offset);
    let height = scale(base.height, zone.height_percent).min(base.height - y_offset);

    ResolvedZone {
        monitor: monitor.id,
        name: zone.name.clone(),
        rect: Rect::new(base.x + x_offset, base.y + y_offset, width, height),
        base,
        work_area: monitor.work_area,
        key: zone.key().map(str::to_string),
    }
}

/// `floor(length * percent / 100)`, with the percentage clamped to `[0, 100]`.
#[allow(clippy::cast_possible_truncation)]
fn scale(length: i32, percent: f64) -> i32 {
    if length <= 0 || !percent.is_finite() {
        return 0;
    }
    let percent = percent.clamp(0.0, 100.0);
    (f64::from(length) * percent / 100.0).floor() as i32
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::zones::{Layout, LayoutZones};

    fn monitor(id: u32, x: i32) -> Monitor {
        Monitor::new(id, Rect::new(x, 0, 1920, 1080), Rect::new(x, 0, 1920, 1040), id == 0)
    }

    fn flat(name: &str, zones: Vec<ZoneConfig>) -> Layout {
        Layout { name: name.to_string(), zones: LayoutZones::Flat(zones) }
    }

    #[test]
    fn test_left_half_of_work_area() {
        let monitor = Monitor::new(0, Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1080), true);
        let zone = resolve_zone(&monitor, &ZoneConfig::new("left", 0.0, 0.0, 50.0, 100.0));
        assert_eq!(zone.rect, Rect::new(0, 0, 960, 1080));
    }

    #[test]
    fn test_respect_taskbar_selects_base() {
        let monitor = monitor(0, 0);
        let mut zone = ZoneConfig::new("full", 0.0, 0.0, 100.0, 100.0);

        assert_eq!(resolve_zone(&monitor, &zone).rect, Rect::new(0, 0, 1920, 1040));

        zone.respect_taskbar = false;
        assert_eq!(resolve_zone(&monitor, &zone).rect, Rect::new(0, 0, 1920, 1080));
    }

    #[test]
    fn test_truncates_instead_of_rounding() {
        let monitor = Monitor::new(0, Rect::new(0, 0, 1000, 1000), Rect::new(0, 0, 1000, 1000), true);
        let zone = resolve_zone(&monitor, &ZoneConfig::new("third", 33.33, 0.0, 33.339, 100.0));
        assert_eq!(zone.rect.x, 333);
        assert_eq!(zone.rect.width, 333);
    }

    #[test]
    fn test_offsets_by_monitor_origin() {
        let monitor = monitor(1, 1920);
        let zone = resolve_zone(&monitor, &ZoneConfig::new("right", 50.0, 0.0, 50.0, 100.0));
        assert_eq!(zone.rect, Rect::new(2880, 0, 960, 1040));
        assert_eq!(zone.monitor, 1);
    }

    #[test]
    fn test_per_monitor_override_and_skipped_monitors() {
        let mut per_monitor = BTreeMap::new();
        per_monitor.insert(0, vec![ZoneConfig::new("only", 0.0, 0.0, 100.0, 100.0)]);
        let layouts = LayoutSet::new(vec![
            flat("halves", vec![
                ZoneConfig::new("left", 0.0, 0.0, 50.0, 100.0),
                ZoneConfig::new("right", 50.0, 0.0, 50.0, 100.0),
            ]),
            Layout { name: "legacy".to_string(), zones: LayoutZones::PerMonitor(per_monitor) },
        ]);
        let monitors = vec![monitor(0, 0), monitor(1, 1920)];

        let mut selection = LayoutSelection::new("legacy");
        let map = resolve(&monitors, &layouts, &selection);
        assert_eq!(map.len(), 1);
        assert_eq!(map[&0][0].name, "only");

        selection.per_monitor.insert(1, "halves".to_string());
        let map = resolve(&monitors, &layouts, &selection);
        assert_eq!(map[&1].len(), 2);
        assert_eq!(map[&1][0].rect, Rect::new(1920, 0, 960, 1040));
    }

    #[test]
    fn test_zone_key_is_carried() {
        let zone = ZoneConfig::new("left", 0.0, 0.0, 50.0, 100.0).with_key("q");
        assert_eq!(resolve_zone(&monitor(0, 0), &zone).key.as_deref(), Some("q"));
    }

    fn percent_pair() -> impl Strategy<Value = (f64, f64)> {
        (0.0..=100.0_f64).prop_flat_map(|start| (Just(start), 0.0..=(100.0 - start)))
    }

    proptest! {
        #[test]
        fn resolved_zone_stays_inside_base(
            bx in -4000..4000_i32,
            by in -4000..4000_i32,
            bw in 1..8000_i32,
            bh in 1..8000_i32,
            (x, w) in percent_pair(),
            (y, h) in percent_pair(),
            respect_taskbar in any::<bool>(),
        ) {
            let bounds = Rect::new(bx, by, bw, bh);
            let work = Rect::new(bx, by, bw, (bh - 40).max(1));
            let monitor = Monitor::new(0, bounds, work, true);
            let mut config = ZoneConfig::new("z", x, y, w, h);
            config.respect_taskbar = respect_taskbar;

            let zone = resolve_zone(&monitor, &config);
            prop_assert!(zone.base.contains_rect(&zone.rect), "{} not inside {}", zone.rect, zone.base);
        }

        #[test]
        fn clamp_keeps_size_and_stays_inside_fitting_area(
            x in -5000..5000_i32,
            y in -5000..5000_i32,
            w in 0..6000_i32,
            h in 0..6000_i32,
            aw in 1..4000_i32,
            ah in 1..4000_i32,
        ) {
            let area = Rect::new(0, 0, aw, ah);
            let clamped = Rect::new(x, y, w, h).clamp_within(&area);
            prop_assert!(clamped.same_size(&Rect::new(x, y, w, h)));
            if w <= aw && h <= ah {
                prop_assert!(area.contains_rect(&clamped), "{} escapes {}", clamped, area);
            } else {
                prop_assert!(clamped.x >= area.x && clamped.y >= area.y, "{} starts before {}", clamped, area);
            }
        }
    }
}
