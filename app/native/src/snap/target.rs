//! Two-stage snap target resolution.
//!
//! A zone key pressed while a monitor key is held targets that monitor. A zone
//! key pressed alone targets the monitor picked by `default_monitor_for_zone_keys`.
//! Number keys are a flat fallback and are ignored while a monitor key is held,
//! since the user is then halfway through a two-stage combination.

use crate::config::{DefaultMonitor, MonitorMode};
use crate::error::ZoneSnapError;
use crate::platform::keys::parse_key;
use crate::platform::monitors::{monitor_for_rect, primary};
use crate::platform::{Point, Rect, VirtualKey};
use crate::zones::{ZoneSnapshot, ZoneTarget};

/// Keys seen during one poll tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapInput {
    /// Monitor whose selection key is held.
    pub monitor_key: Option<u32>,
    /// Active zone keys.
    pub zone_keys: Vec<VirtualKey>,
    /// Pressed digit, 1-9.
    pub number: Option<u8>,
}

impl SnapInput {
    #[must_use]
    pub fn is_empty(&self) -> bool { self.zone_keys.is_empty() && self.number.is_none() }
}

/// What the fallback monitor is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorContext {
    /// Cursor position while a window is being dragged.
    pub drag_cursor: Option<Point>,
    /// Rectangle of the foreground window.
    pub active_window: Option<Rect>,
}

/// Picks the monitor for a zone key pressed without a monitor key.
///
/// Returns `None` when the configured strategy resolves to nothing, for
/// example `context_aware` with no drag and no foreground window.
#[must_use]
pub fn fallback_monitor(
    snapshot: &ZoneSnapshot,
    mode: DefaultMonitor,
    context: &MonitorContext,
) -> Option<u32> {
    let monitor = match mode {
        DefaultMonitor::Fixed(id) => snapshot.monitor(id),
        DefaultMonitor::Mode(MonitorMode::Primary) => primary(&snapshot.monitors),
        DefaultMonitor::Mode(MonitorMode::ContextAware) => match context.drag_cursor {
            Some(cursor) => snapshot.monitor_at(cursor),
            None => context
                .active_window
                .and_then(|rect| monitor_for_rect(&snapshot.monitors, &rect)),
        },
    };
    monitor.map(|m| m.id)
}

/// Resolves the keys of one tick into a zone.
///
/// Zone keys win over number keys. `fallback` is only called when a zone key
/// is active and no monitor key is held.
///
/// # Errors
///
/// Returns [`ZoneSnapError::NoTargetMonitor`] when a zone key is active but
/// no monitor can be determined for it.
pub fn resolve<F>(
    snapshot: &ZoneSnapshot,
    input: &SnapInput,
    fallback: F,
) -> Result<Option<ZoneTarget>, ZoneSnapError>
where
    F: FnOnce() -> Option<u32>,
{
    if !input.zone_keys.is_empty() {
        let monitor = input.monitor_key.or_else(fallback).ok_or(ZoneSnapError::NoTargetMonitor)?;

        let bound = snapshot.zones_on(monitor).iter().find(|zone| {
            zone.key
                .as_deref()
                .and_then(parse_key)
                .is_some_and(|key| input.zone_keys.contains(&key))
        });

        if let Some(zone) = bound {
            return Ok(Some(zone.target()));
        }
        tracing::debug!(monitor, "zone key has no binding on the target monitor");
    }

    if input.monitor_key.is_some() {
        return Ok(None);
    }

    Ok(input.number.and_then(|n| snapshot.numbering.zone_by_number(n)).cloned())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::config::ZoneConfig;
    use crate::platform::Monitor;
    use crate::zones::{Layout, LayoutSet, LayoutZones, ZoneRegistry};

    fn key(name: &str) -> VirtualKey { parse_key(name).unwrap() }

    /// Monitor 0 at the origin, monitor 1 (primary) to its right. Both have a
    /// "left" zone on `q`; monitor 1 also has a "right" zone on `w`.
    fn snapshot() -> std::sync::Arc<ZoneSnapshot> {
        let layout = Layout {
            name: "default".to_string(),
            zones: LayoutZones::PerMonitor(BTreeMap::from([
                (0, vec![ZoneConfig::new("left", 0.0, 0.0, 50.0, 100.0).with_key("q")]),
                (1, vec![
                    ZoneConfig::new("left", 0.0, 0.0, 50.0, 100.0).with_key("q"),
                    ZoneConfig::new("right", 50.0, 0.0, 50.0, 100.0).with_key("w"),
                ]),
            ])),
        };
        let monitors = vec![
            Monitor::new(0, Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1040), false),
            Monitor::new(1, Rect::new(1920, 0, 2560, 1440), Rect::new(1920, 0, 2560, 1400), true),
        ];
        ZoneRegistry::new(monitors, LayoutSet::new(vec![layout]), "default").snapshot()
    }

    #[test]
    fn test_monitor_key_selects_binding() {
        let snapshot = snapshot();
        let input = SnapInput { monitor_key: Some(1), zone_keys: vec![key("q")], number: None };
        let target = resolve(&snapshot, &input, || Some(0)).unwrap();
        assert_eq!(target, Some(ZoneTarget::new(1, "left")));
    }

    #[test]
    fn test_zone_key_uses_fallback_monitor() {
        let snapshot = snapshot();
        let input = SnapInput { zone_keys: vec![key("q")], ..SnapInput::default() };
        assert_eq!(resolve(&snapshot, &input, || Some(0)).unwrap(), Some(ZoneTarget::new(0, "left")));
        assert_eq!(resolve(&snapshot, &input, || Some(1)).unwrap(), Some(ZoneTarget::new(1, "left")));
    }

    #[test]
    fn test_unresolvable_monitor_is_reported() {
        let snapshot = snapshot();
        let input = SnapInput { zone_keys: vec![key("q")], ..SnapInput::default() };
        let err = resolve(&snapshot, &input, || None).unwrap_err();
        assert!(matches!(err, ZoneSnapError::NoTargetMonitor));
        assert!(err.is_unknown_target());
    }

    #[test]
    fn test_zone_key_unbound_on_monitor_falls_through_to_number() {
        let snapshot = snapshot();
        let input = SnapInput { zone_keys: vec![key("w")], number: Some(1), monitor_key: None };
        // "w" only exists on monitor 1; number 1 is monitor 0's "left".
        assert_eq!(resolve(&snapshot, &input, || Some(0)).unwrap(), Some(ZoneTarget::new(0, "left")));
    }

    #[test]
    fn test_number_ignored_while_monitor_key_held() {
        let snapshot = snapshot();
        let input = SnapInput { monitor_key: Some(0), zone_keys: Vec::new(), number: Some(2) };
        assert_eq!(resolve(&snapshot, &input, || Some(0)).unwrap(), None);

        let input = SnapInput { number: Some(2), ..SnapInput::default() };
        assert_eq!(resolve(&snapshot, &input, || None).unwrap(), Some(ZoneTarget::new(1, "left")));
    }

    #[test]
    fn test_fallback_not_called_without_zone_keys() {
        let snapshot = snapshot();
        let input = SnapInput { number: Some(9), ..SnapInput::default() };
        let target = resolve(&snapshot, &input, || panic!("fallback must not be computed")).unwrap();
        assert_eq!(target, None);
    }

    #[test]
    fn test_fallback_monitor_modes() {
        let snapshot = snapshot();
        let idle = MonitorContext::default();

        assert_eq!(fallback_monitor(&snapshot, DefaultMonitor::Fixed(1), &idle), Some(1));
        assert_eq!(fallback_monitor(&snapshot, DefaultMonitor::Fixed(7), &idle), None);
        assert_eq!(
            fallback_monitor(&snapshot, DefaultMonitor::Mode(MonitorMode::Primary), &idle),
            Some(1)
        );

        let context_aware = DefaultMonitor::Mode(MonitorMode::ContextAware);
        assert_eq!(fallback_monitor(&snapshot, context_aware, &idle), None);

        let dragging = MonitorContext {
            drag_cursor: Some(Point::new(100, 100)),
            active_window: Some(Rect::new(2000, 0, 800, 600)),
        };
        assert_eq!(fallback_monitor(&snapshot, context_aware, &dragging), Some(0));

        let focused = MonitorContext { drag_cursor: None, active_window: Some(Rect::new(2000, 0, 800, 600)) };
        assert_eq!(fallback_monitor(&snapshot, context_aware, &focused), Some(1));
    }
}
