//! Zone layouts, resolution to pixels and numbering.
//!
//! Layouts are percentage-based; [`resolver`] turns them into absolute
//! rectangles for the detected monitors, [`numbering`] assigns the 1-9
//! fallback numbers, and [`registry`] keeps the current snapshot of both and
//! swaps it atomically whenever monitors or layout selections change.

pub mod layout;
pub mod numbering;
pub mod registry;
pub mod resolver;

use std::fmt;

use serde::Serialize;

pub use layout::{CycleDirection, Layout, LayoutSet, LayoutZones};
pub use numbering::ZoneNumbering;
pub use registry::{LayoutSelection, ZoneRegistry, ZoneSnapshot};
pub use resolver::{ZoneMap, resolve};

use crate::platform::Rect;

/// Identifies a zone: a monitor id plus the zone's name on that monitor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ZoneTarget {
    pub monitor: u32,
    pub zone: String,
}

impl ZoneTarget {
    #[must_use]
    pub fn new(monitor: u32, zone: impl Into<String>) -> Self {
        Self { monitor, zone: zone.into() }
    }
}

impl fmt::Display for ZoneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.monitor, self.zone)
    }
}

/// A zone resolved to absolute screen pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedZone {
    pub monitor: u32,
    pub name: String,
    /// Target rectangle.
    pub rect: Rect,
    /// Rectangle the percentages were applied to (work area or full monitor).
    pub base: Rect,
    /// Work area of the zone's monitor. Snapped windows are clamped into it.
    #[serde(skip)]
    pub work_area: Rect,
    /// Configured zone key, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl ResolvedZone {
    #[must_use]
    pub fn target(&self) -> ZoneTarget { ZoneTarget::new(self.monitor, self.name.clone()) }

    /// Returns true if the zone covers its whole base rectangle.
    #[must_use]
    pub fn covers_base(&self) -> bool { self.rect == self.base }

    /// Returns true for a "full screen" zone, which hover can be told to ignore.
    #[must_use]
    pub fn is_fullscreen(&self) -> bool { self.name.eq_ignore_ascii_case("full") || self.covers_base() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(name: &str, rect: Rect) -> ResolvedZone {
        ResolvedZone {
            monitor: 0,
            name: name.to_string(),
            rect,
            base: Rect::new(0, 0, 1920, 1040),
            work_area: Rect::new(0, 0, 1920, 1040),
            key: None,
        }
    }

    #[test]
    fn test_zone_target_display() {
        assert_eq!(ZoneTarget::new(1, "left").to_string(), "1:left");
    }

    #[test]
    fn test_zone_targets_order_by_monitor_then_name() {
        let mut targets =
            vec![ZoneTarget::new(1, "a"), ZoneTarget::new(0, "right"), ZoneTarget::new(0, "left")];
        targets.sort();
        assert_eq!(targets, vec![
            ZoneTarget::new(0, "left"),
            ZoneTarget::new(0, "right"),
            ZoneTarget::new(1, "a"),
        ]);
    }

    #[test]
    fn test_fullscreen_detection() {
        assert!(zone("full", Rect::new(0, 0, 100, 100)).is_fullscreen());
        assert!(zone("Full", Rect::new(0, 0, 100, 100)).is_fullscreen());
        assert!(zone("max", Rect::new(0, 0, 1920, 1040)).is_fullscreen());
        assert!(!zone("left", Rect::new(0, 0, 960, 1040)).is_fullscreen());
    }
}
