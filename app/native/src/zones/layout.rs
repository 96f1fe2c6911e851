//! Canonical layout model.
//!
//! Layout files may describe zones in two shapes: a flat list applied to every
//! monitor, or a legacy list of per-monitor zone lists. Both are converted into
//! [`Layout`] right after loading; nothing past the configuration loader sees
//! the file shape.

use std::collections::BTreeMap;

use crate::config::ZoneConfig;

/// Direction for cycling through zones or layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleDirection {
    Next,
    Prev,
}

impl CycleDirection {
    /// Steps `index` by one in this direction, wrapping within `len`.
    ///
    /// `len` must be non-zero.
    #[must_use]
    pub const fn step(self, index: usize, len: usize) -> usize {
        match self {
            Self::Next => (index + 1) % len,
            Self::Prev => (index + len - 1) % len,
        }
    }
}

/// Zones of a layout.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutZones {
    /// One zone list applied to every monitor.
    Flat(Vec<ZoneConfig>),
    /// Separate zone lists per monitor id; monitors without a list get no zones.
    PerMonitor(BTreeMap<u32, Vec<ZoneConfig>>),
}

/// A named, ordered collection of zones.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub name: String,
    pub zones: LayoutZones,
}

impl Layout {
    /// Returns the zones that apply to a monitor, in configuration order.
    #[must_use]
    pub fn zones_for(&self, monitor: u32) -> &[ZoneConfig] {
        match &self.zones {
            LayoutZones::Flat(zones) => zones,
            LayoutZones::PerMonitor(by_monitor) => {
                by_monitor.get(&monitor).map(Vec::as_slice).unwrap_or_default()
            }
        }
    }

    /// Returns true for legacy per-monitor layouts.
    #[must_use]
    pub const fn is_per_monitor(&self) -> bool { matches!(self.zones, LayoutZones::PerMonitor(_)) }

    /// Returns every zone definition in the layout.
    #[must_use]
    pub fn all_zones(&self) -> Vec<&ZoneConfig> {
        match &self.zones {
            LayoutZones::Flat(zones) => zones.iter().collect(),
            LayoutZones::PerMonitor(by_monitor) => by_monitor.values().flatten().collect(),
        }
    }

    /// Returns the total number of zone definitions in the layout.
    #[must_use]
    pub fn zone_count(&self) -> usize {
        match &self.zones {
            LayoutZones::Flat(zones) => zones.len(),
            LayoutZones::PerMonitor(by_monitor) => by_monitor.values().map(Vec::len).sum(),
        }
    }
}

/// All configured layouts, in configuration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutSet {
    layouts: Vec<Layout>,
}

impl LayoutSet {
    #[must_use]
    pub const fn new(layouts: Vec<Layout>) -> Self { Self { layouts } }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Layout> { self.layouts.iter().find(|l| l.name == name) }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool { self.get(name).is_some() }

    pub fn iter(&self) -> impl Iterator<Item = &Layout> { self.layouts.iter() }

    pub fn names(&self) -> impl Iterator<Item = &str> { self.layouts.iter().map(|l| l.name.as_str()) }

    #[must_use]
    pub fn len(&self) -> usize { self.layouts.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.layouts.is_empty() }

    /// Picks the layout that is active after loading.
    ///
    /// `preferred` wins if it names an existing layout, then a layout called
    /// `"default"`, then the first layout.
    #[must_use]
    pub fn initial_name(&self, preferred: Option<&str>) -> Option<&str> {
        preferred
            .and_then(|name| self.get(name))
            .or_else(|| self.get("default"))
            .or_else(|| self.layouts.first())
            .map(|l| l.name.as_str())
    }

    /// Returns the layout after (or before) `current`, wrapping around.
    ///
    /// Returns `None` when fewer than two layouts exist. An unknown `current`
    /// is treated as the first layout.
    #[must_use]
    pub fn cycle_from(&self, current: &str, direction: CycleDirection) -> Option<&str> {
        if self.layouts.len() < 2 {
            return None;
        }

        let index = self.layouts.iter().position(|l| l.name == current).unwrap_or(0);
        let next = direction.step(index, self.layouts.len());
        Some(self.layouts[next].name.as_str())
    }
}
