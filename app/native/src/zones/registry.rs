//! Current zone geometry, swapped atomically.
//!
//! Readers take an [`Arc<ZoneSnapshot>`] and keep using it for as long as they
//! need; writers build a complete new snapshot and replace the old one in a
//! single store, so no consumer ever sees a half-updated zone map.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{CycleDirection, LayoutSet, ResolvedZone, ZoneMap, ZoneNumbering, resolve};
use crate::error::ZoneSnapError;
use crate::platform::monitors::monitor_at;
use crate::platform::{Monitor, Point, Rect};

/// Which layout each monitor uses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutSelection {
    /// Globally active layout.
    pub active: String,
    /// Per-monitor overrides of the active layout.
    pub per_monitor: BTreeMap<u32, String>,
}

impl LayoutSelection {
    #[must_use]
    pub fn new(active: impl Into<String>) -> Self {
        Self { active: active.into(), per_monitor: BTreeMap::new() }
    }

    /// Returns the layout name in effect on `monitor`.
    #[must_use]
    pub fn effective(&self, monitor: u32) -> &str {
        self.per_monitor.get(&monitor).map_or(self.active.as_str(), String::as_str)
    }
}

/// Everything derived from monitors plus layout selection.
#[derive(Debug, Clone)]
pub struct ZoneSnapshot {
    pub monitors: Vec<Monitor>,
    pub layouts: Arc<LayoutSet>,
    pub selection: LayoutSelection,
    pub zones: ZoneMap,
    pub numbering: ZoneNumbering,
}

impl ZoneSnapshot {
    /// Resolves and numbers the zones for a selection.
    #[must_use]
    pub fn build(monitors: Vec<Monitor>, layouts: Arc<LayoutSet>, selection: LayoutSelection) -> Self {
        let zones = resolve(&monitors, &layouts, &selection);
        let numbering = ZoneNumbering::assign(&zones);
        Self { monitors, layouts, selection, zones, numbering }
    }

    #[must_use]
    pub fn monitor(&self, id: u32) -> Option<&Monitor> { self.monitors.iter().find(|m| m.id == id) }

    /// Returns the monitor under a screen point.
    #[must_use]
    pub fn monitor_at(&self, point: Point) -> Option<&Monitor> { monitor_at(&self.monitors, point) }

    /// Returns the zones of one monitor in layout order.
    #[must_use]
    pub fn zones_on(&self, monitor: u32) -> &[ResolvedZone] {
        self.zones.get(&monitor).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn zone(&self, monitor: u32, name: &str) -> Option<&ResolvedZone> {
        self.zones_on(monitor).iter().find(|z| z.name == name)
    }

    /// Iterates every zone, monitor id ascending, zones in layout order.
    pub fn all_zones(&self) -> impl Iterator<Item = &ResolvedZone> { self.zones.values().flatten() }

    #[must_use]
    pub fn zone_count(&self) -> usize { self.zones.values().map(Vec::len).sum() }

    /// Finds the zone under `point`.
    ///
    /// Each zone is shrunk by `margin` pixels on every edge before testing, so
    /// points near a shared border belong to neither zone. Full-screen zones
    /// are skipped when `ignore_fullscreen` is set.
    #[must_use]
    pub fn zone_at(&self, point: Point, margin: i32, ignore_fullscreen: bool) -> Option<&ResolvedZone> {
        let monitor = self.monitor_at(point)?;
        self.zones_on(monitor.id)
            .iter()
            .filter(|zone| !(ignore_fullscreen && zone.is_fullscreen()))
            .find(|zone| zone.rect.inset(margin).contains_point(point))
    }

    /// Finds the index of the zone on `monitor` whose rectangle matches
    /// `rect` within `tolerance` pixels on every edge.
    #[must_use]
    pub fn zone_index_matching(&self, monitor: u32, rect: &Rect, tolerance: i32) -> Option<usize> {
        self.zones_on(monitor).iter().position(|z| z.rect.approx_eq(rect, tolerance))
    }
}

/// Owner of the current [`ZoneSnapshot`].
#[derive(Debug)]
pub struct ZoneRegistry {
    current: RwLock<Arc<ZoneSnapshot>>,
}

impl ZoneRegistry {
    #[must_use]
    pub fn new(monitors: Vec<Monitor>, layouts: LayoutSet, initial_layout: &str) -> Self {
        let snapshot =
            ZoneSnapshot::build(monitors, Arc::new(layouts), LayoutSelection::new(initial_layout));
        Self { current: RwLock::new(Arc::new(snapshot)) }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ZoneSnapshot> { Arc::clone(&*self.current.read()) }

    /// Switches the global active layout. Per-monitor overrides are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::UnknownLayout`] and changes nothing if the
    /// layout does not exist.
    pub fn switch_layout(&self, name: &str) -> Result<Arc<ZoneSnapshot>, ZoneSnapError> {
        let snapshot = self.update(|current| {
            if !current.layouts.contains(name) {
                return Err(ZoneSnapError::UnknownLayout(name.to_string()));
            }
            let mut selection = current.selection.clone();
            selection.active = name.to_string();
            Ok(ZoneSnapshot::build(current.monitors.clone(), Arc::clone(&current.layouts), selection))
        })?;

        tracing::info!(layout = %name, "switched active layout");
        Ok(snapshot)
    }

    /// Overrides the layout of one monitor.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::UnknownMonitor`] or [`ZoneSnapError::UnknownLayout`]
    /// and changes nothing if either does not exist.
    pub fn switch_monitor_layout(
        &self,
        monitor: u32,
        name: &str,
    ) -> Result<Arc<ZoneSnapshot>, ZoneSnapError> {
        let snapshot = self.update(|current| {
            if current.monitor(monitor).is_none() {
                return Err(ZoneSnapError::UnknownMonitor(monitor));
            }
            if !current.layouts.contains(name) {
                return Err(ZoneSnapError::UnknownLayout(name.to_string()));
            }
            let mut selection = current.selection.clone();
            selection.per_monitor.insert(monitor, name.to_string());
            Ok(ZoneSnapshot::build(current.monitors.clone(), Arc::clone(&current.layouts), selection))
        })?;

        tracing::info!(monitor, layout = %name, "switched monitor layout");
        Ok(snapshot)
    }

    /// Moves one monitor to the next or previous configured layout, wrapping.
    ///
    /// Returns `Ok(None)` when fewer than two layouts exist.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::UnknownMonitor`] if the monitor does not exist.
    pub fn cycle_monitor_layout(
        &self,
        monitor: u32,
        direction: CycleDirection,
    ) -> Result<Option<Arc<ZoneSnapshot>>, ZoneSnapError> {
        let next = {
            let current = self.current.read();
            if current.monitor(monitor).is_none() {
                return Err(ZoneSnapError::UnknownMonitor(monitor));
            }
            let effective = current.selection.effective(monitor);
            current.layouts.cycle_from(effective, direction).map(str::to_string)
        };

        match next {
            Some(name) => self.switch_monitor_layout(monitor, &name).map(Some),
            None => Ok(None),
        }
    }

    /// Replaces the monitor list and re-resolves.
    ///
    /// Per-monitor overrides survive for monitor ids that still exist.
    pub fn replace_monitors(&self, monitors: Vec<Monitor>) -> Arc<ZoneSnapshot> {
        let snapshot = {
            let mut current = self.current.write();
            let mut selection = current.selection.clone();
            selection.per_monitor.retain(|id, _| monitors.iter().any(|m| m.id == *id));
            let next =
                Arc::new(ZoneSnapshot::build(monitors, Arc::clone(&current.layouts), selection));
            *current = Arc::clone(&next);
            next
        };

        tracing::debug!(monitors = snapshot.monitors.len(), zones = snapshot.zone_count(), "monitors replaced");
        snapshot
    }

    /// Replaces layouts and monitors after a configuration reload.
    ///
    /// Per-monitor overrides are dropped and `initial_layout` becomes active.
    pub fn reconfigure(
        &self,
        monitors: Vec<Monitor>,
        layouts: LayoutSet,
        initial_layout: &str,
    ) -> Arc<ZoneSnapshot> {
        let snapshot = Arc::new(ZoneSnapshot::build(
            monitors,
            Arc::new(layouts),
            LayoutSelection::new(initial_layout),
        ));
        *self.current.write() = Arc::clone(&snapshot);
        tracing::info!(layout = %initial_layout, zones = snapshot.zone_count(), "zones reconfigured");
        snapshot
    }

    fn update<F>(&self, build: F) -> Result<Arc<ZoneSnapshot>, ZoneSnapError>
    where F: FnOnce(&ZoneSnapshot) -> Result<ZoneSnapshot, ZoneSnapError> {
        let mut current = self.current.write();
        let next = Arc::new(build(&current)?);
        *current = Arc::clone(&next);
        Ok(next)
    }
}
