//! Hotkey actions on the foreground window and the layout selection.

use std::sync::Arc;

use super::ZoneSnap;
use crate::error::ZoneSnapError;
use crate::platform::monitors::monitor_for_rect;
use crate::platform::{Rect, WindowHandle};
use crate::snap::{HotkeyAction, SnapOrigin, SnapOutcome};
use crate::zones::{CycleDirection, ResolvedZone, ZoneSnapshot};

/// Pixels a window may be off a zone on each edge and still count as in it
/// when cycling.
pub const CYCLE_TOLERANCE: i32 = 10;

impl ZoneSnap {
    /// Runs the action bound to a hotkey.
    ///
    /// # Errors
    ///
    /// Returns whatever the action reports; see the individual operations.
    pub fn execute_action(&self, action: &HotkeyAction) -> Result<(), ZoneSnapError> {
        match action {
            HotkeyAction::MoveToZone { monitor, zone } => {
                self.move_active_window_to_zone(*monitor, zone).map(drop)
            }
            HotkeyAction::ToggleOverlay => {
                self.toggle_overlay();
                Ok(())
            }
            HotkeyAction::Restore => self.restore_active_window().map(drop),
            HotkeyAction::Reload => self.reload(),
            HotkeyAction::Cycle { direction } => self.cycle(*direction).map(drop),
            HotkeyAction::CycleAll { direction } => self.cycle_all(*direction).map(drop),
            HotkeyAction::SwitchLayout { layout } => self.switch_layout(layout).map(drop),
        }
    }

    /// Moves a window into a zone.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::UnknownMonitor`] or [`ZoneSnapError::UnknownZone`]
    /// without touching the window, or the native error if the move fails.
    pub fn move_window_to_zone(
        &self,
        handle: WindowHandle,
        monitor: u32,
        zone: &str,
    ) -> Result<SnapOutcome, ZoneSnapError> {
        let snapshot = self.registry.snapshot();
        let zone = lookup_zone(&snapshot, monitor, zone)?;
        self.executor.snap(handle, zone, SnapOrigin::Hotkey)
    }

    /// Moves the foreground window into a zone.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::NoActiveWindow`] if nothing has focus, plus
    /// the errors of [`ZoneSnap::move_window_to_zone`].
    pub fn move_active_window_to_zone(&self, monitor: u32, zone: &str) -> Result<SnapOutcome, ZoneSnapError> {
        self.move_window_to_zone(self.active_window()?, monitor, zone)
    }

    /// Restores a window's pre-snap geometry.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::NoSavedState`] if the window was never
    /// snapped, or the native error if the move fails.
    pub fn restore_window(&self, handle: WindowHandle) -> Result<Rect, ZoneSnapError> {
        self.executor.restore(handle)
    }

    /// Restores the foreground window's pre-snap geometry.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::NoActiveWindow`] if nothing has focus, plus
    /// the errors of [`ZoneSnap::restore_window`].
    pub fn restore_active_window(&self) -> Result<Rect, ZoneSnapError> {
        self.restore_window(self.active_window()?)
    }

    /// Moves the foreground window to the next or previous zone on its
    /// monitor, wrapping. A window in no zone counts as being in the first.
    ///
    /// Returns `Ok(None)` when the monitor has no zones.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::NoActiveWindow`], [`ZoneSnapError::NoTargetMonitor`]
    /// when the window is off every monitor, or the native error.
    pub fn cycle(&self, direction: CycleDirection) -> Result<Option<SnapOutcome>, ZoneSnapError> {
        let handle = self.active_window()?;
        let rect = self.platform.windows.window_rect(handle)?;
        let snapshot = self.registry.snapshot();

        let monitor = monitor_for_rect(&snapshot.monitors, &rect)
            .map(|m| m.id)
            .ok_or(ZoneSnapError::NoTargetMonitor)?;
        let zones = snapshot.zones_on(monitor);
        if zones.is_empty() {
            tracing::debug!(monitor, "no zones to cycle through");
            return Ok(None);
        }

        let current = snapshot.zone_index_matching(monitor, &rect, CYCLE_TOLERANCE).unwrap_or(0);
        let next = &zones[direction.step(current, zones.len())];
        tracing::debug!(monitor, from = current, to = %next.name, "cycling zone");

        self.executor.snap(handle, next, SnapOrigin::Hotkey).map(Some)
    }

    /// Like [`ZoneSnap::cycle`], across every zone of every monitor (monitor
    /// id ascending, zones in layout order).
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::NoActiveWindow`] or the native error.
    pub fn cycle_all(&self, direction: CycleDirection) -> Result<Option<SnapOutcome>, ZoneSnapError> {
        let handle = self.active_window()?;
        let rect = self.platform.windows.window_rect(handle)?;
        let snapshot = self.registry.snapshot();

        let zones: Vec<&ResolvedZone> = snapshot.all_zones().collect();
        if zones.is_empty() {
            return Ok(None);
        }

        let current = zones.iter().position(|z| z.rect.approx_eq(&rect, CYCLE_TOLERANCE)).unwrap_or(0);
        let next = zones[direction.step(current, zones.len())];
        tracing::debug!(from = current, to = %next.target(), "cycling zone on all monitors");

        self.executor.snap(handle, next, SnapOrigin::Hotkey).map(Some)
    }

    /// Switches the global layout.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::UnknownLayout`] and changes nothing if the
    /// layout does not exist.
    pub fn switch_layout(&self, name: &str) -> Result<Arc<ZoneSnapshot>, ZoneSnapError> {
        let snapshot = self.registry.switch_layout(name)?;
        self.overlay.refresh(&snapshot);
        Ok(snapshot)
    }

    /// Switches the layout of one monitor.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::UnknownMonitor`] or [`ZoneSnapError::UnknownLayout`]
    /// and changes nothing if either does not exist.
    pub fn switch_monitor_layout(&self, monitor: u32, name: &str) -> Result<Arc<ZoneSnapshot>, ZoneSnapError> {
        let snapshot = self.registry.switch_monitor_layout(monitor, name)?;
        self.overlay.refresh(&snapshot);
        Ok(snapshot)
    }

    /// Shows the overlay with every zone, or hides it. Returns the new
    /// visibility.
    pub fn toggle_overlay(&self) -> bool { self.overlay.toggle(&self.registry.snapshot()) }

    fn active_window(&self) -> Result<WindowHandle, ZoneSnapError> {
        self.platform.windows.foreground_window().ok_or(ZoneSnapError::NoActiveWindow)
    }
}

fn lookup_zone<'a>(snapshot: &'a ZoneSnapshot, monitor: u32, zone: &str) -> Result<&'a ResolvedZone, ZoneSnapError> {
    if snapshot.monitor(monitor).is_none() {
        return Err(ZoneSnapError::UnknownMonitor(monitor));
    }
    snapshot.zone(monitor, zone).ok_or_else(|| ZoneSnapError::UnknownZone {
        monitor,
        zone: zone.to_string(),
    })
}
