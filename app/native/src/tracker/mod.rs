//! Window state tracker.
//!
//! Remembers where a window was before it was first snapped, where each snap
//! put it, and which windows are temporarily exempt from drift detection.
//! The drift monitor compares snapped windows against their snap record and
//! restores any window the user moved away by hand.
//!
//! All bookkeeping lives behind one mutex. The lock is never held across a
//! call into the window system.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};

use crate::config::StateTrackingConfig;
use crate::error::ZoneSnapError;
use crate::platform::{NativeError, Rect, WindowHandle, WindowSystem};

/// Geometry of a window before its first snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub rect: Rect,
    pub saved_at: Instant,
}

/// Tunables of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    pub auto_restore: bool,
    pub movement_threshold: i32,
    pub operation_exempt_delay: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self { Self::from(&StateTrackingConfig::default()) }
}

impl From<&StateTrackingConfig> for TrackerSettings {
    fn from(config: &StateTrackingConfig) -> Self {
        Self {
            auto_restore: config.auto_restore_enabled,
            movement_threshold: config.movement_threshold_pixels,
            operation_exempt_delay: config.operation_exempt_delay(),
        }
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    saved: HashMap<WindowHandle, WindowState>,
    snapped: HashMap<WindowHandle, Rect>,
    dragging: HashSet<WindowHandle>,
    exempt_until: HashMap<WindowHandle, Instant>,
}

impl TrackerState {
    fn forget(&mut self, handle: WindowHandle) {
        self.saved.remove(&handle);
        self.snapped.remove(&handle);
        self.dragging.remove(&handle);
        self.exempt_until.remove(&handle);
    }

    /// Returns true if the handle is drag- or operation-exempt at `now`.
    /// Expired operation exemptions are dropped.
    fn is_exempt(&mut self, handle: WindowHandle, now: Instant) -> bool {
        if self.dragging.contains(&handle) {
            return true;
        }
        match self.exempt_until.get(&handle).copied() {
            Some(deadline) if now < deadline => true,
            Some(_) => {
                self.exempt_until.remove(&handle);
                false
            }
            None => false,
        }
    }
}

/// Keyed store of saved and snapped window geometry.
pub struct WindowStateTracker {
    windows: Arc<dyn WindowSystem>,
    settings: RwLock<TrackerSettings>,
    state: Mutex<TrackerState>,
}

impl std::fmt::Debug for WindowStateTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("WindowStateTracker")
            .field("settings", &*self.settings.read())
            .field("saved", &state.saved.len())
            .field("snapped", &state.snapped.len())
            .finish_non_exhaustive()
    }
}

impl WindowStateTracker {
    #[must_use]
    pub fn new(windows: Arc<dyn WindowSystem>, settings: TrackerSettings) -> Self {
        Self {
            windows,
            settings: RwLock::new(settings),
            state: Mutex::new(TrackerState::default()),
        }
    }

    /// Applies new settings, e.g. after a configuration reload.
    pub fn configure(&self, settings: TrackerSettings) { *self.settings.write() = settings; }

    #[must_use]
    pub fn settings(&self) -> TrackerSettings { *self.settings.read() }

    /// Records the window's current geometry as its pre-snap state.
    ///
    /// Without `force` an existing state is kept, so re-snapping never loses
    /// the original geometry. Returns whether a state was written.
    ///
    /// # Errors
    ///
    /// Returns the native error if the geometry cannot be read; a stale
    /// handle is forgotten.
    pub fn save_state(&self, handle: WindowHandle, force: bool) -> Result<bool, ZoneSnapError> {
        if !force && self.state.lock().saved.contains_key(&handle) {
            return Ok(false);
        }

        let rect = self.query_rect(handle)?;
        let entry = WindowState { rect, saved_at: Instant::now() };

        let mut state = self.state.lock();
        if force {
            state.saved.insert(handle, entry);
        } else if state.saved.contains_key(&handle) {
            return Ok(false);
        } else {
            state.saved.insert(handle, entry);
        }
        drop(state);

        tracing::debug!(handle = %handle, rect = %rect, force, "saved window state");
        Ok(true)
    }

    /// Records the window's current geometry as its snap record.
    ///
    /// # Errors
    ///
    /// Returns the native error if the geometry cannot be read.
    pub fn mark_as_snapped(&self, handle: WindowHandle) -> Result<Rect, ZoneSnapError> {
        let rect = self.query_rect(handle)?;
        self.state.lock().snapped.insert(handle, rect);
        Ok(rect)
    }

    /// Exempts a window from drift detection while the user drags it.
    pub fn mark_as_dragging(&self, handle: WindowHandle) { self.state.lock().dragging.insert(handle); }

    pub fn unmark_as_dragging(&self, handle: WindowHandle) { self.state.lock().dragging.remove(&handle); }

    #[must_use]
    pub fn is_dragging(&self, handle: WindowHandle) -> bool {
        self.state.lock().dragging.contains(&handle)
    }

    /// Exempts a window from drift detection for the operation grace period.
    ///
    /// Marking again restarts the period.
    pub fn mark_operation_in_progress(&self, handle: WindowHandle) {
        let delay = self.settings.read().operation_exempt_delay;
        self.state.lock().exempt_until.insert(handle, Instant::now() + delay);
    }

    /// Ends an operation exemption immediately.
    pub fn unmark_operation_in_progress(&self, handle: WindowHandle) {
        self.state.lock().exempt_until.remove(&handle);
    }

    /// Returns true while the window is drag- or operation-exempt.
    #[must_use]
    pub fn is_exempt(&self, handle: WindowHandle) -> bool {
        self.state.lock().is_exempt(handle, Instant::now())
    }

    #[must_use]
    pub fn is_snapped(&self, handle: WindowHandle) -> bool {
        self.state.lock().snapped.contains_key(&handle)
    }

    #[must_use]
    pub fn snap_record(&self, handle: WindowHandle) -> Option<Rect> {
        self.state.lock().snapped.get(&handle).copied()
    }

    #[must_use]
    pub fn saved_state(&self, handle: WindowHandle) -> Option<WindowState> {
        self.state.lock().saved.get(&handle).copied()
    }

    /// Returns true if a snapped window now has a size that neither its snap
    /// nor its saved state explain, i.e. the user resized it by hand.
    #[must_use]
    pub fn was_resized_since_snap(&self, handle: WindowHandle, current: &Rect) -> bool {
        let state = self.state.lock();
        let Some(snapped) = state.snapped.get(&handle) else {
            return false;
        };
        let restored_size = state.saved.get(&handle).is_some_and(|s| s.rect.same_size(current));
        !snapped.same_size(current) && !restored_size
    }

    /// Restores the saved geometry and clears the window's records.
    ///
    /// A maximized window is un-maximized first.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::NoSavedState`] without touching anything if
    /// the window has no saved state, or the native error if the move fails.
    pub fn restore_state(&self, handle: WindowHandle) -> Result<Rect, ZoneSnapError> {
        let saved = self.saved_state(handle).ok_or(ZoneSnapError::NoSavedState(handle))?;

        self.native(handle, |windows| {
            if windows.is_maximized(handle)? {
                windows.restore_from_maximized(handle)?;
            }
            windows.set_window_rect(handle, saved.rect)
        })?;

        {
            let mut state = self.state.lock();
            state.saved.remove(&handle);
            state.snapped.remove(&handle);
        }

        tracing::info!(handle = %handle, rect = %saved.rect, "restored window");
        Ok(saved.rect)
    }

    /// Gives the window back its saved size at its current position.
    ///
    /// Records are kept; the window stays snapped until it is released.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::NoSavedState`] if the window has no saved
    /// state, or the native error if the move fails.
    pub fn restore_size_only(&self, handle: WindowHandle) -> Result<Rect, ZoneSnapError> {
        let saved = self.saved_state(handle).ok_or(ZoneSnapError::NoSavedState(handle))?;

        let target = self.native(handle, |windows| {
            let current = windows.window_rect(handle)?;
            let target = current.with_size(saved.rect.width, saved.rect.height);
            windows.set_window_rect(handle, target)?;
            Ok(target)
        })?;

        tracing::debug!(handle = %handle, rect = %target, "restored window size");
        Ok(target)
    }

    /// Drops every record of a window.
    pub fn forget(&self, handle: WindowHandle) { self.state.lock().forget(handle); }

    /// Drops records of windows that no longer exist. Returns how many were
    /// removed.
    pub fn prune_stale(&self) -> usize {
        let handles: HashSet<WindowHandle> = {
            let state = self.state.lock();
            state.saved.keys().chain(state.snapped.keys()).copied().collect()
        };

        let stale: Vec<WindowHandle> =
            handles.into_iter().filter(|&h| !self.windows.is_window(h)).collect();

        if !stale.is_empty() {
            let mut state = self.state.lock();
            for handle in &stale {
                state.forget(*handle);
            }
            tracing::debug!(count = stale.len(), "pruned stale window states");
        }

        stale.len()
    }

    /// Runs one drift-detection cycle at the current time.
    pub fn check_drift(&self) -> Vec<WindowHandle> { self.check_drift_at(Instant::now()) }

    /// Runs one drift-detection cycle.
    ///
    /// Every snapped window that is not exempt at `now` is compared against
    /// its snap record; a window that moved or resized by more than the
    /// movement threshold is restored. Returns the restored handles.
    pub fn check_drift_at(&self, now: Instant) -> Vec<WindowHandle> {
        let settings = self.settings();
        if !settings.auto_restore {
            return Vec::new();
        }

        let candidates: Vec<(WindowHandle, Rect)> = {
            let mut state = self.state.lock();
            let snapped: Vec<(WindowHandle, Rect)> =
                state.snapped.iter().map(|(h, r)| (*h, *r)).collect();
            snapped.into_iter().filter(|(h, _)| !state.is_exempt(*h, now)).collect()
        };

        let mut restored = Vec::new();
        for (handle, snapped) in candidates {
            if !self.windows.is_window(handle) {
                tracing::debug!(handle = %handle, "snapped window is gone");
                self.forget(handle);
                continue;
            }

            let current = match self.windows.window_rect(handle) {
                Ok(rect) => rect,
                Err(err) => {
                    self.handle_native_error(handle, &err);
                    continue;
                }
            };

            if !current.differs_by_more_than(&snapped, settings.movement_threshold) {
                continue;
            }

            // A snap may have started since the candidates were collected.
            let still_eligible = {
                let mut state = self.state.lock();
                state.snapped.get(&handle) == Some(&snapped) && !state.is_exempt(handle, now)
            };
            if !still_eligible {
                continue;
            }

            tracing::info!(handle = %handle, from = %snapped, to = %current, "window moved manually, restoring");
            match self.restore_state(handle) {
                Ok(_) => restored.push(handle),
                Err(ZoneSnapError::NoSavedState(_)) => {
                    self.state.lock().snapped.remove(&handle);
                }
                Err(err) => tracing::warn!(handle = %handle, error = %err, "auto-restore failed"),
            }
        }

        restored
    }

    fn query_rect(&self, handle: WindowHandle) -> Result<Rect, ZoneSnapError> {
        self.native(handle, |windows| windows.window_rect(handle))
    }

    /// Runs a native call and forgets the handle if it turned out stale.
    fn native<T, F>(&self, handle: WindowHandle, call: F) -> Result<T, ZoneSnapError>
    where F: FnOnce(&dyn WindowSystem) -> Result<T, NativeError> {
        call(self.windows.as_ref()).map_err(|err| {
            self.handle_native_error(handle, &err);
            ZoneSnapError::Native(err)
        })
    }

    fn handle_native_error(&self, handle: WindowHandle, err: &NativeError) {
        if let Some(stale) = err.stale_handle() {
            tracing::debug!(handle = %stale, "window no longer exists, discarding its state");
            self.forget(stale);
        } else {
            tracing::warn!(handle = %handle, error = %err, "window call failed");
        }
    }
}
