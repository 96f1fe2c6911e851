//! Snap execution.
//!
//! Every snap, whether triggered by a drag, a key during a drag or a hotkey,
//! goes through [`SnapExecutor::snap`]. One mutex serializes them so a key and
//! a gesture hitting the same window never interleave their save, move and
//! mark steps.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::ZoneSnapError;
use crate::platform::{NativeError, Rect, WindowHandle, WindowSystem};
use crate::tracker::WindowStateTracker;
use crate::zones::{ResolvedZone, ZoneTarget};

/// Pause between releasing a native move and repositioning the window.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(30);

/// What triggered a snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapOrigin {
    /// A zone or number key pressed while dragging.
    DragKey,
    /// The mouse button released over a zone.
    Release,
    /// A hotkey acting on the foreground window.
    Hotkey,
}

impl SnapOrigin {
    const fn ends_native_move(self) -> bool { !matches!(self, Self::Hotkey) }
}

/// Result of a successful snap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapOutcome {
    pub handle: WindowHandle,
    pub target: ZoneTarget,
    /// Rectangle the window was moved to.
    pub rect: Rect,
    /// The window was already snapped before this snap.
    pub resnap: bool,
    /// The pre-snap state was overwritten because the window had been resized.
    pub resaved: bool,
}

/// Moves windows into zones and keeps the tracker in step.
pub struct SnapExecutor {
    windows: Arc<dyn WindowSystem>,
    tracker: Arc<WindowStateTracker>,
    lock: Mutex<()>,
    settle: Duration,
}

impl std::fmt::Debug for SnapExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapExecutor").field("settle", &self.settle).finish_non_exhaustive()
    }
}

impl SnapExecutor {
    #[must_use]
    pub fn new(windows: Arc<dyn WindowSystem>, tracker: Arc<WindowStateTracker>) -> Self {
        Self {
            windows,
            tracker,
            lock: Mutex::new(()),
            settle: DEFAULT_SETTLE,
        }
    }

    /// Overrides the settle pause.
    #[must_use]
    pub const fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    #[must_use]
    pub const fn tracker(&self) -> &Arc<WindowStateTracker> { &self.tracker }

    /// Moves a window into a zone.
    ///
    /// The pre-snap geometry is saved on the first snap only, unless the
    /// window was resized by hand while snapped. The window is exempt from
    /// drift detection for the configured delay afterwards.
    ///
    /// # Errors
    ///
    /// Returns the native error if the window cannot be read or moved. A
    /// stale handle is forgotten by the tracker.
    pub fn snap(
        &self,
        handle: WindowHandle,
        zone: &ResolvedZone,
        origin: SnapOrigin,
    ) -> Result<SnapOutcome, ZoneSnapError> {
        let _guard = self.lock.lock();

        let resnap = self.tracker.is_snapped(handle);
        self.tracker.unmark_as_dragging(handle);

        let current = self.native(handle, self.windows.window_rect(handle))?;
        let force = resnap && self.tracker.was_resized_since_snap(handle, &current);
        let resaved = self.tracker.save_state(handle, force)? && force;
        self.tracker.mark_operation_in_progress(handle);

        if origin.ends_native_move() {
            if let Err(err) = self.windows.release_pointer_capture() {
                tracing::debug!(error = %err, "could not release pointer capture");
            }
            if !self.settle.is_zero() {
                std::thread::sleep(self.settle);
            }
        }

        if self.native(handle, self.windows.is_maximized(handle))? {
            self.native(handle, self.windows.restore_from_maximized(handle))?;
        }

        let rect = zone.rect.clamp_within(&zone.work_area);
        self.native(handle, self.windows.set_window_rect(handle, rect))?;
        self.tracker.mark_as_snapped(handle)?;

        if origin == SnapOrigin::Hotkey {
            self.tracker.prune_stale();
        }

        tracing::info!(
            handle = %handle,
            monitor = zone.monitor,
            zone = %zone.name,
            rect = %rect,
            resnap,
            ?origin,
            "snapped window"
        );

        Ok(SnapOutcome { handle, target: zone.target(), rect, resnap, resaved })
    }

    /// Restores a window's pre-snap geometry.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::NoSavedState`] if the window was never
    /// snapped, or the native error if the move fails.
    pub fn restore(&self, handle: WindowHandle) -> Result<Rect, ZoneSnapError> {
        let _guard = self.lock.lock();
        self.tracker.restore_state(handle)
    }

    fn native<T>(&self, handle: WindowHandle, result: Result<T, NativeError>) -> Result<T, ZoneSnapError> {
        result.map_err(|err| {
            if err.stale_handle().is_some() {
                self.tracker.forget(handle);
            }
            ZoneSnapError::Native(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::platform::headless::HeadlessDesktop;
    use crate::tracker::TrackerSettings;

    fn zone(name: &str, rect: Rect) -> ResolvedZone {
        ResolvedZone {
            monitor: 0,
            name: name.to_string(),
            rect,
            base: Rect::new(0, 0, 1920, 1080),
            work_area: Rect::new(0, 0, 1920, 1080),
            key: None,
        }
    }

    fn setup() -> (Arc<HeadlessDesktop>, Arc<WindowStateTracker>, SnapExecutor) {
        let desktop = Arc::new(HeadlessDesktop::single_monitor(1920, 1080));
        let windows: Arc<dyn WindowSystem> = desktop.clone();
        let tracker = Arc::new(WindowStateTracker::new(Arc::clone(&windows), TrackerSettings::default()));
        let executor = SnapExecutor::new(windows, Arc::clone(&tracker)).with_settle(Duration::ZERO);
        (desktop, tracker, executor)
    }

    #[test]
    fn test_first_snap_saves_and_marks() {
        let (desktop, tracker, executor) = setup();
        let window = desktop.add_window(Rect::new(100, 100, 800, 600));

        let left = zone("left", Rect::new(0, 0, 960, 1080));
        let outcome = executor.snap(window, &left, SnapOrigin::Hotkey).unwrap();

        assert!(!outcome.resnap);
        assert_eq!(outcome.rect, Rect::new(0, 0, 960, 1080));
        assert_eq!(desktop.rect_of(window), Some(Rect::new(0, 0, 960, 1080)));
        assert_eq!(tracker.saved_state(window).map(|s| s.rect), Some(Rect::new(100, 100, 800, 600)));
        assert_eq!(tracker.snap_record(window), Some(Rect::new(0, 0, 960, 1080)));
        assert!(tracker.is_exempt(window));
    }

    #[test]
    fn test_resnap_keeps_original_state() {
        let (desktop, tracker, executor) = setup();
        let window = desktop.add_window(Rect::new(100, 100, 800, 600));

        executor.snap(window, &zone("left", Rect::new(0, 0, 960, 1080)), SnapOrigin::Hotkey).unwrap();
        let outcome = executor
            .snap(window, &zone("right", Rect::new(960, 0, 960, 1080)), SnapOrigin::Hotkey)
            .unwrap();

        assert!(outcome.resnap);
        assert!(!outcome.resaved);
        assert_eq!(tracker.saved_state(window).map(|s| s.rect), Some(Rect::new(100, 100, 800, 600)));

        assert_eq!(executor.restore(window).unwrap(), Rect::new(100, 100, 800, 600));
        assert!(!tracker.is_snapped(window));
    }

    #[test]
    fn test_resnap_after_manual_resize_resaves() {
        let (desktop, tracker, executor) = setup();
        let window = desktop.add_window(Rect::new(100, 100, 800, 600));

        executor.snap(window, &zone("left", Rect::new(0, 0, 960, 1080)), SnapOrigin::Hotkey).unwrap();
        desktop.move_window(window, Rect::new(0, 0, 700, 900)).unwrap();

        let outcome = executor
            .snap(window, &zone("right", Rect::new(960, 0, 960, 1080)), SnapOrigin::Hotkey)
            .unwrap();
        assert!(outcome.resaved);
        assert_eq!(tracker.saved_state(window).map(|s| s.rect), Some(Rect::new(0, 0, 700, 900)));
    }

    #[test]
    fn test_drag_snap_releases_capture_and_clears_drag_exemption() {
        let (desktop, tracker, executor) = setup();
        let window = desktop.add_window(Rect::new(100, 100, 800, 600));
        desktop.set_capture(Some(window));
        tracker.mark_as_dragging(window);

        executor.snap(window, &zone("left", Rect::new(0, 0, 960, 1080)), SnapOrigin::DragKey).unwrap();

        assert_eq!(desktop.capture(), None);
        assert!(!tracker.is_dragging(window));
    }

    #[test]
    fn test_hotkey_snap_keeps_capture() {
        let (desktop, _tracker, executor) = setup();
        let window = desktop.add_window(Rect::new(100, 100, 800, 600));
        let other = desktop.add_window(Rect::new(0, 0, 10, 10));
        desktop.set_capture(Some(other));

        executor.snap(window, &zone("left", Rect::new(0, 0, 960, 1080)), SnapOrigin::Hotkey).unwrap();
        assert_eq!(desktop.capture(), Some(other));
    }

    #[test]
    fn test_maximized_window_is_restored_first() {
        let (desktop, _tracker, executor) = setup();
        let window = desktop.add_window(Rect::new(100, 100, 800, 600));
        desktop.maximize(window, Rect::new(0, 0, 1920, 1080)).unwrap();

        executor.snap(window, &zone("left", Rect::new(0, 0, 960, 1080)), SnapOrigin::Hotkey).unwrap();
        assert!(!desktop.is_maximized(window).unwrap());
    }

    #[test]
    fn test_zone_outside_base_is_clamped() {
        let (desktop, _tracker, executor) = setup();
        let window = desktop.add_window(Rect::new(100, 100, 800, 600));

        let shifted = zone("shifted", Rect::new(1500, -20, 960, 1080));
        let outcome = executor.snap(window, &shifted, SnapOrigin::Hotkey).unwrap();
        assert_eq!(outcome.rect, Rect::new(960, 0, 960, 1080));
        assert_eq!(desktop.rect_of(window), Some(Rect::new(960, 0, 960, 1080)));
    }

    #[test]
    fn test_full_monitor_zone_is_kept_above_taskbar() {
        let (desktop, _tracker, executor) = setup();
        let window = desktop.add_window(Rect::new(100, 100, 400, 300));

        let bottom = ResolvedZone {
            work_area: Rect::new(0, 0, 1920, 1040),
            ..zone("bottom", Rect::new(0, 540, 1920, 540))
        };
        let outcome = executor.snap(window, &bottom, SnapOrigin::Hotkey).unwrap();
        assert_eq!(outcome.rect, Rect::new(0, 500, 1920, 540));
        assert_eq!(desktop.rect_of(window), Some(Rect::new(0, 500, 1920, 540)));
    }

    #[test]
    fn test_stale_window_is_forgotten() {
        let (desktop, tracker, executor) = setup();
        let window = desktop.add_window(Rect::new(100, 100, 800, 600));
        executor.snap(window, &zone("left", Rect::new(0, 0, 960, 1080)), SnapOrigin::Hotkey).unwrap();
        desktop.close_window(window);

        let err = executor
            .snap(window, &zone("right", Rect::new(960, 0, 960, 1080)), SnapOrigin::Hotkey)
            .unwrap_err();
        assert_eq!(err.stale_handle(), Some(window));
        assert!(tracker.saved_state(window).is_none());
        assert!(!tracker.is_snapped(window));
    }

    #[test]
    fn test_hotkey_snap_prunes_closed_windows() {
        let (desktop, tracker, executor) = setup();
        let gone = desktop.add_window(Rect::new(0, 0, 400, 300));
        let window = desktop.add_window(Rect::new(100, 100, 800, 600));

        executor.snap(gone, &zone("left", Rect::new(0, 0, 960, 1080)), SnapOrigin::Release).unwrap();
        desktop.close_window(gone);
        executor.snap(window, &zone("right", Rect::new(960, 0, 960, 1080)), SnapOrigin::Hotkey).unwrap();

        assert!(tracker.saved_state(gone).is_none());
    }

    #[test]
    fn test_failed_move_leaves_window_unsnapped() {
        let (desktop, tracker, executor) = setup();
        let window = desktop.add_window(Rect::new(100, 100, 800, 600));
        desktop.set_failing(true);

        let result = executor.snap(window, &zone("left", Rect::new(0, 0, 960, 1080)), SnapOrigin::Hotkey);
        assert!(matches!(result, Err(ZoneSnapError::Native(NativeError::CallFailed { .. }))));
        assert!(!tracker.is_snapped(window));
        assert_eq!(desktop.rect_of(window), Some(Rect::new(100, 100, 800, 600)));
        // Exemption still expires on its own.
        assert!(tracker.check_drift_at(Instant::now() + Duration::from_secs(5)).is_empty());
    }
}
