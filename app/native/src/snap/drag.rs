//! Drag & snap state machine.
//!
//! Polled every few milliseconds. A press of the primary button over a normal
//! application window makes it the drag candidate; pressing the show-zones key
//! while that window is actually moving brings up the overlay. While the
//! overlay is up the hovered zone is highlighted and zone or number keys snap
//! the window immediately. Releasing the button over a zone snaps it there.
//!
//! Scroll and secondary-click events arrive asynchronously through a
//! [`DragHandle`] and are applied at the start of the next tick.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{self, Receiver, Sender};

use super::executor::{SnapExecutor, SnapOrigin, SnapOutcome};
use super::overlay::OverlayController;
use super::target::{self, MonitorContext, SnapInput};
use crate::config::{DefaultMonitor, HotkeysConfig};
use crate::error::ZoneSnapError;
use crate::input::{HeldKey, InputState, Modifier, MonitorKeys, MouseButton};
use crate::platform::{Point, WindowHandle, WindowSystem, WindowTraits};
use crate::zones::{CycleDirection, ResolvedZone, ZoneRegistry, ZoneSnapshot, ZoneTarget};

/// Period of the drag poll loop.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Commands queued between two ticks before senders are turned away.
const COMMAND_BUFFER_SIZE: usize = 64;

/// Pause after a key-driven snap so key repeat does not snap again.
pub const KEY_SNAP_DEBOUNCE: Duration = Duration::from_millis(200);

/// Window classes of shell surfaces that are never dragged into zones.
const SHELL_WINDOW_CLASSES: &[&str] = &[
    "Progman",
    "WorkerW",
    "Shell_TrayWnd",
    "Shell_SecondaryTrayWnd",
    "Windows.UI.Core.CoreWindow",
    "ApplicationFrameWindow",
    "Windows.UI.Input.InputSite.WindowClass",
    "SysListView32",
    "ToolbarWindow32",
    "ReBarWindow32",
    "MSTaskSwWClass",
    "TaskListThumbnailWnd",
    "Button",
];

/// Returns true for ordinary application windows.
#[must_use]
pub fn is_snappable(traits: &WindowTraits) -> bool {
    !traits.is_desktop
        && traits.visible
        && traits.has_caption
        && traits.has_system_menu
        && !traits.is_tool_window
        && !traits.title.trim().is_empty()
        && !SHELL_WINDOW_CLASSES.contains(&traits.class_name.as_str())
}

/// Drag behavior, resolved from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSettings {
    pub show_zones_key: HeldKey,
    pub scroll_enabled: bool,
    pub scroll_cooldown: Duration,
    pub snap_cooldown: Duration,
    pub hover_margin: i32,
    pub ignore_fullscreen: bool,
    pub default_monitor: DefaultMonitor,
}

impl DragSettings {
    #[must_use]
    pub fn from_config(config: &HotkeysConfig) -> Self {
        let drag = &config.drag_behavior;
        let show_zones_key = HeldKey::parse(&drag.show_zones_key).unwrap_or_else(|| {
            tracing::warn!(key = %drag.show_zones_key, "unknown show_zones_key, using shift");
            HeldKey::Modifier(Modifier::Shift)
        });

        Self {
            show_zones_key,
            scroll_enabled: drag.scroll_layout_switch_enabled,
            scroll_cooldown: drag.scroll_cooldown(),
            snap_cooldown: drag.number_snap_cooldown(),
            hover_margin: drag.zone_hover_margin_pixels,
            ignore_fullscreen: drag.ignore_fullscreen_zone,
            default_monitor: config.default_monitor_for_zone_keys,
        }
    }
}

impl Default for DragSettings {
    fn default() -> Self { Self::from_config(&HotkeysConfig::default()) }
}

/// Where the machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    /// A window was grabbed; no overlay yet.
    Candidate,
    /// The overlay is up.
    OverlayActive,
}

/// State of the current drag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragSession {
    pub window: Option<WindowHandle>,
    pub hover: Option<ZoneTarget>,
    pub overlay_shown: bool,
    /// The overlay was turned on with the secondary button.
    pub overlay_toggled: bool,
    last_position: Option<Point>,
}

/// Events delivered to the machine from outside the poll loop.
#[derive(Debug, Clone)]
pub enum DragCommand {
    /// Mouse wheel turned; positive `delta` scrolls up.
    Scroll { point: Point, delta: i32 },
    SecondaryClick,
    Reconfigure { settings: DragSettings, monitor_keys: MonitorKeys },
}

/// Sender side of a [`DragMachine`]'s command queue.
#[derive(Debug, Clone)]
pub struct DragHandle {
    sender: Sender<DragCommand>,
}

impl DragHandle {
    /// Queues a command for the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::EventChannelClosed`] if the machine is gone
    /// or its queue is full.
    pub fn send(&self, command: DragCommand) -> Result<(), ZoneSnapError> {
        self.sender.try_send(command).map_err(|_| ZoneSnapError::EventChannelClosed)
    }
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// A zone or number key snapped the dragged window.
    KeySnapped(SnapOutcome),
    /// The button was released over a zone.
    ReleaseSnapped(SnapOutcome),
}

/// Shared components the machine works with.
pub struct DragParts {
    pub registry: Arc<ZoneRegistry>,
    pub windows: Arc<dyn WindowSystem>,
    pub input: InputState,
    pub executor: Arc<SnapExecutor>,
    pub overlay: Arc<OverlayController>,
}

/// The drag & snap state machine.
pub struct DragMachine {
    registry: Arc<ZoneRegistry>,
    windows: Arc<dyn WindowSystem>,
    input: InputState,
    executor: Arc<SnapExecutor>,
    overlay: Arc<OverlayController>,
    settings: DragSettings,
    session: DragSession,
    primary_was_down: bool,
    show_key_was_down: bool,
    snap_cooldown_until: Option<Instant>,
    scroll_ready_at: Option<Instant>,
    commands: Receiver<DragCommand>,
}

impl std::fmt::Debug for DragMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragMachine")
            .field("settings", &self.settings)
            .field("session", &self.session)
            .field("primary_was_down", &self.primary_was_down)
            .finish_non_exhaustive()
    }
}

impl DragMachine {
    #[must_use]
    pub fn new(parts: DragParts, settings: DragSettings) -> (Self, DragHandle) {
        let (sender, commands) = mpsc::channel(COMMAND_BUFFER_SIZE);
        let machine = Self {
            registry: parts.registry,
            windows: parts.windows,
            input: parts.input,
            executor: parts.executor,
            overlay: parts.overlay,
            settings,
            session: DragSession::default(),
            primary_was_down: false,
            show_key_was_down: false,
            snap_cooldown_until: None,
            scroll_ready_at: None,
            commands,
        };
        (machine, DragHandle { sender })
    }

    #[must_use]
    pub const fn session(&self) -> &DragSession { &self.session }

    #[must_use]
    pub const fn settings(&self) -> &DragSettings { &self.settings }

    #[must_use]
    pub const fn phase(&self) -> DragPhase {
        if self.session.overlay_shown {
            DragPhase::OverlayActive
        } else if self.session.window.is_some() {
            DragPhase::Candidate
        } else {
            DragPhase::Idle
        }
    }

    /// Runs one poll iteration at the current time.
    pub fn tick(&mut self) -> TickOutcome { self.tick_at(Instant::now()) }

    /// Runs one poll iteration.
    pub fn tick_at(&mut self, now: Instant) -> TickOutcome {
        self.overlay.expire(now);

        let primary = self.input.is_mouse_down(MouseButton::Primary);
        let pressed = primary && !self.primary_was_down;
        let released = !primary && self.primary_was_down;
        self.primary_was_down = primary;

        while let Ok(command) = self.commands.try_recv() {
            self.handle_command(command, now);
        }

        let show_down = self.input.is_held(self.settings.show_zones_key);
        let show_pressed = show_down && !self.show_key_was_down;
        self.show_key_was_down = show_down;

        if pressed {
            self.begin_candidate(now);
        }

        if primary {
            if show_pressed
                && !self.session.overlay_shown
                && let Some(window) = self.session.window
                && self.is_moving(window)
            {
                self.activate_overlay();
            }

            if self.session.overlay_shown {
                self.update_hover();
                if let Some(outcome) = self.try_key_snap(now) {
                    return TickOutcome::KeySnapped(outcome);
                }
            }
        }

        if released && let Some(outcome) = self.finish_release() {
            return TickOutcome::ReleaseSnapped(outcome);
        }

        TickOutcome::Continue
    }

    fn handle_command(&mut self, command: DragCommand, now: Instant) {
        match command {
            DragCommand::Scroll { point, delta } => self.on_scroll(point, delta, now),
            DragCommand::SecondaryClick => self.on_secondary_click(),
            DragCommand::Reconfigure { settings, monitor_keys } => {
                self.settings = settings;
                self.input.set_monitor_keys(monitor_keys);
                tracing::debug!("drag settings updated");
            }
        }
    }

    fn begin_candidate(&mut self, now: Instant) {
        if self.snap_cooldown_until.is_some_and(|until| now < until) {
            tracing::debug!("ignoring press right after a key snap");
            return;
        }
        self.snap_cooldown_until = None;

        let tracker = Arc::clone(self.executor.tracker());
        if let Some(previous) = self.session.window.take() {
            tracker.unmark_as_dragging(previous);
        }

        let Some(window) = self.capture_window() else {
            return;
        };
        self.session.window = Some(window);

        if tracker.is_snapped(window) {
            if let Ok(current) = self.windows.window_rect(window)
                && tracker.was_resized_since_snap(window, &current)
                && let Err(err) = tracker.save_state(window, true)
            {
                tracing::warn!(handle = %window, error = %err, "could not update saved state");
            }
            tracker.mark_as_dragging(window);
            if let Err(err) = tracker.restore_size_only(window) {
                tracing::debug!(handle = %window, error = %err, "could not restore size for drag");
            }
        }

        self.session.last_position = self.windows.window_rect(window).ok().map(|r| Point::new(r.x, r.y));
        tracing::debug!(handle = %window, "drag candidate captured");
    }

    /// Returns the top-level window under the cursor if it can be snapped.
    fn capture_window(&self) -> Option<WindowHandle> {
        let cursor = self.windows.cursor_position().ok()?;
        let overlay_windows = self.overlay.windows();

        let mut hit = self.windows.window_at(cursor)?;
        if overlay_windows.contains(&hit) {
            hit = self.overlay.suspended(|| self.windows.window_at(cursor))?;
        }

        let root = self.windows.root_ancestor(hit);
        if overlay_windows.contains(&root) {
            return None;
        }

        match self.windows.window_traits(root) {
            Ok(traits) if is_snappable(&traits) => Some(root),
            Ok(traits) => {
                tracing::trace!(handle = %root, class = %traits.class_name, "window cannot be snapped");
                None
            }
            Err(err) => {
                tracing::debug!(handle = %root, error = %err, "could not inspect window");
                None
            }
        }
    }

    /// Pointer capture, or a position change since the last check.
    fn is_moving(&mut self, window: WindowHandle) -> bool {
        if self.windows.has_pointer_capture(window) {
            return true;
        }
        let Ok(rect) = self.windows.window_rect(window) else {
            return false;
        };
        let position = Point::new(rect.x, rect.y);
        let moved = self.session.last_position.is_some_and(|last| last != position);
        self.session.last_position = Some(position);
        moved
    }

    fn activate_overlay(&mut self) {
        let snapshot = self.registry.snapshot();
        self.overlay.show(&snapshot);
        self.session.overlay_shown = true;
        self.session.hover = None;

        if let Some(window) = self.session.window {
            self.executor.tracker().mark_as_dragging(window);
        }
        tracing::debug!(window = ?self.session.window, toggled = self.session.overlay_toggled, "overlay active");
    }

    fn update_hover(&mut self) {
        let Ok(cursor) = self.windows.cursor_position() else {
            return;
        };
        let snapshot = self.registry.snapshot();
        let hover = snapshot
            .zone_at(cursor, self.settings.hover_margin, self.settings.ignore_fullscreen)
            .map(ResolvedZone::target);

        if hover != self.session.hover {
            self.overlay.set_highlight(hover.as_ref());
            tracing::trace!(zone = ?hover, "hover changed");
            self.session.hover = hover;
        }
    }

    fn read_snap_input(&self, snapshot: &ZoneSnapshot) -> SnapInput {
        let monitor_key = self.input.pressed_monitor_key();
        let zone_keys = self
            .input
            .active_zone_keys(snapshot.all_zones().filter_map(|z| z.key.as_deref()))
            .into_iter()
            .map(|active| active.key)
            .collect();
        // Always read so the digit latch does not linger into a later tick.
        let number = self.input.pressed_number();

        SnapInput { monitor_key, zone_keys, number }
    }

    fn fallback_monitor(&self, snapshot: &ZoneSnapshot) -> Option<u32> {
        let context = MonitorContext {
            drag_cursor: self.windows.cursor_position().ok(),
            active_window: self
                .windows
                .foreground_window()
                .and_then(|handle| self.windows.window_rect(handle).ok()),
        };
        target::fallback_monitor(snapshot, self.settings.default_monitor, &context)
    }

    fn try_key_snap(&mut self, now: Instant) -> Option<SnapOutcome> {
        let snapshot = self.registry.snapshot();
        let input = self.read_snap_input(&snapshot);
        if input.is_empty() {
            return None;
        }

        if self.session.window.is_none() {
            self.session.window = self.capture_window();
        }
        let Some(window) = self.session.window else {
            tracing::debug!("snap key pressed without a window to snap");
            return None;
        };

        let target = match target::resolve(&snapshot, &input, || self.fallback_monitor(&snapshot)) {
            Ok(Some(target)) => target,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(error = %err, "cannot resolve snap target");
                return None;
            }
        };
        let zone = snapshot.zone(target.monitor, &target.zone)?;

        let result = self.executor.snap(window, zone, SnapOrigin::DragKey);
        self.snap_cooldown_until = Some(now + self.settings.snap_cooldown);
        self.overlay.hide();
        self.session = DragSession::default();

        match result {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                tracing::warn!(handle = %window, zone = %target, error = %err, "key snap failed");
                None
            }
        }
    }

    fn finish_release(&mut self) -> Option<SnapOutcome> {
        let window = self.session.window.take();
        if let Some(window) = window {
            self.executor.tracker().unmark_as_dragging(window);
        }

        if !self.session.overlay_shown {
            self.session = DragSession::default();
            return None;
        }

        let mut snapped = None;
        if let (Some(window), Some(target)) = (window, self.session.hover.take()) {
            let snapshot = self.registry.snapshot();
            match snapshot.zone(target.monitor, &target.zone) {
                Some(zone) => match self.executor.snap(window, zone, SnapOrigin::Release) {
                    Ok(outcome) => snapped = Some(outcome),
                    Err(err) => tracing::warn!(handle = %window, zone = %target, error = %err, "release snap failed"),
                },
                None => tracing::debug!(zone = %target, "hovered zone no longer exists"),
            }
        }

        if self.session.overlay_toggled {
            self.overlay.set_highlight(None);
            self.session.last_position = None;
        } else {
            self.overlay.hide();
            self.session = DragSession::default();
        }

        snapped
    }

    fn on_scroll(&mut self, point: Point, delta: i32, now: Instant) {
        if delta == 0
            || !self.primary_was_down
            || !self.session.overlay_shown
            || !self.settings.scroll_enabled
        {
            return;
        }
        if self.scroll_ready_at.is_some_and(|ready| now < ready) {
            return;
        }
        self.scroll_ready_at = Some(now + self.settings.scroll_cooldown);

        let snapshot = self.registry.snapshot();
        if snapshot.layouts.len() < 2 {
            return;
        }
        let Some(monitor) = snapshot.monitor_at(point).map(|m| m.id) else {
            return;
        };

        let direction = if delta > 0 { CycleDirection::Next } else { CycleDirection::Prev };
        match self.registry.cycle_monitor_layout(monitor, direction) {
            Ok(Some(next)) => {
                self.overlay.refresh(&next);
                self.session.hover = None;
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(monitor, error = %err, "cannot cycle monitor layout"),
        }
    }

    fn on_secondary_click(&mut self) {
        if !self.primary_was_down {
            return;
        }

        if self.session.overlay_shown {
            self.overlay.hide();
            self.session.overlay_shown = false;
            self.session.overlay_toggled = false;
            self.session.hover = None;
            tracing::debug!("overlay toggled off");
        } else {
            if self.session.window.is_none() {
                self.session.window = self.capture_window();
            }
            self.session.overlay_toggled = true;
            self.activate_overlay();
        }
    }
}
