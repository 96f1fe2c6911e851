//! In-memory desktop.
//!
//! [`HeadlessDesktop`] keeps windows, monitors, the cursor and key state in
//! memory and implements [`WindowSystem`] and [`InputDevice`] on top of them.
//! [`RecordingOverlay`] records every overlay command it receives. Together
//! they let the whole engine run without a display server.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{
    InputDevice, KeyState, Monitor, NativeError, NativeResult, OverlaySink, Point, Rect,
    VirtualKey, WindowHandle, WindowSystem, WindowTraits,
};
use crate::snap::overlay::OverlayFrame;
use crate::zones::ZoneTarget;

/// First handle value handed out by [`HeadlessDesktop::add_window`].
const FIRST_HANDLE: u64 = 0x1000;

#[derive(Debug, Clone)]
struct HeadlessWindow {
    rect: Rect,
    maximized: bool,
    parent: Option<WindowHandle>,
    traits: WindowTraits,
}

#[derive(Debug, Default)]
struct DesktopState {
    monitors: Vec<Monitor>,
    windows: BTreeMap<WindowHandle, HeadlessWindow>,
    /// Front-most first.
    z_order: Vec<WindowHandle>,
    foreground: Option<WindowHandle>,
    cursor: Point,
    keys: HashMap<VirtualKey, KeyState>,
    capture: Option<WindowHandle>,
    next_handle: u64,
    moves: Vec<(WindowHandle, Rect)>,
    failing: bool,
}

impl DesktopState {
    fn window(&self, handle: WindowHandle) -> NativeResult<&HeadlessWindow> {
        self.windows.get(&handle).ok_or(NativeError::StaleHandle(handle))
    }

    fn window_mut(&mut self, handle: WindowHandle) -> NativeResult<&mut HeadlessWindow> {
        self.windows.get_mut(&handle).ok_or(NativeError::StaleHandle(handle))
    }

    fn raise(&mut self, handle: WindowHandle) {
        self.z_order.retain(|h| *h != handle);
        self.z_order.insert(0, handle);
    }
}

/// In-memory implementation of the window system and input device.
#[derive(Debug, Default)]
pub struct HeadlessDesktop {
    state: Mutex<DesktopState>,
}

impl HeadlessDesktop {
    /// Creates a desktop with the given monitors and no windows.
    #[must_use]
    pub fn new(monitors: Vec<Monitor>) -> Self {
        Self {
            state: Mutex::new(DesktopState {
                monitors,
                next_handle: FIRST_HANDLE,
                ..DesktopState::default()
            }),
        }
    }

    /// Creates a desktop with one primary monitor whose work area equals its bounds.
    #[must_use]
    pub fn single_monitor(width: i32, height: i32) -> Self {
        let bounds = Rect::new(0, 0, width, height);
        Self::new(vec![Monitor::new(0, bounds, bounds, true)])
    }

    /// Replaces the monitor list.
    pub fn set_monitors(&self, monitors: Vec<Monitor>) { self.state.lock().monitors = monitors; }

    /// Adds a regular application window on top of all others and focuses it.
    pub fn add_window(&self, rect: Rect) -> WindowHandle {
        let title = format!("Window {}", self.state.lock().next_handle - FIRST_HANDLE + 1);
        self.add_window_with(rect, WindowTraits {
            class_name: "HeadlessWindow".to_string(),
            title,
            visible: true,
            has_caption: true,
            has_system_menu: true,
            is_tool_window: false,
            is_desktop: false,
        })
    }

    /// Adds a window with explicit properties on top of all others and focuses it.
    pub fn add_window_with(&self, rect: Rect, traits: WindowTraits) -> WindowHandle {
        let mut state = self.state.lock();
        let handle = WindowHandle(state.next_handle);
        state.next_handle += 1;
        state.windows.insert(handle, HeadlessWindow {
            rect,
            maximized: false,
            parent: None,
            traits,
        });
        state.raise(handle);
        state.foreground = Some(handle);
        handle
    }

    /// Adds a child window (for example a toolbar) inside `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError::StaleHandle`] if the parent does not exist.
    pub fn add_child_window(&self, parent: WindowHandle, rect: Rect) -> NativeResult<WindowHandle> {
        let mut state = self.state.lock();
        let parent_traits = state.window(parent)?.traits.clone();
        let handle = WindowHandle(state.next_handle);
        state.next_handle += 1;
        state.windows.insert(handle, HeadlessWindow {
            rect,
            maximized: false,
            parent: Some(parent),
            traits: WindowTraits {
                class_name: "HeadlessChild".to_string(),
                title: String::new(),
                ..parent_traits
            },
        });
        state.raise(handle);
        Ok(handle)
    }

    /// Destroys a window and all of its children.
    pub fn close_window(&self, handle: WindowHandle) {
        let mut state = self.state.lock();
        state.windows.retain(|h, w| *h != handle && w.parent != Some(handle));
        let live: Vec<WindowHandle> = state.windows.keys().copied().collect();
        state.z_order.retain(|h| live.contains(h));
        if state.foreground == Some(handle) {
            state.foreground = None;
        }
        if state.capture == Some(handle) {
            state.capture = None;
        }
    }

    /// Moves a window the way a user would, without recording a programmatic move.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError::StaleHandle`] if the window does not exist.
    pub fn move_window(&self, handle: WindowHandle, rect: Rect) -> NativeResult<()> {
        let mut state = self.state.lock();
        let window = state.window_mut(handle)?;
        window.rect = rect;
        window.maximized = false;
        Ok(())
    }

    /// Maximizes a window onto the given rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError::StaleHandle`] if the window does not exist.
    pub fn maximize(&self, handle: WindowHandle, rect: Rect) -> NativeResult<()> {
        let mut state = self.state.lock();
        let window = state.window_mut(handle)?;
        window.rect = rect;
        window.maximized = true;
        Ok(())
    }

    /// Hides or shows a window.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError::StaleHandle`] if the window does not exist.
    pub fn set_visible(&self, handle: WindowHandle, visible: bool) -> NativeResult<()> {
        self.state.lock().window_mut(handle)?.traits.visible = visible;
        Ok(())
    }

    /// Brings a window to the front without focusing it.
    pub fn raise_window(&self, handle: WindowHandle) {
        let mut state = self.state.lock();
        if state.windows.contains_key(&handle) {
            state.raise(handle);
        }
    }

    pub fn set_foreground(&self, handle: Option<WindowHandle>) {
        self.state.lock().foreground = handle;
    }

    pub fn set_cursor(&self, point: Point) { self.state.lock().cursor = point; }

    /// Gives (or removes) the pointer capture, as a native move loop would.
    pub fn set_capture(&self, handle: Option<WindowHandle>) { self.state.lock().capture = handle; }

    /// Presses and holds a key.
    pub fn press_key(&self, key: VirtualKey) {
        self.state.lock().keys.insert(key, KeyState {
            down: true,
            pressed_since_last_query: true,
        });
    }

    /// Releases a key. A press that was never queried stays latched.
    pub fn release_key(&self, key: VirtualKey) {
        self.state.lock().keys.entry(key).or_default().down = false;
    }

    /// Presses and immediately releases a key between two queries.
    pub fn tap_key(&self, key: VirtualKey) {
        self.state.lock().keys.insert(key, KeyState {
            down: false,
            pressed_since_last_query: true,
        });
    }

    /// Makes every geometry mutation fail with [`NativeError::CallFailed`].
    pub fn set_failing(&self, failing: bool) { self.state.lock().failing = failing; }

    /// Returns the current rectangle of a window.
    #[must_use]
    pub fn rect_of(&self, handle: WindowHandle) -> Option<Rect> {
        self.state.lock().windows.get(&handle).map(|w| w.rect)
    }

    /// Returns every programmatic move performed through [`WindowSystem`].
    #[must_use]
    pub fn moves(&self) -> Vec<(WindowHandle, Rect)> { self.state.lock().moves.clone() }

    /// Returns true if the pointer capture is currently held by any window.
    #[must_use]
    pub fn capture(&self) -> Option<WindowHandle> { self.state.lock().capture }
}

impl WindowSystem for HeadlessDesktop {
    fn monitors(&self) -> NativeResult<Vec<Monitor>> { Ok(self.state.lock().monitors.clone()) }

    fn foreground_window(&self) -> Option<WindowHandle> { self.state.lock().foreground }

    fn window_rect(&self, handle: WindowHandle) -> NativeResult<Rect> {
        Ok(self.state.lock().window(handle)?.rect)
    }

    fn set_window_rect(&self, handle: WindowHandle, rect: Rect) -> NativeResult<()> {
        let mut state = self.state.lock();
        if state.failing {
            return Err(NativeError::CallFailed {
                call: "set_window_rect",
                message: "headless desktop is failing".to_string(),
            });
        }
        state.window_mut(handle)?.rect = rect;
        state.moves.push((handle, rect));
        Ok(())
    }

    fn is_maximized(&self, handle: WindowHandle) -> NativeResult<bool> {
        Ok(self.state.lock().window(handle)?.maximized)
    }

    fn restore_from_maximized(&self, handle: WindowHandle) -> NativeResult<()> {
        self.state.lock().window_mut(handle)?.maximized = false;
        Ok(())
    }

    fn is_window(&self, handle: WindowHandle) -> bool {
        self.state.lock().windows.contains_key(&handle)
    }

    fn window_at(&self, point: Point) -> Option<WindowHandle> {
        let state = self.state.lock();
        state.z_order.iter().copied().find(|h| {
            state
                .windows
                .get(h)
                .is_some_and(|w| w.traits.visible && w.rect.contains_point(point))
        })
    }

    fn root_ancestor(&self, handle: WindowHandle) -> WindowHandle {
        let state = self.state.lock();
        let mut current = handle;
        while let Some(parent) = state.windows.get(&current).and_then(|w| w.parent) {
            current = parent;
        }
        current
    }

    fn window_traits(&self, handle: WindowHandle) -> NativeResult<WindowTraits> {
        Ok(self.state.lock().window(handle)?.traits.clone())
    }

    fn has_pointer_capture(&self, handle: WindowHandle) -> bool {
        self.state.lock().capture == Some(handle)
    }

    fn release_pointer_capture(&self) -> NativeResult<()> {
        self.state.lock().capture = None;
        Ok(())
    }

    fn cursor_position(&self) -> NativeResult<Point> { Ok(self.state.lock().cursor) }
}

impl InputDevice for HeadlessDesktop {
    fn key_state(&self, key: VirtualKey) -> KeyState {
        let mut state = self.state.lock();
        let entry = state.keys.entry(key).or_default();
        let current = *entry;
        entry.pressed_since_last_query = false;
        current
    }
}

/// A command received by [`RecordingOverlay`].
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayCommand {
    Show,
    Hide,
    Highlight(Option<ZoneTarget>),
    Redraw(OverlayFrame),
    Suspend,
    Resume,
}

/// Overlay sink that records commands instead of drawing.
///
/// When attached to a [`HeadlessDesktop`] with [`RecordingOverlay::attached`],
/// its window is shown on top of the desktop while the overlay is visible, so
/// it is hit by [`WindowSystem::window_at`] unless suspended.
#[derive(Debug, Default)]
pub struct RecordingOverlay {
    commands: Mutex<Vec<OverlayCommand>>,
    surface: Option<(Arc<HeadlessDesktop>, WindowHandle)>,
}

impl RecordingOverlay {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Creates an overlay backed by a full-screen window on `desktop`.
    #[must_use]
    pub fn attached(desktop: &Arc<HeadlessDesktop>, bounds: Rect) -> Self {
        let focused = desktop.foreground_window();
        let handle = desktop.add_window_with(bounds, WindowTraits {
            class_name: "ZoneSnapOverlay".to_string(),
            title: String::new(),
            visible: false,
            has_caption: false,
            has_system_menu: false,
            is_tool_window: true,
            is_desktop: false,
        });
        desktop.set_foreground(focused);
        Self {
            commands: Mutex::new(Vec::new()),
            surface: Some((Arc::clone(desktop), handle)),
        }
    }

    /// Returns all recorded commands.
    #[must_use]
    pub fn commands(&self) -> Vec<OverlayCommand> { self.commands.lock().clone() }

    /// Clears the recorded commands.
    pub fn clear(&self) { self.commands.lock().clear(); }

    /// Returns true if the last show/hide command was a show.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.commands
            .lock()
            .iter()
            .rev()
            .find_map(|c| match c {
                OverlayCommand::Show => Some(true),
                OverlayCommand::Hide => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Returns the most recent highlight command's target.
    #[must_use]
    pub fn last_highlight(&self) -> Option<Option<ZoneTarget>> {
        self.commands.lock().iter().rev().find_map(|c| match c {
            OverlayCommand::Highlight(target) => Some(target.clone()),
            _ => None,
        })
    }

    /// Returns the most recently drawn frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<OverlayFrame> {
        self.commands.lock().iter().rev().find_map(|c| match c {
            OverlayCommand::Redraw(frame) => Some(frame.clone()),
            _ => None,
        })
    }

    fn record(&self, command: OverlayCommand) { self.commands.lock().push(command); }

    fn set_surface_visible(&self, visible: bool) {
        if let Some((desktop, handle)) = &self.surface {
            let _ = desktop.set_visible(*handle, visible);
            if visible {
                desktop.raise_window(*handle);
            }
        }
    }
}

impl OverlaySink for RecordingOverlay {
    fn show(&self) {
        self.set_surface_visible(true);
        self.record(OverlayCommand::Show);
    }

    fn hide(&self) {
        self.set_surface_visible(false);
        self.record(OverlayCommand::Hide);
    }

    fn set_highlight(&self, target: Option<&ZoneTarget>) {
        self.record(OverlayCommand::Highlight(target.cloned()));
    }

    fn redraw(&self, frame: &OverlayFrame) { self.record(OverlayCommand::Redraw(frame.clone())); }

    fn windows(&self) -> Vec<WindowHandle> {
        self.surface.iter().map(|(_, handle)| *handle).collect()
    }

    fn suspend(&self) {
        self.set_surface_visible(false);
        self.record(OverlayCommand::Suspend);
    }

    fn resume(&self) {
        if self.is_visible() {
            self.set_surface_visible(true);
        }
        self.record(OverlayCommand::Resume);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_latch_is_cleared_on_query() {
        let desktop = HeadlessDesktop::single_monitor(1920, 1080);
        desktop.tap_key(VirtualKey(0x51));

        let first = desktop.key_state(VirtualKey(0x51));
        assert!(first.pressed_since_last_query);
        assert!(!first.down);

        let second = desktop.key_state(VirtualKey(0x51));
        assert!(!second.is_active());
    }

    #[test]
    fn test_held_key_stays_down() {
        let desktop = HeadlessDesktop::single_monitor(1920, 1080);
        desktop.press_key(VirtualKey::SHIFT);
        let _ = desktop.key_state(VirtualKey::SHIFT);
        assert!(desktop.key_state(VirtualKey::SHIFT).down);

        desktop.release_key(VirtualKey::SHIFT);
        assert!(!desktop.key_state(VirtualKey::SHIFT).is_active());
    }

    #[test]
    fn test_window_at_respects_z_order_and_visibility() {
        let desktop = HeadlessDesktop::single_monitor(1920, 1080);
        let back = desktop.add_window(Rect::new(0, 0, 800, 600));
        let front = desktop.add_window(Rect::new(100, 100, 800, 600));

        assert_eq!(desktop.window_at(Point::new(150, 150)), Some(front));
        assert_eq!(desktop.window_at(Point::new(50, 50)), Some(back));

        desktop.set_visible(front, false).unwrap();
        assert_eq!(desktop.window_at(Point::new(150, 150)), Some(back));
    }

    #[test]
    fn test_root_ancestor_walks_parents() {
        let desktop = HeadlessDesktop::single_monitor(1920, 1080);
        let top = desktop.add_window(Rect::new(0, 0, 800, 600));
        let child = desktop.add_child_window(top, Rect::new(0, 0, 800, 40)).unwrap();

        assert_eq!(desktop.window_at(Point::new(10, 10)), Some(child));
        assert_eq!(desktop.root_ancestor(child), top);
        assert_eq!(desktop.root_ancestor(top), top);
    }

    #[test]
    fn test_closed_window_is_stale() {
        let desktop = HeadlessDesktop::single_monitor(1920, 1080);
        let handle = desktop.add_window(Rect::new(0, 0, 800, 600));
        desktop.close_window(handle);

        assert!(!desktop.is_window(handle));
        assert_eq!(desktop.window_rect(handle), Err(NativeError::StaleHandle(handle)));
        assert_eq!(desktop.foreground_window(), None);
    }

    #[test]
    fn test_failing_desktop_rejects_moves() {
        let desktop = HeadlessDesktop::single_monitor(1920, 1080);
        let handle = desktop.add_window(Rect::new(0, 0, 800, 600));
        desktop.set_failing(true);

        let result = desktop.set_window_rect(handle, Rect::new(0, 0, 100, 100));
        assert!(matches!(result, Err(NativeError::CallFailed { .. })));
        assert_eq!(desktop.rect_of(handle), Some(Rect::new(0, 0, 800, 600)));
    }

    #[test]
    fn test_user_moves_are_not_recorded() {
        let desktop = HeadlessDesktop::single_monitor(1920, 1080);
        let handle = desktop.add_window(Rect::new(0, 0, 800, 600));
        desktop.move_window(handle, Rect::new(10, 10, 800, 600)).unwrap();
        desktop.set_window_rect(handle, Rect::new(0, 0, 960, 1080)).unwrap();

        assert_eq!(desktop.moves(), vec![(handle, Rect::new(0, 0, 960, 1080))]);
    }

    #[test]
    fn test_attached_overlay_is_hit_only_while_visible() {
        let desktop = Arc::new(HeadlessDesktop::single_monitor(1920, 1080));
        let app = desktop.add_window(Rect::new(0, 0, 800, 600));
        let overlay = RecordingOverlay::attached(&desktop, Rect::new(0, 0, 1920, 1080));
        let surface = overlay.windows()[0];

        assert_eq!(desktop.window_at(Point::new(10, 10)), Some(app));

        overlay.show();
        assert_eq!(desktop.window_at(Point::new(10, 10)), Some(surface));

        overlay.suspend();
        assert_eq!(desktop.window_at(Point::new(10, 10)), Some(app));

        overlay.resume();
        assert_eq!(desktop.window_at(Point::new(10, 10)), Some(surface));
        assert!(overlay.is_visible());
    }
}
