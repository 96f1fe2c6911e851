//! Native capability surface.
//!
//! The engine never talks to the operating system directly. Everything it
//! needs from the environment (window geometry, key state, the window under
//! the cursor, the overlay renderer) goes through the traits in this module,
//! bundled together in a [`Platform`].
//!
//! A fully in-memory implementation lives in [`headless`]; it backs the test
//! suites and dry runs.

pub mod headless;
pub mod keys;
pub mod monitors;
mod types;

use std::sync::Arc;

use thiserror::Error;
pub use types::{KeyState, Monitor, Point, Rect, VirtualKey, WindowHandle};

use crate::snap::overlay::OverlayFrame;
use crate::zones::ZoneTarget;

/// Failure of a native window-manipulation primitive.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NativeError {
    /// The window no longer exists.
    #[error("window {0} no longer exists")]
    StaleHandle(WindowHandle),

    /// Any other failure reported by the environment.
    #[error("native call `{call}` failed: {message}")]
    CallFailed {
        call: &'static str,
        message: String,
    },
}

impl NativeError {
    /// Returns the handle if the failure was caused by a destroyed window.
    #[must_use]
    pub const fn stale_handle(&self) -> Option<WindowHandle> {
        match self {
            Self::StaleHandle(handle) => Some(*handle),
            Self::CallFailed { .. } => None,
        }
    }
}

/// Result type for native calls.
pub type NativeResult<T> = Result<T, NativeError>;

/// Window properties used to decide whether a window may be dragged into a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowTraits {
    pub class_name: String,
    pub title: String,
    pub visible: bool,
    pub has_caption: bool,
    pub has_system_menu: bool,
    pub is_tool_window: bool,
    /// The desktop (root) window itself.
    pub is_desktop: bool,
}

/// Window management primitives.
pub trait WindowSystem: Send + Sync {
    /// Enumerates monitors in whatever order the environment reports them.
    ///
    /// # Errors
    ///
    /// Returns an error if enumeration fails.
    fn monitors(&self) -> NativeResult<Vec<Monitor>>;

    /// Returns the window that currently has keyboard focus.
    fn foreground_window(&self) -> Option<WindowHandle>;

    /// Returns the outer rectangle of a window.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError::StaleHandle`] if the window is gone.
    fn window_rect(&self, handle: WindowHandle) -> NativeResult<Rect>;

    /// Moves and resizes a window.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError::StaleHandle`] if the window is gone.
    fn set_window_rect(&self, handle: WindowHandle, rect: Rect) -> NativeResult<()>;

    /// Returns true if the window is maximized.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError::StaleHandle`] if the window is gone.
    fn is_maximized(&self, handle: WindowHandle) -> NativeResult<bool>;

    /// Leaves the maximized state.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError::StaleHandle`] if the window is gone.
    fn restore_from_maximized(&self, handle: WindowHandle) -> NativeResult<()>;

    /// Returns true if the handle still refers to a live window.
    fn is_window(&self, handle: WindowHandle) -> bool;

    /// Returns the window under a screen point.
    fn window_at(&self, point: Point) -> Option<WindowHandle>;

    /// Returns the top-level ancestor of a window (the window itself if it has none).
    fn root_ancestor(&self, handle: WindowHandle) -> WindowHandle;

    /// Returns the properties of a window.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError::StaleHandle`] if the window is gone.
    fn window_traits(&self, handle: WindowHandle) -> NativeResult<WindowTraits>;

    /// Returns true if the window holds the pointer capture (it is being moved).
    fn has_pointer_capture(&self, handle: WindowHandle) -> bool;

    /// Ends an in-progress native move by releasing the pointer capture.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment rejects the request.
    fn release_pointer_capture(&self) -> NativeResult<()>;

    /// Returns the cursor position.
    ///
    /// # Errors
    ///
    /// Returns an error if the position cannot be read.
    fn cursor_position(&self) -> NativeResult<Point>;
}

/// Physical key and button state.
pub trait InputDevice: Send + Sync {
    /// Returns the state of a key.
    ///
    /// Querying clears the "pressed since last query" latch for that key.
    fn key_state(&self, key: VirtualKey) -> KeyState;
}

/// Overlay renderer commands.
pub trait OverlaySink: Send + Sync {
    fn show(&self);

    fn hide(&self);

    /// Highlights one zone, or clears the highlight.
    fn set_highlight(&self, target: Option<&ZoneTarget>);

    /// Replaces everything drawn with a new frame.
    fn redraw(&self, frame: &OverlayFrame);

    /// Handles of the windows the overlay draws into.
    fn windows(&self) -> Vec<WindowHandle>;

    /// Temporarily hides the overlay windows so they are not hit by
    /// [`WindowSystem::window_at`].
    fn suspend(&self);

    /// Undoes [`OverlaySink::suspend`].
    fn resume(&self);
}

/// The injected capabilities, shared by every component.
#[derive(Clone)]
pub struct Platform {
    pub windows: Arc<dyn WindowSystem>,
    pub input: Arc<dyn InputDevice>,
    pub overlay: Arc<dyn OverlaySink>,
}

impl Platform {
    #[must_use]
    pub fn new(
        windows: Arc<dyn WindowSystem>,
        input: Arc<dyn InputDevice>,
        overlay: Arc<dyn OverlaySink>,
    ) -> Self {
        Self { windows, input, overlay }
    }

    /// Builds a platform backed by an in-memory desktop.
    #[must_use]
    pub fn headless(
        desktop: &Arc<headless::HeadlessDesktop>,
        overlay: &Arc<headless::RecordingOverlay>,
    ) -> Self {
        Self {
            windows: Arc::clone(desktop) as Arc<dyn WindowSystem>,
            input: Arc::clone(desktop) as Arc<dyn InputDevice>,
            overlay: Arc::clone(overlay) as Arc<dyn OverlaySink>,
        }
    }

    /// Detects monitors and normalizes their order and IDs.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot enumerate monitors.
    pub fn detect_monitors(&self) -> NativeResult<Vec<Monitor>> {
        let monitors = monitors::normalize(self.windows.monitors()?);
        tracing::debug!(count = monitors.len(), "detected monitors");
        Ok(monitors)
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_error_display() {
        let err = NativeError::StaleHandle(WindowHandle(0x10));
        assert_eq!(err.to_string(), "window 0x10 no longer exists");

        let err = NativeError::CallFailed {
            call: "SetWindowPos",
            message: "access denied".to_string(),
        };
        assert!(err.to_string().contains("SetWindowPos"));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_stale_handle_accessor() {
        assert_eq!(
            NativeError::StaleHandle(WindowHandle(7)).stale_handle(),
            Some(WindowHandle(7))
        );
        let err = NativeError::CallFailed { call: "x", message: String::new() };
        assert_eq!(err.stale_handle(), None);
    }
}
