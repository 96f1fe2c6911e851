//! Overlay control.
//!
//! [`OverlayController`] sits between the engine and the [`OverlaySink`]: it
//! builds the frames the sink draws, remembers what is visible and which zone
//! is highlighted, and only forwards commands that change something.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

use crate::config::OverlayConfig;
use crate::platform::{Monitor, OverlaySink, Rect, WindowHandle};
use crate::zones::{ZoneSnapshot, ZoneTarget};

/// One zone as drawn on the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayZone {
    pub monitor_id: u32,
    pub name: String,
    pub rect: Rect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u8>,
}

/// Everything the overlay needs to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayFrame {
    pub monitors: Vec<Monitor>,
    pub zones: Vec<OverlayZone>,
    pub color: String,
    pub opacity: f64,
    pub alpha: u8,
}

impl OverlayFrame {
    /// Builds a frame from the current zones.
    #[must_use]
    pub fn from_snapshot(snapshot: &ZoneSnapshot, style: &OverlayConfig) -> Self {
        let zones = snapshot
            .all_zones()
            .map(|zone| OverlayZone {
                monitor_id: zone.monitor,
                name: zone.name.clone(),
                rect: zone.rect,
                label: snapshot.numbering.label(zone.monitor, &zone.name).map(str::to_string),
                number: snapshot.numbering.number(zone.monitor, &zone.name),
            })
            .collect();

        Self {
            monitors: snapshot.monitors.clone(),
            zones,
            color: style.color.clone(),
            opacity: style.opacity,
            alpha: style.alpha,
        }
    }
}

#[derive(Debug, Default)]
struct OverlayState {
    visible: bool,
    highlight: Option<ZoneTarget>,
    hide_at: Option<Instant>,
}

/// Shared, change-only front end of the overlay sink.
pub struct OverlayController {
    sink: Arc<dyn OverlaySink>,
    style: Mutex<OverlayConfig>,
    state: Mutex<OverlayState>,
}

impl std::fmt::Debug for OverlayController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayController").field("state", &*self.state.lock()).finish_non_exhaustive()
    }
}

impl OverlayController {
    #[must_use]
    pub fn new(sink: Arc<dyn OverlaySink>, style: OverlayConfig) -> Self {
        Self {
            sink,
            style: Mutex::new(style),
            state: Mutex::new(OverlayState::default()),
        }
    }

    /// Replaces the overlay style. Takes effect on the next redraw.
    pub fn set_style(&self, style: OverlayConfig) { *self.style.lock() = style; }

    #[must_use]
    pub fn frame(&self, snapshot: &ZoneSnapshot) -> OverlayFrame {
        OverlayFrame::from_snapshot(snapshot, &self.style.lock())
    }

    #[must_use]
    pub fn is_visible(&self) -> bool { self.state.lock().visible }

    #[must_use]
    pub fn highlight(&self) -> Option<ZoneTarget> { self.state.lock().highlight.clone() }

    /// Draws the current zones and shows the overlay. Clears any highlight
    /// and any pending auto-hide.
    pub fn show(&self, snapshot: &ZoneSnapshot) { self.show_with_deadline(snapshot, None); }

    /// Shows the overlay and hides it again after `duration`.
    pub fn show_for(&self, snapshot: &ZoneSnapshot, duration: Option<Duration>) {
        self.show_with_deadline(snapshot, duration.map(|d| Instant::now() + d));
    }

    fn show_with_deadline(&self, snapshot: &ZoneSnapshot, hide_at: Option<Instant>) {
        let frame = self.frame(snapshot);
        let had_highlight = {
            let mut state = self.state.lock();
            state.visible = true;
            state.hide_at = hide_at;
            state.highlight.take().is_some()
        };

        if had_highlight {
            self.sink.set_highlight(None);
        }
        self.sink.redraw(&frame);
        self.sink.show();
        tracing::debug!(zones = frame.zones.len(), "overlay shown");
    }

    /// Hides the overlay and clears the highlight. No-op when hidden.
    pub fn hide(&self) {
        let was_visible = {
            let mut state = self.state.lock();
            let was_visible = state.visible;
            state.visible = false;
            state.hide_at = None;
            state.highlight = None;
            was_visible
        };

        if was_visible {
            self.sink.hide();
            self.sink.set_highlight(None);
            tracing::debug!("overlay hidden");
        }
    }

    /// Shows the overlay if hidden, hides it otherwise. Returns the new
    /// visibility.
    pub fn toggle(&self, snapshot: &ZoneSnapshot) -> bool {
        if self.is_visible() {
            self.hide();
            false
        } else {
            let auto_hide = self.style.lock().auto_hide();
            self.show_for(snapshot, auto_hide);
            true
        }
    }

    /// Hides the overlay if its auto-hide deadline has passed.
    pub fn expire(&self, now: Instant) -> bool {
        let expired = self.state.lock().hide_at.is_some_and(|deadline| now >= deadline);
        if expired {
            self.hide();
        }
        expired
    }

    /// Highlights a zone, or clears the highlight. Only changes reach the sink.
    pub fn set_highlight(&self, target: Option<&ZoneTarget>) -> bool {
        {
            let mut state = self.state.lock();
            if state.highlight.as_ref() == target {
                return false;
            }
            state.highlight = target.cloned();
        }
        self.sink.set_highlight(target);
        true
    }

    /// Redraws the overlay with new zones if it is visible.
    pub fn refresh(&self, snapshot: &ZoneSnapshot) {
        if !self.is_visible() {
            return;
        }
        self.set_highlight(None);
        self.sink.redraw(&self.frame(snapshot));
    }

    /// Windows owned by the overlay.
    #[must_use]
    pub fn windows(&self) -> Vec<WindowHandle> { self.sink.windows() }

    /// Runs `f` with the overlay windows momentarily hidden.
    pub fn suspended<T>(&self, f: impl FnOnce() -> T) -> T {
        self.sink.suspend();
        let result = f();
        self.sink.resume();
        result
    }
}
