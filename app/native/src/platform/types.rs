//! Geometry and identity types shared by every layer of the engine.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A point in absolute screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }
}

/// An axis-aligned rectangle in absolute screen pixels.
///
/// The rectangle covers `x..x + width` horizontally and `y..y + height`
/// vertically (right and bottom edges are exclusive).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the exclusive right edge.
    #[must_use]
    pub const fn right(&self) -> i32 { self.x + self.width }

    /// Returns the exclusive bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 { self.y + self.height }

    /// Returns true if the rectangle has a positive area.
    #[must_use]
    pub const fn is_valid(&self) -> bool { self.width > 0 && self.height > 0 }

    /// Returns true if the point lies inside the rectangle.
    #[must_use]
    pub const fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Returns true if `other` lies entirely inside this rectangle.
    #[must_use]
    pub const fn contains_rect(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns the center point (rounded towards the origin).
    #[must_use]
    pub const fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Returns true if both rectangles have the same width and height.
    #[must_use]
    pub const fn same_size(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Returns a copy of this rectangle with another size, keeping the position.
    #[must_use]
    pub const fn with_size(&self, width: i32, height: i32) -> Self {
        Self::new(self.x, self.y, width, height)
    }

    /// Shrinks every edge by `margin` pixels.
    ///
    /// A margin larger than half of a dimension collapses that dimension to zero.
    #[must_use]
    pub fn inset(&self, margin: i32) -> Self {
        Self::new(
            self.x + margin,
            self.y + margin,
            (self.width - margin * 2).max(0),
            (self.height - margin * 2).max(0),
        )
    }

    /// Returns true if any edge or dimension differs from `other` by more than
    /// `threshold` pixels.
    #[must_use]
    pub const fn differs_by_more_than(&self, other: &Self, threshold: i32) -> bool {
        (self.x - other.x).abs() > threshold
            || (self.y - other.y).abs() > threshold
            || (self.width - other.width).abs() > threshold
            || (self.height - other.height).abs() > threshold
    }

    /// Returns true if every edge lies within `tolerance` pixels of `other`.
    #[must_use]
    pub const fn approx_eq(&self, other: &Self, tolerance: i32) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.right() - other.right()).abs() <= tolerance
            && (self.bottom() - other.bottom()).abs() <= tolerance
    }

    /// Moves the rectangle back inside `area`.
    ///
    /// Each axis is translated independently so that the rectangle no longer
    /// extends past the area's edges. The size never changes: a rectangle
    /// larger than the area on some axis is aligned to the area's origin on
    /// that axis.
    #[must_use]
    pub fn clamp_within(&self, area: &Self) -> Self {
        let (x, width) = clamp_axis(self.x, self.width, area.x, area.width);
        let (y, height) = clamp_axis(self.y, self.height, area.y, area.height);
        Self::new(x, y, width, height)
    }
}

fn clamp_axis(start: i32, len: i32, area_start: i32, area_len: i32) -> (i32, i32) {
    if len >= area_len {
        return (area_start, len);
    }

    let start = start.max(area_start).min(area_start + area_len - len);
    (start, len)
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}

/// Opaque identifier of a native top-level window.
///
/// Handles are only compared and passed back to the window system. They may be
/// reused by the environment after the window is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:#x}", self.0) }
}

/// A detected display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct Monitor {
    /// Position in the `(x, y)`-sorted detection order.
    #[serde(default)]
    pub id: u32,
    /// Full monitor rectangle.
    pub bounds: Rect,
    /// Monitor rectangle minus reserved shell regions such as a taskbar.
    pub work_area: Rect,
    #[serde(default)]
    pub is_primary: bool,
}

impl Monitor {
    #[must_use]
    pub const fn new(id: u32, bounds: Rect, work_area: Rect, is_primary: bool) -> Self {
        Self { id, bounds, work_area, is_primary }
    }

    /// Returns the rectangle zones are resolved against.
    #[must_use]
    pub const fn base_rect(&self, respect_taskbar: bool) -> Rect {
        if respect_taskbar { self.work_area } else { self.bounds }
    }
}

/// A virtual key code as reported by the input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VirtualKey(pub u16);

impl VirtualKey {
    pub const LBUTTON: Self = Self(0x01);
    pub const RBUTTON: Self = Self(0x02);
    pub const MBUTTON: Self = Self(0x04);
    pub const SHIFT: Self = Self(0x10);
    pub const CONTROL: Self = Self(0x11);
    pub const MENU: Self = Self(0x12);
    pub const LWIN: Self = Self(0x5B);
    pub const RWIN: Self = Self(0x5C);
    pub const LSHIFT: Self = Self(0xA0);
    pub const RSHIFT: Self = Self(0xA1);
    pub const LCONTROL: Self = Self(0xA2);
    pub const RCONTROL: Self = Self(0xA3);
    pub const LMENU: Self = Self(0xA4);
    pub const RMENU: Self = Self(0xA5);

    /// Top-row digit key (`0`..=`9`).
    #[must_use]
    pub const fn digit(n: u8) -> Self { Self(0x30 + n as u16) }

    /// Numeric keypad digit key (`0`..=`9`).
    #[must_use]
    pub const fn numpad(n: u8) -> Self { Self(0x60 + n as u16) }

    /// Returns the digit for top-row or numpad digit keys.
    #[must_use]
    pub fn as_digit(self) -> Option<u8> {
        let offset = match self.0 {
            0x30..=0x39 => self.0 - 0x30,
            0x60..=0x69 => self.0 - 0x60,
            _ => return None,
        };
        u8::try_from(offset).ok()
    }
}

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "VK({:#04x})", self.0) }
}

/// State of a key or button at query time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    /// The key is currently held.
    pub down: bool,
    /// The key was pressed at some point since the previous query.
    pub pressed_since_last_query: bool,
}

impl KeyState {
    /// Edge-or-held: true if the key is held or was tapped since the last query.
    #[must_use]
    pub const fn is_active(self) -> bool { self.down || self.pressed_since_last_query }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10, 20, 100, 50);
        assert_eq!(rect.right(), 110);
        assert_eq!(rect.bottom(), 70);
        assert_eq!(rect.center(), Point::new(60, 45));
    }

    #[test]
    fn test_rect_contains_point_is_half_open() {
        let rect = Rect::new(0, 0, 100, 100);
        assert!(rect.contains_point(Point::new(0, 0)));
        assert!(rect.contains_point(Point::new(99, 99)));
        assert!(!rect.contains_point(Point::new(100, 50)));
        assert!(!rect.contains_point(Point::new(50, 100)));
    }

    #[test]
    fn test_rect_inset_collapses_to_zero() {
        let rect = Rect::new(0, 0, 10, 100);
        let inset = rect.inset(6);
        assert_eq!(inset, Rect::new(6, 6, 0, 88));
    }

    #[test]
    fn test_differs_by_more_than_is_strict() {
        let a = Rect::new(0, 0, 960, 1080);
        assert!(!a.differs_by_more_than(&Rect::new(10, 0, 960, 1080), 10));
        assert!(a.differs_by_more_than(&Rect::new(11, 0, 960, 1080), 10));
        assert!(a.differs_by_more_than(&Rect::new(0, 0, 940, 1080), 10));
    }

    #[test]
    fn test_clamp_translates_back_inside() {
        let area = Rect::new(0, 0, 1920, 1040);
        let clamped = Rect::new(1800, 1000, 400, 300).clamp_within(&area);
        assert_eq!(clamped, Rect::new(1520, 740, 400, 300));

        let clamped = Rect::new(-50, -20, 400, 300).clamp_within(&area);
        assert_eq!(clamped, Rect::new(0, 0, 400, 300));
    }

    #[test]
    fn test_clamp_leaves_fitting_rect_untouched() {
        let area = Rect::new(1920, 0, 1920, 1080);
        let rect = Rect::new(1920, 0, 960, 1080);
        assert_eq!(rect.clamp_within(&area), rect);
    }

    #[test]
    fn test_clamp_never_resizes_oversized_axis() {
        let area = Rect::new(0, 0, 1920, 1040);
        let clamped = Rect::new(0, 40, 1920, 1080).clamp_within(&area);
        assert_eq!(clamped, Rect::new(0, 0, 1920, 1080));

        let clamped = Rect::new(300, 500, 2400, 300).clamp_within(&area);
        assert_eq!(clamped, Rect::new(0, 500, 2400, 300));
    }

    #[test]
    fn test_approx_eq_uses_edges() {
        let a = Rect::new(0, 0, 960, 1080);
        assert!(a.approx_eq(&Rect::new(5, 3, 958, 1080), 10));
        assert!(!a.approx_eq(&Rect::new(0, 0, 980, 1080), 10));
    }

    #[test]
    fn test_window_handle_display_is_hex() {
        assert_eq!(WindowHandle(0x1a2b).to_string(), "0x1a2b");
    }

    #[test]
    fn test_monitor_base_rect() {
        let monitor = Monitor::new(
            0,
            Rect::new(0, 0, 1920, 1080),
            Rect::new(0, 0, 1920, 1040),
            true,
        );
        assert_eq!(monitor.base_rect(true).height, 1040);
        assert_eq!(monitor.base_rect(false).height, 1080);
    }

    #[test]
    fn test_virtual_key_digits() {
        assert_eq!(VirtualKey::digit(1), VirtualKey(0x31));
        assert_eq!(VirtualKey::numpad(9), VirtualKey(0x69));
        assert_eq!(VirtualKey(0x35).as_digit(), Some(5));
        assert_eq!(VirtualKey(0x63).as_digit(), Some(3));
        assert_eq!(VirtualKey(0x41).as_digit(), None);
    }

    #[test]
    fn test_key_state_edge_or_held() {
        assert!(!KeyState::default().is_active());
        assert!(KeyState { down: true, pressed_since_last_query: false }.is_active());
        assert!(KeyState { down: false, pressed_since_last_query: true }.is_active());
    }
}
