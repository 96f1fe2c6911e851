//! Monitor ordering and lookup helpers.

use super::types::{Monitor, Point, Rect};

/// Sorts monitors by their top-left corner and reassigns IDs `0..N`.
///
/// Sorting is by `x` first, then `y`, so IDs stay stable for a given
/// arrangement regardless of the order the environment enumerates displays in.
#[must_use]
pub fn normalize(mut monitors: Vec<Monitor>) -> Vec<Monitor> {
    monitors.sort_by_key(|m| (m.bounds.x, m.bounds.y));

    for (index, monitor) in monitors.iter_mut().enumerate() {
        monitor.id = u32::try_from(index).unwrap_or(u32::MAX);
    }

    monitors
}

/// Returns the monitor whose full bounds contain the point.
#[must_use]
pub fn monitor_at(monitors: &[Monitor], point: Point) -> Option<&Monitor> {
    monitors.iter().find(|m| m.bounds.contains_point(point))
}

/// Returns the monitor containing the center of a window rectangle.
#[must_use]
pub fn monitor_for_rect<'a>(monitors: &'a [Monitor], rect: &Rect) -> Option<&'a Monitor> {
    monitor_at(monitors, rect.center())
}

/// Returns the monitor flagged as primary.
#[must_use]
pub fn primary(monitors: &[Monitor]) -> Option<&Monitor> { monitors.iter().find(|m| m.is_primary) }

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(x: i32, y: i32, primary: bool) -> Monitor {
        let bounds = Rect::new(x, y, 1920, 1080);
        Monitor::new(99, bounds, Rect::new(x, y, 1920, 1040), primary)
    }

    #[test]
    fn test_normalize_sorts_by_position_and_reassigns_ids() {
        let monitors =
            normalize(vec![monitor(1920, 0, false), monitor(-1920, 0, false), monitor(0, 0, true)]);

        let xs: Vec<i32> = monitors.iter().map(|m| m.bounds.x).collect();
        let ids: Vec<u32> = monitors.iter().map(|m| m.id).collect();
        assert_eq!(xs, vec![-1920, 0, 1920]);
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_normalize_breaks_ties_on_y() {
        let monitors = normalize(vec![monitor(0, 1080, false), monitor(0, 0, true)]);
        assert_eq!(monitors[0].bounds.y, 0);
        assert_eq!(monitors[1].bounds.y, 1080);
    }

    #[test]
    fn test_monitor_at_point() {
        let monitors = normalize(vec![monitor(0, 0, true), monitor(1920, 0, false)]);
        assert_eq!(monitor_at(&monitors, Point::new(100, 100)).map(|m| m.id), Some(0));
        assert_eq!(monitor_at(&monitors, Point::new(1920, 100)).map(|m| m.id), Some(1));
        assert!(monitor_at(&monitors, Point::new(5000, 100)).is_none());
    }

    #[test]
    fn test_monitor_for_rect_uses_center() {
        let monitors = normalize(vec![monitor(0, 0, true), monitor(1920, 0, false)]);
        // Mostly on the second monitor.
        let rect = Rect::new(1800, 0, 800, 600);
        assert_eq!(monitor_for_rect(&monitors, &rect).map(|m| m.id), Some(1));
    }

    #[test]
    fn test_primary_lookup() {
        let monitors = normalize(vec![monitor(0, 0, false), monitor(1920, 0, true)]);
        assert_eq!(primary(&monitors).map(|m| m.id), Some(1));
        assert!(primary(&[]).is_none());
    }
}
