//! Input state queries.
//!
//! A polling façade over the [`InputDevice`]: modifiers and mouse buttons are
//! checked as "currently held", ordinary keys as edge-or-held so that a tap
//! shorter than one poll period is not lost.
//!
//! Reading a key consumes its edge latch, so callers should query each key at
//! most once per poll tick.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::platform::keys::{key_label, parse_key};
use crate::platform::{InputDevice, VirtualKey};

/// Logical modifier keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Shift,
    Ctrl,
    Alt,
    Win,
}

impl Modifier {
    /// Parses a modifier name. Accepts the common aliases.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "shift" => Some(Self::Shift),
            "ctrl" | "control" => Some(Self::Ctrl),
            "alt" | "menu" | "option" => Some(Self::Alt),
            "win" | "super" | "cmd" | "meta" => Some(Self::Win),
            _ => None,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Shift => "shift",
            Self::Ctrl => "ctrl",
            Self::Alt => "alt",
            Self::Win => "win",
        }
    }

    /// Virtual keys that count as this modifier being held.
    #[must_use]
    pub const fn keys(self) -> &'static [VirtualKey] {
        match self {
            Self::Shift => &[VirtualKey::SHIFT],
            Self::Ctrl => &[VirtualKey::CONTROL],
            Self::Alt => &[VirtualKey::MENU],
            Self::Win => &[VirtualKey::LWIN, VirtualKey::RWIN],
        }
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

impl MouseButton {
    #[must_use]
    pub const fn key(self) -> VirtualKey {
        match self {
            Self::Primary => VirtualKey::LBUTTON,
            Self::Secondary => VirtualKey::RBUTTON,
            Self::Middle => VirtualKey::MBUTTON,
        }
    }
}

/// A key that can be held: either a modifier or an ordinary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeldKey {
    Modifier(Modifier),
    Key(VirtualKey),
}

impl HeldKey {
    /// Parses a modifier or key name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Modifier::from_name(name).map(Self::Modifier).or_else(|| parse_key(name).map(Self::Key))
    }
}

/// Monitor-selection keys compiled from the `monitor_keys` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorKeys {
    bindings: Vec<(u32, HeldKey)>,
    reserved_digits: BTreeSet<u8>,
}

impl MonitorKeys {
    /// Compiles `monitor id -> key name` bindings. Unknown key names are
    /// logged and skipped.
    #[must_use]
    pub fn compile(table: &BTreeMap<u32, String>) -> Self {
        let mut keys = Self::default();

        for (&monitor, name) in table {
            let Some(key) = HeldKey::parse(name) else {
                tracing::warn!(monitor, key = %name, "unknown monitor key, ignoring");
                continue;
            };

            if let HeldKey::Key(vk) = key
                && let Some(digit) = vk.as_digit()
            {
                keys.reserved_digits.insert(digit);
            }
            keys.bindings.push((monitor, key));
        }

        keys
    }

    /// Digits bound to monitor selection, never read as zone numbers.
    #[must_use]
    pub const fn reserved_digits(&self) -> &BTreeSet<u8> { &self.reserved_digits }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.bindings.is_empty() }
}

/// A zone key found active during a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveZoneKey {
    pub key: VirtualKey,
    /// Overlay label for the key.
    pub label: String,
}

/// Polling façade answering "what is pressed right now".
pub struct InputState {
    device: Arc<dyn InputDevice>,
    monitor_keys: MonitorKeys,
}

impl std::fmt::Debug for InputState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputState").field("monitor_keys", &self.monitor_keys).finish_non_exhaustive()
    }
}

impl InputState {
    #[must_use]
    pub fn new(device: Arc<dyn InputDevice>, monitor_keys: MonitorKeys) -> Self {
        Self { device, monitor_keys }
    }

    /// Replaces the monitor-selection keys after a reload.
    pub fn set_monitor_keys(&mut self, monitor_keys: MonitorKeys) { self.monitor_keys = monitor_keys; }

    #[must_use]
    pub const fn monitor_keys(&self) -> &MonitorKeys { &self.monitor_keys }

    /// Returns true while any key of the modifier is held.
    #[must_use]
    pub fn is_modifier_down(&self, modifier: Modifier) -> bool {
        modifier.keys().iter().any(|&key| self.device.key_state(key).down)
    }

    /// Returns true while the button is held.
    #[must_use]
    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.device.key_state(button.key()).down
    }

    /// Edge-or-held check for an ordinary key.
    #[must_use]
    pub fn is_key_active(&self, key: VirtualKey) -> bool { self.device.key_state(key).is_active() }

    /// Returns true while `key` is held. Modifiers are checked as held,
    /// ordinary keys as edge-or-held.
    #[must_use]
    pub fn is_held(&self, key: HeldKey) -> bool {
        match key {
            HeldKey::Modifier(modifier) => self.is_modifier_down(modifier),
            HeldKey::Key(vk) => self.is_key_active(vk),
        }
    }

    /// Returns the monitor whose selection key is active, lowest id first.
    #[must_use]
    pub fn pressed_monitor_key(&self) -> Option<u32> {
        self.monitor_keys
            .bindings
            .iter()
            .find(|(_, key)| self.is_held(*key))
            .map(|(monitor, _)| *monitor)
    }

    /// Returns the active keys among the configured zone key names.
    ///
    /// Each distinct key is queried once, so two zones sharing a key see the
    /// same answer. Unknown key names are never active.
    pub fn active_zone_keys<'a, I>(&self, names: I) -> Vec<ActiveZoneKey>
    where I: IntoIterator<Item = &'a str> {
        let mut seen = BTreeSet::new();
        let mut active = Vec::new();

        for name in names {
            let Some(key) = parse_key(name) else {
                continue;
            };
            if seen.insert(key) && self.is_key_active(key) {
                active.push(ActiveZoneKey { key, label: key_label(name) });
            }
        }

        active
    }

    /// Returns the digit 1-9 that is pressed, top row first, then numpad.
    ///
    /// Digits reserved as monitor-selection keys are skipped on both rows.
    #[must_use]
    pub fn pressed_number(&self) -> Option<u8> {
        let reserved = &self.monitor_keys.reserved_digits;
        let candidates = (1..=9).filter(|n| !reserved.contains(n));

        candidates
            .clone()
            .find(|&n| self.is_key_active(VirtualKey::digit(n)))
            .or_else(|| candidates.into_iter().find(|&n| self.is_key_active(VirtualKey::numpad(n))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::HeadlessDesktop;

    fn default_monitor_keys() -> BTreeMap<u32, String> {
        BTreeMap::from([(0, "`".to_string()), (1, "1".to_string()), (2, "2".to_string())])
    }

    fn input(desktop: &Arc<HeadlessDesktop>) -> InputState {
        let device: Arc<dyn InputDevice> = desktop.clone();
        InputState::new(device, MonitorKeys::compile(&default_monitor_keys()))
    }

    #[test]
    fn test_modifier_names() {
        assert_eq!(Modifier::from_name("Shift"), Some(Modifier::Shift));
        assert_eq!(Modifier::from_name("control"), Some(Modifier::Ctrl));
        assert_eq!(Modifier::from_name("super"), Some(Modifier::Win));
        assert_eq!(Modifier::from_name("q"), None);
    }

    #[test]
    fn test_modifier_is_held_only() {
        let desktop = Arc::new(HeadlessDesktop::single_monitor(1920, 1080));
        let input = input(&desktop);

        desktop.tap_key(VirtualKey::SHIFT);
        assert!(!input.is_modifier_down(Modifier::Shift));

        desktop.press_key(VirtualKey::SHIFT);
        assert!(input.is_modifier_down(Modifier::Shift));

        desktop.press_key(VirtualKey::RWIN);
        assert!(input.is_modifier_down(Modifier::Win));
    }

    #[test]
    fn test_tap_is_seen_once() {
        let desktop = Arc::new(HeadlessDesktop::single_monitor(1920, 1080));
        let input = input(&desktop);
        let q = parse_key("q").unwrap();

        desktop.tap_key(q);
        assert!(input.is_key_active(q));
        assert!(!input.is_key_active(q));
    }

    #[test]
    fn test_pressed_monitor_key() {
        let desktop = Arc::new(HeadlessDesktop::single_monitor(1920, 1080));
        let input = input(&desktop);
        assert_eq!(input.pressed_monitor_key(), None);

        desktop.press_key(VirtualKey::digit(2));
        assert_eq!(input.pressed_monitor_key(), Some(2));

        desktop.release_key(VirtualKey::digit(2));
        desktop.press_key(parse_key("`").unwrap());
        assert_eq!(input.pressed_monitor_key(), Some(0));
    }

    #[test]
    fn test_modifier_as_monitor_key() {
        let desktop = Arc::new(HeadlessDesktop::single_monitor(1920, 1080));
        let device: Arc<dyn InputDevice> = desktop.clone();
        let table = BTreeMap::from([(1, "alt".to_string())]);
        let input = InputState::new(device, MonitorKeys::compile(&table));

        desktop.press_key(VirtualKey::MENU);
        assert_eq!(input.pressed_monitor_key(), Some(1));
    }

    #[test]
    fn test_pressed_number_skips_monitor_digits() {
        let desktop = Arc::new(HeadlessDesktop::single_monitor(1920, 1080));
        let input = input(&desktop);

        desktop.press_key(VirtualKey::digit(1));
        desktop.press_key(VirtualKey::numpad(2));
        assert_eq!(input.pressed_number(), None);

        desktop.press_key(VirtualKey::numpad(3));
        assert_eq!(input.pressed_number(), Some(3));

        desktop.press_key(VirtualKey::digit(4));
        assert_eq!(input.pressed_number(), Some(4));
    }

    #[test]
    fn test_active_zone_keys_query_each_key_once() {
        let desktop = Arc::new(HeadlessDesktop::single_monitor(1920, 1080));
        let input = input(&desktop);

        desktop.tap_key(VirtualKey::numpad(5));
        let active = input.active_zone_keys(["q", "num5", "NUM5", "nonsense"]);
        assert_eq!(active, vec![ActiveZoneKey {
            key: VirtualKey::numpad(5),
            label: "Num5".to_string(),
        }]);

        assert!(input.active_zone_keys(["q", "num5"]).is_empty());
    }

    #[test]
    fn test_unknown_monitor_key_is_skipped() {
        let table = BTreeMap::from([(0, "hyper".to_string()), (1, "1".to_string())]);
        let keys = MonitorKeys::compile(&table);
        assert_eq!(keys.reserved_digits().iter().copied().collect::<Vec<_>>(), vec![1]);
        assert!(!keys.is_empty());
    }
}
