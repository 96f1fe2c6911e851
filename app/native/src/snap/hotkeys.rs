//! Hotkey bindings and combo matching.
//!
//! Configured combos such as `"ctrl+alt+shift+]"` are parsed into [`Combo`]s
//! and bound to a [`HotkeyAction`]. The [`HotkeyDispatcher`] follows raw key
//! events and reports an action when the held keys match a combo exactly.
//!
//! Matching rules:
//! - a generic modifier (`ctrl`) matches either side, a sided one (`ctrl_l`)
//!   only that side;
//! - the held modifiers must be exactly the combo's modifiers, and the held
//!   ordinary keys exactly the combo's keys;
//! - a combo fires once per press; auto-repeat of a held key is ignored;
//! - releasing any modifier re-arms every combo, releasing an ordinary key
//!   re-arms the combos containing it.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::config::HotkeysConfig;
use crate::input::Modifier;
use crate::platform::VirtualKey;
use crate::platform::keys::parse_key;
use crate::zones::CycleDirection;

/// Side of a sided modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Left,
    Right,
}

/// A modifier a combo requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModifierSpec {
    pub modifier: Modifier,
    /// `None` accepts either side.
    pub side: Option<Side>,
}

impl ModifierSpec {
    fn parse(token: &str) -> Option<Self> {
        if token == "alt_gr" || token == "altgr" {
            return Some(Self { modifier: Modifier::Alt, side: Some(Side::Right) });
        }

        let (name, side) = if let Some(name) = token.strip_suffix("_l") {
            (name, Some(Side::Left))
        } else if let Some(name) = token.strip_suffix("_r") {
            (name, Some(Side::Right))
        } else {
            (token, None)
        };

        Modifier::from_name(name).map(|modifier| Self { modifier, side })
    }

    fn is_satisfied_by(self, held: &BTreeSet<(Modifier, Option<Side>)>) -> bool {
        held.iter().any(|&(modifier, side)| {
            modifier == self.modifier && (self.side.is_none() || side == self.side)
        })
    }
}

impl fmt::Display for ModifierSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.modifier.name())?;
        match self.side {
            Some(Side::Left) => f.write_str("_l"),
            Some(Side::Right) => f.write_str("_r"),
            None => Ok(()),
        }
    }
}

/// Error parsing a hotkey combo.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComboError {
    #[error("hotkey is empty")]
    Empty,

    #[error("unknown key '{0}'")]
    UnknownKey(String),

    #[error("hotkey '{0}' has no key besides modifiers")]
    ModifiersOnly(String),
}

/// A parsed key combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combo {
    modifiers: BTreeSet<ModifierSpec>,
    keys: BTreeSet<VirtualKey>,
    normalized: String,
}

impl Combo {
    /// Canonical text: lowercase, modifiers sorted by name, then keys sorted
    /// by name.
    #[must_use]
    pub fn normalized(&self) -> &str { &self.normalized }

    #[must_use]
    pub fn contains_key(&self, key: VirtualKey) -> bool { self.keys.contains(&key) }

    /// Returns true if both combos require the same keys, however spelled.
    #[must_use]
    pub fn same_keys(&self, other: &Self) -> bool {
        self.modifiers == other.modifiers && self.keys == other.keys
    }

    fn matches(&self, modifiers: &BTreeSet<(Modifier, Option<Side>)>, keys: &BTreeSet<VirtualKey>) -> bool {
        let required: BTreeSet<Modifier> = self.modifiers.iter().map(|m| m.modifier).collect();
        let held: BTreeSet<Modifier> = modifiers.iter().map(|(m, _)| *m).collect();

        required == held
            && self.modifiers.iter().all(|spec| spec.is_satisfied_by(modifiers))
            && &self.keys == keys
    }
}

impl FromStr for Combo {
    type Err = ComboError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.trim().is_empty() {
            return Err(ComboError::Empty);
        }

        let mut modifiers = BTreeSet::new();
        let mut keys = BTreeMap::new();

        for part in text.split('+') {
            let token = part.trim().to_ascii_lowercase();
            if token.is_empty() {
                return Err(ComboError::Empty);
            }

            if let Some(spec) = ModifierSpec::parse(&token) {
                modifiers.insert(spec);
            } else if let Some(key) = parse_key(&token) {
                keys.insert(token, key);
            } else {
                return Err(ComboError::UnknownKey(token));
            }
        }

        if keys.is_empty() {
            return Err(ComboError::ModifiersOnly(text.to_string()));
        }

        let mut names: Vec<String> = modifiers.iter().map(ToString::to_string).collect();
        names.sort();
        names.extend(keys.keys().cloned());

        Ok(Self {
            modifiers,
            keys: keys.into_values().collect(),
            normalized: names.join("+"),
        })
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.normalized) }
}

/// What a hotkey does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HotkeyAction {
    /// Move the foreground window into a zone.
    MoveToZone { monitor: u32, zone: String },
    ToggleOverlay,
    /// Restore the foreground window's pre-snap geometry.
    Restore,
    Reload,
    /// Next/previous zone on the window's monitor.
    Cycle {
        #[serde(serialize_with = "serialize_direction")]
        direction: CycleDirection,
    },
    /// Next/previous zone across all monitors.
    CycleAll {
        #[serde(serialize_with = "serialize_direction")]
        direction: CycleDirection,
    },
    SwitchLayout { layout: String },
}

fn serialize_direction<S: serde::Serializer>(direction: &CycleDirection, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(direction_name(*direction))
}

const fn direction_name(direction: CycleDirection) -> &'static str {
    match direction {
        CycleDirection::Next => "next",
        CycleDirection::Prev => "prev",
    }
}

impl fmt::Display for HotkeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MoveToZone { monitor, zone } => write!(f, "move to {zone} on monitor {monitor}"),
            Self::ToggleOverlay => f.write_str("toggle overlay"),
            Self::Restore => f.write_str("restore window"),
            Self::Reload => f.write_str("reload configuration"),
            Self::Cycle { direction } => write!(f, "cycle {} zone", direction_name(*direction)),
            Self::CycleAll { direction } => {
                write!(f, "cycle {} zone on all monitors", direction_name(*direction))
            }
            Self::SwitchLayout { layout } => write!(f, "switch to layout {layout}"),
        }
    }
}

/// A combo bound to an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub combo: Combo,
    pub action: HotkeyAction,
}

/// All hotkey bindings, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HotkeyMap {
    bindings: Vec<HotkeyBinding>,
}

impl HotkeyMap {
    /// Builds the bindings from the hotkey configuration.
    ///
    /// Blank combos are disabled. Invalid combos are logged and skipped. A
    /// combo bound twice keeps the later action.
    #[must_use]
    pub fn from_config(config: &HotkeysConfig) -> Self {
        let mut entries: Vec<(&str, HotkeyAction)> = vec![
            (config.overlay_hotkey.as_str(), HotkeyAction::ToggleOverlay),
            (config.restore_hotkey.as_str(), HotkeyAction::Restore),
            (config.reload_config_hotkey.as_str(), HotkeyAction::Reload),
            (config.cycle_next_hotkey.as_str(), HotkeyAction::Cycle { direction: CycleDirection::Next }),
            (config.cycle_prev_hotkey.as_str(), HotkeyAction::Cycle { direction: CycleDirection::Prev }),
            (config.cycle_all_next_hotkey.as_str(), HotkeyAction::CycleAll {
                direction: CycleDirection::Next,
            }),
            (config.cycle_all_prev_hotkey.as_str(), HotkeyAction::CycleAll {
                direction: CycleDirection::Prev,
            }),
        ];
        entries.extend(config.zone_hotkeys.iter().map(|hotkey| {
            (hotkey.keys.as_str(), HotkeyAction::MoveToZone {
                monitor: hotkey.monitor,
                zone: hotkey.zone.clone(),
            })
        }));
        entries.extend(config.layout_switches.iter().map(|switch| {
            (switch.keys.as_str(), HotkeyAction::SwitchLayout { layout: switch.layout.clone() })
        }));

        let mut map = Self::default();
        for (text, action) in entries {
            if text.trim().is_empty() {
                continue;
            }
            match text.parse::<Combo>() {
                Ok(combo) => map.bind(combo, action),
                Err(err) => tracing::warn!(hotkey = %text, error = %err, "invalid hotkey, skipping"),
            }
        }

        tracing::debug!(count = map.len(), "built hotkey bindings");
        map
    }

    /// Adds a binding, replacing any earlier binding of the same combo.
    pub fn bind(&mut self, combo: Combo, action: HotkeyAction) {
        if let Some(existing) = self.bindings.iter_mut().find(|b| b.combo.same_keys(&combo)) {
            tracing::warn!(
                hotkey = %combo,
                previous = %existing.action,
                action = %action,
                "hotkey bound twice, keeping the later binding"
            );
            existing.action = action;
        } else {
            self.bindings.push(HotkeyBinding { combo, action });
        }
    }

    #[must_use]
    pub fn bindings(&self) -> &[HotkeyBinding] { &self.bindings }

    #[must_use]
    pub fn len(&self) -> usize { self.bindings.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.bindings.is_empty() }
}

/// Maps a virtual key to the modifier it represents, if any.
#[must_use]
pub const fn modifier_of(key: VirtualKey) -> Option<(Modifier, Option<Side>)> {
    let found = match key.0 {
        0x10 => (Modifier::Shift, None),
        0xA0 => (Modifier::Shift, Some(Side::Left)),
        0xA1 => (Modifier::Shift, Some(Side::Right)),
        0x11 => (Modifier::Ctrl, None),
        0xA2 => (Modifier::Ctrl, Some(Side::Left)),
        0xA3 => (Modifier::Ctrl, Some(Side::Right)),
        0x12 => (Modifier::Alt, None),
        0xA4 => (Modifier::Alt, Some(Side::Left)),
        0xA5 => (Modifier::Alt, Some(Side::Right)),
        0x5B => (Modifier::Win, Some(Side::Left)),
        0x5C => (Modifier::Win, Some(Side::Right)),
        _ => return None,
    };
    Some(found)
}

/// Follows key events and reports hotkey actions.
#[derive(Debug, Default)]
pub struct HotkeyDispatcher {
    map: HotkeyMap,
    held: BTreeSet<VirtualKey>,
    fired: HashSet<usize>,
}

impl HotkeyDispatcher {
    #[must_use]
    pub fn new(map: HotkeyMap) -> Self { Self { map, ..Self::default() } }

    /// Replaces the bindings, e.g. after a reload. Held keys are kept.
    pub fn set_map(&mut self, map: HotkeyMap) {
        self.map = map;
        self.fired.clear();
    }

    #[must_use]
    pub const fn map(&self) -> &HotkeyMap { &self.map }

    /// Forgets every held key.
    pub fn reset(&mut self) {
        self.held.clear();
        self.fired.clear();
    }

    /// Handles a key press. Returns the action of the combo it completes.
    pub fn key_down(&mut self, key: VirtualKey) -> Option<HotkeyAction> {
        if !self.held.insert(key) {
            return None;
        }

        let mut modifiers = BTreeSet::new();
        let mut keys = BTreeSet::new();
        for &held in &self.held {
            match modifier_of(held) {
                Some(modifier) => {
                    modifiers.insert(modifier);
                }
                None => {
                    keys.insert(held);
                }
            }
        }

        let index = self.map.bindings.iter().position(|b| b.combo.matches(&modifiers, &keys))?;
        if !self.fired.insert(index) {
            return None;
        }

        let action = self.map.bindings[index].action.clone();
        tracing::debug!(hotkey = %self.map.bindings[index].combo, action = %action, "hotkey pressed");
        Some(action)
    }

    /// Handles a key release.
    pub fn key_up(&mut self, key: VirtualKey) {
        self.held.remove(&key);

        if modifier_of(key).is_some() {
            self.fired.clear();
        } else {
            let bindings = &self.map.bindings;
            self.fired.retain(|&index| !bindings[index].combo.contains_key(key));
        }
    }
}
