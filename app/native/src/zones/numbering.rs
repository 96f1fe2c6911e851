//! Number-key fallback for zones.
//!
//! Zones are numbered 1-9 by monitor id, then by zone name. Zones past the
//! ninth get no number but stay reachable by hover or zone key.

use std::collections::{BTreeMap, HashMap};

use super::{ZoneMap, ZoneTarget};
use crate::platform::keys::key_label;

/// Highest zone number.
pub const MAX_ZONE_NUMBER: u8 = 9;

/// Zone numbers and display labels for one zone map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneNumbering {
    by_number: BTreeMap<u8, ZoneTarget>,
    numbers: HashMap<ZoneTarget, u8>,
    labels: HashMap<ZoneTarget, String>,
}

impl ZoneNumbering {
    /// Numbers every zone in `zones`, replacing nothing: the result is built
    /// from scratch so stale numbers never survive a layout change.
    #[must_use]
    pub fn assign(zones: &ZoneMap) -> Self {
        let mut numbering = Self::default();
        let mut next: u8 = 1;

        for (&monitor, monitor_zones) in zones {
            let mut sorted: Vec<_> = monitor_zones.iter().collect();
            sorted.sort_by(|a, b| a.name.cmp(&b.name));

            for zone in sorted {
                let target = zone.target();

                let number = (next <= MAX_ZONE_NUMBER).then(|| {
                    let number = next;
                    numbering.by_number.insert(number, target.clone());
                    numbering.numbers.insert(target.clone(), number);
                    next += 1;
                    number
                });

                let label = zone
                    .key
                    .as_deref()
                    .map(key_label)
                    .or_else(|| number.map(|n| n.to_string()));
                if let Some(label) = label {
                    numbering.labels.insert(target, label);
                }
            }

            tracing::trace!(monitor, assigned = numbering.by_number.len(), "numbered zones");
        }

        numbering
    }

    /// Returns the zone bound to `number`.
    #[must_use]
    pub fn zone_by_number(&self, number: u8) -> Option<&ZoneTarget> { self.by_number.get(&number) }

    /// Returns the number assigned to a zone.
    #[must_use]
    pub fn number(&self, monitor: u32, zone: &str) -> Option<u8> {
        self.numbers.get(&ZoneTarget::new(monitor, zone)).copied()
    }

    /// Returns the overlay label of a zone: its key label, else its number.
    #[must_use]
    pub fn label(&self, monitor: u32, zone: &str) -> Option<&str> {
        self.labels.get(&ZoneTarget::new(monitor, zone)).map(String::as_str)
    }

    /// Iterates `(number, zone)` pairs in ascending number order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &ZoneTarget)> {
        self.by_number.iter().map(|(n, t)| (*n, t))
    }

    /// Returns how many zones received a number.
    #[must_use]
    pub fn len(&self) -> usize { self.by_number.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.by_number.is_empty() }
}
