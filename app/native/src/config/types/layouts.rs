//! Layout and zone configuration types.

use std::collections::{BTreeMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::root::ConfigError;
use crate::zones::{Layout, LayoutZones};

/// Tolerance for `x + width` / `y + height` sums written with decimals (33.33 + 66.67).
const PERCENT_EPSILON: f64 = 1e-6;

const fn default_respect_taskbar() -> bool { true }

/// A zone definition, in percentages of its monitor's base rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ZoneConfig {
    /// Zone name, unique within a layout (or within one monitor of a
    /// per-monitor layout).
    pub name: String,

    /// Left edge, in percent of the base width.
    pub x_percent: f64,

    /// Top edge, in percent of the base height.
    pub y_percent: f64,

    /// Width, in percent of the base width.
    pub width_percent: f64,

    /// Height, in percent of the base height.
    pub height_percent: f64,

    /// Resolve against the monitor's work area (true) or its full bounds (false).
    /// Default: true
    #[serde(default = "default_respect_taskbar")]
    pub respect_taskbar: bool,

    /// Key that snaps the dragged window into this zone while the overlay is shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl ZoneConfig {
    /// Creates a zone that respects the taskbar and has no key.
    #[must_use]
    pub fn new(name: &str, x_percent: f64, y_percent: f64, width: f64, height: f64) -> Self {
        Self {
            name: name.to_string(),
            x_percent,
            y_percent,
            width_percent: width,
            height_percent: height,
            respect_taskbar: true,
            key: None,
        }
    }

    /// Sets the zone key.
    #[must_use]
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    /// Returns the configured key, if it is not blank.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    fn validate(&self, layout: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidZone {
            layout: layout.to_string(),
            zone: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("zone name is empty".to_string()));
        }

        for (field, value) in [
            ("x_percent", self.x_percent),
            ("y_percent", self.y_percent),
            ("width_percent", self.width_percent),
            ("height_percent", self.height_percent),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(invalid(format!("{field} must be between 0 and 100, got {value}")));
            }
        }

        if self.x_percent + self.width_percent > 100.0 + PERCENT_EPSILON {
            return Err(invalid("x_percent + width_percent exceeds 100".to_string()));
        }
        if self.y_percent + self.height_percent > 100.0 + PERCENT_EPSILON {
            return Err(invalid("y_percent + height_percent exceeds 100".to_string()));
        }

        Ok(())
    }
}

/// Zones of one monitor in a legacy per-monitor layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonitorZonesConfig {
    /// Monitor id (position in the left-to-right monitor order).
    pub id: u32,

    /// Zones shown on that monitor.
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
}

/// A layout as written in the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LayoutConfig {
    /// Layout name.
    pub name: String,

    /// Zones applied to every monitor.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<ZoneConfig>,

    /// Legacy per-monitor zones, used only when `zones` is empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub monitors: Vec<MonitorZonesConfig>,
}

impl LayoutConfig {
    /// Validates the layout and converts it into its canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidZone`] for out-of-range percentages and
    /// duplicate zone names, and [`ConfigError::InvalidLayout`] for a blank name.
    pub fn into_layout(self) -> Result<Layout, ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidLayout("layout name is empty".to_string()));
        }

        let zones = if !self.zones.is_empty() || self.monitors.is_empty() {
            validate_zone_list(&self.name, &self.zones)?;
            LayoutZones::Flat(self.zones)
        } else {
            let mut by_monitor: BTreeMap<u32, Vec<ZoneConfig>> = BTreeMap::new();
            for monitor in self.monitors {
                by_monitor.entry(monitor.id).or_default().extend(monitor.zones);
            }
            for zones in by_monitor.values() {
                validate_zone_list(&self.name, zones)?;
            }
            LayoutZones::PerMonitor(by_monitor)
        };

        Ok(Layout { name: self.name, zones })
    }
}

fn validate_zone_list(layout: &str, zones: &[ZoneConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for zone in zones {
        zone.validate(layout)?;

        if !seen.insert(zone.name.as_str()) {
            return Err(ConfigError::InvalidZone {
                layout: layout.to_string(),
                zone: zone.name.clone(),
                reason: "duplicate zone name".to_string(),
            });
        }
    }

    Ok(())
}
