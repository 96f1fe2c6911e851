//! Overlay appearance configuration.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Zone overlay appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OverlayConfig {
    /// Zone fill color name or hex value.
    /// Default: "cyan"
    pub color: String,

    /// Fill opacity between 0.0 and 1.0.
    /// Default: 0.3
    pub opacity: f64,

    /// Window alpha between 0 and 255.
    /// Default: 180
    pub alpha: u8,

    /// Seconds after which an overlay opened by the overlay hotkey hides
    /// itself. Zero disables auto-hide.
    /// Default: 3
    pub auto_hide_seconds: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            color: "cyan".to_string(),
            opacity: 0.3,
            alpha: 180,
            auto_hide_seconds: 3.0,
        }
    }
}

impl OverlayConfig {
    /// Returns the auto-hide delay, or `None` if auto-hide is disabled.
    #[must_use]
    pub fn auto_hide(&self) -> Option<Duration> {
        (self.auto_hide_seconds > 0.0).then(|| super::seconds(self.auto_hide_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_defaults() {
        let config = OverlayConfig::default();
        assert_eq!(config.color, "cyan");
        assert_eq!(config.alpha, 180);
        assert!((config.opacity - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.auto_hide(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_zero_disables_auto_hide() {
        let config = OverlayConfig { auto_hide_seconds: 0.0, ..Default::default() };
        assert_eq!(config.auto_hide(), None);
    }

    #[test]
    fn test_partial_overlay_uses_defaults() {
        let config: OverlayConfig = serde_json::from_str(r#"{"color": "magenta"}"#).unwrap();
        assert_eq!(config.color, "magenta");
        assert_eq!(config.alpha, 180);
    }
}
