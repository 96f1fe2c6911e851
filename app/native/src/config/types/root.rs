//! Root configuration structure, errors and file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hotkeys::HotkeysConfig;
use super::layouts::LayoutConfig;
use super::overlay::OverlayConfig;

/// Root configuration structure for ZoneSnap.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ZoneSnapConfig {
    /// Optional JSON Schema reference for editor support.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Hotkeys, drag behavior and state tracking.
    pub hotkeys: HotkeysConfig,

    /// Overlay appearance.
    pub overlay: OverlayConfig,

    /// Layouts, in the order used for layout cycling.
    pub layouts: Vec<LayoutConfig>,

    /// Layout active at startup. Falls back to a layout named `"default"`,
    /// then to the first layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_layout: Option<String>,
}

/// Errors that can occur when loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.config/zonesnap/config.jsonc, \
         <config dir>/zonesnap/config.jsonc, or ~/.zonesnap.jsonc"
    )]
    NotFound,

    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration defines no layouts.
    #[error("No layouts defined; at least one layout is required")]
    NoLayouts,

    /// Two layouts share a name.
    #[error("Duplicate layout name: {0}")]
    DuplicateLayout(String),

    /// A layout is malformed.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// A zone is malformed.
    #[error("Invalid zone '{zone}' in layout '{layout}': {reason}")]
    InvalidZone {
        layout: String,
        zone: String,
        reason: String,
    },
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Legacy configuration file names in home directory.
const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[".zonesnap.jsonc", ".zonesnap.json"];

/// Environment variable that points at a configuration file.
pub const CONFIG_ENV_VAR: &str = "ZONESNAP_CONFIG";

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/zonesnap/` if the variable is set
/// 2. `~/.config/zonesnap/`
/// 3. The platform configuration directory (`dirs::config_dir()`) + `zonesnap/`
/// 4. `~/.zonesnap.jsonc` or `~/.zonesnap.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut push_dir = |dir: PathBuf| {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    };

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        push_dir(PathBuf::from(xdg_config).join("zonesnap"));
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(home.join(".config").join("zonesnap"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(config_dir.join("zonesnap"));
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Parses configuration text. Comments are stripped before parsing.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the text is not valid JSONC for the schema.
pub fn parse_config(text: &str) -> Result<ZoneSnapConfig, ConfigError> {
    let reader = json_comments::StripComments::new(text.as_bytes());
    Ok(serde_json::from_reader(reader)?)
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if it contains invalid JSON.
pub fn load_config_from_path(path: &Path) -> Result<ZoneSnapConfig, ConfigError> {
    let file = fs::File::open(path)?;
    // Strip comments from JSONC before parsing
    let reader = json_comments::StripComments::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Finds the configuration file to use.
///
/// `ZONESNAP_CONFIG` wins over the search paths.
#[must_use]
pub fn find_config_file() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from) {
        return Some(path);
    }

    config_paths().into_iter().find(|path| path.exists())
}
