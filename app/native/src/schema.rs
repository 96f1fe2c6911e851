//! JSON Schema for the configuration file.
//!
//! Editors that understand JSON Schema can validate and complete
//! `config.jsonc` with the output of `zonesnap schema`.

use schemars::schema_for;

use crate::config::ZoneSnapConfig;

/// Generates the configuration schema as pretty-printed JSON.
#[must_use]
pub fn print_schema() -> String {
    let schema = schema_for!(ZoneSnapConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_describes_top_level_sections() {
        let value: serde_json::Value = serde_json::from_str(&print_schema()).unwrap();
        let properties = value.get("properties").unwrap();
        for key in ["hotkeys", "overlay", "layouts", "default_layout"] {
            assert!(properties.get(key).is_some(), "missing {key}");
        }
    }
}
