//! Key name table.
//!
//! Maps the key names accepted in configuration files (`"q"`, `"num5"`,
//! `"pgdn"`, `` "`" ``...) to virtual key codes, and renders the short labels
//! drawn on the overlay.

use super::types::VirtualKey;

/// Parses a single key name into its virtual key code.
///
/// Names are case-insensitive and surrounding whitespace is ignored.
/// Returns `None` for unknown names and for modifier names, which are
/// handled separately by the input layer.
#[must_use]
pub fn parse_key(name: &str) -> Option<VirtualKey> {
    let upper = name.trim().to_ascii_uppercase();

    if let Some(n) = numpad_digit(&upper) {
        return Some(VirtualKey::numpad(n));
    }

    if let Some(rest) = upper.strip_prefix('F')
        && let Ok(n) = rest.parse::<u16>()
        && (1..=24).contains(&n)
    {
        return Some(VirtualKey(0x70 + n - 1));
    }

    let mut chars = upper.chars();
    if let (Some(c), None) = (chars.next(), chars.next())
        && (c.is_ascii_digit() || c.is_ascii_uppercase())
    {
        return Some(VirtualKey(c as u16));
    }

    let code = match upper.as_str() {
        "-" | "MINUS" => 0xBD,
        "=" | "EQUALS" | "EQUAL" => 0xBB,
        "`" | "BACKTICK" | "GRAVE" | "TILDE" | "~" => 0xC0,
        "[" | "LBRACKET" => 0xDB,
        "]" | "RBRACKET" => 0xDD,
        "\\" | "BACKSLASH" => 0xDC,
        ";" | "SEMICOLON" => 0xBA,
        "'" | "QUOTE" => 0xDE,
        "," | "COMMA" => 0xBC,
        "." | "PERIOD" => 0xBE,
        "/" | "SLASH" => 0xBF,
        "TAB" => 0x09,
        "CAPSLOCK" | "CAPS" => 0x14,
        "SPACE" => 0x20,
        "ENTER" | "RETURN" => 0x0D,
        "BACKSPACE" => 0x08,
        "ESC" | "ESCAPE" => 0x1B,
        "DELETE" | "DEL" => 0x2E,
        "INSERT" | "INS" => 0x2D,
        "HOME" => 0x24,
        "END" => 0x23,
        "PAGEUP" | "PGUP" => 0x21,
        "PAGEDOWN" | "PGDN" => 0x22,
        "LEFT" => 0x25,
        "UP" => 0x26,
        "RIGHT" => 0x27,
        "DOWN" => 0x28,
        _ => return None,
    };

    Some(VirtualKey(code))
}

/// Renders the overlay label for a configured key name.
///
/// Numpad keys render as `NumN`, a few named keys get a short title-cased
/// label, everything else is uppercased.
#[must_use]
pub fn key_label(name: &str) -> String {
    let upper = name.trim().to_ascii_uppercase();

    if let Some(n) = numpad_digit(&upper) {
        return format!("Num{n}");
    }

    match upper.as_str() {
        "BACKTICK" | "GRAVE" | "`" => "`".to_string(),
        "TAB" => "Tab".to_string(),
        "CAPSLOCK" | "CAPS" => "Caps".to_string(),
        "SPACE" => "Space".to_string(),
        _ => upper,
    }
}

/// Recognizes `NUM5`, `NUMPAD5` and `KP_5` style names.
fn numpad_digit(upper: &str) -> Option<u8> {
    let digits = upper
        .strip_prefix("NUMPAD")
        .or_else(|| upper.strip_prefix("NUM"))
        .or_else(|| upper.strip_prefix("KP_"))?;

    match digits.as_bytes() {
        [d @ b'0'..=b'9'] => Some(d - b'0'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_letters_and_digits() {
        assert_eq!(parse_key("q"), Some(VirtualKey(0x51)));
        assert_eq!(parse_key(" Q "), Some(VirtualKey(0x51)));
        assert_eq!(parse_key("1"), Some(VirtualKey(0x31)));
        assert_eq!(parse_key("0"), Some(VirtualKey(0x30)));
    }

    #[test]
    fn test_parse_punctuation_aliases() {
        assert_eq!(parse_key("`"), Some(VirtualKey(0xC0)));
        assert_eq!(parse_key("backtick"), Some(VirtualKey(0xC0)));
        assert_eq!(parse_key("]"), Some(VirtualKey(0xDD)));
        assert_eq!(parse_key("["), Some(VirtualKey(0xDB)));
        assert_eq!(parse_key("pgdn"), Some(VirtualKey(0x22)));
    }

    #[test]
    fn test_parse_numpad_variants() {
        assert_eq!(parse_key("num5"), Some(VirtualKey(0x65)));
        assert_eq!(parse_key("NUMPAD0"), Some(VirtualKey(0x60)));
        assert_eq!(parse_key("kp_9"), Some(VirtualKey(0x69)));
        assert_eq!(parse_key("num10"), None);
    }

    #[test]
    fn test_parse_function_keys() {
        assert_eq!(parse_key("f1"), Some(VirtualKey(0x70)));
        assert_eq!(parse_key("F24"), Some(VirtualKey(0x87)));
        assert_eq!(parse_key("f25"), None);
        assert_eq!(parse_key("f"), Some(VirtualKey(0x46)));
    }

    #[test]
    fn test_parse_rejects_unknown_and_modifiers() {
        assert_eq!(parse_key("shift"), None);
        assert_eq!(parse_key("hyper"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn test_key_labels() {
        assert_eq!(key_label("q"), "Q");
        assert_eq!(key_label("num3"), "Num3");
        assert_eq!(key_label("numpad7"), "Num7");
        assert_eq!(key_label("backtick"), "`");
        assert_eq!(key_label("tab"), "Tab");
        assert_eq!(key_label("caps"), "Caps");
        assert_eq!(key_label("space"), "Space");
        assert_eq!(key_label("pgdn"), "PGDN");
    }
}
