//! CLI output formatting.
//!
//! Tables are rendered by the commands themselves with `tabled`; this module
//! holds the shared helpers for JSON output and cell values.

use colored::Colorize;

use crate::platform::Rect;

/// Prints JSON with syntax highlighting.
///
/// Keys are cyan, strings green, numbers yellow, booleans and `null` magenta.
pub fn print_highlighted_json(value: &serde_json::Value) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    println!("{}", highlight_json(&json));
}

/// Colors a pretty-printed JSON document.
#[must_use]
pub fn highlight_json(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '"' => {
                let end = string_end(&chars, i);
                let token: String = chars[i..end].iter().collect();
                if next_significant(&chars, end) == Some(':') {
                    out.push_str(&token.cyan().to_string());
                } else {
                    out.push_str(&token.green().to_string());
                }
                i = end;
            }
            c if c.is_ascii_alphanumeric() || c == '-' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || "+-.".contains(chars[i])) {
                    i += 1;
                }
                let token: String = chars[start..i].iter().collect();
                let colored = match token.as_str() {
                    "true" | "false" | "null" => token.magenta(),
                    _ => token.yellow(),
                };
                out.push_str(&colored.to_string());
            }
            c @ ('{' | '}' | '[' | ']') => {
                out.push_str(&c.to_string().white().bold().to_string());
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Returns the index just past the string literal starting at `start`.
fn string_end(chars: &[char], start: usize) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '"' => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars.get(from..)?.iter().copied().find(|c| !c.is_whitespace())
}

/// Formats a boolean as a colored check mark.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}

/// Formats a rectangle as `x,y widthxheight`.
#[must_use]
pub fn format_rect(rect: &Rect) -> String {
    format!("{},{} {}x{}", rect.x, rect.y, rect.width, rect.height)
}
