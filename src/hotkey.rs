//! Hotkey combination normalization.
//!
//! The same combination can be written many ways: `Ctrl+Shift+A`,
//! `shift+ctrl+a`, `^+a`. [`normalize`] maps all of them to one canonical
//! registry key, with modifiers in the fixed order `Ctrl`, `Alt`, `Shift`,
//! `Win` followed by the canonical key name.
//!
//! Normalization is total: any input produces a key, even nonsense.
//!
//! ```
//! use hotkey_lang::hotkey::normalize;
//!
//! assert_eq!(normalize("Shift+Ctrl+a"), "Ctrl+Shift+A");
//! assert_eq!(normalize("#1"), "Win+1");
//! assert_eq!(normalize("win+1"), "Win+1");
//! ```

use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

static FUNCTION_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)f([1-9]|1[0-9]|2[0-4])$").unwrap());

/// Modifier keys, declared in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Win,
}

impl Modifier {
    /// Word spelling, case-insensitive (`ctrl`, `Control`, `ALT`, ...).
    pub fn from_word(word: &str) -> Option<Modifier> {
        match word.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Some(Modifier::Ctrl),
            "alt" => Some(Modifier::Alt),
            "shift" => Some(Modifier::Shift),
            "win" | "super" => Some(Modifier::Win),
            _ => None,
        }
    }

    /// Symbolic prefix spelling: `^` Ctrl, `!` Alt, `+` Shift, `#` Win.
    pub fn from_symbol(symbol: char) -> Option<Modifier> {
        match symbol {
            '^' => Some(Modifier::Ctrl),
            '!' => Some(Modifier::Alt),
            '+' => Some(Modifier::Shift),
            '#' => Some(Modifier::Win),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Modifier::Ctrl => "Ctrl",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
            Modifier::Win => "Win",
        }
    }
}

/// True for `F1` through `F24`, any case.
pub fn is_function_key(word: &str) -> bool {
    FUNCTION_KEY.is_match(word)
}

/// A parsed key combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hotkey {
    pub modifiers: BTreeSet<Modifier>,
    pub key: String,
}

impl Hotkey {
    /// Parses any text into a combination. Never fails: unknown modifier
    /// words simply become part of the key.
    pub fn parse(text: &str) -> Hotkey {
        let mut modifiers = BTreeSet::new();
        let mut rest = text.trim();

        // Symbolic prefixes, as long as something is left for the key.
        while rest.chars().count() > 1 {
            let Some(first) = rest.chars().next() else {
                break;
            };
            match Modifier::from_symbol(first) {
                Some(modifier) => {
                    modifiers.insert(modifier);
                    rest = &rest[first.len_utf8()..];
                }
                None => break,
            }
        }

        // Word modifiers separated by '+'; a trailing "++" means the '+' key.
        while let Some(split) = rest.find('+') {
            if split == 0 || split + 1 >= rest.len() {
                break;
            }
            match Modifier::from_word(&rest[..split]) {
                Some(modifier) => {
                    modifiers.insert(modifier);
                    rest = &rest[split + 1..];
                }
                None => break,
            }
        }

        Hotkey {
            modifiers,
            key: canonical_key(rest),
        }
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = self.modifiers.iter().map(|m| m.name()).collect();
        if !self.key.is_empty() {
            parts.push(&self.key);
        }
        f.write_str(&parts.join("+"))
    }
}

/// Canonical registry key for a combination.
pub fn normalize(text: &str) -> String {
    Hotkey::parse(text).to_string()
}

fn canonical_key(key: &str) -> String {
    let key = key.trim();
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    if chars.next().is_none() {
        return first.to_uppercase().collect();
    }
    if is_function_key(key) {
        return key.to_ascii_uppercase();
    }

    let named = match key.to_ascii_lowercase().as_str() {
        "esc" | "escape" => "Escape",
        "enter" | "return" => "Enter",
        "tab" => "Tab",
        "space" => "Space",
        "bs" | "backspace" => "Backspace",
        "del" | "delete" => "Delete",
        "ins" | "insert" => "Insert",
        "home" => "Home",
        "end" => "End",
        "pgup" | "pageup" => "PageUp",
        "pgdn" | "pagedown" => "PageDown",
        "up" => "Up",
        "down" => "Down",
        "left" => "Left",
        "right" => "Right",
        "printscreen" | "prtsc" => "PrintScreen",
        "pause" => "Pause",
        "capslock" => "CapsLock",
        "numlock" => "NumLock",
        "scrolllock" => "ScrollLock",
        _ => "",
    };
    if !named.is_empty() {
        return named.to_string();
    }

    // Unknown names: first letter upper, rest lower.
    let mut out: String = first.to_uppercase().collect();
    out.push_str(&key[first.len_utf8()..].to_lowercase());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_order_is_canonical() {
        assert_eq!(normalize("Ctrl+Shift+A"), "Ctrl+Shift+A");
        assert_eq!(normalize("Shift+Ctrl+A"), "Ctrl+Shift+A");
        assert_eq!(normalize("win+alt+shift+ctrl+x"), "Ctrl+Alt+Shift+Win+X");
    }

    #[test]
    fn test_symbolic_prefixes() {
        assert_eq!(normalize("^c"), "Ctrl+C");
        assert_eq!(normalize("!Tab"), "Alt+Tab");
        assert_eq!(normalize("+a"), "Shift+A");
        assert_eq!(normalize("^+a"), normalize("Ctrl+Shift+A"));
    }

    #[test]
    fn test_bare_keys() {
        assert_eq!(normalize("F1"), "F1");
        assert_eq!(normalize("f12"), "F12");
        assert_eq!(normalize("esc"), "Escape");
        assert_eq!(normalize("pgdn"), "PageDown");
        assert_eq!(normalize("#"), "#");
        assert_eq!(normalize("+"), "+");
    }

    #[test]
    fn test_plus_key() {
        assert_eq!(normalize("Ctrl++"), "Ctrl++");
    }

    #[test]
    fn test_total_on_odd_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("Hyper+K"), "Hyper+k");
        assert_eq!(normalize("^"), "^");
    }

    #[test]
    fn test_function_key_range() {
        assert!(is_function_key("F1"));
        assert!(is_function_key("f24"));
        assert!(!is_function_key("F25"));
        assert!(!is_function_key("F0"));
        assert!(!is_function_key("Foo"));
    }
}
