// tests/hotkey_tests.rs

use hotkey_lang::hotkey::{Hotkey, Modifier, normalize};

// ============================================================================
// Normalization
// ============================================================================

#[test]
fn test_equivalent_spellings() {
    let groups = vec![
        vec!["Ctrl+Shift+A", "shift+ctrl+a", "^+a", "+^A", "CONTROL+Shift+a"],
        vec!["Win+1", "win+1", "#1", "super+1"],
        vec!["Alt+Tab", "!Tab", "alt+tab"],
        vec!["F1", "f1"],
        vec!["Escape", "esc", "ESCAPE"],
    ];

    for group in groups {
        let expected = normalize(group[0]);
        for spelling in &group[1..] {
            assert_eq!(normalize(spelling), expected, "{} vs {}", spelling, group[0]);
        }
    }
}

#[test]
fn test_modifier_order_does_not_matter() {
    let modifiers = ["Ctrl", "Alt", "Shift", "Win"];
    // Every rotation of the full modifier set names the same combination.
    for start in 0..modifiers.len() {
        let rotated: Vec<&str> = modifiers[start..]
            .iter()
            .chain(&modifiers[..start])
            .copied()
            .collect();
        let text = format!("{}+k", rotated.join("+"));
        assert_eq!(normalize(&text), "Ctrl+Alt+Shift+Win+K");
    }
}

#[test]
fn test_normalize_is_idempotent() {
    for text in ["^!a", "shift+F12", "win+pgup", "Ctrl++", "x"] {
        let once = normalize(text);
        assert_eq!(normalize(&once), once, "{}", text);
    }
}

#[test]
fn test_plus_key() {
    assert_eq!(normalize("Ctrl++"), "Ctrl++");
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_components() {
    let hotkey = Hotkey::parse("shift+ctrl+pagedown");
    assert_eq!(
        hotkey.modifiers.iter().copied().collect::<Vec<_>>(),
        vec![Modifier::Ctrl, Modifier::Shift]
    );
    assert_eq!(hotkey.key, "PageDown");
    assert_eq!(hotkey.to_string(), "Ctrl+Shift+PageDown");
}

#[test]
fn test_unknown_words_stay_in_key() {
    let hotkey = Hotkey::parse("Hyper+x");
    assert!(hotkey.modifiers.is_empty());
    assert_eq!(hotkey.key, "Hyper+x");
}
