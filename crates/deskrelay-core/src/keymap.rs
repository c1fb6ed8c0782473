//! Mapping of UI key/button identifiers onto injection-layer names.

use crate::{Modifier, MouseButton};
use tracing::debug;

/// Button code `2` is the right button; everything else is treated as left.
pub fn button_from_code(code: i64) -> MouseButton {
    if code == 2 {
        MouseButton::Right
    } else {
        MouseButton::Left
    }
}

/// Translate a UI key name (`KeyboardEvent.key`) to the injection-layer name.
///
/// Named special keys go through a fixed table; anything else is lower-cased
/// and passed through.
pub fn injection_key_name(key: &str) -> String {
    let mapped = match key {
        "Shift" => "shift",
        "Enter" => "enter",
        "Control" => "control",
        "Alt" => "alt",
        "Meta" => "command",
        "Backspace" => "backspace",
        "Delete" => "delete",
        "ArrowUp" => "up",
        "ArrowDown" => "down",
        "ArrowLeft" => "left",
        "ArrowRight" => "right",
        "Tab" => "tab",
        other => return other.to_lowercase(),
    };
    mapped.to_string()
}

/// Parse modifier names; unknown names are skipped.
pub fn parse_modifiers<S: AsRef<str>>(names: &[S]) -> Vec<Modifier> {
    let mut modifiers = Vec::new();
    for name in names {
        let modifier = match name.as_ref().to_lowercase().as_str() {
            "shift" => Modifier::Shift,
            "control" | "ctrl" => Modifier::Control,
            "alt" | "option" => Modifier::Alt,
            "command" | "cmd" | "meta" => Modifier::Command,
            other => {
                debug!(modifier = other, "ignoring unknown modifier");
                continue;
            }
        };
        if !modifiers.contains(&modifier) {
            modifiers.push(modifier);
        }
    }
    modifiers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_codes() {
        assert_eq!(button_from_code(2), MouseButton::Right);
        assert_eq!(button_from_code(0), MouseButton::Left);
        assert_eq!(button_from_code(1), MouseButton::Left);
        assert_eq!(button_from_code(4), MouseButton::Left);
        assert_eq!(button_from_code(-1), MouseButton::Left);
    }

    #[test]
    fn test_special_keys() {
        assert_eq!(injection_key_name("Enter"), "enter");
        assert_eq!(injection_key_name("Meta"), "command");
        assert_eq!(injection_key_name("ArrowLeft"), "left");
        assert_eq!(injection_key_name("Tab"), "tab");
    }

    #[test]
    fn test_passthrough_is_lowercased() {
        assert_eq!(injection_key_name("q"), "q");
        assert_eq!(injection_key_name("Q"), "q");
        assert_eq!(injection_key_name("Escape"), "escape");
        assert_eq!(injection_key_name("F5"), "f5");
    }

    #[test]
    fn test_parse_modifiers() {
        let mods = parse_modifiers(&["Shift", "cmd", "KeyQ", "shift"]);
        assert_eq!(mods, vec![Modifier::Shift, Modifier::Command]);
        assert!(parse_modifiers::<&str>(&[]).is_empty());
    }
}
