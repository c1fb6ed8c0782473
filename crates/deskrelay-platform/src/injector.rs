//! Input injection backed by `enigo`.

use deskrelay_core::{
    Direction as KeyDirection, HostError, HostResult, InputAction, InputInjector, Modifier,
    MouseButton,
};
use enigo::{Axis, Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Real input injector using `enigo` crate.
pub struct EnigoInjector {
    enigo: Mutex<Enigo>,
}

impl EnigoInjector {
    pub fn new() -> HostResult<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| HostError::Unavailable(format!("failed to create Enigo: {e}")))?;
        Ok(Self {
            enigo: Mutex::new(enigo),
        })
    }
}

fn failed(e: impl std::fmt::Display) -> HostError {
    HostError::InjectionFailed(e.to_string())
}

impl InputInjector for EnigoInjector {
    fn inject(&self, action: &InputAction) -> HostResult<()> {
        let mut enigo = self.enigo.lock().unwrap_or_else(PoisonError::into_inner);

        match action {
            InputAction::MoveTo { x, y } => {
                debug!(x, y, "injecting mouse move");
                enigo.move_mouse(*x, *y, Coordinate::Abs).map_err(failed)?;
            }

            InputAction::Click { button } => {
                debug!(?button, "injecting click");
                enigo
                    .button(mouse_button_to_enigo(*button), Direction::Click)
                    .map_err(failed)?;
            }

            InputAction::Button { button, direction } => {
                debug!(?button, ?direction, "injecting mouse button");
                enigo
                    .button(mouse_button_to_enigo(*button), direction_to_enigo(*direction))
                    .map_err(failed)?;
            }

            InputAction::Scroll { delta_x, delta_y } => {
                debug!(delta_x, delta_y, "injecting scroll");
                if *delta_y != 0 {
                    enigo.scroll(*delta_y, Axis::Vertical).map_err(failed)?;
                }
                if *delta_x != 0 {
                    enigo.scroll(*delta_x, Axis::Horizontal).map_err(failed)?;
                }
            }

            InputAction::Key {
                key,
                direction,
                modifiers,
            } => {
                debug!(key, ?direction, ?modifiers, "injecting key");
                let mut chord: Vec<Key> = modifiers.iter().map(|m| modifier_to_enigo(*m)).collect();
                chord.push(parse_key(key)?);
                let toggle = |k: Key, d: Direction| enigo.key(k, d).map_err(failed);
                match direction {
                    KeyDirection::Press => press_chord(&chord, toggle)?,
                    KeyDirection::Release => release_chord(&chord, toggle)?,
                }
            }
        }

        Ok(())
    }
}

/// Press `keys` in order. If one fails, the keys already down are released
/// in reverse before the error is returned.
fn press_chord<F>(keys: &[Key], mut toggle: F) -> HostResult<()>
where
    F: FnMut(Key, Direction) -> HostResult<()>,
{
    for (i, k) in keys.iter().enumerate() {
        if let Err(e) = toggle(*k, Direction::Press) {
            for held in keys[..i].iter().rev() {
                if let Err(release) = toggle(*held, Direction::Release) {
                    warn!(key = ?held, "Failed to release key after press error: {}", release);
                }
            }
            return Err(e);
        }
    }
    Ok(())
}

/// Release `keys` in reverse order. Every key is attempted; the first
/// failure is returned.
fn release_chord<F>(keys: &[Key], mut toggle: F) -> HostResult<()>
where
    F: FnMut(Key, Direction) -> HostResult<()>,
{
    let mut outcome = Ok(());
    for k in keys.iter().rev() {
        let released = toggle(*k, Direction::Release);
        if outcome.is_ok() {
            outcome = released;
        }
    }
    outcome
}

fn mouse_button_to_enigo(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
    }
}

fn direction_to_enigo(direction: KeyDirection) -> Direction {
    match direction {
        KeyDirection::Press => Direction::Press,
        KeyDirection::Release => Direction::Release,
    }
}

fn modifier_to_enigo(modifier: Modifier) -> Key {
    match modifier {
        Modifier::Shift => Key::Shift,
        Modifier::Control => Key::Control,
        Modifier::Alt => Key::Alt,
        Modifier::Command => Key::Meta,
    }
}

/// Parse an injection-layer key name into an enigo Key.
///
/// Single characters map to `Key::Unicode`; longer names must be known.
fn parse_key(key: &str) -> HostResult<Key> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(if c == ' ' { Key::Space } else { Key::Unicode(c) });
    }

    let parsed = match key.to_lowercase().as_str() {
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,

        "shift" => Key::Shift,
        "control" | "ctrl" => Key::Control,
        "alt" => Key::Alt,
        "command" | "cmd" | "meta" => Key::Meta,

        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,

        "backspace" => Key::Backspace,
        "delete" => Key::Delete,
        "enter" | "return" => Key::Return,
        "tab" => Key::Tab,
        "escape" | "esc" => Key::Escape,
        "space" => Key::Space,
        "capslock" => Key::CapsLock,

        _ => return Err(HostError::InvalidKey(key.to_string())),
    };

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_single_char() {
        assert!(matches!(parse_key("a").unwrap(), Key::Unicode('a')));
        assert!(matches!(parse_key("é").unwrap(), Key::Unicode('é')));
        assert!(matches!(parse_key(" ").unwrap(), Key::Space));
    }

    #[test]
    fn test_parse_key_injection_names() {
        assert!(matches!(parse_key("enter").unwrap(), Key::Return));
        assert!(matches!(parse_key("command").unwrap(), Key::Meta));
        assert!(matches!(parse_key("up").unwrap(), Key::UpArrow));
        assert!(matches!(parse_key("backspace").unwrap(), Key::Backspace));
        assert!(matches!(parse_key("f5").unwrap(), Key::F5));
    }

    /// Records every toggle and fails when `broken` is pressed.
    fn recorder(
        log: &mut Vec<(String, bool)>,
        broken: Option<Key>,
    ) -> impl FnMut(Key, Direction) -> HostResult<()> + '_ {
        move |k, d| {
            let pressed = matches!(d, Direction::Press);
            if pressed && broken.is_some_and(|b| format!("{b:?}") == format!("{k:?}")) {
                return Err(HostError::InjectionFailed("device busy".into()));
            }
            log.push((format!("{k:?}"), pressed));
            Ok(())
        }
    }

    #[test]
    fn test_press_failure_releases_held_modifiers() {
        let chord = [Key::Shift, Key::Control, Key::Return];
        let mut log = Vec::new();
        let err = press_chord(&chord, recorder(&mut log, Some(Key::Return))).unwrap_err();

        assert!(matches!(err, HostError::InjectionFailed(_)));
        assert_eq!(
            log,
            vec![
                ("Shift".to_string(), true),
                ("Control".to_string(), true),
                ("Control".to_string(), false),
                ("Shift".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_release_attempts_every_key() {
        let chord = [Key::Shift, Key::Unicode('a')];
        let mut log = Vec::new();
        let mut calls = 0;
        let result = release_chord(&chord, |k, _| {
            calls += 1;
            log.push(format!("{k:?}"));
            if calls == 1 {
                Err(HostError::InjectionFailed("device busy".into()))
            } else {
                Ok(())
            }
        });

        assert!(result.is_err());
        assert_eq!(log, vec![format!("{:?}", Key::Unicode('a')), "Shift".to_string()]);
    }

    #[test]
    fn test_parse_key_unknown_name() {
        let err = parse_key("mediaplaypause").unwrap_err();
        assert!(matches!(err, HostError::InvalidKey(k) if k == "mediaplaypause"));
    }
}
