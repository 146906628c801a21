//! Key bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Help line shown in the bottom pane.
pub const HELP_TEXT: &str = "Enter: Play | n: Next | p: Previous | s: Stop | x: Pause/Resume | >: Volume Up | <: Volume Down | Esc: Quit";

/// What a key press asks the player to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    PlaySelected,
    Next,
    Previous,
    Stop,
    TogglePause,
    VolumeUp,
    VolumeDown,
    CursorUp,
    CursorDown,
    CursorHome,
    CursorEnd,
}

/// Map a key event to an action.
///
/// Only presses count; releases and auto-repeats are ignored so a held key
/// toggles pause once.
pub fn map_key(event: &KeyEvent) -> Option<Action> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    let action = match event.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Enter => Action::PlaySelected,
        KeyCode::Up | KeyCode::Char('k') => Action::CursorUp,
        KeyCode::Down | KeyCode::Char('j') => Action::CursorDown,
        KeyCode::Home => Action::CursorHome,
        KeyCode::End => Action::CursorEnd,
        KeyCode::Char('n') => Action::Next,
        KeyCode::Char('p') => Action::Previous,
        KeyCode::Char('s') => Action::Stop,
        KeyCode::Char('x') => Action::TogglePause,
        KeyCode::Char('>') => Action::VolumeUp,
        KeyCode::Char('<') => Action::VolumeDown,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn maps_bound_keys() {
        let cases = [
            (KeyCode::Esc, Action::Quit),
            (KeyCode::Enter, Action::PlaySelected),
            (KeyCode::Char('n'), Action::Next),
            (KeyCode::Char('p'), Action::Previous),
            (KeyCode::Char('s'), Action::Stop),
            (KeyCode::Char('x'), Action::TogglePause),
            (KeyCode::Char('>'), Action::VolumeUp),
            (KeyCode::Char('<'), Action::VolumeDown),
            (KeyCode::Up, Action::CursorUp),
            (KeyCode::Char('k'), Action::CursorUp),
            (KeyCode::Down, Action::CursorDown),
            (KeyCode::Char('j'), Action::CursorDown),
            (KeyCode::Home, Action::CursorHome),
            (KeyCode::End, Action::CursorEnd),
        ];
        for (code, action) in cases {
            assert_eq!(map_key(&press(code)), Some(action), "{code:?}");
        }
    }

    #[test]
    fn shifted_volume_keys_still_map() {
        let event = KeyEvent::new(KeyCode::Char('>'), KeyModifiers::SHIFT);
        assert_eq!(map_key(&event), Some(Action::VolumeUp));
    }

    #[test]
    fn ctrl_c_quits_other_ctrl_chords_ignored() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&ctrl_c), Some(Action::Quit));
        let ctrl_n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&ctrl_n), None);
    }

    #[test]
    fn release_and_repeat_are_ignored() {
        for kind in [KeyEventKind::Release, KeyEventKind::Repeat] {
            let event = KeyEvent::new_with_kind(KeyCode::Char('x'), KeyModifiers::NONE, kind);
            assert_eq!(map_key(&event), None);
        }
    }

    #[test]
    fn unbound_keys_do_nothing() {
        assert_eq!(map_key(&press(KeyCode::Char('z'))), None);
        assert_eq!(map_key(&press(KeyCode::Tab)), None);
    }
}
