//! Key bindings: arrows and vim-style.

use crate::tilt::Direction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Tilt(Direction),
    /// Enter/space: dismiss a result, pick a menu entry, start from the title.
    Confirm,
    NextLevel,
    PreviousLevel,
    Restart,
    Pause,
    Quit,
    None,
}

/// Map key event to game action. Arrows or hjkl tilt; Ctrl-C quits too.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL {
        return match code {
            KeyCode::Char('c') => Action::Quit,
            _ => Action::None,
        };
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Left | KeyCode::Char('h' | 'a') => Action::Tilt(Direction::Left),
        KeyCode::Right | KeyCode::Char('l' | 'd') => Action::Tilt(Direction::Right),
        KeyCode::Up | KeyCode::Char('k' | 'w') => Action::Tilt(Direction::Up),
        KeyCode::Down | KeyCode::Char('j' | 's') => Action::Tilt(Direction::Down),
        KeyCode::Enter | KeyCode::Char(' ') => Action::Confirm,
        KeyCode::Char('n' | 'N') | KeyCode::PageDown => Action::NextLevel,
        KeyCode::Char('b' | 'B') | KeyCode::PageUp => Action::PreviousLevel,
        KeyCode::Char('r' | 'R') => Action::Restart,
        KeyCode::Char('p' | 'P') => Action::Pause,
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrows_and_vim_keys_tilt() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::Tilt(Direction::Left));
        assert_eq!(key_to_action(key(KeyCode::Char('l'))), Action::Tilt(Direction::Right));
        assert_eq!(key_to_action(key(KeyCode::Char('k'))), Action::Tilt(Direction::Up));
        assert_eq!(key_to_action(key(KeyCode::Down)), Action::Tilt(Direction::Down));
    }

    #[test]
    fn test_level_and_menu_keys() {
        assert_eq!(key_to_action(key(KeyCode::Char('n'))), Action::NextLevel);
        assert_eq!(key_to_action(key(KeyCode::Char('b'))), Action::PreviousLevel);
        assert_eq!(key_to_action(key(KeyCode::Char('r'))), Action::Restart);
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Confirm);
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Quit);
    }

    #[test]
    fn test_modifiers() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_c), Action::Quit);
        let alt_h = KeyEvent::new(KeyCode::Char('h'), KeyModifiers::ALT);
        assert_eq!(key_to_action(alt_h), Action::None);
        let shift_n = KeyEvent::new(KeyCode::Char('N'), KeyModifiers::SHIFT);
        assert_eq!(key_to_action(shift_n), Action::NextLevel);
    }
}
