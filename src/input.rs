//! Key bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Drop,
    Restart,
    Pause,
    Quit,
    None,
}

/// Map key event to game action. Space/Enter/Down (or `j`) drop.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Down | KeyCode::Char('j') => Action::Drop,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn space_and_enter_drop() {
        assert_eq!(key_to_action(key(KeyCode::Char(' '), KeyModifiers::NONE)), Action::Drop);
        assert_eq!(key_to_action(key(KeyCode::Enter, KeyModifiers::NONE)), Action::Drop);
        assert_eq!(key_to_action(key(KeyCode::Down, KeyModifiers::NONE)), Action::Drop);
    }

    #[test]
    fn restart_accepts_shifted_r() {
        assert_eq!(key_to_action(key(KeyCode::Char('r'), KeyModifiers::NONE)), Action::Restart);
        assert_eq!(key_to_action(key(KeyCode::Char('R'), KeyModifiers::SHIFT)), Action::Restart);
    }

    #[test]
    fn ctrl_c_quits_other_chords_ignored() {
        assert_eq!(key_to_action(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Char(' '), KeyModifiers::ALT)), Action::None);
        assert_eq!(key_to_action(key(KeyCode::Char('x'), KeyModifiers::NONE)), Action::None);
    }
}
