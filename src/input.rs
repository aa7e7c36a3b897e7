//! Terminal events mapped to game commands.

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind,
};
use std::time::Duration;

/// What the player asked for, independent of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Flap while running, start a run otherwise.
    Activate,
    Restart,
    Home,
    NextCharacter,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Command(Command),
    Resize { cols: u16, rows: u16 },
}

pub fn map_key(key: &KeyEvent) -> Option<Command> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(Command::Quit);
    }
    match key.code {
        KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => Some(Command::Activate),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Restart),
        KeyCode::Char('h') | KeyCode::Char('H') => Some(Command::Home),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(Command::NextCharacter),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

pub fn map_event(ev: Event) -> Option<InputEvent> {
    match ev {
        Event::Key(key) => map_key(&key).map(InputEvent::Command),
        Event::Mouse(m) if matches!(m.kind, MouseEventKind::Down(_)) => {
            Some(InputEvent::Command(Command::Activate))
        }
        Event::Resize(cols, rows) => Some(InputEvent::Resize { cols, rows }),
        _ => None,
    }
}

/// Drains whatever is pending without waiting.
pub fn collect_input_nonblocking() -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();
    while event::poll(Duration::ZERO)? {
        if let Some(ev) = map_event(event::read()?) {
            out.push(ev);
            if out.len() >= 32 {
                break;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseButton, MouseEvent};

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn flap_keys_activate() {
        for code in [KeyCode::Char(' '), KeyCode::Up, KeyCode::Enter] {
            assert_eq!(
                map_event(press(code)),
                Some(InputEvent::Command(Command::Activate))
            );
        }
    }

    #[test]
    fn restart_and_home_are_distinct_from_activate() {
        assert_eq!(
            map_event(press(KeyCode::Char('r'))),
            Some(InputEvent::Command(Command::Restart))
        );
        assert_eq!(
            map_event(press(KeyCode::Char('h'))),
            Some(InputEvent::Command(Command::Home))
        );
    }

    #[test]
    fn ctrl_c_quits_but_c_cycles() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&ctrl_c), Some(Command::Quit));
        let c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(map_key(&c), Some(Command::NextCharacter));
    }

    #[test]
    fn key_release_is_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char(' '),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(map_key(&release), None);
    }

    #[test]
    fn mouse_down_activates() {
        let click = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(map_event(click), Some(InputEvent::Command(Command::Activate)));
    }

    #[test]
    fn resize_passes_through() {
        assert_eq!(
            map_event(Event::Resize(100, 40)),
            Some(InputEvent::Resize {
                cols: 100,
                rows: 40
            })
        );
    }
}
