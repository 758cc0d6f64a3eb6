use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputEvent {
    /// A printable key; toggles are looked up from it
    Key(char),
    /// Any other key press (Enter, arrows, ...), still counts as acknowledgement
    OtherKey,
    /// Ctrl-C or an interrupt signal
    Cancel,
    Resize {
        rows: u16,
        cols: u16,
    },
}

/// Translate a terminal event. Releases, mouse, focus, and paste events map to `None`.
pub(crate) fn map_event(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) => map_key(key),
        Event::Resize(cols, rows) => Some(InputEvent::Resize { rows, cols }),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<InputEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(InputEvent::Cancel),
            _ => Some(InputEvent::OtherKey),
        };
    }
    match key.code {
        KeyCode::Char(ch) => Some(InputEvent::Key(ch)),
        _ => Some(InputEvent::OtherKey),
    }
}
