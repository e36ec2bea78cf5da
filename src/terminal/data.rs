use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::ResourceKind;

/// Input the dashboard reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    RefreshAll,
    Refresh(ResourceKind),
    /// The terminal window regained focus
    Focus,
    /// The screen must be repainted, e.g. after a resize
    Redraw,
    Quit,
}

/// Translates a raw terminal event, ignoring keys without a binding.
pub fn map_event(event: Event) -> Option<UiEvent> {
    match event {
        Event::Key(key) => map_key(key),
        Event::FocusGained => Some(UiEvent::Focus),
        Event::Resize(_, _) => Some(UiEvent::Redraw),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<UiEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(UiEvent::Quit),
            KeyCode::Char('l') => Some(UiEvent::Redraw),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(UiEvent::Quit),
        KeyCode::Char('r') | KeyCode::F(5) => Some(UiEvent::RefreshAll),
        KeyCode::Char('1') => Some(UiEvent::Refresh(ResourceKind::Overview)),
        KeyCode::Char('2') => Some(UiEvent::Refresh(ResourceKind::Charts)),
        KeyCode::Char('3') => Some(UiEvent::Refresh(ResourceKind::Activities)),
        _ => None,
    }
}
