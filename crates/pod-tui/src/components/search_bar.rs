//! SearchBar component: query input at the top of the Search view.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::Span,
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{Action, ComponentId, View},
    app_state::AppState,
    component::Component,
    theme::C_MUTED,
    widgets::{
        pane_chrome::pane_chrome,
        text_input::{InputAction, TextInput},
    },
};

pub struct SearchBar {
    input: TextInput,
}

impl SearchBar {
    pub fn new() -> Self {
        Self {
            input: TextInput::new("podcast title"),
        }
    }

    fn begin(&mut self) -> Vec<Action> {
        self.input.activate();
        vec![Action::BeginEditing]
    }

    fn end_editing(&mut self) -> Vec<Action> {
        self.input.deactivate();
        vec![Action::EndEditing]
    }
}

impl Default for SearchBar {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for SearchBar {
    fn id(&self) -> ComponentId {
        ComponentId::SearchBar
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if !self.input.is_active() {
            return match key.code {
                KeyCode::Enter | KeyCode::Char('/') | KeyCode::Char('i') => self.begin(),
                _ => vec![],
            };
        }
        match self.input.handle_key(key) {
            InputAction::Submitted(raw) => vec![Action::EndEditing, Action::Search(raw)],
            InputAction::Cancelled => vec![Action::EndEditing],
            InputAction::Changed | InputAction::None => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::Down(_) if !self.input.is_active() => self.begin(),
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        match action {
            // `/` from any pane lands here.
            Action::FocusPane(ComponentId::SearchBar) if !self.input.is_active() => self.begin(),
            // Focus moved elsewhere (a click on another pane or view tab).
            Action::FocusPane(id) if *id != ComponentId::SearchBar && self.input.is_active() => {
                self.end_editing()
            }
            Action::SwitchView(View::Player) if self.input.is_active() => self.end_editing(),
            Action::Search(raw) => {
                self.input.set_value(raw.trim());
                vec![]
            }
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, _state: &AppState) {
        let block = pane_chrome("search", Some('1'), focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 {
            return;
        }
        self.input.draw(frame, inner);
        if focused && !self.input.is_active() && inner.height > 1 {
            let hint = Rect {
                y: inner.y + 1,
                height: 1,
                ..inner
            };
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  Enter or / to type a new search",
                    Style::default().fg(C_MUTED),
                )),
                hint,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn press(bar: &mut SearchBar, code: KeyCode) -> Vec<Action> {
        bar.handle_key(KeyEvent::new(code, KeyModifiers::NONE), &AppState::default())
    }

    #[test]
    fn test_type_and_submit_emits_raw_query() {
        let mut bar = SearchBar::new();
        assert!(matches!(&press(&mut bar, KeyCode::Enter)[..], [Action::BeginEditing]));
        for c in " serial ".chars() {
            press(&mut bar, KeyCode::Char(c));
        }
        let actions = press(&mut bar, KeyCode::Enter);
        assert!(matches!(&actions[..], [Action::EndEditing, Action::Search(q)] if q == " serial "));
        assert!(!bar.input.is_active());
    }

    #[test]
    fn test_focusing_clears_previous_query() {
        let mut bar = SearchBar::new();
        bar.on_action(&Action::Search("Serial".into()), &AppState::default());
        press(&mut bar, KeyCode::Char('/'));
        assert!(bar.input.is_active());
        let actions = press(&mut bar, KeyCode::Enter);
        assert!(matches!(&actions[..], [Action::EndEditing, Action::Search(q)] if q.is_empty()));
    }

    #[test]
    fn test_focus_elsewhere_ends_editing() {
        let mut bar = SearchBar::new();
        let state = AppState::default();
        press(&mut bar, KeyCode::Enter);
        assert!(bar
            .on_action(&Action::FocusPane(ComponentId::SearchBar), &state)
            .is_empty());

        let actions = bar.on_action(&Action::FocusPane(ComponentId::History), &state);
        assert!(matches!(&actions[..], [Action::EndEditing]));
        assert!(!bar.input.is_active());
        // Typing no longer lands in the field.
        assert!(press(&mut bar, KeyCode::Char('j')).is_empty());
        assert!(bar.on_action(&Action::FocusPane(ComponentId::Results), &state).is_empty());

        press(&mut bar, KeyCode::Enter);
        let actions = bar.on_action(&Action::SwitchView(View::Player), &state);
        assert!(matches!(&actions[..], [Action::EndEditing]));
    }

    #[test]
    fn test_escape_cancels() {
        let mut bar = SearchBar::new();
        press(&mut bar, KeyCode::Enter);
        assert!(matches!(&press(&mut bar, KeyCode::Esc)[..], [Action::EndEditing]));
    }
}
