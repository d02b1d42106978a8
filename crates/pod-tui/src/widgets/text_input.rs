//! TextInput: tui-input wrapper for the search bar.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_INPUT_BG, C_INPUT_FG, C_MUTED};

#[derive(Debug, PartialEq)]
pub enum InputAction {
    Changed,
    Submitted(String),
    Cancelled,
    None,
}

pub struct TextInput {
    input: Input,
    active: bool,
    placeholder: String,
}

impl TextInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            active: false,
            placeholder: placeholder.into(),
        }
    }

    /// Start editing.  Any previous text is discarded so a fresh query
    /// always starts from an empty field.
    pub fn activate(&mut self) {
        self.active = true;
        self.input = Input::default();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn set_value(&mut self, value: &str) {
        self.input = Input::new(value.to_string());
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        if !self.active {
            return InputAction::None;
        }
        match key.code {
            KeyCode::Esc => {
                self.deactivate();
                InputAction::Cancelled
            }
            KeyCode::Enter => {
                self.deactivate();
                InputAction::Submitted(self.input.value().to_string())
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                InputAction::Changed
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        if area.width < 3 || area.height == 0 {
            return;
        }
        let scroll = self
            .input
            .visual_scroll(area.width.saturating_sub(3) as usize);
        let value = self.input.value();
        let display = if value.is_empty() && !self.active {
            Span::styled(
                format!("> {}", self.placeholder),
                Style::default().fg(C_MUTED),
            )
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(format!("> {}", visible), Style::default().fg(C_INPUT_FG))
        };
        let line = Rect { height: 1, ..area };
        frame.render_widget(
            Paragraph::new(Line::from(display)).style(Style::default().bg(C_INPUT_BG)),
            line,
        );

        if self.active {
            let cursor_x = area.x + 2 + (self.input.visual_cursor() - scroll) as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width - 1), area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_activate_clears_previous_text() {
        let mut input = TextInput::new("podcast title");
        input.set_value("Serial");
        input.activate();
        assert_eq!(input.input.value(), "");
        assert!(input.is_active());
    }

    #[test]
    fn test_typing_and_submit() {
        let mut input = TextInput::new("podcast title");
        input.activate();
        for c in "abc".chars() {
            assert_eq!(input.handle_key(key(KeyCode::Char(c))), InputAction::Changed);
        }
        assert_eq!(
            input.handle_key(key(KeyCode::Enter)),
            InputAction::Submitted("abc".into())
        );
        assert!(!input.is_active());
    }

    #[test]
    fn test_inactive_ignores_keys() {
        let mut input = TextInput::new("");
        assert_eq!(input.handle_key(key(KeyCode::Char('x'))), InputAction::None);
        assert_eq!(input.input.value(), "");
    }
}
