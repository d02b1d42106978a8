//! HistoryList component: stored queries, oldest first.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_PRIMARY, C_SECONDARY, C_SELECTION_BG},
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
    },
};

pub struct HistoryList {
    list: ScrollableList<String>,
}

impl HistoryList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(),
        }
    }

    fn sync(&mut self, state: &AppState) {
        self.list.refresh_items(state.history.clone());
    }

    fn rerun_selected(&self) -> Vec<Action> {
        match self.list.selected_item() {
            Some(term) => vec![Action::Search(term.clone())],
            None => vec![],
        }
    }
}

impl Default for HistoryList {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for HistoryList {
    fn id(&self) -> ComponentId {
        ComponentId::History
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(1),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Enter => return self.rerun_selected(),
            KeyCode::Char('x') | KeyCode::Char('X') => return vec![Action::ResetHistory],
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        let rel_row = event.row.saturating_sub(area.y + 1) as usize;
        match event.kind {
            MouseEventKind::ScrollUp => self.list.select_up(1),
            MouseEventKind::ScrollDown => self.list.select_down(1),
            MouseEventKind::Down(MouseButton::Left) => {
                if self.list.handle_click(rel_row) {
                    return self.rerun_selected();
                }
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        if matches!(action, Action::HistoryChanged) {
            self.sync(state);
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let count = state.history.len().to_string();
        let badge = (!state.history.is_empty()).then(|| Badge {
            text: &count,
            color: C_SECONDARY,
        });
        let block = pane_chrome("history", Some('2'), focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.list.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  no searches yet", Style::default().fg(C_MUTED))),
                inner,
            );
            return;
        }

        let rows = inner.height as usize;
        self.list.ensure_visible(rows);
        let items: Vec<ListItem> = self
            .list
            .visible_items(rows)
            .map(|(idx, term)| {
                if idx == self.list.selected {
                    let style = Style::default().fg(C_PRIMARY);
                    let style = if focused {
                        style.add_modifier(Modifier::BOLD)
                    } else {
                        style
                    };
                    ListItem::new(Line::from(Span::styled(format!(" {}", term), style)))
                        .style(Style::default().bg(C_SELECTION_BG))
                } else {
                    ListItem::new(Line::from(Span::styled(
                        format!(" {}", term),
                        Style::default().fg(C_SECONDARY),
                    )))
                }
            })
            .collect();
        frame.render_widget(List::new(items), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn state_with(history: &[&str]) -> AppState {
        AppState {
            history: history.iter().map(|s| s.to_string()).collect(),
            ..AppState::default()
        }
    }

    #[test]
    fn test_enter_reissues_selected_query() {
        let state = state_with(&["Serial", "Radiolab"]);
        let mut history = HistoryList::new();
        history.on_action(&Action::HistoryChanged, &state);
        history.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE), &state);
        let actions = history.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &state);
        assert!(matches!(&actions[..], [Action::Search(q)] if q == "Radiolab"));
    }

    #[test]
    fn test_x_resets() {
        let state = state_with(&["Serial"]);
        let mut history = HistoryList::new();
        let actions =
            history.handle_key(KeyEvent::new(KeyCode::Char('X'), KeyModifiers::SHIFT), &state);
        assert!(matches!(&actions[..], [Action::ResetHistory]));
    }

    #[test]
    fn test_empty_history_enter_is_noop() {
        let mut history = HistoryList::new();
        let actions = history.handle_key(
            KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
            &AppState::default(),
        );
        assert!(actions.is_empty());
    }
}
