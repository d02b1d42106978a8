//! QueueList component: queued episodes in play order.

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

use pod_proto::model::EpisodeSummary;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    text::truncate,
    theme::{C_DATE, C_MUTED, C_NUMBER_HINT, C_PLAYING, C_PRIMARY, C_SECONDARY, C_SELECTION_BG},
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
    },
};

pub struct QueueList {
    list: ScrollableList<EpisodeSummary>,
}

impl QueueList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(),
        }
    }

    fn selected_actions(&self, make: impl Fn(&EpisodeSummary) -> Action) -> Vec<Action> {
        self.list.selected_item().map(make).into_iter().collect()
    }
}

impl Default for QueueList {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for QueueList {
    fn id(&self) -> ComponentId {
        ComponentId::Queue
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
            KeyCode::Enter | KeyCode::Char('p') => {
                return self.selected_actions(|e| Action::Play(e.clone()))
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                return self.selected_actions(|e| Action::Dequeue(e.key()))
            }
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
                self.list.handle_click(rel_row);
            }
            MouseEventKind::Down(MouseButton::Right) => {
                if self.list.handle_click(rel_row) {
                    return self.selected_actions(|e| Action::Dequeue(e.key()));
                }
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        if matches!(action, Action::QueueChanged) {
            self.list.refresh_items(state.queue.clone());
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let count = self.list.len().to_string();
        let badge = (!self.list.is_empty()).then(|| Badge {
            text: &count,
            color: C_SECONDARY,
        });
        let block = pane_chrome("queue", Some('2'), focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.list.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  queue is empty: press a on an episode to add it",
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            return;
        }

        let rows = inner.height as usize;
        let width = inner.width as usize;
        self.list.ensure_visible(rows);
        let items: Vec<ListItem> = self
            .list
            .visible_items(rows)
            .map(|(idx, ep)| {
                let playing = state.is_now_playing(ep);
                let selected = idx == self.list.selected;
                let marker = if playing {
                    Span::styled(" ▶ ", Style::default().fg(C_PLAYING))
                } else {
                    Span::styled(format!("{:>2} ", idx + 1), Style::default().fg(C_NUMBER_HINT))
                };
                let date = ep.published_label();
                let title_w = width.saturating_sub(date.chars().count() + 6);
                let title_style = match (playing, selected && focused) {
                    (true, _) => Style::default().fg(C_PLAYING),
                    (false, true) => Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
                    (false, false) => Style::default().fg(C_SECONDARY),
                };
                let line = Line::from(vec![
                    marker,
                    Span::styled(truncate(&ep.title, title_w), title_style),
                    Span::raw("  "),
                    Span::styled(date, Style::default().fg(C_DATE)),
                ]);
                let bg = if selected {
                    Style::default().bg(C_SELECTION_BG)
                } else {
                    Style::default()
                };
                ListItem::new(line).style(bg)
            })
            .collect();
        frame.render_widget(List::new(items), inner);
    }
}
