//! PlayerPanel component: now-playing details, transport and seek bar.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use pod_proto::playback::PlaybackStatus;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    text::truncate,
    theme::{C_ACCENT, C_ARTWORK, C_DATE, C_LOADING, C_MUTED, C_PLAYING, C_PRIMARY, C_SECONDARY},
    widgets::{pane_chrome::pane_chrome, progress_bar::draw_seek_bar},
};

/// Arrow-key skip distance, seconds.
pub const SKIP_SECS: f64 = 15.0;

pub struct PlayerPanel {
    /// Seek bar rect from the last draw.
    bar: Option<Rect>,
    /// Play/pause button rect from the last draw.
    button: Option<Rect>,
}

impl PlayerPanel {
    pub fn new() -> Self {
        Self {
            bar: None,
            button: None,
        }
    }

    fn contains(rect: Option<Rect>, col: u16, row: u16) -> Option<Rect> {
        rect.filter(|r| {
            col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height
        })
    }
}

impl Default for PlayerPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for PlayerPanel {
    fn id(&self) -> ComponentId {
        ComponentId::Player
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !state.player.has_source() {
            return vec![];
        }
        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => vec![Action::TogglePause],
            KeyCode::Left | KeyCode::Char('h') => vec![Action::Skip(-SKIP_SECS)],
            KeyCode::Right | KeyCode::Char('l') => vec![Action::Skip(SKIP_SECS)],
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        if !matches!(event.kind, MouseEventKind::Down(MouseButton::Left))
            || !state.player.has_source()
        {
            return vec![];
        }
        if let Some(bar) = Self::contains(self.bar, event.column, event.row) {
            return vec![Action::SeekClick {
                offset_x: (event.column - bar.x) as f64,
                width: bar.width as f64,
            }];
        }
        if Self::contains(self.button, event.column, event.row).is_some() {
            return vec![Action::TogglePause];
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let view = &state.player;
        let block = pane_chrome("now playing", Some('1'), focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.bar = None;
        self.button = None;

        if !view.has_source() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  nothing playing: pick an episode in the Search view (F1)",
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            return;
        }

        let [title_row, meta_row, _, bar_row, _, button_row] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let width = inner.width as usize;
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {}", truncate(&view.title, width.saturating_sub(2))),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ))),
            title_row,
        );

        let mut meta = vec![Span::styled(
            format!(" {}", view.date_label),
            Style::default().fg(C_DATE),
        )];
        if !view.image.is_empty() {
            meta.push(Span::styled("  ▣ ", Style::default().fg(C_ARTWORK)));
            meta.push(Span::styled(
                truncate(&view.image, width.saturating_sub(view.date_label.len() + 6)),
                Style::default().fg(C_MUTED),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(meta)), meta_row);

        let bar_area = Rect {
            x: bar_row.x + 1,
            width: bar_row.width.saturating_sub(2),
            ..bar_row
        };
        self.bar = draw_seek_bar(frame, bar_area, view);

        let (status_text, status_color) = match view.status {
            PlaybackStatus::Idle => ("stopped", C_MUTED),
            PlaybackStatus::Loading => ("loading", C_LOADING),
            PlaybackStatus::Playing => ("playing", C_PLAYING),
            PlaybackStatus::Paused => ("paused", C_SECONDARY),
        };
        let button_text = format!(" [ {} {} ] ", view.toggle_icon(), view.toggle_label());
        let button_w = button_text.chars().count() as u16;
        self.button = Some(Rect {
            width: button_w.min(button_row.width),
            ..button_row
        });
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(
                    button_text,
                    Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
                ),
                Span::styled(status_text, Style::default().fg(status_color)),
                Span::styled("   ←/→ 15s", Style::default().fg(C_MUTED)),
            ])),
            button_row,
        );
    }
}
