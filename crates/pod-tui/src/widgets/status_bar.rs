//! Header tabs and footer bars: view tabs, keybindings, last log line.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use pod_proto::playback::{PlaybackStatus, PlayerView};

use crate::action::View;
use crate::theme::{
    C_ACCENT, C_LOADING, C_MODE_EDITING, C_MODE_NORMAL, C_MUTED, C_PLAYING, C_PRIMARY,
    C_SECONDARY,
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Editing => "SEARCH",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Editing => C_MODE_EDITING,
        }
    }
}

fn status_dot(status: PlaybackStatus) -> Span<'static> {
    let color = match status {
        PlaybackStatus::Idle => C_MUTED,
        PlaybackStatus::Loading => C_LOADING,
        PlaybackStatus::Playing => C_PLAYING,
        PlaybackStatus::Paused => C_SECONDARY,
    };
    Span::styled("●", Style::default().fg(color))
}

const BRAND: &str = " p0dcast ";
const SEARCH_TAB: &str = "Search [F1]";
const PLAYER_TAB: &str = "Player [F2]";

/// Which tab sits at `column` of the nav row, if any.
pub fn nav_tab_at(area: Rect, column: u16) -> Option<View> {
    let brand_end = area.x + BRAND.chars().count() as u16;
    let search_end = brand_end + SEARCH_TAB.chars().count() as u16 + 2;
    let player_end = search_end + PLAYER_TAB.chars().count() as u16 + 2;
    match column {
        c if c >= brand_end && c < search_end => Some(View::Search),
        c if c >= search_end && c < player_end => Some(View::Player),
        _ => None,
    }
}

/// Top row: view tabs plus a compact now-playing label.
pub fn draw_nav_bar(frame: &mut Frame, area: Rect, view: View, player: &PlayerView) {
    let tab = |label: &'static str, active: bool| {
        if active {
            Span::styled(
                format!(" {} ", label),
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(format!(" {} ", label), Style::default().fg(C_MUTED))
        }
    };
    let mut spans = vec![
        Span::styled(
            BRAND,
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        tab(SEARCH_TAB, view == View::Search),
        tab(PLAYER_TAB, view == View::Player),
    ];
    if player.has_source() {
        spans.push(Span::raw("  "));
        spans.push(status_dot(player.status));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            player.title.clone(),
            Style::default().fg(C_SECONDARY),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the log bar: last log line.
pub fn draw_log_bar(frame: &mut Frame, area: Rect, last_log: Option<&str>) {
    let line = Line::from(Span::styled(
        last_log.unwrap_or(""),
        Style::default().fg(C_SECONDARY),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

pub fn keys_for(mode: InputMode, view: View) -> &'static str {
    match (mode, view) {
        (InputMode::Editing, _) => " type a title  Enter search  Esc cancel",
        (InputMode::Normal, View::Search) => {
            " / search  ↑↓/jk select  Enter open/play  a queue  Backspace feeds  x clear history  Tab panes  F2 player  q quit"
        }
        (InputMode::Normal, View::Player) => {
            " Space play/pause  ←→ skip 15s  click bar seek  ↑↓ select  Enter play  d remove  Tab panes  F1 search  q quit"
        }
    }
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, view: View) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default().fg(mode.color()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys_for(mode, view), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
