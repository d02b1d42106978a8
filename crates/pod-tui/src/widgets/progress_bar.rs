//! Seek bar: smooth Unicode fill flanked by elapsed and total labels.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use pod_proto::playback::PlayerView;

use crate::theme::{C_LOADING, C_MUTED, C_PLAYING, C_SECONDARY};

const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Fill string for `progress` (0.0..=1.0) across `width` cells.
pub fn bar_fill(progress: f64, width: usize) -> String {
    let eighths = (progress.clamp(0.0, 1.0) * width as f64 * 8.0) as usize;
    let full = (eighths / 8).min(width);
    let mut bar = String::with_capacity(width * 3);
    for _ in 0..full {
        bar.push('█');
    }
    if full < width {
        bar.push(BLOCKS[eighths % 8]);
        for _ in (full + 1)..width {
            bar.push('░');
        }
    }
    bar
}

/// Draw the seek bar for `view` into one row of `area`.  Returns the rect of
/// the bar itself so clicks can be mapped to a position.
pub fn draw_seek_bar(frame: &mut Frame, area: Rect, view: &PlayerView) -> Option<Rect> {
    if area.width < 8 || area.height == 0 {
        return None;
    }
    let row = Rect { height: 1, ..area };

    if view.loading {
        let line = Line::from(Span::styled(
            " loading…",
            Style::default().fg(C_LOADING).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line), row);
        return None;
    }

    let (left, right) = if view.times_visible {
        (
            format!("{} ", view.elapsed_text),
            format!(" {}", view.total_text),
        )
    } else {
        (String::new(), String::new())
    };
    let label_w = (left.chars().count() + right.chars().count()) as u16;
    let bar_w = area.width.saturating_sub(label_w).max(4);

    let spans = vec![
        Span::styled(left.clone(), Style::default().fg(C_SECONDARY)),
        Span::styled(
            bar_fill(view.progress(), bar_w as usize),
            Style::default().fg(C_PLAYING),
        ),
        Span::styled(right, Style::default().fg(C_MUTED)),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), row);

    Some(Rect {
        x: row.x + left.chars().count() as u16,
        width: bar_w,
        ..row
    })
}
