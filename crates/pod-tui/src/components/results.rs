//! Results component: feed cards from a search, or the episode cards of one
//! feed.
//!
//! The card list stays behind a loader until the eager artwork batch has
//! settled (see `reveal`).  Cards past the eager batch request their artwork
//! from `tick()` once they scroll into view.

use std::time::Instant;

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use pod_proto::model::{EpisodeSummary, FeedSummary};
use pod_proto::search::NO_RESULTS;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    reveal::{ArtworkState, ImageReveal},
    text::{plain_text, truncate},
    theme::{
        C_ARTWORK, C_DATE, C_ERROR, C_LOADING, C_MUTED, C_PLAYING, C_PRIMARY, C_SECONDARY,
        C_SELECTION_BG,
    },
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
    },
};

const CARD_HEIGHT: u16 = 3;

#[derive(Debug, Clone)]
enum CardKind {
    Feed(FeedSummary),
    Episode(EpisodeSummary),
}

#[derive(Debug, Clone)]
struct Card {
    kind: CardKind,
    /// Plain-text description, cleaned once when the card is built.
    blurb: String,
}

impl Card {
    fn feed(feed: FeedSummary) -> Self {
        Self {
            blurb: plain_text(&feed.description),
            kind: CardKind::Feed(feed),
        }
    }

    fn episode(episode: EpisodeSummary) -> Self {
        Self {
            blurb: plain_text(&episode.description),
            kind: CardKind::Episode(episode),
        }
    }

    fn title(&self) -> &str {
        match &self.kind {
            CardKind::Feed(f) => &f.title,
            CardKind::Episode(e) => &e.title,
        }
    }

    fn artwork_url(&self) -> Option<String> {
        match &self.kind {
            CardKind::Feed(f) => f.artwork_url().map(str::to_string),
            CardKind::Episode(e) => e.artwork_url().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Feeds,
    Episodes { feed_title: String },
}

pub struct ResultsPanel {
    list: ScrollableList<Card>,
    mode: Mode,
    /// Last feed result set, restored by Back.
    feeds: Vec<FeedSummary>,
    reveal: ImageReveal,
    /// A request is in flight.  Prior cards stay visible meanwhile.
    pending: bool,
    message: Option<String>,
    /// Cards that fit in the pane at the last draw.
    cards_per_page: usize,
    last_click: Option<(usize, Instant)>,
}

impl ResultsPanel {
    pub fn new(eager_images: usize) -> Self {
        Self {
            list: ScrollableList::new(),
            mode: Mode::Feeds,
            feeds: Vec::new(),
            reveal: ImageReveal::new(eager_images),
            pending: false,
            message: None,
            cards_per_page: 1,
            last_click: None,
        }
    }

    fn show_cards(&mut self, cards: Vec<Card>) -> Vec<Action> {
        self.pending = false;
        self.message = None;
        let sources = cards.iter().map(Card::artwork_url).collect();
        self.list.set_items(cards);
        let step = self.reveal.reset(sources);
        if step.requests.is_empty() {
            vec![]
        } else {
            vec![Action::FetchArtwork(step.requests)]
        }
    }

    fn show_feeds(&mut self, feeds: &[FeedSummary]) -> Vec<Action> {
        self.mode = Mode::Feeds;
        self.feeds = feeds.to_vec();
        self.show_cards(feeds.iter().cloned().map(Card::feed).collect())
    }

    fn activate_selected(&self) -> Vec<Action> {
        match self.list.selected_item().map(|c| &c.kind) {
            Some(CardKind::Feed(f)) => vec![Action::OpenFeed(f.clone())],
            Some(CardKind::Episode(e)) => vec![Action::Play(e.clone())],
            None => vec![],
        }
    }

    fn selected_episode(&self) -> Option<&EpisodeSummary> {
        match self.list.selected_item().map(|c| &c.kind) {
            Some(CardKind::Episode(e)) => Some(e),
            _ => None,
        }
    }

    fn artwork_glyph(&self, idx: usize) -> (String, Color) {
        match self.reveal.slot(idx) {
            Some(ArtworkState::Loaded { width, height }) => {
                (format!("▣ {}×{}", width, height), C_ARTWORK)
            }
            Some(ArtworkState::Fallback) => ("♪".to_string(), C_MUTED),
            _ => ("·".to_string(), C_MUTED),
        }
    }

    fn card_lines(
        &self,
        idx: usize,
        card: &Card,
        width: usize,
        selected: bool,
        state: &AppState,
    ) -> Vec<Line<'static>> {
        let (art, art_color) = self.artwork_glyph(idx);
        let (marker, meta) = match &card.kind {
            CardKind::Feed(f) => (
                Span::raw("  "),
                format!("{} episodes · newest {}", f.episode_count, f.newest_label()),
            ),
            CardKind::Episode(e) => {
                let marker = if state.is_now_playing(e) {
                    Span::styled("▶ ", Style::default().fg(C_PLAYING))
                } else {
                    Span::raw("  ")
                };
                (marker, e.published_label())
            }
        };
        let title_style = if selected {
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_PRIMARY)
        };
        let inner_w = width.saturating_sub(4);
        vec![
            Line::from(vec![
                marker,
                Span::styled(truncate(card.title(), inner_w), title_style),
            ]),
            Line::from(vec![
                Span::raw("  "),
                Span::styled(meta, Style::default().fg(C_DATE)),
                Span::raw("  "),
                Span::styled(art, Style::default().fg(art_color)),
            ]),
            Line::from(vec![
                Span::raw("  "),
                Span::styled(truncate(&card.blurb, inner_w), Style::default().fg(C_SECONDARY)),
            ]),
        ]
    }
}

impl Component for ResultsPanel {
    fn id(&self) -> ComponentId {
        ComponentId::Results
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
            5
        } else {
            1
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(step),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(step),
            KeyCode::PageUp => self.list.select_up(self.cards_per_page.max(1)),
            KeyCode::PageDown => self.list.select_down(self.cards_per_page.max(1)),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Enter => return self.activate_selected(),
            KeyCode::Char('p') => {
                if let Some(e) = self.selected_episode() {
                    return vec![Action::Play(e.clone())];
                }
            }
            KeyCode::Char('a') => {
                if let Some(e) = self.selected_episode() {
                    return vec![Action::Enqueue(e.clone())];
                }
            }
            KeyCode::Backspace | KeyCode::Esc | KeyCode::Char('h') => {
                if matches!(self.mode, Mode::Episodes { .. }) {
                    return vec![Action::BackToFeeds];
                }
            }
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => self.list.select_up(1),
            MouseEventKind::ScrollDown => self.list.select_down(1),
            MouseEventKind::Down(MouseButton::Left) => {
                let slot = (event.row.saturating_sub(area.y + 1) / CARD_HEIGHT) as usize;
                let now = Instant::now();
                let is_double = self
                    .last_click
                    .map(|(s, t)| s == slot && t.elapsed().as_millis() < 400)
                    .unwrap_or(false);
                if self.list.handle_click(slot) {
                    if is_double {
                        self.last_click = None;
                        return self.activate_selected();
                    }
                    self.last_click = Some((slot, now));
                }
            }
            _ => {}
        }
        vec![]
    }

    fn tick(&mut self, _state: &AppState) -> Vec<Action> {
        let requests = self
            .reveal
            .on_viewport(self.list.viewport(self.cards_per_page));
        if requests.is_empty() {
            vec![]
        } else {
            vec![Action::FetchArtwork(requests)]
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        match action {
            Action::ResultsPending => {
                self.pending = true;
                vec![]
            }
            Action::FeedsLoaded(feeds) => self.show_feeds(feeds),
            Action::EpisodesLoaded { feed, episodes } => {
                self.mode = Mode::Episodes {
                    feed_title: feed.title.clone(),
                };
                self.show_cards(episodes.iter().cloned().map(Card::episode).collect())
            }
            Action::ResultsMessage(msg) => {
                self.pending = false;
                self.message = Some(msg.clone());
                self.list.clear();
                self.reveal.conceal();
                vec![]
            }
            Action::BackToFeeds => {
                let feeds = std::mem::take(&mut self.feeds);
                self.show_feeds(&feeds)
            }
            Action::ArtworkSettled {
                generation,
                index,
                outcome,
            } => {
                if self.reveal.on_settled(*generation, *index, outcome.clone()) {
                    self.list.select_first();
                }
                vec![]
            }
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let title = match &self.mode {
            Mode::Feeds => "results".to_string(),
            Mode::Episodes { feed_title } => format!("episodes · {}", feed_title),
        };
        let count = self.list.len().to_string();
        let badge = if self.pending || (!self.list.is_empty() && !self.reveal.is_revealed()) {
            Some(Badge {
                text: "loading",
                color: C_LOADING,
            })
        } else if !self.list.is_empty() {
            Some(Badge {
                text: &count,
                color: C_SECONDARY,
            })
        } else {
            None
        };
        let block = pane_chrome(&title, Some('3'), focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.cards_per_page = ((inner.height / CARD_HEIGHT) as usize).max(1);

        if let Some(msg) = &self.message {
            let color = if msg.starts_with("Error") { C_ERROR } else { C_MUTED };
            frame.render_widget(
                Paragraph::new(Span::styled(format!("  {}", msg), Style::default().fg(color))),
                inner,
            );
            return;
        }
        if self.list.is_empty() {
            let hint = if self.pending {
                "  searching…".to_string()
            } else if matches!(self.mode, Mode::Episodes { .. }) {
                format!("  {}", NO_RESULTS)
            } else {
                "  type a podcast title to search".to_string()
            };
            frame.render_widget(
                Paragraph::new(Span::styled(hint, Style::default().fg(C_MUTED))),
                inner,
            );
            return;
        }
        if !self.reveal.is_revealed() {
            let msg = format!("  loading artwork ({} left)…", self.reveal.pending());
            frame.render_widget(
                Paragraph::new(Span::styled(msg, Style::default().fg(C_LOADING))),
                inner,
            );
            return;
        }

        self.list.ensure_visible(self.cards_per_page);
        let width = inner.width as usize;
        let mut y = inner.y;
        let cards: Vec<(usize, Card)> = self
            .list
            .visible_items(self.cards_per_page)
            .map(|(i, c)| (i, c.clone()))
            .collect();
        for (idx, card) in cards {
            let selected = idx == self.list.selected;
            let rect = Rect {
                x: inner.x,
                y,
                width: inner.width,
                height: CARD_HEIGHT.min(inner.y + inner.height - y),
            };
            let style = if selected && focused {
                Style::default().bg(C_SELECTION_BG)
            } else {
                Style::default()
            };
            frame.render_widget(
                Paragraph::new(self.card_lines(idx, &card, width, selected, state)).style(style),
                rect,
            );
            y += CARD_HEIGHT;
        }
    }
}
