//! App: component-based event loop.
//!
//! - `App` owns every component and the `AppState` they read.
//! - Background tasks (terminal input, player broadcasts, HTTP requests,
//!   artwork loads) report in over one `mpsc` channel of `AppMessage`s.
//! - Components return `Vec<Action>`; the App queues and applies them.
//! - Playback commands flow out to the `PlayerCore` over its own channel.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    Terminal,
};
use tokio::sync::{broadcast, mpsc, Semaphore};
use tracing::{debug, info, warn};

use pod_proto::api::{ApiError, PodcastApi};
use pod_proto::config::Config;
use pod_proto::model::{EpisodeKey, EpisodeSummary, FeedSummary};
use pod_proto::playback::PlayerView;
use pod_proto::queue::QueueManager;
use pod_proto::search::{prepare_query, RequestSequencer, NO_RESULTS};
use pod_proto::store::PreferenceStore;

use crate::artwork::ArtworkLoader;
use crate::core::{PlayerCommand, PlayerEvent};
use crate::reveal::{ArtworkOutcome, ArtworkRequest};
use crate::BroadcastMessage;
use crate::{
    action::{Action, ComponentId, View},
    app_state::AppState,
    component::Component,
    components::{
        history_list::HistoryList, player_panel::PlayerPanel, queue_list::QueueList,
        results::ResultsPanel, search_bar::SearchBar,
    },
    widgets::{
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
    workspace::ViewManager,
};

/// Concurrent artwork downloads.
const ARTWORK_CONCURRENCY: usize = 6;

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    PlayerUpdated(PlayerView),
    Ended(EpisodeKey),
    Log(String),
    Error(String),
    SearchDone {
        seq: u64,
        result: Result<Vec<FeedSummary>, ApiError>,
    },
    EpisodesDone {
        seq: u64,
        feed: FeedSummary,
        result: Result<Option<Vec<EpisodeSummary>>, ApiError>,
    },
    ArtworkSettled {
        generation: u64,
        index: usize,
        outcome: ArtworkOutcome,
    },
}

#[derive(Default, Clone, Copy)]
struct PaneAreas {
    nav: Rect,
    search_bar: Rect,
    history: Rect,
    results: Rect,
    player: Rect,
    queue: Rect,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    config: Config,
    pub state: AppState,

    // ── Components ────────────────────────────────────────────────────────────
    search_bar: SearchBar,
    history: HistoryList,
    results: ResultsPanel,
    player: PlayerPanel,
    queue_list: QueueList,

    vm: ViewManager,
    pane_areas: PaneAreas,
    toast: ToastManager,

    // ── Services ──────────────────────────────────────────────────────────────
    store: Arc<PreferenceStore>,
    queue: QueueManager,
    api: PodcastApi,
    artwork: ArtworkLoader,
    artwork_slots: Arc<Semaphore>,
    sequencer: RequestSequencer,
    player_tx: mpsc::Sender<PlayerEvent>,
    msg_tx: Option<mpsc::Sender<AppMessage>>,

    /// Actions waiting to be applied, in order.
    pending_actions: VecDeque<Action>,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        store: Arc<PreferenceStore>,
        api: PodcastApi,
        artwork: ArtworkLoader,
        player_tx: mpsc::Sender<PlayerEvent>,
    ) -> Self {
        let queue = QueueManager::new(store.clone());
        let state = AppState {
            history: store.search_history(),
            queue: queue.entries().to_vec(),
            ..AppState::default()
        };
        Self {
            results: ResultsPanel::new(config.ui.eager_images),
            config,
            state,
            search_bar: SearchBar::new(),
            history: HistoryList::new(),
            player: PlayerPanel::new(),
            queue_list: QueueList::new(),
            vm: ViewManager::default(),
            pane_areas: PaneAreas::default(),
            toast: ToastManager::new(),
            store,
            queue,
            api,
            artwork,
            artwork_slots: Arc::new(Semaphore::new(ARTWORK_CONCURRENCY)),
            sequencer: RequestSequencer::new(),
            player_tx,
            msg_tx: None,
            pending_actions: VecDeque::new(),
            should_quit: false,
        }
    }

    pub async fn run(
        mut self,
        mut broadcast_rx: broadcast::Receiver<BroadcastMessage>,
    ) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        let width = terminal.size()?.width;
        debug!("run(): terminal width {}", width);

        let (tx, mut rx) = mpsc::channel::<AppMessage>(1024);
        self.msg_tx = Some(tx.clone());

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: broadcast receiver (PlayerCore → AppMessage) ─────
        let bc_tx = tx.clone();
        tokio::spawn(async move {
            loop {
                match broadcast_rx.recv().await {
                    Ok(msg) => {
                        let app_msg = match msg {
                            BroadcastMessage::PlayerUpdated(view) => AppMessage::PlayerUpdated(view),
                            BroadcastMessage::Ended(key) => AppMessage::Ended(key),
                            BroadcastMessage::Log(s) => AppMessage::Log(s),
                            BroadcastMessage::Error(s) => AppMessage::Error(s),
                        };
                        if bc_tx.send(app_msg).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("broadcast receiver lagged by {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        self.startup(width).await;

        // Toast expiry and spinner animation.
        let mut toast_tick = tokio::time::interval(Duration::from_millis(100));
        toast_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // Component maintenance: lazy artwork for cards scrolled into view.
        let mut ui_tick = tokio::time::interval(Duration::from_millis(150));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    const MAX_DRAIN: usize = 256;
                    self.handle_message(msg).await;
                    let mut drained = 0usize;
                    while drained < MAX_DRAIN {
                        let Ok(next) = rx.try_recv() else { break };
                        drained += 1;
                        self.handle_message(next).await;
                    }
                    needs_redraw = true;
                }

                _ = ui_tick.tick() => {
                    let tick_actions: Vec<Action> = {
                        let s = &self.state;
                        let mut all = Vec::new();
                        all.extend(self.search_bar.tick(s));
                        all.extend(self.history.tick(s));
                        all.extend(self.results.tick(s));
                        all.extend(self.player.tick(s));
                        all.extend(self.queue_list.tick(s));
                        all
                    };
                    if !tick_actions.is_empty() {
                        for action in tick_actions {
                            self.dispatch(action);
                        }
                        self.drain_actions().await;
                        needs_redraw = true;
                    }
                }

                _ = toast_tick.tick() => {
                    if !self.toast.is_empty() {
                        self.toast.tick();
                        needs_redraw = true;
                    }
                }
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        info!("p0dcast shutting down");
        let _ = self.player_tx.send(PlayerEvent::Shutdown).await;
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        Ok(())
    }

    /// Sync components with persisted state and resume the last episode.
    async fn startup(&mut self, width: u16) {
        self.dispatch(Action::HistoryChanged);
        self.dispatch(Action::QueueChanged);
        if let Some(snapshot) = self.store.player_state() {
            info!("resuming {} at {:.1}s", snapshot.title, snapshot.current_time);
            if width < self.config.ui.narrow_width {
                self.dispatch(Action::SwitchView(View::Player));
            }
            self.send_player(PlayerCommand::Resume(snapshot)).await;
        }
        self.drain_actions().await;
        self.state.last_log = Some(format!("api: {}", self.api.base_url()));
    }

    // ── Message handling ──────────────────────────────────────────────────────

    async fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                if key.kind == KeyEventKind::Release {
                    return;
                }
                for action in self.handle_key(key) {
                    self.dispatch(action);
                }
            }
            AppMessage::Event(Event::Mouse(mouse)) => {
                for action in self.handle_mouse(mouse) {
                    self.dispatch(action);
                }
            }
            AppMessage::Event(_) => {}
            AppMessage::PlayerUpdated(view) => {
                self.state.player = view;
            }
            AppMessage::Ended(key) => self.on_ended(key).await,
            AppMessage::Log(line) => {
                info!("{}", line);
                self.state.last_log = Some(line);
            }
            AppMessage::Error(err) => {
                warn!("{}", err);
                self.toast.error(err.clone());
                self.state.last_log = Some(err);
            }
            AppMessage::SearchDone { seq, result } => {
                if !self.sequencer.is_current(seq) {
                    debug!("discarding stale search response #{}", seq);
                    return;
                }
                self.toast.dismiss_spinner();
                let action = match result {
                    Ok(feeds) if feeds.is_empty() => Action::ResultsMessage(NO_RESULTS.into()),
                    Ok(feeds) => {
                        info!("search #{}: {} feeds", seq, feeds.len());
                        Action::FeedsLoaded(feeds)
                    }
                    Err(e) => {
                        warn!("search #{} failed: {}", seq, e);
                        Action::ResultsMessage(e.display_message())
                    }
                };
                self.dispatch(action);
            }
            AppMessage::EpisodesDone { seq, feed, result } => {
                if !self.sequencer.is_current(seq) {
                    debug!("discarding stale episodes response #{}", seq);
                    return;
                }
                self.toast.dismiss_spinner();
                match result {
                    Ok(Some(episodes)) => {
                        info!("episodes #{}: {} for {}", seq, episodes.len(), feed.title);
                        self.dispatch(Action::EpisodesLoaded { feed, episodes });
                    }
                    Ok(None) => debug!("episodes #{}: feed has no id", seq),
                    Err(e) => {
                        warn!("episodes #{} failed: {}", seq, e);
                        self.dispatch(Action::ResultsMessage(e.display_message()));
                    }
                }
            }
            AppMessage::ArtworkSettled {
                generation,
                index,
                outcome,
            } => self.dispatch(Action::ArtworkSettled {
                generation,
                index,
                outcome,
            }),
        }
        self.drain_actions().await;
    }

    /// Auto-advance to the queued entry after the one that finished.
    async fn on_ended(&mut self, key: EpisodeKey) {
        match self.queue.next_after(&key).cloned() {
            Some(next) => {
                info!("ended {}, advancing to {}", key, next.title);
                self.toast.info(format!("Up next: {}", next.title));
                self.send_player(PlayerCommand::Load(next)).await;
            }
            None => {
                self.state.last_log = Some("Episode finished".into());
            }
        }
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            return vec![Action::Quit];
        }

        // The search bar captures everything while editing.
        if self.state.input_mode == InputMode::Editing {
            return self.search_bar.handle_key(key, &self.state);
        }

        match key.code {
            KeyCode::Char('q') if key.modifiers == KeyModifiers::NONE => {
                return vec![Action::Quit];
            }
            KeyCode::F(1) => return vec![Action::SwitchView(View::Search)],
            KeyCode::F(2) => return vec![Action::SwitchView(View::Player)],
            KeyCode::Tab => return vec![Action::FocusNext],
            KeyCode::BackTab => return vec![Action::FocusPrev],
            KeyCode::Char('/') => return vec![Action::FocusPane(ComponentId::SearchBar)],
            KeyCode::Char('K') => {
                self.vm.show_keys_bar = !self.vm.show_keys_bar;
                return vec![];
            }
            KeyCode::Char(c @ '1'..='3') => {
                self.vm.focus_nth(c as usize - '1' as usize);
                return vec![];
            }
            KeyCode::Char(' ')
                if self.vm.focused() != Some(ComponentId::Player)
                    && self.state.player.has_source() =>
            {
                return vec![Action::TogglePause];
            }
            _ => {}
        }

        let s = &self.state;
        match self.vm.focused() {
            Some(ComponentId::SearchBar) => self.search_bar.handle_key(key, s),
            Some(ComponentId::History) => self.history.handle_key(key, s),
            Some(ComponentId::Results) => self.results.handle_key(key, s),
            Some(ComponentId::Player) => self.player.handle_key(key, s),
            Some(ComponentId::Queue) => self.queue_list.handle_key(key, s),
            None => vec![],
        }
    }

    // ── Mouse handling ────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        let is_click = matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        );
        if !is_click {
            return vec![];
        }
        let (col, row) = (event.column, event.row);

        fn hit(r: Rect, col: u16, row: u16) -> bool {
            r.width > 0
                && r.height > 0
                && col >= r.x
                && col < r.x + r.width
                && row >= r.y
                && row < r.y + r.height
        }

        let areas = self.pane_areas;
        if hit(areas.nav, col, row) {
            return match status_bar::nav_tab_at(areas.nav, col) {
                Some(view) if matches!(event.kind, MouseEventKind::Down(_)) => {
                    vec![Action::SwitchView(view)]
                }
                _ => vec![],
            };
        }

        let s = &self.state;
        let (id, mut actions) = if hit(areas.search_bar, col, row) {
            let a = self.search_bar.handle_mouse(event, areas.search_bar, s);
            (ComponentId::SearchBar, a)
        } else if hit(areas.history, col, row) {
            let a = self.history.handle_mouse(event, areas.history, s);
            (ComponentId::History, a)
        } else if hit(areas.results, col, row) {
            let a = self.results.handle_mouse(event, areas.results, s);
            (ComponentId::Results, a)
        } else if hit(areas.player, col, row) {
            let a = self.player.handle_mouse(event, areas.player, s);
            (ComponentId::Player, a)
        } else if hit(areas.queue, col, row) {
            let a = self.queue_list.handle_mouse(event, areas.queue, s);
            (ComponentId::Queue, a)
        } else {
            return vec![];
        };
        if self.vm.focused() != Some(id) {
            actions.insert(0, Action::FocusPane(id));
        }
        actions
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        self.pending_actions.push_back(action);
    }

    /// Apply queued actions until none are left.  Every action is offered to
    /// all components first; whatever they return is queued behind it.
    async fn drain_actions(&mut self) {
        while let Some(action) = self.pending_actions.pop_front() {
            let secondary: Vec<Action> = {
                let s = &self.state;
                let mut out = Vec::new();
                out.extend(self.search_bar.on_action(&action, s));
                out.extend(self.history.on_action(&action, s));
                out.extend(self.results.on_action(&action, s));
                out.extend(self.player.on_action(&action, s));
                out.extend(self.queue_list.on_action(&action, s));
                out
            };
            self.apply_action(action).await;
            self.pending_actions.extend(secondary);
        }
    }

    async fn apply_action(&mut self, action: Action) {
        match &action {
            Action::ArtworkSettled { .. } | Action::FetchArtwork(_) => {}
            _ => debug!("apply_action: {:?}", action),
        }
        match action {
            // ── Search ────────────────────────────────────────────────────────
            Action::Search(raw) => self.start_search(&raw),
            Action::ResetHistory => match self.store.reset_search_history() {
                Ok(()) => {
                    self.state.history.clear();
                    self.dispatch(Action::HistoryChanged);
                    self.toast.info("Search history cleared");
                }
                Err(e) => {
                    warn!("resetting search history: {:#}", e);
                    self.toast.error("Could not clear search history");
                }
            },
            Action::OpenFeed(feed) => self.open_feed(feed),
            Action::BackToFeeds => {
                // Invalidate an episode request still in flight.
                self.sequencer.issue();
                self.toast.dismiss_spinner();
            }
            Action::FetchArtwork(requests) => self.fetch_artwork(requests),

            // ── Queue ─────────────────────────────────────────────────────────
            Action::Enqueue(episode) => {
                let title = episode.title.clone();
                match self.queue.enqueue(episode) {
                    Ok(()) => self.toast.success(format!("Queued: {}", title)),
                    Err(e) => {
                        warn!("enqueue failed: {:#}", e);
                        self.toast.error("Could not save the queue");
                    }
                }
                self.sync_queue();
            }
            Action::Dequeue(key) => {
                if let Err(e) = self.queue.remove(&key) {
                    warn!("dequeue failed: {:#}", e);
                    self.toast.error("Could not save the queue");
                }
                self.sync_queue();
            }

            // ── Playback ──────────────────────────────────────────────────────
            Action::Play(episode) => {
                self.toast.info(format!("Loading: {}", episode.title));
                self.send_player(PlayerCommand::Load(episode)).await;
            }
            Action::TogglePause => self.send_player(PlayerCommand::TogglePause).await,
            Action::Skip(delta) => self.send_player(PlayerCommand::Skip(delta)).await,
            Action::SeekClick { offset_x, width } => {
                self.send_player(PlayerCommand::SeekClick { offset_x, width })
                    .await
            }

            // ── Navigation ────────────────────────────────────────────────────
            Action::FocusNext => {
                self.vm.focus_next();
            }
            Action::FocusPrev => {
                self.vm.focus_prev();
            }
            Action::FocusPane(id) => {
                self.vm.focus_set(id);
                self.state.view = self.vm.view;
            }
            Action::SwitchView(view) => {
                self.vm.set_view(view);
                self.state.view = view;
            }
            Action::BeginEditing => {
                self.vm.focus_set(ComponentId::SearchBar);
                self.state.view = self.vm.view;
                self.state.input_mode = InputMode::Editing;
            }
            Action::EndEditing => self.state.input_mode = InputMode::Normal,

            Action::Quit => self.should_quit = true,

            Action::ResultsPending
            | Action::FeedsLoaded(_)
            | Action::EpisodesLoaded { .. }
            | Action::ResultsMessage(_)
            | Action::ArtworkSettled { .. }
            | Action::HistoryChanged
            | Action::QueueChanged => {}
        }
    }

    fn start_search(&mut self, raw: &str) {
        let query = match prepare_query(raw) {
            Ok(q) => q,
            Err(e) => {
                // Drop any response still in flight for the previous query.
                self.sequencer.issue();
                self.toast.dismiss_spinner();
                self.dispatch(Action::ResultsMessage(e.to_string()));
                return;
            }
        };
        match self.store.push_search_history(&query) {
            Ok(true) => {
                self.state.history = self.store.search_history();
                self.dispatch(Action::HistoryChanged);
            }
            Ok(false) => {}
            Err(e) => warn!("saving search history: {:#}", e),
        }

        let seq = self.sequencer.issue();
        info!("search #{}: {:?}", seq, query);
        self.dispatch(Action::ResultsPending);
        self.dispatch(Action::FocusPane(ComponentId::Results));
        self.toast.spinner(format!("Searching \"{}\"…", query));

        let api = self.api.clone();
        self.spawn_reply(async move {
            let result = api.search(&query).await;
            AppMessage::SearchDone { seq, result }
        });
    }

    fn open_feed(&mut self, feed: FeedSummary) {
        let Some(feed_id) = feed.feed_id() else {
            self.toast.info("This podcast has no episode list");
            return;
        };
        let seq = self.sequencer.issue();
        info!("episodes #{}: feed {} ({})", seq, feed_id, feed.title);
        self.dispatch(Action::ResultsPending);
        self.toast.spinner(format!("Loading {}…", feed.title));

        let api = self.api.clone();
        self.spawn_reply(async move {
            let result = api.list_episodes(Some(feed_id), feed.episode_count).await;
            AppMessage::EpisodesDone { seq, feed, result }
        });
    }

    fn fetch_artwork(&mut self, requests: Vec<ArtworkRequest>) {
        for req in requests {
            let loader = self.artwork.clone();
            let slots = self.artwork_slots.clone();
            self.spawn_reply(async move {
                let outcome = match slots.acquire_owned().await {
                    Ok(_permit) => loader.load(&req.url).await,
                    Err(_) => ArtworkOutcome::Fallback("loader shut down".into()),
                };
                AppMessage::ArtworkSettled {
                    generation: req.generation,
                    index: req.index,
                    outcome,
                }
            });
        }
    }

    /// Run `fut` in the background and feed its message back into the loop.
    fn spawn_reply<F>(&self, fut: F)
    where
        F: std::future::Future<Output = AppMessage> + Send + 'static,
    {
        let Some(tx) = self.msg_tx.clone() else {
            warn!("spawn_reply before the event loop started");
            return;
        };
        tokio::spawn(async move {
            let msg = fut.await;
            let _ = tx.send(msg).await;
        });
    }

    fn sync_queue(&mut self) {
        self.state.queue = self.queue.entries().to_vec();
        self.dispatch(Action::QueueChanged);
    }

    async fn send_player(&self, cmd: PlayerCommand) {
        if self.player_tx.send(PlayerEvent::Command(cmd)).await.is_err() {
            warn!("player core is gone, command dropped");
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        let keys_h = if self.vm.show_keys_bar { 1u16 } else { 0 };
        let [nav, body, log_row, keys_row] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(keys_h),
        ])
        .areas(area);

        status_bar::draw_nav_bar(frame, nav, self.vm.view, &self.state.player);
        status_bar::draw_log_bar(frame, log_row, self.state.last_log.as_deref());
        if self.vm.show_keys_bar {
            status_bar::draw_keys_bar(frame, keys_row, self.state.input_mode, self.vm.view);
        }

        self.pane_areas = PaneAreas {
            nav,
            ..PaneAreas::default()
        };
        match self.vm.view {
            View::Search => self.draw_search(frame, body),
            View::Player => self.draw_player(frame, body),
        }

        self.toast.draw(frame, area);
    }

    fn draw_search(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let [bar, rest] =
            Layout::vertical([Constraint::Length(4), Constraint::Min(0)]).areas(area);
        let [history, results] = if area.width < 70 {
            Layout::vertical([Constraint::Length(6), Constraint::Min(0)]).areas(rest)
        } else {
            Layout::horizontal([Constraint::Length(28), Constraint::Min(0)]).areas(rest)
        };

        let focused = self.vm.focused();
        let s = &self.state;
        self.search_bar
            .draw(frame, bar, focused == Some(ComponentId::SearchBar), s);
        self.history
            .draw(frame, history, focused == Some(ComponentId::History), s);
        self.results
            .draw(frame, results, focused == Some(ComponentId::Results), s);

        self.pane_areas.search_bar = bar;
        self.pane_areas.history = history;
        self.pane_areas.results = results;
    }

    fn draw_player(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let [player, queue] =
            Layout::vertical([Constraint::Length(8), Constraint::Min(0)]).areas(area);

        let focused = self.vm.focused();
        let s = &self.state;
        self.player
            .draw(frame, player, focused == Some(ComponentId::Player), s);
        self.queue_list
            .draw(frame, queue, focused == Some(ComponentId::Queue), s);

        self.pane_areas.player = player;
        self.pane_areas.queue = queue;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::crossterm::event::MouseButton;

    struct Harness {
        app: App,
        player_rx: mpsc::Receiver<PlayerEvent>,
        _dir: tempfile::TempDir,
    }

    fn harness(history: &[&str]) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.api.base_url = "http://127.0.0.1:9".into();
        let store = Arc::new(PreferenceStore::open(dir.path().join("prefs.json")));
        for term in history {
            store.push_search_history(term).unwrap();
        }
        let api = PodcastApi::new(&config.api).unwrap();
        let artwork =
            ArtworkLoader::new(dir.path().join("artwork"), Duration::from_secs(1)).unwrap();
        let (player_tx, player_rx) = mpsc::channel(8);
        Harness {
            app: App::new(config, store, api, artwork, player_tx),
            player_rx,
            _dir: dir,
        }
    }

    fn key(code: KeyCode) -> AppMessage {
        AppMessage::Event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn feed(title: &str, id: u64) -> FeedSummary {
        FeedSummary {
            title: title.into(),
            episode_count: 3,
            itunes_id: Some(id),
            ..FeedSummary::default()
        }
    }

    fn episode(title: &str) -> EpisodeSummary {
        EpisodeSummary {
            title: title.into(),
            enclosure_url: format!("https://cdn.example/{}.mp3", title),
            feed_id: Some(4),
            ..EpisodeSummary::default()
        }
    }

    #[tokio::test]
    async fn test_click_history_while_typing_returns_keys_to_panes() {
        let Harness { mut app, _dir, .. } = harness(&["Serial"]);
        app.dispatch(Action::HistoryChanged);
        app.dispatch(Action::FeedsLoaded(vec![
            feed("Serial", 1),
            feed("Serial Killers", 2),
        ]));
        app.drain_actions().await;

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();

        app.handle_message(key(KeyCode::Char('/'))).await;
        assert_eq!(app.state.input_mode, InputMode::Editing);

        let history = app.pane_areas.history;
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: history.x + 2,
            row: history.y + 1,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_message(AppMessage::Event(Event::Mouse(click))).await;
        assert_eq!(app.state.input_mode, InputMode::Normal);
        assert_eq!(app.vm.focused(), Some(ComponentId::Results));

        // `j` moves the results selection instead of being typed.
        app.handle_message(key(KeyCode::Char('j'))).await;
        let actions = app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(matches!(&actions[..], [Action::OpenFeed(f)] if f.title == "Serial Killers"));
    }

    #[tokio::test]
    async fn test_nav_click_while_typing_ends_editing() {
        let Harness { mut app, _dir, .. } = harness(&[]);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();

        app.handle_message(key(KeyCode::Char('/'))).await;
        assert_eq!(app.state.input_mode, InputMode::Editing);
        let nav = app.pane_areas.nav;
        let column = (nav.x..nav.x + nav.width)
            .find(|&c| status_bar::nav_tab_at(nav, c) == Some(View::Player))
            .unwrap();
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row: nav.y,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_message(AppMessage::Event(Event::Mouse(click))).await;
        assert_eq!(app.state.input_mode, InputMode::Normal);
        assert_eq!(app.vm.focused(), Some(ComponentId::Player));
    }

    #[tokio::test]
    async fn test_ended_advances_to_next_queued() {
        let Harness {
            mut app,
            mut player_rx,
            _dir,
        } = harness(&[]);
        let (a, b) = (episode("a"), episode("b"));
        app.queue.enqueue(a.clone()).unwrap();
        app.queue.enqueue(b.clone()).unwrap();

        app.handle_message(AppMessage::Ended(a.key())).await;
        match player_rx.try_recv() {
            Ok(PlayerEvent::Command(PlayerCommand::Load(next))) => assert_eq!(next, b),
            other => panic!("expected Load, got {:?}", other),
        }

        // A resumed episode has no feed id and is matched by URL.
        let resumed = EpisodeKey {
            feed_id: None,
            enclosure_url: a.enclosure_url.clone(),
        };
        app.handle_message(AppMessage::Ended(resumed)).await;
        assert!(matches!(
            player_rx.try_recv(),
            Ok(PlayerEvent::Command(PlayerCommand::Load(_)))
        ));

        app.handle_message(AppMessage::Ended(b.key())).await;
        assert!(player_rx.try_recv().is_err());
        assert_eq!(app.state.last_log.as_deref(), Some("Episode finished"));
    }
}
