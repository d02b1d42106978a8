//! Action enum: user intents and internal events flowing through the App.

use pod_proto::model::{EpisodeKey, EpisodeSummary, FeedSummary};

use crate::reveal::{ArtworkOutcome, ArtworkRequest};

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    SearchBar,
    History,
    Results,
    Player,
    Queue,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Search ───────────────────────────────────────────────────────────────
    /// Run a search with raw (untrimmed) input.
    Search(String),
    ResetHistory,
    OpenFeed(FeedSummary),
    BackToFeeds,
    /// Start loading these card images.
    FetchArtwork(Vec<ArtworkRequest>),

    // ── Results (App → results pane) ─────────────────────────────────────────
    /// A search or episode request is in flight.
    ResultsPending,
    FeedsLoaded(Vec<FeedSummary>),
    EpisodesLoaded {
        feed: FeedSummary,
        episodes: Vec<EpisodeSummary>,
    },
    /// Replace the results with a line of text (errors, empty results).
    ResultsMessage(String),
    ArtworkSettled {
        generation: u64,
        index: usize,
        outcome: ArtworkOutcome,
    },

    // ── Queue ────────────────────────────────────────────────────────────────
    Enqueue(EpisodeSummary),
    Dequeue(EpisodeKey),

    // ── Playback ─────────────────────────────────────────────────────────────
    Play(EpisodeSummary),
    TogglePause,
    Skip(f64),
    SeekClick { offset_x: f64, width: f64 },

    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),
    SwitchView(View),
    BeginEditing,
    EndEditing,

    // ── Sync notifications (App → components) ────────────────────────────────
    HistoryChanged,
    QueueChanged,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}

/// Which top-level view is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Search, // search bar, history and results
    Player, // now playing and the queue
}

impl View {
    pub fn other(self) -> Self {
        match self {
            Self::Search => Self::Player,
            Self::Player => Self::Search,
        }
    }
}
