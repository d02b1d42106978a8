//! Playback state machine.
//!
//! The controller never touches the media backend directly.  Each operation
//! updates the [`PlayerView`] and returns the [`MediaCommand`]s the caller
//! must forward to the player process.

use serde::{Deserialize, Serialize};

use crate::model::{EpisodeKey, EpisodeSummary, PlaybackSnapshot};
use crate::timefmt::format_time;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle, // nothing loaded, or the last episode ended/failed
    Loading, // source requested, waiting for metadata
    Playing,
    Paused,
}

/// Primitive operations on the media backend.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    /// Load `url` paused, positioned at `start_secs`.
    Load { url: String, start_secs: f64 },
    Play,
    Pause,
    SeekTo(f64),
}

/// Everything the player pane renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub status: PlaybackStatus,
    pub title: String,
    pub date_label: String,
    pub image: String,
    pub src: String,
    pub key: Option<EpisodeKey>,
    pub position: f64,
    pub duration: f64,
    pub elapsed_text: String,
    pub total_text: String,
    /// Elapsed/total labels are hidden while a fresh load waits for metadata.
    pub times_visible: bool,
    /// Progress bar shows a loading indicator instead of a fill.
    pub loading: bool,
}

impl PlayerView {
    pub fn toggle_icon(&self) -> &'static str {
        if self.status == PlaybackStatus::Playing {
            "⏸"
        } else {
            "▶"
        }
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.status == PlaybackStatus::Playing {
            "Pause"
        } else {
            "Play"
        }
    }

    /// Fraction of the episode played, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn has_source(&self) -> bool {
        !self.src.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct PlaybackController {
    view: PlayerView,
    /// Start playing once metadata arrives. Cleared for resumed snapshots.
    autoplay: bool,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &PlayerView {
        &self.view
    }

    pub fn status(&self) -> PlaybackStatus {
        self.view.status
    }

    /// Start a fresh load of `episode` from the beginning.
    pub fn load(&mut self, episode: &EpisodeSummary) -> Vec<MediaCommand> {
        self.view = PlayerView {
            status: PlaybackStatus::Loading,
            title: episode.title.clone(),
            date_label: episode.published_label(),
            image: episode.artwork_url().unwrap_or_default().to_string(),
            src: episode.enclosure_url.clone(),
            key: Some(episode.key()),
            elapsed_text: "0:00".to_string(),
            times_visible: false,
            loading: true,
            ..Default::default()
        };
        self.autoplay = true;
        self.request_load(0.0)
    }

    /// Restore a saved snapshot: same display, paused at the saved position.
    pub fn resume(&mut self, snap: &PlaybackSnapshot) -> Vec<MediaCommand> {
        self.view = PlayerView {
            status: PlaybackStatus::Loading,
            title: snap.title.clone(),
            date_label: snap.date.clone(),
            image: snap.image.clone(),
            src: snap.src.clone(),
            key: Some(EpisodeKey {
                feed_id: None,
                enclosure_url: snap.src.clone(),
            }),
            position: snap.current_time,
            duration: snap.duration,
            elapsed_text: format_time(snap.current_time).unwrap_or_else(|| "0:00".to_string()),
            total_text: format_time(snap.duration).unwrap_or_default(),
            times_visible: true,
            loading: true,
        };
        self.autoplay = false;
        self.request_load(snap.current_time.max(0.0))
    }

    fn request_load(&mut self, start_secs: f64) -> Vec<MediaCommand> {
        if self.view.src.is_empty() {
            self.fail();
            return Vec::new();
        }
        vec![MediaCommand::Load {
            url: self.view.src.clone(),
            start_secs,
        }]
    }

    /// Duration became known.  Completes a pending load; later calls only
    /// refresh the total.
    pub fn on_metadata(&mut self, duration: f64) -> Vec<MediaCommand> {
        if duration.is_finite() && duration > 0.0 {
            self.view.duration = duration;
            if let Some(text) = format_time(duration) {
                self.view.total_text = text;
            }
        }
        if self.view.status != PlaybackStatus::Loading {
            return Vec::new();
        }
        self.view.loading = false;
        self.view.times_visible = true;
        if self.autoplay {
            self.view.status = PlaybackStatus::Playing;
            vec![MediaCommand::Play]
        } else {
            self.view.status = PlaybackStatus::Paused;
            Vec::new()
        }
    }

    pub fn on_time_update(&mut self, position: f64) {
        if !position.is_finite() || self.view.status == PlaybackStatus::Idle {
            return;
        }
        self.view.position = position;
        if let Some(text) = format_time(position) {
            self.view.elapsed_text = text;
        }
    }

    /// The backend reports a pause state change that we did not request.
    pub fn on_pause_observed(&mut self, paused: bool) {
        match (self.view.status, paused) {
            (PlaybackStatus::Playing, true) => self.view.status = PlaybackStatus::Paused,
            (PlaybackStatus::Paused, false) => self.view.status = PlaybackStatus::Playing,
            _ => {}
        }
    }

    pub fn toggle(&mut self) -> Vec<MediaCommand> {
        match self.view.status {
            PlaybackStatus::Playing => {
                self.view.status = PlaybackStatus::Paused;
                vec![MediaCommand::Pause]
            }
            PlaybackStatus::Paused => {
                self.view.status = PlaybackStatus::Playing;
                vec![MediaCommand::Play]
            }
            PlaybackStatus::Idle if self.view.has_source() => self.restart(),
            _ => Vec::new(),
        }
    }

    /// Load the current source again from the start, after it ended or failed.
    fn restart(&mut self) -> Vec<MediaCommand> {
        self.view.status = PlaybackStatus::Loading;
        self.view.position = 0.0;
        self.view.elapsed_text = "0:00".to_string();
        self.view.times_visible = false;
        self.view.loading = true;
        self.autoplay = true;
        self.request_load(0.0)
    }

    /// Seek to the point of the progress bar at `offset_x` of `width`.
    pub fn seek_click(&mut self, offset_x: f64, width: f64) -> Vec<MediaCommand> {
        if !self.seekable() || !(width > 0.0) || !offset_x.is_finite() {
            return Vec::new();
        }
        let target = (offset_x / width).clamp(0.0, 1.0) * self.view.duration;
        self.seek_to(target)
    }

    /// Relative seek, clamped to `[0, duration]`.
    pub fn skip(&mut self, delta: f64) -> Vec<MediaCommand> {
        if !self.seekable() || !delta.is_finite() {
            return Vec::new();
        }
        let target = (self.view.position + delta).clamp(0.0, self.view.duration);
        self.seek_to(target)
    }

    fn seekable(&self) -> bool {
        matches!(
            self.view.status,
            PlaybackStatus::Playing | PlaybackStatus::Paused
        ) && self.view.duration > 0.0
    }

    fn seek_to(&mut self, target: f64) -> Vec<MediaCommand> {
        self.view.position = target;
        if let Some(text) = format_time(target) {
            self.view.elapsed_text = text;
        }
        vec![MediaCommand::SeekTo(target)]
    }

    /// The episode played to the end.  Returns its key for auto-advance.
    pub fn on_ended(&mut self) -> Option<EpisodeKey> {
        if self.view.status == PlaybackStatus::Idle {
            return None;
        }
        self.view.status = PlaybackStatus::Idle;
        self.view.loading = false;
        self.view.position = self.view.duration;
        self.view.key.clone()
    }

    /// The backend could not load or play the source.
    pub fn fail(&mut self) {
        self.view.status = PlaybackStatus::Idle;
        self.view.loading = false;
    }

    /// Current state for persistence.  Only produced while playing.
    pub fn snapshot(&self) -> Option<PlaybackSnapshot> {
        if self.view.status != PlaybackStatus::Playing {
            return None;
        }
        Some(PlaybackSnapshot {
            title: self.view.title.clone(),
            date: self.view.date_label.clone(),
            current_time: self.view.position,
            duration: self.view.duration,
            image: self.view.image.clone(),
            src: self.view.src.clone(),
        })
    }
}
