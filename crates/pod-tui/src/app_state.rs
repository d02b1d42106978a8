//! AppState: shared read-only data passed to components during render/event.
//!
//! Only the App event loop writes to it.

use pod_proto::model::{EpisodeKey, EpisodeSummary};
use pod_proto::playback::{PlaybackStatus, PlayerView};

use crate::action::View;
use crate::widgets::status_bar::InputMode;

#[derive(Debug, Default)]
pub struct AppState {
    pub view: View,
    pub input_mode: InputMode,

    /// Search history, oldest first.
    pub history: Vec<String>,
    /// Mirror of the queue manager's entries.
    pub queue: Vec<EpisodeSummary>,
    /// Latest view published by the player core.
    pub player: PlayerView,

    /// Most recent log line, shown in the footer.
    pub last_log: Option<String>,
}

impl AppState {
    pub fn now_playing_key(&self) -> Option<&EpisodeKey> {
        match self.player.status {
            PlaybackStatus::Idle => None,
            _ => self.player.key.as_ref(),
        }
    }

    /// Whether `episode` is the one loaded in the player.  Resumed snapshots
    /// carry no feed id, so those match on the audio URL alone.
    pub fn is_now_playing(&self, episode: &EpisodeSummary) -> bool {
        match self.now_playing_key() {
            Some(key) if key.feed_id.is_some() => *key == episode.key(),
            Some(key) => key.enclosure_url == episode.enclosure_url,
            None => false,
        }
    }
}
