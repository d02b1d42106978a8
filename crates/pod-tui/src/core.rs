/// PlayerCore: single-owner event loop for playback.
///
/// Owns the `PlaybackController` and the mpv process; no other task touches
/// them.  The UI sends `PlayerEvent::Command`s, mpv pushes property-change and
/// file events through a forwarder task, and a cancellable timer emits
/// `SnapshotTick` so the playing position is written to the preference store.
///
/// Every state change is published as `BroadcastMessage::PlayerUpdated`
/// carrying a full `PlayerView`.
use std::sync::Arc;
use std::time::Duration;

use pod_proto::config::Config;
use pod_proto::model::{EpisodeSummary, PlaybackSnapshot};
use pod_proto::playback::{MediaCommand, PlaybackController, PlaybackStatus, PlayerView};
use pod_proto::store::PreferenceStore;
use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::mpv::{EndReason, MpvEvent, MpvHandle, MpvProcess, OBS_DURATION, OBS_PAUSE, OBS_TIME_POS};
use crate::BroadcastMessage;

/// What the UI can ask the player to do.
#[derive(Debug, Clone)]
pub enum PlayerCommand {
    Load(EpisodeSummary),
    Resume(PlaybackSnapshot),
    TogglePause,
    SeekClick { offset_x: f64, width: f64 },
    Skip(f64),
}

#[derive(Debug)]
pub enum PlayerEvent {
    Command(PlayerCommand),
    Mpv(MpvEvent),
    SnapshotTick,
    HeartbeatTick,
    Shutdown,
}

pub struct PlayerCore {
    config: Config,
    store: Arc<PreferenceStore>,
    controller: PlaybackController,
    mpv: MpvProcess,
    mpv_handle: Option<MpvHandle>,
    event_tx: mpsc::Sender<PlayerEvent>,
    broadcast_tx: broadcast::Sender<BroadcastMessage>,
    /// Seek target for a resumed source, applied once mpv reports file-loaded.
    pending_start: Option<f64>,
    /// Latest duration mpv reported for the current file.
    obs_duration: Option<f64>,
    snapshot_cancel: CancellationToken,
    last_published: Option<PlayerView>,
}

impl PlayerCore {
    pub fn new(
        config: Config,
        store: Arc<PreferenceStore>,
        broadcast_tx: broadcast::Sender<BroadcastMessage>,
        event_tx: mpsc::Sender<PlayerEvent>,
    ) -> Self {
        let mpv = MpvProcess::new(config.mpv.default_volume);
        Self {
            config,
            store,
            controller: PlaybackController::new(),
            mpv,
            mpv_handle: None,
            event_tx,
            broadcast_tx,
            pending_start: None,
            obs_duration: None,
            snapshot_cancel: CancellationToken::new(),
            last_published: None,
        }
    }

    /// Run until `Shutdown` arrives or every sender is gone.
    pub async fn run(mut self, mut event_rx: mpsc::Receiver<PlayerEvent>) -> anyhow::Result<()> {
        info!("PlayerCore: starting event loop");

        let interval = Duration::from_secs(self.config.ui.snapshot_interval_secs.max(1));
        spawn_snapshot_timer(interval, self.event_tx.clone(), self.snapshot_cancel.clone());

        let heartbeat_tx = self.event_tx.clone();
        let heartbeat_cancel = self.snapshot_cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = heartbeat_cancel.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_secs(10)) => {
                        if heartbeat_tx.send(PlayerEvent::HeartbeatTick).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        while let Some(evt) = event_rx.recv().await {
            match evt {
                PlayerEvent::Shutdown => {
                    info!("PlayerCore: shutdown requested");
                    break;
                }
                PlayerEvent::Command(cmd) => {
                    info!("PlayerCore: command {:?}", cmd);
                    self.handle_command(cmd).await;
                }
                PlayerEvent::Mpv(evt) => self.handle_mpv_event(evt).await,
                PlayerEvent::SnapshotTick => self.write_snapshot(),
                PlayerEvent::HeartbeatTick => self.check_mpv_alive(),
            }
            self.publish();
        }

        self.cleanup().await;
        Ok(())
    }

    async fn handle_command(&mut self, cmd: PlayerCommand) {
        let media = match cmd {
            PlayerCommand::Load(episode) => self.controller.load(&episode),
            PlayerCommand::Resume(snap) => self.controller.resume(&snap),
            PlayerCommand::TogglePause => self.controller.toggle(),
            PlayerCommand::SeekClick { offset_x, width } => {
                self.controller.seek_click(offset_x, width)
            }
            PlayerCommand::Skip(delta) => self.controller.skip(delta),
        };
        self.apply(media).await;
    }

    async fn apply(&mut self, commands: Vec<MediaCommand>) {
        for cmd in commands {
            if let Err(e) = self.apply_one(cmd).await {
                error!("PlayerCore: media command failed: {}", e);
                self.controller.fail();
                self.pending_start = None;
                let _ = self
                    .broadcast_tx
                    .send(BroadcastMessage::Error(format!("Playback failed: {}", e)));
                break;
            }
        }
    }

    async fn apply_one(&mut self, cmd: MediaCommand) -> anyhow::Result<()> {
        if let MediaCommand::Load { url, start_secs } = cmd {
            let handle = self.ensure_mpv_handle().await?;
            self.obs_duration = None;
            self.pending_start = (start_secs > 0.0).then_some(start_secs);
            handle.load_paused(&url).await?;
            return Ok(());
        }

        let Some(handle) = self.mpv_handle.clone() else {
            debug!("PlayerCore: no mpv connection, dropping {:?}", cmd);
            return Ok(());
        };
        match cmd {
            MediaCommand::Play => handle.set_pause(false).await,
            MediaCommand::Pause => handle.set_pause(true).await,
            MediaCommand::SeekTo(secs) => handle.seek_to(secs).await,
            MediaCommand::Load { .. } => Ok(()),
        }
    }

    async fn handle_mpv_event(&mut self, evt: MpvEvent) {
        if let Some((obs_id, data)) = evt.as_property_change() {
            let loading = self.controller.status() == PlaybackStatus::Loading;
            match obs_id {
                OBS_PAUSE => {
                    if !loading {
                        if let Some(paused) = data.as_bool() {
                            self.controller.on_pause_observed(paused);
                        }
                    }
                }
                OBS_TIME_POS => {
                    if !loading {
                        if let Some(pos) = data.as_f64() {
                            self.controller.on_time_update(pos);
                        }
                    }
                }
                OBS_DURATION => {
                    self.obs_duration = data.as_f64();
                    if let (false, Some(d)) = (loading, self.obs_duration) {
                        let media = self.controller.on_metadata(d);
                        self.apply(media).await;
                    }
                }
                _ => {}
            }
            return;
        }

        match evt.event_name() {
            Some("file-loaded") => {
                debug!("PlayerCore: file-loaded (duration {:?})", self.obs_duration);
                if let (Some(start), Some(handle)) = (self.pending_start.take(), self.mpv_handle.clone()) {
                    if let Err(e) = handle.seek_to(start).await {
                        warn!("PlayerCore: resume seek to {} failed: {}", start, e);
                    }
                }
                let media = self.controller.on_metadata(self.obs_duration.unwrap_or(0.0));
                self.apply(media).await;
            }
            Some("end-file") => match evt.end_reason() {
                Some(EndReason::Eof) => {
                    if let Some(key) = self.controller.on_ended() {
                        info!("PlayerCore: ended {}", key);
                        let _ = self.broadcast_tx.send(BroadcastMessage::Ended(key));
                    }
                }
                Some(EndReason::Error(msg)) => {
                    warn!("PlayerCore: mpv could not play source: {}", msg);
                    self.controller.fail();
                    self.pending_start = None;
                    let _ = self
                        .broadcast_tx
                        .send(BroadcastMessage::Error(format!("Playback failed: {}", msg)));
                }
                _ => {}
            },
            Some(other) => debug!("PlayerCore: mpv event {}", other),
            None => {}
        }
    }

    fn write_snapshot(&self) {
        let Some(snap) = self.controller.snapshot() else {
            return;
        };
        match self.store.save_player_state(&snap) {
            Ok(()) => debug!("PlayerCore: snapshot at {:.1}s", snap.current_time),
            Err(e) => warn!("PlayerCore: failed to save snapshot: {}", e),
        }
    }

    fn check_mpv_alive(&mut self) {
        if self.mpv_handle.is_none() || self.mpv.is_alive() {
            return;
        }
        warn!("PlayerCore: heartbeat: mpv process died");
        self.mpv_handle = None;
        if self.controller.status() != PlaybackStatus::Idle {
            self.controller.fail();
            let _ = self
                .broadcast_tx
                .send(BroadcastMessage::Error("mpv exited unexpectedly".into()));
        }
    }

    async fn ensure_mpv_handle(&mut self) -> anyhow::Result<MpvHandle> {
        if self.mpv_handle.is_some() && !self.mpv.is_alive() {
            warn!("PlayerCore: mpv process died, dropping handle");
            self.mpv_handle = None;
        }
        if let Some(handle) = &self.mpv_handle {
            return Ok(handle.clone());
        }

        // One forwarder per connection, feeding mpv events into our loop.
        let (mpv_tx, mut mpv_rx) = mpsc::channel::<MpvEvent>(64);
        let core_tx = self.event_tx.clone();
        tokio::spawn(async move {
            while let Some(evt) = mpv_rx.recv().await {
                if core_tx.send(PlayerEvent::Mpv(evt)).await.is_err() {
                    break;
                }
            }
        });

        let handle = self.mpv.spawn_and_connect(mpv_tx).await?;
        handle.observe_properties().await;
        let _ = self
            .broadcast_tx
            .send(BroadcastMessage::Log("mpv started".into()));
        self.mpv_handle = Some(handle.clone());
        Ok(handle)
    }

    fn publish(&mut self) {
        let view = self.controller.view();
        if let Some(last) = &self.last_published {
            if !view_changed(last, view) {
                return;
            }
        }
        self.last_published = Some(view.clone());
        let _ = self
            .broadcast_tx
            .send(BroadcastMessage::PlayerUpdated(view.clone()));
    }

    async fn cleanup(&mut self) {
        info!("PlayerCore: cleanup");
        self.snapshot_cancel.cancel();
        self.write_snapshot();
        if let Some(handle) = self.mpv_handle.take() {
            let _ = handle.stop().await;
        }
        self.mpv.kill().await;
    }
}

/// Emit `SnapshotTick` every `interval` until `cancel` fires.
pub fn spawn_snapshot_timer(
    interval: Duration,
    tx: mpsc::Sender<PlayerEvent>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // interval() fires immediately; the first snapshot is one period in.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if tx.send(PlayerEvent::SnapshotTick).await.is_err() {
                        break;
                    }
                }
            }
        }
        debug!("snapshot timer stopped");
    })
}

/// Whether `next` differs from `prev` enough to be worth redrawing.
/// Position jitter under a quarter second is ignored.
fn view_changed(prev: &PlayerView, next: &PlayerView) -> bool {
    if (prev.position - next.position).abs() >= 0.25 {
        return true;
    }
    let mut aligned = next.clone();
    aligned.position = prev.position;
    aligned != *prev
}
