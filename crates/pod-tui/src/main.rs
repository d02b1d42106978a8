mod action;
mod app;
mod app_state;
mod artwork;
mod component;
mod components;
mod core;
mod focus;
mod mpv;
mod reveal;
mod text;
mod theme;
mod widgets;
mod workspace;

use std::sync::Arc;
use std::time::Duration;

use pod_proto::api::PodcastApi;
use pod_proto::config::Config;
use pod_proto::model::EpisodeKey;
use pod_proto::playback::PlayerView;
use pod_proto::store::PreferenceStore;
use tokio::sync::{broadcast, mpsc};

/// What the PlayerCore broadcasts to the UI.
#[derive(Debug, Clone)]
pub enum BroadcastMessage {
    /// The player view changed.
    PlayerUpdated(PlayerView),
    /// This episode played to the end.
    Ended(EpisodeKey),
    /// A log line from the core event loop.
    Log(String),
    /// A playback failure to show to the user.
    Error(String),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = pod_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("p0dcast.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Default to debug for app code; HTTP client internals stay at warn.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("p0dcast log: {}", log_path.display());
    tracing::info!("p0dcast starting…");

    // ── Config and persisted preferences ─────────────────────────────────────
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("config unreadable, using defaults: {:#}", e);
            Config::default()
        }
    };
    let store = Arc::new(PreferenceStore::open(config.paths.prefs_file.clone()));
    tracing::info!("preferences: {}", store.path().display());

    let api = PodcastApi::new(&config.api)?;
    let artwork = artwork::ArtworkLoader::new(
        config.paths.artwork_dir.clone(),
        Duration::from_secs(config.api.request_timeout_secs),
    )?;

    // ── Channels: PlayerCore → UI (broadcast), UI → PlayerCore (mpsc) ───────
    let (broadcast_tx, broadcast_rx) = broadcast::channel::<BroadcastMessage>(256);
    let (event_tx, event_rx) = mpsc::channel::<core::PlayerEvent>(256);

    let player = core::PlayerCore::new(
        config.clone(),
        store.clone(),
        broadcast_tx,
        event_tx.clone(),
    );
    let player_task = tokio::spawn(async move {
        if let Err(e) = player.run(event_rx).await {
            tracing::error!("PlayerCore exited with error: {}", e);
        }
    });

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(config, store, api, artwork, event_tx);
    let result = app.run(broadcast_rx).await;

    // Let the core write its last snapshot and stop mpv.
    if tokio::time::timeout(Duration::from_secs(3), player_task)
        .await
        .is_err()
    {
        tracing::warn!("PlayerCore did not stop in time");
    }
    tracing::info!("p0dcast stopped");
    result
}
