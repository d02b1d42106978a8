/// mpv JSON IPC driver.
///
/// ```text
///   MpvProcess::spawn_and_connect()
///         │
///         ├── writer_task   ← IpcRequest via mpsc → socket line
///         └── reader_task   ← socket lines
///                                ├── reply (request_id)      → waiting oneshot
///                                └── event / property-change → MpvEvent channel
/// ```
///
/// `MpvHandle` is cloneable; every call awaits mpv's reply (5 s timeout).
/// `MpvProcess` owns the child and can be asked whether it is still alive.
///
/// Unix uses a domain socket, Windows a named pipe `\\.\pipe\<name>`.
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

#[cfg(unix)]
use tokio::net::UnixStream;

#[cfg(windows)]
use tokio::net::windows::named_pipe::ClientOptions;

static NEXT_REQ_ID: AtomicU64 = AtomicU64::new(1);

/// observe_property ids, matched in property-change events.
pub const OBS_PAUSE: u64 = 1;
pub const OBS_TIME_POS: u64 = 2;
pub const OBS_DURATION: u64 = 3;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<anyhow::Result<Value>>>>>;

struct IpcRequest {
    req_id: u64,
    line: String,
    reply: oneshot::Sender<anyhow::Result<Value>>,
}

/// Unsolicited message from mpv (no request_id).
#[derive(Debug, Clone)]
pub struct MpvEvent {
    pub raw: Value,
}

/// Why mpv stopped playing a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    Eof,
    Error(String),
    /// Replaced by another loadfile, or stopped.
    Other(String),
}

impl MpvEvent {
    pub fn event_name(&self) -> Option<&str> {
        self.raw.get("event")?.as_str()
    }

    /// `(observe id, data)` for property-change events.
    pub fn as_property_change(&self) -> Option<(u64, &Value)> {
        if self.event_name()? != "property-change" {
            return None;
        }
        let id = self.raw.get("id")?.as_u64()?;
        Some((id, self.raw.get("data").unwrap_or(&Value::Null)))
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        if self.event_name()? != "end-file" {
            return None;
        }
        let reason = self.raw.get("reason").and_then(|r| r.as_str()).unwrap_or("");
        Some(match reason {
            "eof" => EndReason::Eof,
            "error" => EndReason::Error(
                self.raw
                    .get("file_error")
                    .and_then(|e| e.as_str())
                    .unwrap_or("unknown error")
                    .to_string(),
            ),
            other => EndReason::Other(other.to_string()),
        })
    }
}

#[derive(Clone)]
pub struct MpvHandle {
    tx: mpsc::Sender<IpcRequest>,
}

impl MpvHandle {
    pub async fn send(&self, command: Value) -> anyhow::Result<Value> {
        let req_id = NEXT_REQ_ID.fetch_add(1, Ordering::Relaxed);
        let mut line = serde_json::to_string(&json!({ "command": command, "request_id": req_id }))?;
        line.push('\n');

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(IpcRequest {
                req_id,
                line,
                reply: reply_tx,
            })
            .await
            .map_err(|_| anyhow::anyhow!("mpv writer task gone"))?;

        tokio::time::timeout(tokio::time::Duration::from_secs(5), reply_rx)
            .await
            .map_err(|_| anyhow::anyhow!("mpv IPC timeout for req={}", req_id))?
            .map_err(|_| anyhow::anyhow!("mpv reply channel dropped req={}", req_id))?
    }

    /// Replace the current file with `url`, paused.  Playback is started
    /// explicitly once the duration is known.
    pub async fn load_paused(&self, url: &str) -> anyhow::Result<()> {
        self.set_pause(true).await?;
        debug!("mpv: loadfile {}", url);
        self.send(json!(["loadfile", url, "replace"])).await?;
        Ok(())
    }

    pub async fn set_pause(&self, paused: bool) -> anyhow::Result<()> {
        self.send(json!(["set_property", "pause", paused])).await?;
        Ok(())
    }

    pub async fn seek_to(&self, secs: f64) -> anyhow::Result<()> {
        self.send(json!(["seek", secs, "absolute"])).await?;
        Ok(())
    }

    pub async fn stop(&self) -> anyhow::Result<()> {
        self.send(json!(["stop"])).await?;
        Ok(())
    }

    /// Register the properties the player core tracks.  Needed after every
    /// fresh connection.
    pub async fn observe_properties(&self) {
        let props = [
            (OBS_PAUSE, "pause"),
            (OBS_TIME_POS, "time-pos"),
            (OBS_DURATION, "duration"),
        ];
        for (id, name) in props {
            match self.send(json!(["observe_property", id, name])).await {
                Ok(_) => debug!("mpv: observing {} as {}", name, id),
                Err(e) => warn!("mpv: observe_property {} failed: {}", name, e),
            }
        }
    }
}

/// Owns the mpv child process.
pub struct MpvProcess {
    socket_name: String,
    volume: f32,
    process: Option<tokio::process::Child>,
}

impl MpvProcess {
    pub fn new(volume: f32) -> Self {
        Self {
            socket_name: pod_proto::platform::mpv_socket_name(),
            volume,
            process: None,
        }
    }

    pub fn is_alive(&mut self) -> bool {
        let Some(child) = self.process.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                warn!("mpv exited: {}", status);
                false
            }
            Err(e) => {
                warn!("mpv: try_wait failed: {}", e);
                false
            }
        }
    }

    pub async fn kill(&mut self) {
        if let Some(mut child) = self.process.take() {
            let _ = child.kill().await;
        }
    }

    fn spawn_child(&mut self) -> anyhow::Result<()> {
        let binary = pod_proto::platform::find_mpv_binary()
            .ok_or_else(|| anyhow::anyhow!("mpv binary not found (set MPV_PATH or install mpv)"))?;
        let stderr_path = pod_proto::platform::data_dir().join("mpv-stderr.log");
        let stderr = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&stderr_path)?;

        let child = tokio::process::Command::new(&binary)
            .arg("--no-video")
            .arg("--idle=yes")
            .arg("--quiet")
            .arg(pod_proto::platform::mpv_socket_arg())
            .arg(format!(
                "--volume={}",
                (self.volume * 100.0).clamp(0.0, 100.0).round() as i64
            ))
            .stdout(std::process::Stdio::null())
            .stderr(stderr)
            .kill_on_drop(true)
            .spawn()?;
        info!("mpv: spawned {} (pid {:?})", binary.display(), child.id());
        self.process = Some(child);
        Ok(())
    }

    #[cfg(unix)]
    pub async fn spawn_and_connect(
        &mut self,
        event_tx: mpsc::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        self.kill().await;
        let socket_path = std::path::PathBuf::from(&self.socket_name);
        let _ = tokio::fs::remove_file(&socket_path).await;

        self.spawn_child()?;

        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if socket_path.exists() {
                break;
            }
        }
        if !socket_path.exists() {
            anyhow::bail!("mpv IPC socket did not appear");
        }

        let stream = UnixStream::connect(&socket_path).await?;
        info!("mpv: connected to {}", socket_path.display());
        let (read_half, write_half) = stream.into_split();
        Ok(start_io_tasks(read_half, write_half, event_tx))
    }

    #[cfg(windows)]
    pub async fn spawn_and_connect(
        &mut self,
        event_tx: mpsc::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        self.kill().await;
        self.spawn_child()?;

        let pipe_path = format!(r"\\.\pipe\{}", self.socket_name);
        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if let Ok(client) = ClientOptions::new().open(&pipe_path) {
                info!("mpv: connected to {}", pipe_path);
                let (read_half, write_half) = tokio::io::split(client);
                return Ok(start_io_tasks(read_half, write_half, event_tx));
            }
        }
        anyhow::bail!("mpv named pipe did not appear")
    }
}

fn start_io_tasks<R, W>(read_half: R, write_half: W, event_tx: mpsc::Sender<MpvEvent>) -> MpvHandle
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
    let (tx, rx) = mpsc::channel::<IpcRequest>(64);
    tokio::spawn(writer_task(write_half, rx, pending.clone()));
    tokio::spawn(reader_task(BufReader::new(read_half), pending, event_tx));
    MpvHandle { tx }
}

async fn fail_all(pending: &PendingMap, reason: &str) {
    let mut map = pending.lock().await;
    for (_, tx) in map.drain() {
        let _ = tx.send(Err(anyhow::anyhow!("{}", reason)));
    }
}

async fn reader_task<R>(mut reader: BufReader<R>, pending: PendingMap, event_tx: mpsc::Sender<MpvEvent>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("mpv reader: connection closed");
                fail_all(&pending, "mpv IPC connection closed").await;
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let val: Value = match serde_json::from_str(trimmed) {
                    Ok(v) => v,
                    Err(e) => {
                        debug!("mpv reader: bad json '{}': {}", trimmed, e);
                        continue;
                    }
                };
                match val.get("request_id").and_then(|v| v.as_u64()) {
                    Some(req_id) => {
                        let Some(tx) = pending.lock().await.remove(&req_id) else {
                            debug!("mpv reader: reply for unknown req={}", req_id);
                            continue;
                        };
                        let result = match val["error"].as_str() {
                            Some("success") => Ok(val),
                            other => Err(anyhow::anyhow!(
                                "mpv error: {}",
                                other.unwrap_or("unknown error")
                            )),
                        };
                        let _ = tx.send(result);
                    }
                    None => {
                        if event_tx.send(MpvEvent { raw: val }).await.is_err() {
                            debug!("mpv reader: event receiver gone");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                warn!("mpv reader: {}", e);
                fail_all(&pending, "mpv IPC read error").await;
                break;
            }
        }
    }
}

async fn writer_task<W>(mut writer: W, mut rx: mpsc::Receiver<IpcRequest>, pending: PendingMap)
where
    W: tokio::io::AsyncWrite + Unpin,
{
    while let Some(req) = rx.recv().await {
        // Registered before the write so the reader can always match the reply.
        pending.lock().await.insert(req.req_id, req.reply);
        debug!("mpv writer: req={} {}", req.req_id, req.line.trim());
        if let Err(e) = writer.write_all(req.line.as_bytes()).await {
            warn!("mpv writer: {}", e);
            if let Some(tx) = pending.lock().await.remove(&req.req_id) {
                let _ = tx.send(Err(anyhow::anyhow!("mpv write error: {}", e)));
            }
            break;
        }
    }
    debug!("mpv writer: exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_change_parsed() {
        let ev = MpvEvent {
            raw: json!({"event": "property-change", "id": OBS_TIME_POS, "name": "time-pos", "data": 12.5}),
        };
        let (id, data) = ev.as_property_change().unwrap();
        assert_eq!(id, OBS_TIME_POS);
        assert_eq!(data.as_f64(), Some(12.5));
        assert!(ev.end_reason().is_none());
    }

    #[test]
    fn test_end_file_reasons() {
        let eof = MpvEvent {
            raw: json!({"event": "end-file", "reason": "eof"}),
        };
        assert_eq!(eof.end_reason(), Some(EndReason::Eof));

        let err = MpvEvent {
            raw: json!({"event": "end-file", "reason": "error", "file_error": "loading failed"}),
        };
        assert_eq!(err.end_reason(), Some(EndReason::Error("loading failed".into())));

        let replaced = MpvEvent {
            raw: json!({"event": "end-file", "reason": "stop"}),
        };
        assert_eq!(replaced.end_reason(), Some(EndReason::Other("stop".into())));
    }

    #[tokio::test]
    async fn test_reply_routed_to_caller() {
        let (client, server) = tokio::io::duplex(4096);
        let (client_r, client_w) = tokio::io::split(client);
        let (event_tx, mut event_rx) = mpsc::channel(8);
        let handle = start_io_tasks(client_r, client_w, event_tx);

        // Fake mpv: echo a success reply for each request, plus one event.
        tokio::spawn(async move {
            let (server_r, mut server_w) = tokio::io::split(server);
            let mut lines = BufReader::new(server_r).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let req: Value = serde_json::from_str(&line).unwrap();
                let id = req["request_id"].as_u64().unwrap();
                let reply = format!(
                    "{{\"event\":\"file-loaded\"}}\n{{\"request_id\":{},\"error\":\"success\",\"data\":true}}\n",
                    id
                );
                server_w.write_all(reply.as_bytes()).await.unwrap();
            }
        });

        let resp = handle.send(json!(["get_property", "pause"])).await.unwrap();
        assert_eq!(resp["data"], json!(true));
        let ev = event_rx.recv().await.unwrap();
        assert_eq!(ev.event_name(), Some("file-loaded"));
    }
}
