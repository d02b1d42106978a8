#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use pod_proto::config::ApiConfig;
use pod_proto::api::PodcastApi;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Query strings seen by the fixture server, in arrival order.
#[derive(Clone, Default)]
pub struct Recorded {
    pub requests: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
}

impl Recorded {
    pub fn all(&self) -> Vec<(String, HashMap<String, String>)> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, path: &str, params: HashMap<String, String>) {
        self.requests.lock().unwrap().push((path.to_string(), params));
    }
}

pub struct Fixture {
    pub api: PodcastApi,
    pub recorded: Recorded,
}

/// Start the fixture proxy on an ephemeral port and return a client for it.
pub async fn start() -> Fixture {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/api/search", get(search))
        .route("/api/episodes", get(episodes))
        .with_state(recorded.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let api = PodcastApi::new(&ApiConfig {
        base_url: format!("http://{}", addr),
        request_timeout_secs: 5,
    })
    .unwrap();
    Fixture { api, recorded }
}

pub fn feed(title: &str, episodes: i64, itunes_id: u64) -> Value {
    json!({
        "title": title,
        "description": format!("About {title}"),
        "image": format!("https://img.example/{itunes_id}.png"),
        "episodeCount": episodes,
        "newestItemPubdate": 1_623_758_400,
        "itunesId": itunes_id,
    })
}

async fn search(
    State(recorded): State<Recorded>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let q = params.get("q").cloned().unwrap_or_default();
    recorded.push("/api/search", params);
    match q.as_str() {
        "Serial" => Json(json!({
            "feeds": [
                feed("Serial", 40, 1),
                feed("Serial", 12, 2),
                feed("Serial Killers", 0, 3),
                feed("Serially", 5, 4),
            ]
        }))
        .into_response(),
        "empty" => Json(json!({ "feeds": [feed("Nothing Here", 0, 5)] })).into_response(),
        "null" => Json(json!({ "feeds": null })).into_response(),
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, "upstream failed").into_response(),
        "garbage" => "<html>not json</html>".into_response(),
        _ => Json(json!({ "feeds": [] })).into_response(),
    }
}

async fn episodes(
    State(recorded): State<Recorded>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let feed_id = params.get("feedId").cloned().unwrap_or_default();
    recorded.push("/api/episodes", params);
    if feed_id == "404" {
        return (StatusCode::NOT_FOUND, "no such feed").into_response();
    }
    Json(json!({
        "items": [
            {
                "title": "Episode 2",
                "description": "<p>Second <b>one</b></p>",
                "image": "",
                "feedImage": "https://img.example/feed.png",
                "datePublished": 1_700_000_000,
                "enclosureUrl": "https://cdn.example/2.mp3",
            },
            {
                "title": "Episode 1",
                "description": null,
                "image": "https://img.example/1.png",
                "feedImage": null,
                "datePublished": null,
                "enclosureUrl": "https://cdn.example/1.mp3",
            },
        ]
    }))
    .into_response()
}
