mod common;

use common::fixture_server;
use pod_proto::api::ApiError;
use pod_proto::search::prepare_query;

#[tokio::test]
async fn search_drops_duplicate_titles_and_empty_feeds() {
    let fx = fixture_server::start().await;
    let feeds = fx.api.search("Serial").await.unwrap();

    let titles: Vec<_> = feeds.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(titles, ["Serial", "Serially"]);
    assert_eq!(feeds[0].episode_count, 40);
    assert_eq!(feeds[0].feed_id(), Some(1));
}

#[tokio::test]
async fn search_sends_trimmed_query() {
    let fx = fixture_server::start().await;
    let query = prepare_query("   Serial  ").unwrap();
    fx.api.search(&query).await.unwrap();

    let seen = fx.recorded.all();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "/api/search");
    assert_eq!(seen[0].1.get("q").map(String::as_str), Some("Serial"));
}

#[tokio::test]
async fn zero_episode_only_result_is_empty() {
    let fx = fixture_server::start().await;
    assert!(fx.api.search("empty").await.unwrap().is_empty());
    assert!(fx.api.search("null").await.unwrap().is_empty());
}

#[tokio::test]
async fn server_error_is_status() {
    let fx = fixture_server::start().await;
    let err = fx.api.search("boom").await.unwrap_err();
    assert!(matches!(err, ApiError::Status(s) if s.as_u16() == 500));
    assert!(err.display_message().starts_with("Error: "));
}

#[tokio::test]
async fn non_json_body_is_decode_error() {
    let fx = fixture_server::start().await;
    let err = fx.api.search("garbage").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = pod_proto::api::PodcastApi::new(&pod_proto::config::ApiConfig {
        base_url: format!("http://{}", addr),
        request_timeout_secs: 2,
    })
    .unwrap();
    let err = api.search("anything").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}
