mod common;

use common::fixture_server;
use pod_proto::api::ApiError;

#[tokio::test]
async fn episodes_keep_server_order_and_carry_feed_id() {
    let fx = fixture_server::start().await;
    let items = fx.api.list_episodes(Some(77), 2).await.unwrap().unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Episode 2");
    assert_eq!(items[1].title, "Episode 1");
    assert!(items.iter().all(|e| e.feed_id == Some(77)));

    // Episode artwork falls back to the feed image; nulls decode as empty.
    assert_eq!(items[0].artwork_url(), Some("https://img.example/feed.png"));
    assert_eq!(items[1].description, "");
    assert_eq!(items[1].published_label(), "Not Available");
}

#[tokio::test]
async fn episodes_request_carries_feed_id_and_max() {
    let fx = fixture_server::start().await;
    fx.api.list_episodes(Some(77), 40).await.unwrap();

    let seen = fx.recorded.all();
    assert_eq!(seen.len(), 1);
    let params = &seen[0].1;
    assert_eq!(params.get("feedId").map(String::as_str), Some("77"));
    assert_eq!(params.get("max").map(String::as_str), Some("40"));
}

#[tokio::test]
async fn missing_feed_id_sends_nothing() {
    let fx = fixture_server::start().await;
    assert!(fx.api.list_episodes(None, 10).await.unwrap().is_none());
    assert!(fx.api.list_episodes(Some(0), 10).await.unwrap().is_none());
    assert!(fx.recorded.all().is_empty());
}

#[tokio::test]
async fn episodes_not_found_is_status() {
    let fx = fixture_server::start().await;
    let err = fx.api.list_episodes(Some(404), 5).await.unwrap_err();
    assert!(matches!(err, ApiError::Status(s) if s.as_u16() == 404));
}
