//! HTTP client for the podcast index proxy (`/api/search`, `/api/episodes`).

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::model::{EpisodeSummary, EpisodesResponse, FeedSummary, SearchResponse};
use crate::search::filter_feeds;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(StatusCode),
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Text rendered in place of results.
    pub fn display_message(&self) -> String {
        format!("Error: {}", self)
    }
}

#[derive(Debug, Clone)]
pub struct PodcastApi {
    client: reqwest::Client,
    base_url: String,
}

impl PodcastApi {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("p0dcast/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search feeds by title.  `query` must already be trimmed and non-empty.
    ///
    /// The result is filtered: no zero-episode feeds, no repeated titles.
    pub async fn search(&self, query: &str) -> Result<Vec<FeedSummary>, ApiError> {
        let url = format!("{}/api/search", self.base_url);
        let resp: SearchResponse = self.get_json(&url, &[("q", query.to_string())]).await?;
        let total = resp.feeds.len();
        let feeds = filter_feeds(resp.feeds);
        debug!("search '{}': {} feeds ({} after filtering)", query, total, feeds.len());
        Ok(feeds)
    }

    /// List episodes of one feed, in server order.
    ///
    /// Returns `Ok(None)` without sending anything when the feed has no
    /// usable id.  Every returned episode carries `feed_id`.
    pub async fn list_episodes(
        &self,
        feed_id: Option<u64>,
        max: i64,
    ) -> Result<Option<Vec<EpisodeSummary>>, ApiError> {
        let Some(feed_id) = feed_id.filter(|id| *id != 0) else {
            debug!("list_episodes: no feed id, skipping request");
            return Ok(None);
        };
        let url = format!("{}/api/episodes", self.base_url);
        let params = [("feedId", feed_id.to_string()), ("max", max.to_string())];
        let resp: EpisodesResponse = self.get_json(&url, &params).await?;
        let items = resp
            .items
            .into_iter()
            .map(|mut ep| {
                ep.feed_id = Some(feed_id);
                ep
            })
            .collect::<Vec<_>>();
        debug!("episodes feed={}: {} items", feed_id, items.len());
        Ok(Some(items))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("GET {} returned {}", url, status);
            return Err(ApiError::Status(status));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefix() {
        let err = ApiError::Status(StatusCode::BAD_GATEWAY);
        assert_eq!(err.display_message(), "Error: server returned 502 Bad Gateway");

        let decode = serde_json::from_str::<SearchResponse>("[").unwrap_err();
        assert!(ApiError::from(decode).display_message().starts_with("Error: unexpected response"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = ApiConfig {
            base_url: "http://localhost:3000/".into(),
            request_timeout_secs: 1,
        };
        let api = PodcastApi::new(&config).unwrap();
        assert_eq!(api.base_url(), "http://localhost:3000");
    }

    #[tokio::test]
    async fn test_episodes_without_feed_id_is_noop() {
        // Port 9 is never contacted: the call must return before any request.
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".into(),
            request_timeout_secs: 1,
        };
        let api = PodcastApi::new(&config).unwrap();
        assert!(api.list_episodes(None, 10).await.unwrap().is_none());
        assert!(api.list_episodes(Some(0), 10).await.unwrap().is_none());
    }
}
