//! Feed, episode and snapshot types shared by the clients, the store and the UI.
//!
//! Field names follow the podcast proxy's camelCase JSON so the same structs
//! can be decoded from HTTP responses and written to the preference store.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::timefmt;

/// Treat an explicit JSON `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One podcast series as returned by `/api/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSummary {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub image: String,
    #[serde(default, deserialize_with = "nullable")]
    pub episode_count: i64,
    /// Epoch seconds of the newest episode.
    #[serde(default)]
    pub newest_item_pubdate: Option<i64>,
    /// Provider-specific numeric feed id. Zero is treated as absent.
    #[serde(default)]
    pub itunes_id: Option<u64>,
}

impl FeedSummary {
    /// The id to request episodes with, if the feed has a usable one.
    pub fn feed_id(&self) -> Option<u64> {
        self.itunes_id.filter(|id| *id != 0)
    }

    pub fn artwork_url(&self) -> Option<&str> {
        non_empty(&self.image)
    }

    pub fn newest_label(&self) -> String {
        timefmt::date_label(self.newest_item_pubdate)
    }
}

/// One episode as returned by `/api/episodes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSummary {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    /// Rich text (HTML) as delivered by the index.
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub image: String,
    #[serde(default, deserialize_with = "nullable")]
    pub feed_image: String,
    /// Epoch seconds.
    #[serde(default)]
    pub date_published: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub enclosure_url: String,
    /// Stamped by the episode client from the request; absent on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_id: Option<u64>,
}

impl EpisodeSummary {
    pub fn key(&self) -> EpisodeKey {
        EpisodeKey {
            feed_id: self.feed_id,
            enclosure_url: self.enclosure_url.clone(),
        }
    }

    /// Episode artwork, falling back to the feed's artwork.
    pub fn artwork_url(&self) -> Option<&str> {
        non_empty(&self.image).or_else(|| non_empty(&self.feed_image))
    }

    pub fn published_label(&self) -> String {
        timefmt::date_label(self.date_published)
    }
}

/// Stable identity of an episode: the feed it came from plus its audio URL.
///
/// Titles are display strings and can collide across episodes, so queue
/// membership is tested with this key instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpisodeKey {
    pub feed_id: Option<u64>,
    pub enclosure_url: String,
}

impl fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.feed_id {
            Some(id) => write!(f, "{}:{}", id, self.enclosure_url),
            None => write!(f, "-:{}", self.enclosure_url),
        }
    }
}

/// Last-known playback position and metadata, used to resume after restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub title: String,
    /// Publish date, already formatted for display.
    pub date: String,
    pub current_time: f64,
    pub duration: f64,
    #[serde(default)]
    pub image: String,
    /// Audio source URL.
    pub src: String,
}

/// Body of `GET /api/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub feeds: Vec<FeedSummary>,
}

/// Body of `GET /api/episodes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EpisodesResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub items: Vec<EpisodeSummary>,
}

fn non_empty(s: &str) -> Option<&str> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_decodes_nulls_as_defaults() {
        let json = r#"{"title":null,"description":"d","image":null,"episodeCount":3,
                       "newestItemPubdate":null,"itunesId":0}"#;
        let feed: FeedSummary = serde_json::from_str(json).unwrap();
        assert_eq!(feed.title, "");
        assert_eq!(feed.episode_count, 3);
        assert_eq!(feed.feed_id(), None);
        assert_eq!(feed.artwork_url(), None);
        assert_eq!(feed.newest_label(), "Not Available");
    }

    #[test]
    fn test_episode_artwork_falls_back_to_feed_image() {
        let ep = EpisodeSummary {
            title: "Ep 1".into(),
            feed_image: "https://img.example/feed.png".into(),
            enclosure_url: "https://cdn.example/1.mp3".into(),
            ..Default::default()
        };
        assert_eq!(ep.artwork_url(), Some("https://img.example/feed.png"));
    }

    #[test]
    fn test_episode_key_ignores_title() {
        let a = EpisodeSummary {
            title: "Same".into(),
            enclosure_url: "https://cdn.example/a.mp3".into(),
            feed_id: Some(7),
            ..Default::default()
        };
        let b = EpisodeSummary {
            enclosure_url: "https://cdn.example/b.mp3".into(),
            ..a.clone()
        };
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key().to_string(), "7:https://cdn.example/a.mp3");
    }

    #[test]
    fn test_episode_feed_id_not_serialized_when_absent() {
        let ep = EpisodeSummary {
            title: "x".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&ep).unwrap();
        assert!(json.contains("\"enclosureUrl\""));
        assert!(!json.contains("feedId"));
    }

    #[test]
    fn test_search_response_null_feeds() {
        let resp: SearchResponse = serde_json::from_str(r#"{"feeds":null}"#).unwrap();
        assert!(resp.feeds.is_empty());
        let resp: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.feeds.is_empty());
    }
}
