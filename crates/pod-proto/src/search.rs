//! Query validation, result filtering and request sequencing.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::FeedSummary;

/// Shown in place of results when a search or episode listing comes back empty.
pub const NO_RESULTS: &str = "No Results Found";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("Please enter a podcast title.")]
    EmptyInput,
}

/// Trim user input into a query, rejecting blank input.
pub fn prepare_query(input: &str) -> Result<String, SearchError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SearchError::EmptyInput);
    }
    Ok(trimmed.to_string())
}

/// Drop feeds without episodes and feeds whose title was already seen.
///
/// The first feed with a given title wins; comparison is case-sensitive.
pub fn filter_feeds(feeds: Vec<FeedSummary>) -> Vec<FeedSummary> {
    let mut seen: HashSet<String> = HashSet::new();
    feeds
        .into_iter()
        .filter(|feed| feed.episode_count > 0)
        .filter(|feed| seen.insert(feed.title.clone()))
        .collect()
}

/// Hands out increasing request numbers; only the newest one is current.
///
/// A response is applied only if the number it was issued with is still the
/// latest, so a slow response can never overwrite a newer one.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, seq: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == seq
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(title: &str, episodes: i64) -> FeedSummary {
        FeedSummary {
            title: title.into(),
            episode_count: episodes,
            ..Default::default()
        }
    }

    #[test]
    fn test_blank_input_rejected() {
        assert_eq!(prepare_query("   "), Err(SearchError::EmptyInput));
        assert_eq!(prepare_query(""), Err(SearchError::EmptyInput));
        assert_eq!(
            SearchError::EmptyInput.to_string(),
            "Please enter a podcast title."
        );
        assert_eq!(prepare_query("  serial \n").unwrap(), "serial");
    }

    #[test]
    fn test_duplicate_titles_first_wins() {
        let mut first = feed("Serial", 10);
        first.description = "first".into();
        let mut second = feed("Serial", 20);
        second.description = "second".into();

        let kept = filter_feeds(vec![first, feed("Other", 1), second]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].description, "first");
        assert_eq!(kept[1].title, "Other");
    }

    #[test]
    fn test_titles_compare_case_sensitively() {
        let kept = filter_feeds(vec![feed("Serial", 1), feed("serial", 1)]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_zero_episode_feed_dropped() {
        assert!(filter_feeds(vec![feed("Empty", 0)]).is_empty());
        assert!(filter_feeds(vec![feed("Negative", -1)]).is_empty());
    }

    #[test]
    fn test_empty_feed_does_not_claim_title() {
        let kept = filter_feeds(vec![feed("Serial", 0), feed("Serial", 4)]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].episode_count, 4);
    }

    #[test]
    fn test_stale_sequence_discarded() {
        let seq = RequestSequencer::new();
        let first = seq.issue();
        let second = seq.issue();
        assert!(second > first);
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
        assert_eq!(seq.latest(), second);
    }
}
