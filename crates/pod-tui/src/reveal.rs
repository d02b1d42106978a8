//! Image reveal bookkeeping for a list of result cards.
//!
//! The first `limit` cards load their artwork immediately and the list stays
//! behind the loader until every one of them has settled (loaded or fallen
//! back).  Cards past the limit keep their source deferred and are requested
//! only once they scroll into view, after the reveal.  A generation number
//! tags every request so completions from a replaced result set are ignored.

use std::ops::Range;
use tracing::debug;

/// Eager image count used when nothing else is configured.
pub const EAGER_LIMIT: usize = 25;

#[derive(Debug, Clone, PartialEq)]
pub enum ArtworkState {
    /// Past the eager limit, not yet in view.  Holds the real source.
    Deferred(Option<String>),
    Loading(String),
    Loaded { width: u32, height: u32 },
    /// Shown with the fallback artwork.
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkRequest {
    pub generation: u64,
    pub index: usize,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArtworkOutcome {
    Loaded { width: u32, height: u32 },
    Fallback(String),
}

#[derive(Debug, Default, PartialEq)]
pub struct RevealStep {
    pub requests: Vec<ArtworkRequest>,
    /// The container became visible in this step.
    pub revealed: bool,
}

#[derive(Debug)]
pub struct ImageReveal {
    generation: u64,
    limit: usize,
    slots: Vec<ArtworkState>,
    pending: usize,
    revealed: bool,
}

impl ImageReveal {
    pub fn new(limit: usize) -> Self {
        Self {
            generation: 0,
            limit,
            slots: Vec::new(),
            pending: 0,
            revealed: false,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn slot(&self, idx: usize) -> Option<&ArtworkState> {
        self.slots.get(idx)
    }

    /// Hide everything again, e.g. while a new request is in flight.
    pub fn conceal(&mut self) {
        self.generation += 1;
        self.slots.clear();
        self.pending = 0;
        self.revealed = false;
    }

    /// Start a new result set.  `sources[i]` is the artwork URL of card `i`.
    pub fn reset(&mut self, sources: Vec<Option<String>>) -> RevealStep {
        self.conceal();
        let mut requests = Vec::new();
        for (index, source) in sources.into_iter().enumerate() {
            let state = if index >= self.limit {
                ArtworkState::Deferred(source)
            } else if let Some(url) = source {
                requests.push(ArtworkRequest {
                    generation: self.generation,
                    index,
                    url: url.clone(),
                });
                ArtworkState::Loading(url)
            } else {
                ArtworkState::Fallback
            };
            self.slots.push(state);
        }
        self.pending = requests.len();
        debug!(
            "reveal gen={}: {} cards, {} eager requests",
            self.generation,
            self.slots.len(),
            self.pending
        );
        let revealed = self.pending == 0;
        self.revealed = revealed;
        RevealStep { requests, revealed }
    }

    /// Record a finished load.  Returns true when this completion revealed
    /// the container.
    pub fn on_settled(&mut self, generation: u64, index: usize, outcome: ArtworkOutcome) -> bool {
        if generation != self.generation {
            debug!("reveal: dropping stale artwork gen={} idx={}", generation, index);
            return false;
        }
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        if !matches!(slot, ArtworkState::Loading(_)) {
            return false;
        }
        *slot = match outcome {
            ArtworkOutcome::Loaded { width, height } if width > 0 => {
                ArtworkState::Loaded { width, height }
            }
            ArtworkOutcome::Loaded { .. } => ArtworkState::Fallback,
            ArtworkOutcome::Fallback(reason) => {
                debug!("reveal: artwork {} fell back: {}", index, reason);
                ArtworkState::Fallback
            }
        };
        if self.revealed || index >= self.limit {
            return false;
        }
        self.pending = self.pending.saturating_sub(1);
        if self.pending == 0 {
            self.revealed = true;
            return true;
        }
        false
    }

    /// Cards in `visible` are on screen.  Deferred ones among them start
    /// loading; each card is requested at most once.
    pub fn on_viewport(&mut self, visible: Range<usize>) -> Vec<ArtworkRequest> {
        if !self.revealed {
            return Vec::new();
        }
        let end = visible.end.min(self.slots.len());
        let mut requests = Vec::new();
        for index in visible.start.min(end)..end {
            let ArtworkState::Deferred(source) = &self.slots[index] else {
                continue;
            };
            self.slots[index] = match source.clone() {
                Some(url) => {
                    requests.push(ArtworkRequest {
                        generation: self.generation,
                        index,
                        url: url.clone(),
                    });
                    ArtworkState::Loading(url)
                }
                None => ArtworkState::Fallback,
            };
        }
        requests
    }
}

impl Default for ImageReveal {
    fn default() -> Self {
        Self::new(EAGER_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(n: usize) -> Vec<Option<String>> {
        (0..n)
            .map(|i| Some(format!("https://img.example/{i}.png")))
            .collect()
    }

    fn loaded() -> ArtworkOutcome {
        ArtworkOutcome::Loaded {
            width: 600,
            height: 600,
        }
    }

    #[test]
    fn test_reveal_after_first_25_of_30() {
        let mut reveal = ImageReveal::new(25);
        let step = reveal.reset(sources(30));
        assert!(!step.revealed);
        assert_eq!(step.requests.len(), 25);
        assert!(step.requests.iter().all(|r| r.index < 25));
        for i in 25..30 {
            assert!(matches!(reveal.slot(i), Some(ArtworkState::Deferred(Some(_)))));
        }

        // Deferred cards stay unrequested until the reveal.
        assert!(reveal.on_viewport(20..30).is_empty());

        let gen = reveal.generation();
        for i in 0..24 {
            assert!(!reveal.on_settled(gen, i, loaded()));
        }
        assert!(!reveal.is_revealed());
        assert!(reveal.on_settled(gen, 24, ArtworkOutcome::Fallback("404".into())));
        assert!(reveal.is_revealed());
        assert_eq!(reveal.slot(24), Some(&ArtworkState::Fallback));

        let lazy = reveal.on_viewport(20..28);
        let idx: Vec<_> = lazy.iter().map(|r| r.index).collect();
        assert_eq!(idx, [25, 26, 27]);
        // Observed once: scrolling back over them requests nothing.
        assert!(reveal.on_viewport(20..28).is_empty());
        assert_eq!(reveal.on_viewport(0..100).len(), 2);
    }

    #[test]
    fn test_zero_images_reveals_immediately() {
        let mut reveal = ImageReveal::new(25);
        let step = reveal.reset(Vec::new());
        assert!(step.revealed);
        assert!(step.requests.is_empty());
    }

    #[test]
    fn test_missing_sources_settle_as_fallback() {
        let mut reveal = ImageReveal::new(25);
        let step = reveal.reset(vec![None, Some("https://img.example/a.png".into()), None]);
        assert_eq!(step.requests.len(), 1);
        assert!(!step.revealed);
        assert_eq!(reveal.slot(0), Some(&ArtworkState::Fallback));
        assert!(reveal.on_settled(reveal.generation(), 1, loaded()));
    }

    #[test]
    fn test_all_sources_missing_reveals_immediately() {
        let mut reveal = ImageReveal::new(25);
        assert!(reveal.reset(vec![None, None]).revealed);
    }

    #[test]
    fn test_zero_width_is_fallback() {
        let mut reveal = ImageReveal::new(25);
        reveal.reset(sources(1));
        let gen = reveal.generation();
        assert!(reveal.on_settled(gen, 0, ArtworkOutcome::Loaded { width: 0, height: 0 }));
        assert_eq!(reveal.slot(0), Some(&ArtworkState::Fallback));
    }

    #[test]
    fn test_stale_generation_ignored() {
        let mut reveal = ImageReveal::new(25);
        reveal.reset(sources(2));
        let old = reveal.generation();
        reveal.reset(sources(2));

        assert!(!reveal.on_settled(old, 0, loaded()));
        assert!(!reveal.on_settled(old, 1, loaded()));
        assert!(!reveal.is_revealed());
        assert_eq!(reveal.pending(), 2);
    }

    #[test]
    fn test_duplicate_completion_counted_once() {
        let mut reveal = ImageReveal::new(25);
        reveal.reset(sources(2));
        let gen = reveal.generation();
        reveal.on_settled(gen, 0, loaded());
        reveal.on_settled(gen, 0, loaded());
        assert_eq!(reveal.pending(), 1);
        assert!(!reveal.is_revealed());
    }
}
