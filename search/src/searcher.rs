//! Parallel fuzzy searcher over a fixed corpus.
//!
//! # Design
//!
//! - One `SearchResult` per corpus item, allocated once. Searches rescore and
//!   reorder these in place, so a keystroke never allocates per item.
//! - Scoring runs on a `WorkerPool`; each worker owns a private scorer.
//! - Incremental narrowing: when the needle extends the previous needle, only
//!   the previous matches are rescored. This relies on the scorer never
//!   matching an extension of a needle that failed, and can be switched off
//!   with `SearchConfig::narrowing`.
//!
//! The results vector is kept as `[searched-but-unmatched | matches]` for the
//! last window, so the previous matches are always its tail.

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::pool::WorkerPool;
use crate::results::{NEEDLE_MAX, ResultList, SearchResult};
use crate::scorer::{FuzzyOptions, FuzzyScorer, Scorer};
use std::time::Instant;

pub struct Searcher<'h, K, S: Scorer = FuzzyScorer> {
    /// Declared first so workers are joined before the results are freed.
    pool: WorkerPool<S>,
    results: Vec<SearchResult<'h, K>>,
    previous_needle: String,
    /// Number of trailing results that matched `previous_needle`.
    num_previous_matches: usize,
    /// False until the first search, and after `reset`.
    has_previous: bool,
    narrowing: bool,
}

/// Create operations.
impl<'h, K: Send> Searcher<'h, K, FuzzyScorer> {
    /// Creates a fuzzy searcher over parallel key and haystack arrays.
    pub fn new(keys: Vec<K>, haystacks: &[&'h str], config: &SearchConfig) -> Result<Self> {
        Self::with_scorer(keys, haystacks, FuzzyOptions::from(config), config)
    }

    /// Creates a fuzzy searcher over `(key, haystack)` pairs.
    pub fn from_items(
        items: impl IntoIterator<Item = (K, &'h str)>,
        config: &SearchConfig,
    ) -> Self {
        Self::from_items_with_scorer(items, FuzzyOptions::from(config), config)
    }
}

impl<'h, K: Send, S: Scorer> Searcher<'h, K, S> {
    /// Creates a searcher using a custom scorer.
    pub fn with_scorer(
        keys: Vec<K>,
        haystacks: &[&'h str],
        options: S::Options,
        config: &SearchConfig,
    ) -> Result<Self> {
        if keys.len() != haystacks.len() {
            return Err(SearchError::LengthMismatch {
                keys: keys.len(),
                haystacks: haystacks.len(),
            });
        }
        Ok(Self::from_items_with_scorer(
            keys.into_iter().zip(haystacks.iter().copied()),
            options,
            config,
        ))
    }

    pub fn from_items_with_scorer(
        items: impl IntoIterator<Item = (K, &'h str)>,
        options: S::Options,
        config: &SearchConfig,
    ) -> Self {
        let results: Vec<_> = items
            .into_iter()
            .enumerate()
            .map(|(index, (key, haystack))| SearchResult::new(index, key, haystack))
            .collect();

        let max_haystack_len = results.iter().map(|r| r.haystack.len()).max().unwrap_or(0);
        let threads = config.thread_count();
        let pool = WorkerPool::with_workers(threads, |_| {
            S::new(max_haystack_len, NEEDLE_MAX, &options)
        });

        tracing::debug!(items = results.len(), threads, "created searcher");

        Self {
            num_previous_matches: results.len(),
            results,
            pool,
            previous_needle: String::with_capacity(NEEDLE_MAX),
            has_previous: false,
            narrowing: config.narrowing,
        }
    }
}

/// Search operations.
impl<'h, K: Send, S: Scorer> Searcher<'h, K, S> {
    /// Scores the corpus against `needle` and returns the matches, worst first.
    ///
    /// Needles longer than `NEEDLE_MAX` bytes are rejected before any work is
    /// dispatched.
    pub fn search(&mut self, needle: &str) -> Result<ResultList<'_, 'h, K>> {
        if needle.len() > NEEDLE_MAX {
            return Err(SearchError::NeedleTooLong {
                len: needle.len(),
                max: NEEDLE_MAX,
            });
        }

        let started = Instant::now();
        let total = self.results.len();

        let narrowed =
            self.narrowing && self.has_previous && needle.starts_with(&self.previous_needle);
        let window_len = if narrowed {
            self.num_previous_matches
        } else {
            total
        };
        let window_start = total - window_len;
        let window = &mut self.results[window_start..];

        self.pool.execute(window, |scorer: &mut S, result: &mut SearchResult<'h, K>| {
            let scored = scorer.score_matches(result.haystack, needle);
            result.score = scored.score;
            if scored.score.is_some() {
                result.matches.set(scored.matches);
            } else {
                result.matches.clear();
            }
        })?;

        window.sort_unstable_by(SearchResult::rank_cmp);
        let unmatched = window.partition_point(|r| r.score.is_none());
        let matched = window_len - unmatched;

        self.num_previous_matches = matched;
        self.previous_needle.clear();
        self.previous_needle.push_str(needle);
        self.has_previous = true;

        let elapsed = started.elapsed();
        tracing::trace!(
            needle_len = needle.len(),
            window = window_len,
            matched,
            narrowed,
            elapsed_us = elapsed.as_micros() as u64,
            "search finished"
        );

        Ok(ResultList {
            results: &self.results[total - matched..],
            elapsed,
        })
    }

    /// Forgets the previous needle so the next search rescans the whole corpus.
    pub fn reset(&mut self) {
        self.previous_needle.clear();
        self.num_previous_matches = self.results.len();
        self.has_previous = false;
    }
}

/// Query operations.
impl<'h, K, S: Scorer> Searcher<'h, K, S> {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn thread_count(&self) -> usize {
        self.pool.thread_count()
    }

    /// Every result slot, in the order left by the last search.
    ///
    /// Slots outside the last search window keep the score from the search
    /// that last covered them.
    pub fn results(&self) -> &[SearchResult<'h, K>] {
        &self.results
    }

    /// Needle of the last search, if any.
    pub fn previous_needle(&self) -> Option<&str> {
        self.has_previous.then_some(self.previous_needle.as_str())
    }
}
