//! Search results types.

use std::cmp::Ordering;
use std::time::Duration;

/// Longest needle, in bytes, the searcher accepts.
pub const NEEDLE_MAX: usize = 128;

/// Fixed-capacity list of matched byte offsets in a haystack.
#[derive(Debug, Clone)]
pub struct MatchBuffer {
    len: usize,
    offsets: [u32; NEEDLE_MAX],
}

impl MatchBuffer {
    pub fn new() -> Self {
        Self {
            len: 0,
            offsets: [0; NEEDLE_MAX],
        }
    }

    /// Replaces the contents, keeping at most `NEEDLE_MAX` offsets.
    pub fn set(&mut self, offsets: &[u32]) {
        let len = offsets.len().min(NEEDLE_MAX);
        self.offsets[..len].copy_from_slice(&offsets[..len]);
        self.len = len;
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.offsets[..self.len]
    }

    pub fn contains(&self, offset: usize) -> bool {
        u32::try_from(offset).is_ok_and(|offset| self.as_slice().binary_search(&offset).is_ok())
    }
}

impl Default for MatchBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// One corpus item together with its score for the most recent search.
///
/// A result permanently pairs a key with its haystack. `index()` is the
/// item's position in the corpus the searcher was built from.
#[derive(Debug)]
pub struct SearchResult<'h, K> {
    pub(crate) key: K,
    pub(crate) haystack: &'h str,
    pub(crate) index: usize,
    /// Boxed so sorting moves a pointer, not the whole buffer.
    pub(crate) matches: Box<MatchBuffer>,
    pub(crate) score: Option<i64>,
}

impl<'h, K> SearchResult<'h, K> {
    pub(crate) fn new(index: usize, key: K, haystack: &'h str) -> Self {
        Self {
            key,
            haystack,
            index,
            matches: Box::default(),
            score: None,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn haystack(&self) -> &'h str {
        self.haystack
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Ascending byte offsets of the matched characters.
    pub fn matches(&self) -> &[u32] {
        self.matches.as_slice()
    }

    /// `None` if the item did not match the last needle it was scored against.
    pub fn score(&self) -> Option<i64> {
        self.score
    }

    /// Ordering used for result lists: no-match first, then ascending score,
    /// ties broken by corpus position.
    pub(crate) fn rank_cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Matches of one search, worst first, best last.
#[derive(Debug)]
pub struct ResultList<'s, 'h, K> {
    pub(crate) results: &'s [SearchResult<'h, K>],
    pub(crate) elapsed: Duration,
}

impl<'s, 'h, K> ResultList<'s, 'h, K> {
    pub fn results(&self) -> &'s [SearchResult<'h, K>] {
        self.results
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Highest scoring match.
    pub fn best(&self) -> Option<&'s SearchResult<'h, K>> {
        self.results.last()
    }

    /// Iterates best match first.
    pub fn iter_best_first(&self) -> impl Iterator<Item = &'s SearchResult<'h, K>> {
        self.results.iter().rev()
    }

    /// Keys in list order.
    pub fn keys(&self) -> impl Iterator<Item = &'s K> {
        self.results.iter().map(SearchResult::key)
    }
}
