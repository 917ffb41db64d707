//! Scorer contract and the nucleo-backed fuzzy scorer.

use crate::config::{CaseMatching, SearchConfig};
use nucleo::pattern::{Atom, AtomKind, Normalization};
use nucleo::{Config as NucleoConfig, Matcher, Utf32Str};

/// Outcome of scoring one haystack against a needle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMatch<'a> {
    /// `None` if the haystack does not match.
    pub score: Option<i64>,
    /// Ascending byte offsets of the matched characters in the haystack.
    pub matches: &'a [u32],
}

impl ScoredMatch<'_> {
    pub const NO_MATCH: ScoredMatch<'static> = ScoredMatch {
        score: None,
        matches: &[],
    };
}

/// Character-level matching primitive used by the searcher.
///
/// Every worker thread owns its own instance, so implementations may keep
/// mutable scratch buffers. Scoring must be a pure function of
/// `(haystack, needle)` and must not fail: an item that cannot be scored is
/// reported as no match.
pub trait Scorer: Send + 'static {
    type Options: Clone;

    /// Creates an instance able to score haystacks up to `max_haystack_len`
    /// bytes against needles up to `max_needle_len` bytes.
    fn new(max_haystack_len: usize, max_needle_len: usize, options: &Self::Options) -> Self;

    fn score_matches(&mut self, haystack: &str, needle: &str) -> ScoredMatch<'_>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyOptions {
    pub case_matching: CaseMatching,
    pub unicode_normalization: bool,
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        Self {
            case_matching: CaseMatching::default(),
            unicode_normalization: true,
        }
    }
}

impl From<&SearchConfig> for FuzzyOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            case_matching: config.case_matching,
            unicode_normalization: config.unicode_normalization,
        }
    }
}

/// Fuzzy subsequence scorer over `nucleo`'s matcher. Higher scores are better.
///
/// The empty needle matches every haystack with score 0 and no offsets.
pub struct FuzzyScorer {
    matcher: Matcher,
    options: FuzzyOptions,
    /// Needle the cached atom was parsed from.
    needle: String,
    atom: Option<Atom>,
    chars: Vec<char>,
    /// Byte offset of each entry in `chars`.
    char_offsets: Vec<u32>,
    indices: Vec<u32>,
    offsets: Vec<u32>,
}

impl FuzzyScorer {
    /// Re-parses the cached atom when the needle differs from the last call.
    fn refresh_atom(&mut self, needle: &str) {
        if self.atom.is_some() && self.needle == needle {
            return;
        }

        let case_matching = match self.options.case_matching {
            CaseMatching::Sensitive => nucleo::pattern::CaseMatching::Respect,
            CaseMatching::Insensitive => nucleo::pattern::CaseMatching::Ignore,
            CaseMatching::Smart => nucleo::pattern::CaseMatching::Smart,
        };

        let normalization = if self.options.unicode_normalization {
            Normalization::Smart
        } else {
            Normalization::Never
        };

        self.needle.clear();
        self.needle.push_str(needle);
        self.atom = Some(Atom::new(
            needle,
            case_matching,
            normalization,
            AtomKind::Fuzzy,
            false,
        ));
    }
}

impl Scorer for FuzzyScorer {
    type Options = FuzzyOptions;

    fn new(max_haystack_len: usize, max_needle_len: usize, options: &FuzzyOptions) -> Self {
        Self {
            matcher: Matcher::new(NucleoConfig::DEFAULT),
            options: *options,
            needle: String::with_capacity(max_needle_len),
            atom: None,
            chars: Vec::with_capacity(max_haystack_len),
            char_offsets: Vec::with_capacity(max_haystack_len),
            indices: Vec::with_capacity(max_needle_len),
            offsets: Vec::with_capacity(max_needle_len),
        }
    }

    fn score_matches(&mut self, haystack: &str, needle: &str) -> ScoredMatch<'_> {
        if needle.is_empty() {
            return ScoredMatch {
                score: Some(0),
                matches: &[],
            };
        }

        self.refresh_atom(needle);
        let Some(atom) = &self.atom else {
            return ScoredMatch::NO_MATCH;
        };

        let ascii = haystack.is_ascii();
        let utf32 = if ascii {
            Utf32Str::Ascii(haystack.as_bytes())
        } else {
            self.chars.clear();
            self.char_offsets.clear();
            for (offset, c) in haystack.char_indices() {
                self.chars.push(c);
                self.char_offsets.push(offset as u32);
            }
            Utf32Str::Unicode(&self.chars)
        };

        self.indices.clear();
        let Some(score) = atom.indices(utf32, &mut self.matcher, &mut self.indices) else {
            return ScoredMatch::NO_MATCH;
        };

        // Matcher indices count chars; callers want byte offsets.
        self.indices.sort_unstable();
        self.indices.dedup();
        self.offsets.clear();
        if ascii {
            self.offsets.extend_from_slice(&self.indices);
        } else {
            let char_offsets = &self.char_offsets;
            self.offsets
                .extend(self.indices.iter().map(|&i| char_offsets[i as usize]));
        }

        ScoredMatch {
            score: Some(i64::from(score)),
            matches: &self.offsets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> FuzzyScorer {
        FuzzyScorer::new(64, 128, &FuzzyOptions::default())
    }

    #[test]
    fn test_subsequence_matches() {
        let mut scorer = scorer();

        let scored = scorer.score_matches("abcdefg", "ae");

        assert!(scored.score.is_some());
        assert_eq!(scored.matches, &[0, 4]);
    }

    #[test]
    fn test_missing_char_is_no_match() {
        let mut scorer = scorer();

        let scored = scorer.score_matches("aaaaaab", "ae");

        assert_eq!(scored, ScoredMatch::NO_MATCH);
    }

    #[test]
    fn test_empty_needle_matches_everything() {
        let mut scorer = scorer();

        let scored = scorer.score_matches("anything", "");

        assert_eq!(scored.score, Some(0));
        assert!(scored.matches.is_empty());
    }

    #[test]
    fn test_word_boundary_scores_higher() {
        let mut scorer = scorer();

        let inner = scorer.score_matches("abcdefg", "ae").score.unwrap();
        let boundary = scorer.score_matches("abc efg hij", "ae").score.unwrap();

        assert!(boundary > inner);
    }

    #[test]
    fn test_offsets_are_bytes_for_multibyte_haystack() {
        let mut scorer = scorer();
        let haystack = "café bar";

        let scored = scorer.score_matches(haystack, "bar");

        // 'é' takes two bytes, so "bar" starts at byte 6.
        assert_eq!(scored.matches, &[6, 7, 8]);
        for &offset in scored.matches {
            assert!(haystack.is_char_boundary(offset as usize));
        }
    }

    #[test]
    fn test_smart_case() {
        let mut scorer = scorer();

        assert!(scorer.score_matches("Hello", "hel").score.is_some());
        assert!(scorer.score_matches("hello", "Hel").score.is_none());
        assert!(scorer.score_matches("Hello", "Hel").score.is_some());
    }

    #[test]
    fn test_case_sensitive_option() {
        let options = FuzzyOptions {
            case_matching: CaseMatching::Sensitive,
            ..FuzzyOptions::default()
        };
        let mut scorer = FuzzyScorer::new(64, 128, &options);

        assert!(scorer.score_matches("Hello", "hel").score.is_none());
    }

    #[test]
    fn test_needle_change_reparses() {
        let mut scorer = scorer();

        assert!(scorer.score_matches("hello world", "hw").score.is_some());
        assert!(scorer.score_matches("hello world", "xyz").score.is_none());
        assert!(scorer.score_matches("hello world", "hw").score.is_some());
    }
}
