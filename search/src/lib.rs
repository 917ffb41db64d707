//! Quill fuzzy search core.
//!
//! Provides interactive, per-keystroke fuzzy search over notes, journal
//! entries and tasks.
//!
//! # Design
//!
//! - `Searcher`: owns a fixed corpus of `(key, haystack)` pairs and answers
//!   repeated `search(needle)` calls. Scoring is spread over a persistent
//!   `WorkerPool`; each worker owns a private `Scorer`.
//! - Incremental narrowing: a needle that extends the previous one only
//!   rescores the previous matches.
//! - `Chunker`: splits long documents into line chunks that remember their
//!   source document, byte range and line number.
//! - `Snippet` / `PreviewDisplay`: select what to show for a hit. Drawing is
//!   left to the caller.
//!
//! # Blocking API
//!
//! - `Searcher::search()`: scores, sorts and returns matches worst first, best
//!   last. Blocks until every item in the search window is scored.
//! - `SearchResult::print_matched()`: snippet window around the first match.
//! - `PreviewDisplay::lines()`: lines around a chunk hit.

mod chunker;
mod config;
mod error;
mod pool;
mod render;
mod results;
mod scorer;
mod searcher;

pub use chunker::{ChunkIndex, Chunker, DocumentId};
pub use config::{CaseMatching, SearchConfig, SnippetConfig};
pub use error::{ConfigError, Result, SearchError};
pub use pool::WorkerPool;
pub use render::{ELLIPSIS, PreviewDisplay, PreviewLine, Segment, Segments, Snippet};
pub use results::{MatchBuffer, NEEDLE_MAX, ResultList, SearchResult};
pub use scorer::{FuzzyOptions, FuzzyScorer, ScoredMatch, Scorer};
pub use searcher::Searcher;
