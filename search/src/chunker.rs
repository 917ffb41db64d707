//! Line-granular chunking of long documents for content search.
//!
//! Documents are borrowed, not copied. Each chunk records which document it
//! came from, its exact byte range and its 1-based line number, so a hit can
//! be mapped back for previews.

use crate::config::SearchConfig;
use crate::scorer::{FuzzyOptions, FuzzyScorer, Scorer};
use crate::searcher::Searcher;

pub type DocumentId = usize;

/// Location of one chunk in its source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkIndex {
    pub document: DocumentId,
    /// Byte offset of the first byte of the line.
    pub start: usize,
    /// Byte offset one past the last byte of the line, excluding the newline.
    pub end: usize,
    /// 1-based.
    pub line: usize,
}

impl ChunkIndex {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug)]
pub struct Chunker<'d> {
    documents: Vec<&'d str>,
    chunks: Vec<&'d str>,
    indices: Vec<ChunkIndex>,
    min_chunk_chars: usize,
}

impl<'d> Chunker<'d> {
    pub fn new(min_chunk_chars: usize) -> Self {
        Self {
            documents: Vec::new(),
            chunks: Vec::new(),
            indices: Vec::new(),
            min_chunk_chars,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.min_chunk_chars)
    }

    /// Splits `document` into line chunks and returns its id.
    ///
    /// Lines shorter than the configured minimum once trimmed are skipped;
    /// kept lines are stored untrimmed.
    pub fn add(&mut self, document: &'d str) -> DocumentId {
        let id = self.documents.len();
        self.documents.push(document);

        let before = self.chunks.len();
        let mut start = 0;
        for (line_number, line) in document.split('\n').enumerate() {
            let end = start + line.len();
            if line.trim().chars().count() >= self.min_chunk_chars {
                self.chunks.push(line);
                self.indices.push(ChunkIndex {
                    document: id,
                    start,
                    end,
                    line: line_number + 1,
                });
            }
            start = end + 1;
        }

        tracing::trace!(
            document = id,
            bytes = document.len(),
            chunks = self.chunks.len() - before,
            "chunked document"
        );
        id
    }

    /// Builds a fuzzy searcher over every chunk added so far.
    ///
    /// Each call returns an independent searcher.
    pub fn searcher(&self, config: &SearchConfig) -> Searcher<'d, ChunkIndex> {
        self.searcher_with::<FuzzyScorer>(FuzzyOptions::from(config), config)
    }

    /// Builds a searcher over every chunk with a custom scorer.
    pub fn searcher_with<S: Scorer>(
        &self,
        options: S::Options,
        config: &SearchConfig,
    ) -> Searcher<'d, ChunkIndex, S> {
        let items = self
            .indices
            .iter()
            .copied()
            .zip(self.chunks.iter().copied());
        Searcher::from_items_with_scorer(items, options, config)
    }

    /// Full text of the document a chunk came from.
    pub fn document(&self, chunk: &ChunkIndex) -> &'d str {
        self.documents[chunk.document]
    }

    /// Text of the chunk itself.
    pub fn chunk_text(&self, chunk: &ChunkIndex) -> &'d str {
        &self.document(chunk)[chunk.range()]
    }

    pub fn document_by_id(&self, id: DocumentId) -> Option<&'d str> {
        self.documents.get(id).copied()
    }

    pub fn documents(&self) -> &[&'d str] {
        &self.documents
    }

    pub fn chunks(&self) -> &[ChunkIndex] {
        &self.indices
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn min_chunk_chars(&self) -> usize {
        self.min_chunk_chars
    }
}

impl Default for Chunker<'_> {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}
