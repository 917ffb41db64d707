//! Snippet selection for result rows and nearby-line previews.
//!
//! Nothing here draws. A snippet decides which window of a haystack to show
//! and which bytes in it matched; the UI applies its own emphasis.

use crate::chunker::{ChunkIndex, Chunker};
use crate::results::SearchResult;
use std::fmt;

/// Marker drawn where a snippet window cuts off haystack text.
pub const ELLIPSIS: &str = "...";

impl<'h, K> SearchResult<'h, K> {
    /// Selects a window of about `context_chars` bytes centred on the first
    /// match. The window plus any ellipsis markers fits in `max_width` bytes;
    /// below 7 bytes no markers are drawn.
    pub fn print_matched(&self, context_chars: usize, max_width: usize) -> Snippet<'h, '_> {
        Snippet::new(self.haystack, self.matches(), context_chars, max_width)
    }
}

/// Window of a haystack with match flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snippet<'h, 'm> {
    text: &'h str,
    /// Byte offset of `text` in the haystack.
    offset: usize,
    matches: &'m [u32],
    truncated_start: bool,
    truncated_end: bool,
}

impl<'h, 'm> Snippet<'h, 'm> {
    pub fn new(
        haystack: &'h str,
        matches: &'m [u32],
        context_chars: usize,
        max_width: usize,
    ) -> Self {
        let len = haystack.len();
        if len <= context_chars.min(max_width) {
            return Self {
                text: haystack,
                offset: 0,
                matches,
                truncated_start: false,
                truncated_end: false,
            };
        }

        let first = matches.first().map_or(0, |&m| m as usize).min(len);
        let marked = max_width > 2 * ELLIPSIS.len();
        let (start, end) = if marked {
            // Reserve one marker, and a second only if both ends are cut.
            let window = centred_window(first, context_chars.min(max_width - ELLIPSIS.len()), len);
            if window.0 > 0 && window.1 < len {
                let narrow = context_chars.min(max_width - 2 * ELLIPSIS.len());
                centred_window(first, narrow, len)
            } else {
                window
            }
        } else {
            centred_window(first, context_chars.min(max_width), len)
        };

        // Shrink inwards to char boundaries so the window never grows.
        let start = ceil_char_boundary(haystack, start);
        let end = floor_char_boundary(haystack, end).max(start);

        Self {
            text: &haystack[start..end],
            offset: start,
            matches,
            truncated_start: marked && start > 0,
            truncated_end: marked && end < len,
        }
    }

    /// Visible haystack text, without markers.
    pub fn text(&self) -> &'h str {
        self.text
    }

    /// Byte offset of the window in the haystack.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether a leading marker is drawn. Always false when `max_width` is too
    /// narrow for markers, even if the window is cut.
    pub fn truncated_start(&self) -> bool {
        self.truncated_start
    }

    pub fn truncated_end(&self) -> bool {
        self.truncated_end
    }

    /// Whether the byte at `index` within the window starts a matched character.
    pub fn is_highlighted(&self, index: usize) -> bool {
        u32::try_from(self.offset + index)
            .is_ok_and(|offset| self.matches.binary_search(&offset).is_ok())
    }

    /// Runs of window text, alternating between matched and unmatched.
    pub fn segments(&self) -> Segments<'h, '_> {
        Segments {
            snippet: self,
            pos: 0,
        }
    }

    /// Rendered width in bytes, markers included.
    pub fn width(&self) -> usize {
        let markers = usize::from(self.truncated_start) + usize::from(self.truncated_end);
        self.text.len() + markers * ELLIPSIS.len()
    }
}

impl fmt::Display for Snippet<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.truncated_start {
            f.write_str(ELLIPSIS)?;
        }
        f.write_str(self.text)?;
        if self.truncated_end {
            f.write_str(ELLIPSIS)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'h> {
    pub text: &'h str,
    pub highlighted: bool,
}

pub struct Segments<'h, 's> {
    snippet: &'s Snippet<'h, 's>,
    pos: usize,
}

impl<'h> Iterator for Segments<'h, '_> {
    type Item = Segment<'h>;

    fn next(&mut self) -> Option<Segment<'h>> {
        let text = self.snippet.text;
        if self.pos >= text.len() {
            return None;
        }

        let start = self.pos;
        let highlighted = self.snippet.is_highlighted(start);
        let mut end = start;
        for (i, c) in text[start..].char_indices() {
            if self.snippet.is_highlighted(start + i) != highlighted {
                break;
            }
            end = start + i + c.len_utf8();
        }
        self.pos = end;

        Some(Segment {
            text: &text[start..end],
            highlighted,
        })
    }
}

/// `width` bytes around `first`, shifted left when it would run past `len`.
fn centred_window(first: usize, width: usize, len: usize) -> (usize, usize) {
    let end = (first.saturating_sub(width / 2) + width).min(len);
    (end.saturating_sub(width), end)
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(s: &str, mut index: usize) -> usize {
    while !s.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// One line of a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLine<'d> {
    /// 1-based line number in the document.
    pub number: usize,
    pub text: &'d str,
    /// True for the line the chunk was taken from.
    pub is_match: bool,
}

/// Lines around a matched chunk, read from its source document.
#[derive(Debug, Clone, Copy)]
pub struct PreviewDisplay<'d> {
    document: &'d str,
    chunk: ChunkIndex,
    radius: usize,
}

impl<'d> PreviewDisplay<'d> {
    pub fn new(chunker: &Chunker<'d>, chunk: &ChunkIndex, radius: usize) -> Self {
        Self {
            document: chunker.document(chunk),
            chunk: *chunk,
            radius,
        }
    }

    /// Non-blank lines within `radius` lines of the matched line, in order.
    pub fn lines(&self) -> impl Iterator<Item = PreviewLine<'d>> + use<'d> {
        let first = self.chunk.line.saturating_sub(self.radius).max(1);
        let last = self.chunk.line + self.radius;
        let matched = self.chunk.line;
        let document = self.document;

        // Walk back from the chunk to the start of the first preview line.
        let mut start = self.chunk.start;
        let mut line = self.chunk.line;
        while line > first {
            start = document[..start - 1].rfind('\n').map_or(0, |i| i + 1);
            line -= 1;
        }

        document[start..]
            .split('\n')
            .zip(first..=last)
            .filter(|(text, _)| !text.trim().is_empty())
            .map(move |(text, number)| PreviewLine {
                number,
                text,
                is_match: number == matched,
            })
    }
}

impl fmt::Display for PreviewDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            let marker = if line.is_match { '>' } else { ' ' };
            writeln!(f, "{:>5}{marker} {}", line.number, line.text.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
