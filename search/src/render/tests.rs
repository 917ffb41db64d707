use super::*;
use crate::config::SearchConfig;

mod snippet {
    use super::*;

    fn padded() -> String {
        format!("{}XYZ{}", "a".repeat(50), "b".repeat(50))
    }

    #[test]
    fn test_short_haystack_shown_whole() {
        let snippet = Snippet::new("hello world", &[0, 6], 40, 80);

        assert_eq!(snippet.text(), "hello world");
        assert!(!snippet.truncated_start());
        assert!(!snippet.truncated_end());
        assert_eq!(snippet.to_string(), "hello world");
    }

    #[test]
    fn test_window_centred_on_first_match() {
        let haystack = padded();

        let snippet = Snippet::new(&haystack, &[50, 51, 52], 20, 80);

        assert_eq!(snippet.offset(), 40);
        assert_eq!(snippet.text(), format!("{}XYZ{}", "a".repeat(10), "b".repeat(7)));
        assert!(snippet.truncated_start());
        assert!(snippet.truncated_end());
        assert_eq!(snippet.to_string(), format!("...{}...", snippet.text()));
    }

    #[test]
    fn test_clipped_to_max_width() {
        let haystack = padded();

        let snippet = Snippet::new(&haystack, &[50], 100, 30);

        assert_eq!(snippet.width(), 30);
        assert_eq!(snippet.to_string().len(), 30);
        assert!(snippet.text().contains('X'));
    }

    #[test]
    fn test_too_narrow_for_markers() {
        let snippet = Snippet::new("abcdefghijklmnop", &[8], 10, 5);

        assert_eq!(snippet.text(), "ghijk");
        assert!(!snippet.truncated_start());
        assert!(!snippet.truncated_end());
        assert_eq!(snippet.to_string(), "ghijk");
        assert!(snippet.width() <= 5);
    }

    #[test]
    fn test_narrow_widths_never_overflow() {
        let haystack = padded();

        for max_width in 0..=12 {
            for &first in &[0u32, 50, 102] {
                let indices = [first];
                let snippet = Snippet::new(&haystack, &indices, 40, max_width);
                assert!(
                    snippet.width() <= max_width,
                    "max_width {max_width}, match {first}: {snippet}"
                );
                assert_eq!(snippet.to_string().len(), snippet.width());
            }
        }
    }

    #[test]
    fn test_single_marker_uses_freed_width() {
        let haystack = "abcdefghijklmnopqrstuvwxyz";

        let snippet = Snippet::new(haystack, &[0], 40, 12);

        assert_eq!(snippet.to_string(), "abcdefghi...");
        assert_eq!(snippet.width(), 12);

        let snippet = Snippet::new(haystack, &[25], 40, 12);

        assert_eq!(snippet.to_string(), "...rstuvwxyz");
        assert_eq!(snippet.width(), 12);
    }

    #[test]
    fn test_match_near_start() {
        let haystack = format!("XYZ{}", "b".repeat(100));

        let snippet = Snippet::new(&haystack, &[0], 20, 80);

        assert_eq!(snippet.offset(), 0);
        assert_eq!(snippet.text().len(), 20);
        assert!(!snippet.truncated_start());
        assert!(snippet.truncated_end());
    }

    #[test]
    fn test_match_near_end() {
        let haystack = format!("{}XYZ", "a".repeat(100));

        let snippet = Snippet::new(&haystack, &[102], 20, 80);

        assert!(snippet.text().ends_with("XYZ"));
        assert_eq!(snippet.text().len(), 20);
        assert!(snippet.truncated_start());
        assert!(!snippet.truncated_end());
    }

    #[test]
    fn test_no_matches_starts_at_beginning() {
        let haystack = "c".repeat(100);

        let snippet = Snippet::new(&haystack, &[], 20, 80);

        assert_eq!(snippet.offset(), 0);
        assert!(!snippet.truncated_start());
    }

    #[test]
    fn test_multibyte_window_on_char_boundaries() {
        let haystack = format!("{}x", "é".repeat(30));

        let snippet = Snippet::new(&haystack, &[60], 10, 80);

        assert!(snippet.text().ends_with('x'));
        assert!(snippet.text().len() <= 10);
        assert!(haystack.is_char_boundary(snippet.offset()));
    }

    #[test]
    fn test_segments_alternate() {
        let snippet = Snippet::new("hello world", &[0, 6], 40, 80);

        let segments: Vec<(&str, bool)> = snippet
            .segments()
            .map(|s| (s.text, s.highlighted))
            .collect();

        assert_eq!(
            segments,
            vec![("h", true), ("ello ", false), ("w", true), ("orld", false)]
        );
    }

    #[test]
    fn test_segments_group_consecutive_matches() {
        let snippet = Snippet::new("xx hello", &[3, 4, 5], 40, 80);

        let highlighted: Vec<&str> = snippet
            .segments()
            .filter(|s| s.highlighted)
            .map(|s| s.text)
            .collect();

        assert_eq!(highlighted, vec!["hel"]);
    }

    #[test]
    fn test_segments_respect_window_offset() {
        let haystack = padded();

        let snippet = Snippet::new(&haystack, &[50, 52], 20, 80);

        assert!(snippet.is_highlighted(10));
        assert!(!snippet.is_highlighted(11));
        assert!(snippet.is_highlighted(12));
        let joined: String = snippet.segments().map(|s| s.text).collect();
        assert_eq!(joined, snippet.text());
    }

    #[test]
    fn test_segments_multibyte_match() {
        let snippet = Snippet::new("café", &[3], 40, 80);

        let segments: Vec<(&str, bool)> = snippet
            .segments()
            .map(|s| (s.text, s.highlighted))
            .collect();

        assert_eq!(segments, vec![("caf", false), ("é", true)]);
    }

    #[test]
    fn test_print_matched_uses_result_matches() {
        let haystacks = ["the quick brown fox jumps over the lazy dog"];
        let config = SearchConfig {
            threads: Some(1),
            ..SearchConfig::default()
        };
        let mut searcher = crate::Searcher::new(vec![()], &haystacks, &config).unwrap();
        let list = searcher.search("lazy").unwrap();

        let snippet = list.best().unwrap().print_matched(12, 80);

        let highlighted: String = snippet
            .segments()
            .filter(|s| s.highlighted)
            .map(|s| s.text)
            .collect();
        assert_eq!(highlighted, "lazy");
        assert!(snippet.truncated_start());
    }
}

mod preview {
    use super::*;

    const NOTE: &str = "line1 title\n\nline3 alpha\nline4 beta\nline5 gamma\nline6 delta target\nline7 eps\n\nline9 zeta\nline10 eta\nline11 theta\nline12 iota";

    fn chunk_at(chunker: &Chunker<'_>, line: usize) -> ChunkIndex {
        *chunker.chunks().iter().find(|c| c.line == line).unwrap()
    }

    fn numbers(preview: &PreviewDisplay<'_>) -> Vec<usize> {
        preview.lines().map(|l| l.number).collect()
    }

    #[test]
    fn test_lines_around_match_skip_blank() {
        let mut chunker = Chunker::new(3);
        chunker.add(NOTE);

        let preview = PreviewDisplay::new(&chunker, &chunk_at(&chunker, 6), 4);

        assert_eq!(numbers(&preview), vec![3, 4, 5, 6, 7, 9, 10]);
        let matched: Vec<&str> = preview
            .lines()
            .filter(|l| l.is_match)
            .map(|l| l.text)
            .collect();
        assert_eq!(matched, vec!["line6 delta target"]);
    }

    #[test]
    fn test_near_document_start() {
        let mut chunker = Chunker::new(3);
        chunker.add(NOTE);

        let preview = PreviewDisplay::new(&chunker, &chunk_at(&chunker, 1), 4);

        assert_eq!(numbers(&preview), vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_near_document_end() {
        let mut chunker = Chunker::new(3);
        chunker.add(NOTE);

        let preview = PreviewDisplay::new(&chunker, &chunk_at(&chunker, 11), 4);

        assert_eq!(numbers(&preview), vec![7, 9, 10, 11, 12]);
    }

    #[test]
    fn test_zero_radius() {
        let mut chunker = Chunker::new(3);
        chunker.add(NOTE);

        let preview = PreviewDisplay::new(&chunker, &chunk_at(&chunker, 9), 0);

        assert_eq!(numbers(&preview), vec![9]);
    }

    #[test]
    fn test_second_document() {
        let mut chunker = Chunker::new(3);
        chunker.add("unrelated first document");
        chunker.add("alpha\nbeta line\ngamma");

        let chunk = *chunker
            .chunks()
            .iter()
            .find(|c| c.document == 1 && c.line == 2)
            .unwrap();
        let preview = PreviewDisplay::new(&chunker, &chunk, 1);

        let texts: Vec<&str> = preview.lines().map(|l| l.text).collect();
        assert_eq!(texts, vec!["alpha", "beta line", "gamma"]);
    }

    #[test]
    fn test_display_marks_matched_line() {
        let mut chunker = Chunker::new(3);
        chunker.add("first\nsecond\nthird");

        let preview = PreviewDisplay::new(&chunker, &chunk_at(&chunker, 2), 1);

        assert_eq!(
            preview.to_string(),
            "    1  first\n    2> second\n    3  third\n"
        );
    }
}
