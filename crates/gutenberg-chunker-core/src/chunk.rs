//! Paragraph chunker.
//!
//! Groups body lines into paragraphs separated by blank lines and keeps
//! only paragraphs that reach a minimum length. Each chunk is the
//! paragraph's trimmed lines, each followed by `\n`.
//!
//! # Algorithm
//!
//! 1. A non-blank line is appended to the buffer followed by `\n`.
//! 2. A blank line closes the paragraph: if the buffer is at least
//!    `min_chars` bytes long it is emitted, otherwise it is dropped. The
//!    buffer is reset either way.
//! 3. At end of input a paragraph that was never closed by a blank line
//!    is dropped, whatever its length.
//!
//! Length is the UTF-8 byte length of the buffer, newlines included.
//!
//! # Example
//!
//! ```rust
//! use gutenberg_chunker_core::chunk::chunk_body;
//!
//! let text = "*** START\nalpha\nbeta\n\nshort\n\n*** END";
//! let chunks: Vec<String> = chunk_body(text, 5).collect();
//! assert_eq!(chunks, vec!["alpha\nbeta\n".to_string(), "short\n".to_string()]);
//! ```

use crate::boundary::{body_lines, BodyLines};

/// Minimum accepted chunk length.
pub const DEFAULT_MIN_CHARS: usize = 300;

/// Paragraph buffer with a length threshold.
#[derive(Debug, Clone)]
pub struct ChunkAccumulator {
    buf: String,
    min_chars: usize,
}

impl ChunkAccumulator {
    pub fn new(min_chars: usize) -> Self {
        Self {
            buf: String::new(),
            min_chars,
        }
    }

    /// Feed one line; returns a chunk when a blank line closes a long enough paragraph.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        let text = line.trim();
        if !text.is_empty() {
            self.buf.push_str(text);
            self.buf.push('\n');
            return None;
        }

        let paragraph = std::mem::take(&mut self.buf);
        if paragraph.len() < self.min_chars {
            None
        } else {
            Some(paragraph)
        }
    }

    /// Text accumulated since the last paragraph boundary.
    pub fn pending(&self) -> &str {
        &self.buf
    }
}

/// Iterator adaptor turning a line stream into accepted chunks.
pub struct Chunks<I> {
    lines: I,
    acc: ChunkAccumulator,
}

impl<I> Chunks<I> {
    pub fn new(lines: I, min_chars: usize) -> Self {
        Self {
            lines,
            acc: ChunkAccumulator::new(min_chars),
        }
    }

    /// Unflushed trailing text. Discarded when iteration ends.
    pub fn pending(&self) -> &str {
        self.acc.pending()
    }
}

impl<'a, I> Iterator for Chunks<I>
where
    I: Iterator<Item = &'a str>,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let line = self.lines.next()?;
            if let Some(chunk) = self.acc.push_line(line) {
                return Some(chunk);
            }
        }
    }
}

/// Run boundary detection and chunking over a raw document.
pub fn chunk_body(content: &str, min_chars: usize) -> Chunks<BodyLines<'_>> {
    Chunks::new(body_lines(content), min_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_line(word: &str, min: usize) -> String {
        let mut s = String::new();
        while s.len() < min {
            s.push_str(word);
            s.push(' ');
        }
        s.trim_end().to_string()
    }

    #[test]
    fn test_long_paragraph_emitted_short_dropped() {
        let long = long_line("Hello world this is a long enough paragraph", 320);
        let text = format!(
            "junk\n*** START\n{}\n\nshort\n\n*** END\nlicense text",
            long
        );
        let chunks: Vec<String> = chunk_body(&text, DEFAULT_MIN_CHARS).collect();
        assert_eq!(chunks, vec![format!("{}\n", long)]);
    }

    #[test]
    fn test_no_start_marker_no_chunks() {
        let long = long_line("words", 400);
        let text = format!("{}\n\n{}\n\n", long, long);
        assert_eq!(chunk_body(&text, DEFAULT_MIN_CHARS).count(), 0);
    }

    #[test]
    fn test_end_right_after_start_no_chunks() {
        let text = "*** START\n*** END\nlicense\n\n";
        assert_eq!(chunk_body(text, 1).count(), 0);
    }

    #[test]
    fn test_multi_line_paragraph_joined_with_newlines() {
        let text = "*** START\n  one  \ntwo\nthree\n\n";
        let chunks: Vec<String> = chunk_body(text, 1).collect();
        assert_eq!(chunks, vec!["one\ntwo\nthree\n".to_string()]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // "abcd\n" is exactly 5 bytes
        let text = "*** START\nabcd\n\nabc\n\n";
        let chunks: Vec<String> = chunk_body(text, 5).collect();
        assert_eq!(chunks, vec!["abcd\n".to_string()]);
    }

    #[test]
    fn test_trailing_paragraph_without_blank_line_is_dropped() {
        let long = long_line("tail", 400);
        let text = format!("*** START\n{}", long);
        let mut chunks = chunk_body(&text, DEFAULT_MIN_CHARS);
        assert_eq!(chunks.next(), None);
        assert_eq!(chunks.pending(), format!("{}\n", long));
    }

    #[test]
    fn test_end_line_never_lands_in_a_chunk() {
        let text = "*** START\npara one\n\npara two\n*** END\n\nlicense\n\n";
        let chunks: Vec<String> = chunk_body(text, 1).collect();
        assert_eq!(chunks, vec!["para one\n".to_string()]);
    }

    #[test]
    fn test_consecutive_blank_lines_do_not_emit_empty_chunks() {
        let text = "*** START\n\n\n\nword\n\n\n";
        let chunks: Vec<String> = chunk_body(text, 1).collect();
        assert_eq!(chunks, vec!["word\n".to_string()]);
    }

    #[test]
    fn test_order_preserved() {
        let a = long_line("alpha", 300);
        let b = long_line("bravo", 300);
        let c = long_line("charlie", 300);
        let text = format!("*** START\n{}\n\n{}\n\n{}\n\n", a, b, c);
        let chunks: Vec<String> = chunk_body(&text, DEFAULT_MIN_CHARS).collect();
        assert_eq!(
            chunks,
            vec![format!("{}\n", a), format!("{}\n", b), format!("{}\n", c)]
        );
    }

    #[test]
    fn test_deterministic() {
        let text = format!("*** START\n{}\n\n", long_line("x", 500));
        let c1: Vec<String> = chunk_body(&text, 300).collect();
        let c2: Vec<String> = chunk_body(&text, 300).collect();
        assert_eq!(c1, c2);
    }

    #[test]
    fn test_accumulator_resets_after_short_paragraph() {
        let mut acc = ChunkAccumulator::new(10);
        assert_eq!(acc.push_line("tiny"), None);
        assert_eq!(acc.push_line(""), None);
        assert_eq!(acc.pending(), "");
        assert_eq!(acc.push_line("0123456789"), None);
        assert_eq!(acc.push_line("   "), Some("0123456789\n".to_string()));
    }
}
