//! Byte-offset ↔ line/column conversion over a snapshot of source text.

use crate::range::{Position, Range};

/// Maps byte offsets in a fixed snapshot of source text to UTF-16
/// `(line, column)` positions and back.
///
/// Built once per source text; rebuilding is cheap (`O(n)`) so callers
/// typically construct a fresh `LineIndex` whenever the backing text
/// changes rather than trying to patch one incrementally.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in text.char_indices() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts, len: text.len() }
    }

    /// Converts a byte offset into a position. Offsets past the end of
    /// the text clamp to the last valid offset.
    pub fn offset_to_position(&self, text: &str, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = self.line_starts.binary_search(&offset).unwrap_or_else(|i| i.saturating_sub(1));
        let line_start = self.line_starts[line];
        let column: usize = text[line_start..offset].chars().map(char::len_utf16).sum();
        Position::new(line as u32, column as u32)
    }

    /// Converts a position back into a byte offset, or `None` if the line
    /// is past the end of the text.
    pub fn position_to_offset(&self, text: &str, pos: Position) -> Option<usize> {
        let line = pos.line as usize;
        if line >= self.line_starts.len() {
            return None;
        }
        let line_start = self.line_starts[line];
        let line_end = self.line_starts.get(line + 1).copied().unwrap_or(self.len);
        let line_text = &text[line_start..line_end];

        let mut utf16_count = 0u32;
        for (byte_offset, ch) in line_text.char_indices() {
            if utf16_count >= pos.column {
                return Some(line_start + byte_offset);
            }
            utf16_count += ch.len_utf16() as u32;
        }
        Some(line_start + line_text.len())
    }

    /// Builds a [`Range`] from a pair of byte offsets.
    pub fn range(&self, text: &str, start: usize, end: usize) -> Range {
        Range::new(self.offset_to_position(text, start), self.offset_to_position(text, end))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_to_position_on_first_line() {
        let text = "hello world";
        let idx = LineIndex::new(text);
        assert_eq!(idx.offset_to_position(text, 0), Position::new(0, 0));
        assert_eq!(idx.offset_to_position(text, 6), Position::new(0, 6));
    }

    #[test]
    fn offset_to_position_across_lines() {
        let text = "abc\ndef\nghi";
        let idx = LineIndex::new(text);
        assert_eq!(idx.offset_to_position(text, 4), Position::new(1, 0));
        assert_eq!(idx.offset_to_position(text, 7), Position::new(1, 3));
        assert_eq!(idx.offset_to_position(text, 8), Position::new(2, 0));
    }

    #[test]
    fn offset_past_end_clamps() {
        let text = "abc";
        let idx = LineIndex::new(text);
        assert_eq!(idx.offset_to_position(text, 1000), Position::new(0, 3));
    }

    #[test]
    fn position_to_offset_round_trips() {
        let text = "line one\nline two\nline three";
        let idx = LineIndex::new(text);
        for offset in [0, 5, 9, 14, 18, text.len()] {
            let pos = idx.offset_to_position(text, offset);
            assert_eq!(idx.position_to_offset(text, pos), Some(offset));
        }
    }

    #[test]
    fn position_past_last_line_is_none() {
        let text = "only one line";
        let idx = LineIndex::new(text);
        assert_eq!(idx.position_to_offset(text, Position::new(5, 0)), None);
    }

    #[test]
    fn empty_source_has_a_single_zero_length_line() {
        let text = "";
        let idx = LineIndex::new(text);
        assert_eq!(idx.offset_to_position(text, 0), Position::new(0, 0));
        assert_eq!(idx.position_to_offset(text, Position::new(0, 0)), Some(0));
    }

    #[test]
    fn file_without_trailing_newline() {
        let text = "no newline here";
        let idx = LineIndex::new(text);
        let end = idx.offset_to_position(text, text.len());
        assert_eq!(end, Position::new(0, text.len() as u32));
    }

    #[test]
    fn non_ascii_columns_counted_in_utf16_units() {
        // "é" is one UTF-16 code unit but two UTF-8 bytes.
        let text = "é world";
        let idx = LineIndex::new(text);
        let e_bytes = 'é'.len_utf8();
        assert_eq!(idx.offset_to_position(text, e_bytes), Position::new(0, 1));
    }
}
