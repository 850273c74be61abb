//! The editable input buffer.
//!
//! Text is edited in grapheme clusters so a caret never lands inside a
//! multi-codepoint character. The console owns exactly one buffer and only
//! replaces it through `Console::set_buffer`; the editing methods here work on
//! a scratch copy that is then committed.

use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
    /// Caret position in graphemes.
    caret: usize,
}

impl InputBuffer {
    /// Buffer holding `text` with the caret at the end.
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut buffer = Self {
            text: text.into(),
            caret: 0,
        };
        buffer.move_end();
        buffer
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn caret(&self) -> usize {
        self.caret
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn move_left(&mut self) {
        self.caret = self.caret.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.caret = self.clamp(self.caret.saturating_add(1));
    }

    pub fn move_home(&mut self) {
        self.caret = 0;
    }

    pub fn move_end(&mut self) {
        self.caret = self.grapheme_count();
    }

    /// Move to the same column on the previous line. Returns false on the
    /// first line.
    pub fn move_up(&mut self) -> bool {
        let lines = self.line_spans();
        let row = self.caret_row(&lines);
        if row == 0 {
            return false;
        }
        self.caret = Self::column_in(&lines, row, row - 1, self.caret);
        true
    }

    /// Move to the same column on the next line. Returns false on the last
    /// line.
    pub fn move_down(&mut self) -> bool {
        let lines = self.line_spans();
        let row = self.caret_row(&lines);
        if row + 1 >= lines.len() {
            return false;
        }
        self.caret = Self::column_in(&lines, row, row + 1, self.caret);
        true
    }

    pub fn insert_char(&mut self, c: char) {
        let index = self.byte_index();
        self.text.insert(index, c);
        self.move_right();
    }

    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let index = self.byte_index();
        self.text.insert_str(index, text);
        let inserted = text.graphemes(true).count();
        self.caret = self.clamp(self.caret.saturating_add(inserted));
    }

    pub fn backspace(&mut self) {
        if self.caret == 0 {
            return;
        }
        let start = self.byte_index_at(self.caret - 1);
        let end = self.byte_index_at(self.caret);
        self.text.replace_range(start..end, "");
        self.move_left();
    }

    pub fn delete_forward(&mut self) {
        if self.caret >= self.grapheme_count() {
            return;
        }
        let start = self.byte_index_at(self.caret);
        let end = self.byte_index_at(self.caret + 1);
        self.text.replace_range(start..end, "");
    }

    #[must_use]
    pub fn grapheme_count(&self) -> usize {
        self.text.graphemes(true).count()
    }

    /// Byte offset of the caret within `text`.
    #[must_use]
    pub fn byte_index(&self) -> usize {
        self.byte_index_at(self.caret)
    }

    fn byte_index_at(&self, grapheme_index: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(grapheme_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    /// `(start, len)` of every line in graphemes, newline excluded.
    fn line_spans(&self) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut start = 0;
        let mut len = 0;
        for grapheme in self.text.graphemes(true) {
            if grapheme == "\n" {
                spans.push((start, len));
                start += len + 1;
                len = 0;
            } else {
                len += 1;
            }
        }
        spans.push((start, len));
        spans
    }

    fn caret_row(&self, lines: &[(usize, usize)]) -> usize {
        lines
            .iter()
            .rposition(|(start, _)| *start <= self.caret)
            .unwrap_or(0)
    }

    fn column_in(lines: &[(usize, usize)], from: usize, to: usize, caret: usize) -> usize {
        let column = caret - lines[from].0;
        let (start, len) = lines[to];
        start + column.min(len)
    }

    fn clamp(&self, caret: usize) -> usize {
        caret.min(self.grapheme_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_text_places_caret_at_end() {
        let buffer = InputBuffer::with_text("héllo");
        assert_eq!(buffer.caret(), 5);
        assert_eq!(buffer.byte_index(), "héllo".len());
    }

    #[test]
    fn insert_char_in_middle() {
        let mut buffer = InputBuffer::with_text("1+");
        buffer.move_home();
        buffer.move_right();
        buffer.insert_char('0');
        assert_eq!(buffer.text(), "10+");
        assert_eq!(buffer.caret(), 2);
    }

    #[test]
    fn insert_text_advances_by_graphemes() {
        let mut buffer = InputBuffer::default();
        buffer.insert_text("e\u{301}x");
        assert_eq!(buffer.caret(), 2);
        buffer.insert_text("");
        assert_eq!(buffer.text(), "e\u{301}x");
    }

    #[test]
    fn backspace_removes_whole_grapheme() {
        let mut buffer = InputBuffer::with_text("ae\u{301}");
        buffer.backspace();
        assert_eq!(buffer.text(), "a");
        assert_eq!(buffer.caret(), 1);
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut buffer = InputBuffer::with_text("ab");
        buffer.move_home();
        buffer.backspace();
        assert_eq!(buffer.text(), "ab");
    }

    #[test]
    fn delete_forward_at_end_is_noop() {
        let mut buffer = InputBuffer::with_text("ab");
        buffer.delete_forward();
        assert_eq!(buffer.text(), "ab");
        buffer.move_left();
        buffer.delete_forward();
        assert_eq!(buffer.text(), "a");
    }

    #[test]
    fn vertical_moves_keep_column() {
        let mut buffer = InputBuffer::with_text("abcd\nx\nwxyz");
        buffer.move_left();
        assert_eq!(buffer.caret(), 10);

        assert!(buffer.move_up());
        assert_eq!(buffer.caret(), 6, "clamped to the short line");
        assert!(buffer.move_up());
        assert_eq!(buffer.caret(), 1);
        assert!(!buffer.move_up());

        assert!(buffer.move_down());
        assert!(buffer.move_down());
        assert_eq!(buffer.caret(), 8);
        assert!(!buffer.move_down());
    }

    #[test]
    fn vertical_moves_on_single_line_do_nothing() {
        let mut buffer = InputBuffer::with_text("1+1");
        assert!(!buffer.move_up());
        assert!(!buffer.move_down());
        assert_eq!(buffer.caret(), 3);
    }

    #[test]
    fn caret_clamps_at_bounds() {
        let mut buffer = InputBuffer::with_text("x");
        buffer.move_right();
        assert_eq!(buffer.caret(), 1);
        buffer.move_left();
        buffer.move_left();
        assert_eq!(buffer.caret(), 0);
    }
}
