#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn zero() -> Self {
        Self { line: 0, column: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Intersection of two half-open ranges, or None when they don't overlap.
    pub fn intersect(&self, other: &Range) -> Option<Range> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(Range::new(start, end))
        } else {
            None
        }
    }
}

/// Line-oriented text buffer. Columns are character indices, not bytes.
/// The buffer always holds at least one (possibly empty) line.
pub struct TextBuffer {
    lines: Vec<String>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    pub fn from_string(content: &str) -> Self {
        let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
        let lines: Vec<String> = normalized.split('\n').map(|s| s.to_string()).collect();
        Self { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn get_line(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(|s| s.as_str())
    }

    pub fn set_line(&mut self, line: usize, content: &str) {
        if let Some(slot) = self.lines.get_mut(line) {
            *slot = content.to_string();
        }
    }

    pub fn line_length(&self, line: usize) -> usize {
        self.lines.get(line).map_or(0, |l| l.chars().count())
    }

    pub fn get_text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn end_position(&self) -> Position {
        let last = self.lines.len() - 1;
        Position::new(last, self.line_length(last))
    }

    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.lines.len() - 1);
        let column = pos.column.min(self.line_length(line));
        Position::new(line, column)
    }

    fn byte_index(&self, line: usize, column: usize) -> usize {
        let text = &self.lines[line];
        text.char_indices()
            .nth(column)
            .map(|(i, _)| i)
            .unwrap_or(text.len())
    }

    /// Absolute character offset of a position; each line break counts as one.
    pub fn position_to_offset(&self, pos: Position) -> usize {
        let pos = self.clamp(pos);
        let mut offset = 0;
        for line in &self.lines[..pos.line] {
            offset += line.chars().count() + 1;
        }
        offset + pos.column
    }

    pub fn offset_to_position(&self, offset: usize) -> Position {
        let mut remaining = offset;
        for (idx, line) in self.lines.iter().enumerate() {
            let len = line.chars().count();
            if remaining <= len {
                return Position::new(idx, remaining);
            }
            remaining -= len + 1;
        }
        self.end_position()
    }

    /// Insert text at a position and return the position just past it.
    pub fn insert(&mut self, pos: Position, text: &str) -> Position {
        let pos = self.clamp(pos);
        let byte = self.byte_index(pos.line, pos.column);
        let tail = self.lines[pos.line].split_off(byte);

        let mut parts = text.split('\n');
        let first = parts.next().unwrap_or("");
        self.lines[pos.line].push_str(first);

        let mut end_line = pos.line;
        let mut end_column = pos.column + first.chars().count();
        for part in parts {
            end_line += 1;
            end_column = part.chars().count();
            self.lines.insert(end_line, part.to_string());
        }
        self.lines[end_line].push_str(&tail);
        Position::new(end_line, end_column)
    }

    /// Delete a range and return the removed text.
    pub fn delete(&mut self, range: Range) -> String {
        let start = self.clamp(range.start);
        let end = self.clamp(range.end);
        if start >= end {
            return String::new();
        }
        let removed = self.text_range(Range::new(start, end));

        if start.line == end.line {
            let sb = self.byte_index(start.line, start.column);
            let eb = self.byte_index(end.line, end.column);
            self.lines[start.line].replace_range(sb..eb, "");
        } else {
            let sb = self.byte_index(start.line, start.column);
            let eb = self.byte_index(end.line, end.column);
            let tail = self.lines[end.line][eb..].to_string();
            self.lines[start.line].truncate(sb);
            self.lines[start.line].push_str(&tail);
            self.lines.drain(start.line + 1..=end.line);
        }
        removed
    }

    /// Delete a range and insert replacement text in its place.
    /// Returns (removed text, position past the replacement).
    pub fn replace(&mut self, range: Range, replacement: &str) -> (String, Position) {
        let removed = self.delete(range);
        let start = self.clamp(range.start);
        let end = self.insert(start, replacement);
        (removed, end)
    }

    pub fn text_range(&self, range: Range) -> String {
        let start = self.clamp(range.start);
        let end = self.clamp(range.end);
        if start >= end {
            return String::new();
        }
        if start.line == end.line {
            let sb = self.byte_index(start.line, start.column);
            let eb = self.byte_index(end.line, end.column);
            return self.lines[start.line][sb..eb].to_string();
        }
        let mut out = String::new();
        let sb = self.byte_index(start.line, start.column);
        out.push_str(&self.lines[start.line][sb..]);
        for line in &self.lines[start.line + 1..end.line] {
            out.push('\n');
            out.push_str(line);
        }
        out.push('\n');
        let eb = self.byte_index(end.line, end.column);
        out.push_str(&self.lines[end.line][..eb]);
        out
    }

    pub fn char_at(&self, pos: Position) -> Option<char> {
        self.lines.get(pos.line)?.chars().nth(pos.column)
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_has_one_line() {
        let buffer = TextBuffer::new();
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.get_text(), "");
    }

    #[test]
    fn test_from_string_normalizes_line_endings() {
        let buffer = TextBuffer::from_string("a\r\nb\rc");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.get_text(), "a\nb\nc");
    }

    #[test]
    fn test_insert_single_line() {
        let mut buffer = TextBuffer::from_string("Hello World");
        let end = buffer.insert(Position::new(0, 6), "Beautiful ");
        assert_eq!(buffer.get_text(), "Hello Beautiful World");
        assert_eq!(end, Position::new(0, 16));
    }

    #[test]
    fn test_insert_multiline() {
        let mut buffer = TextBuffer::from_string("ab");
        let end = buffer.insert(Position::new(0, 1), "x\ny");
        assert_eq!(buffer.get_text(), "ax\nyb");
        assert_eq!(end, Position::new(1, 1));
    }

    #[test]
    fn test_delete_within_line() {
        let mut buffer = TextBuffer::from_string("Hello Beautiful World");
        let removed = buffer.delete(Range::new(Position::new(0, 6), Position::new(0, 16)));
        assert_eq!(removed, "Beautiful ");
        assert_eq!(buffer.get_text(), "Hello World");
    }

    #[test]
    fn test_delete_across_lines() {
        let mut buffer = TextBuffer::from_string("one\ntwo\nthree");
        let removed = buffer.delete(Range::new(Position::new(0, 2), Position::new(2, 1)));
        assert_eq!(removed, "e\ntwo\nt");
        assert_eq!(buffer.get_text(), "onhree");
    }

    #[test]
    fn test_replace_reports_end_position() {
        let mut buffer = TextBuffer::from_string("a a a");
        let (removed, end) =
            buffer.replace(Range::new(Position::new(0, 0), Position::new(0, 1)), "bb");
        assert_eq!(removed, "a");
        assert_eq!(end, Position::new(0, 2));
        assert_eq!(buffer.get_text(), "bb a a");
    }

    #[test]
    fn test_offset_round_trip() {
        let buffer = TextBuffer::from_string("Hello\nWorld\nTest");
        let pos = Position::new(1, 3);
        let offset = buffer.position_to_offset(pos);
        assert_eq!(offset, 9);
        assert_eq!(buffer.offset_to_position(offset), pos);
    }

    #[test]
    fn test_offset_at_line_boundary() {
        let buffer = TextBuffer::from_string("ab\ncd");
        // Offset 2 is the end of line 0, offset 3 the start of line 1.
        assert_eq!(buffer.offset_to_position(2), Position::new(0, 2));
        assert_eq!(buffer.offset_to_position(3), Position::new(1, 0));
    }

    #[test]
    fn test_clamp_out_of_bounds() {
        let buffer = TextBuffer::from_string("ab\ncd");
        assert_eq!(buffer.clamp(Position::new(9, 9)), Position::new(1, 2));
        assert_eq!(buffer.clamp(Position::new(0, 9)), Position::new(0, 2));
    }

    #[test]
    fn test_text_range_multiline() {
        let buffer = TextBuffer::from_string("one\ntwo\nthree");
        let text = buffer.text_range(Range::new(Position::new(0, 1), Position::new(2, 2)));
        assert_eq!(text, "ne\ntwo\nth");
    }

    #[test]
    fn test_unicode_columns() {
        let mut buffer = TextBuffer::from_string("héllo");
        buffer.insert(Position::new(0, 2), "x");
        assert_eq!(buffer.get_text(), "héxllo");
        assert_eq!(buffer.char_at(Position::new(0, 1)), Some('é'));
    }

    #[test]
    fn test_range_normalizes_order() {
        let range = Range::new(Position::new(1, 0), Position::new(0, 0));
        assert_eq!(range.start, Position::new(0, 0));
        assert_eq!(range.end, Position::new(1, 0));
    }

    #[test]
    fn test_range_intersect() {
        let a = Range::new(Position::new(0, 0), Position::new(0, 5));
        let b = Range::new(Position::new(0, 3), Position::new(0, 8));
        let c = a.intersect(&b).unwrap();
        assert_eq!(c, Range::new(Position::new(0, 3), Position::new(0, 5)));
        let d = Range::new(Position::new(1, 0), Position::new(1, 1));
        assert!(a.intersect(&d).is_none());
    }
}
