use super::tags::TagSet;
use super::text_buffer::{Position, Range, TextBuffer};
use super::undo::{UndoAction, UndoManager};
use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The editor's single open document: the text buffer plus everything that
/// rides along with it (tag overlay, cursor, selection, undo history, file
/// binding).
pub struct Document {
    buffer: TextBuffer,
    pub tags: TagSet,
    cursor: Position,
    selection: Option<Range>,
    undo: UndoManager,
    pub filename: Option<PathBuf>,
    pub modified: bool,
    pending_scroll: Option<Position>,
    links_enabled: bool,
}

impl Document {
    pub fn new() -> Self {
        Self::from_string("")
    }

    pub fn from_string(content: &str) -> Self {
        Self {
            buffer: TextBuffer::from_string(content),
            tags: TagSet::new(),
            cursor: Position::zero(),
            selection: None,
            undo: UndoManager::new(),
            filename: None,
            modified: false,
            pending_scroll: None,
            links_enabled: true,
        }
    }

    pub fn open(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        debug!("opened {} ({} bytes)", path.display(), content.len());
        let mut doc = Self::from_string(&content);
        doc.filename = Some(path.to_path_buf());
        Ok(doc)
    }

    pub fn save(&mut self) -> io::Result<()> {
        match self.filename.clone() {
            Some(path) => self.save_to(&path),
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no file name set",
            )),
        }
    }

    pub fn save_to(&mut self, path: &Path) -> io::Result<()> {
        fs::write(path, self.buffer.get_text())?;
        debug!("saved {}", path.display());
        self.filename = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    // --- buffer access ---

    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    pub fn get_line(&self, line: usize) -> Option<&str> {
        self.buffer.get_line(line)
    }

    pub fn line_length(&self, line: usize) -> usize {
        self.buffer.line_length(line)
    }

    pub fn get_text(&self) -> String {
        self.buffer.get_text()
    }

    pub fn text_range(&self, range: Range) -> String {
        self.buffer.text_range(range)
    }

    pub fn end_position(&self) -> Position {
        self.buffer.end_position()
    }

    pub fn position_to_offset(&self, pos: Position) -> usize {
        self.buffer.position_to_offset(pos)
    }

    pub fn offset_to_position(&self, offset: usize) -> Position {
        self.buffer.offset_to_position(offset)
    }

    pub fn clamp(&self, pos: Position) -> Position {
        self.buffer.clamp(pos)
    }

    // --- mutations (undo-recorded) ---

    pub fn insert_text(&mut self, pos: Position, text: &str) -> Position {
        let at = self.buffer.clamp(pos);
        let end = self.buffer.insert(at, text);
        self.undo.add_action(UndoAction::Insert {
            at,
            text: text.to_string(),
        });
        self.modified = true;
        end
    }

    pub fn delete_range(&mut self, range: Range) -> String {
        let removed = self.buffer.delete(range);
        if !removed.is_empty() {
            self.undo.add_action(UndoAction::Delete {
                at: self.buffer.clamp(range.start),
                text: removed.clone(),
            });
            self.modified = true;
        }
        removed
    }

    /// Delete `range`, insert `text` in its place, return the position just
    /// past the inserted text.
    pub fn replace_range(&mut self, range: Range, text: &str) -> Position {
        self.delete_range(range);
        self.insert_text(range.start, text)
    }

    // --- undo ---

    pub fn begin_edit_group(&mut self) {
        self.undo.start_group(self.cursor);
    }

    pub fn end_edit_group(&mut self) {
        self.undo.end_group(self.cursor);
    }

    /// Drop all undo history; used after loading, when the normalization
    /// pass should not be undoable.
    pub fn reset_history(&mut self) {
        self.undo = UndoManager::new();
    }

    pub fn undo_edit(&mut self) -> bool {
        match self.undo.undo() {
            Some(group) => {
                self.cursor = group.apply_reverse(&mut self.buffer);
                self.selection = None;
                self.modified = true;
                true
            }
            None => false,
        }
    }

    pub fn redo_edit(&mut self) -> bool {
        match self.undo.redo() {
            Some(group) => {
                self.cursor = group.apply(&mut self.buffer);
                self.selection = None;
                self.modified = true;
                true
            }
            None => false,
        }
    }

    // --- cursor / selection marks ---

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn set_cursor(&mut self, pos: Position) {
        self.cursor = self.buffer.clamp(pos);
    }

    pub fn selection(&self) -> Option<Range> {
        self.selection
    }

    pub fn set_selection(&mut self, range: Range) {
        let clamped = Range::new(self.buffer.clamp(range.start), self.buffer.clamp(range.end));
        self.selection = if clamped.is_empty() {
            None
        } else {
            Some(clamped)
        };
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    // --- view coupling ---

    /// Ask the view to bring a position on screen on its next render.
    pub fn request_scroll(&mut self, pos: Position) {
        self.pending_scroll = Some(pos);
    }

    pub fn take_scroll_request(&mut self) -> Option<Position> {
        self.pending_scroll.take()
    }

    // --- link activation gate ---

    pub fn links_enabled(&self) -> bool {
        self.links_enabled
    }

    pub fn set_links_enabled(&mut self, enabled: bool) {
        self.links_enabled = enabled;
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_open_and_save_round_trip() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "T buy milk\nN idea\n").unwrap();

        let mut doc = Document::open(file.path()).unwrap();
        assert_eq!(doc.line_count(), 3);
        assert!(!doc.modified);

        doc.insert_text(Position::new(1, 0), "X ");
        assert!(doc.modified);
        doc.save().unwrap();
        assert!(!doc.modified);

        let written = fs::read_to_string(file.path()).unwrap();
        assert_eq!(written, "T buy milk\nX N idea\n");
    }

    #[test]
    fn test_save_without_filename_fails() {
        let mut doc = Document::from_string("x");
        assert!(doc.save().is_err());
    }

    #[test]
    fn test_edit_group_undo() {
        let mut doc = Document::from_string("a a a");
        doc.begin_edit_group();
        doc.replace_range(Range::new(Position::new(0, 0), Position::new(0, 1)), "bb");
        doc.replace_range(Range::new(Position::new(0, 3), Position::new(0, 4)), "bb");
        doc.end_edit_group();
        assert_eq!(doc.get_text(), "bb bb a");

        assert!(doc.undo_edit());
        assert_eq!(doc.get_text(), "a a a");
        assert!(doc.redo_edit());
        assert_eq!(doc.get_text(), "bb bb a");
    }

    #[test]
    fn test_cursor_clamped() {
        let mut doc = Document::from_string("ab\ncd");
        doc.set_cursor(Position::new(10, 10));
        assert_eq!(doc.cursor(), Position::new(1, 2));
    }

    #[test]
    fn test_empty_selection_clears() {
        let mut doc = Document::from_string("ab");
        doc.set_selection(Range::new(Position::new(0, 1), Position::new(0, 1)));
        assert!(doc.selection().is_none());
        doc.set_selection(Range::new(Position::new(0, 0), Position::new(0, 2)));
        assert!(doc.selection().is_some());
    }

    #[test]
    fn test_scroll_request_consumed_once() {
        let mut doc = Document::from_string("ab");
        doc.request_scroll(Position::zero());
        assert!(doc.take_scroll_request().is_some());
        assert!(doc.take_scroll_request().is_none());
    }
}
