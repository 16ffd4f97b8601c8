use super::text_buffer::{Position, Range, TextBuffer};

/// The range occupied by `text` when laid down starting at `start`.
pub fn span_of(start: Position, text: &str) -> Range {
    let mut parts = text.split('\n');
    let first = parts.next().unwrap_or("");
    let mut end = Position::new(start.line, start.column + first.chars().count());
    for part in parts {
        end.line += 1;
        end.column = part.chars().count();
    }
    Range::new(start, end)
}

#[derive(Debug, Clone)]
pub enum UndoAction {
    Insert { at: Position, text: String },
    Delete { at: Position, text: String },
}

impl UndoAction {
    pub fn apply(&self, buffer: &mut TextBuffer) {
        match self {
            UndoAction::Insert { at, text } => {
                buffer.insert(*at, text);
            }
            UndoAction::Delete { at, text } => {
                buffer.delete(span_of(*at, text));
            }
        }
    }

    pub fn reverse(&self) -> UndoAction {
        match self {
            UndoAction::Insert { at, text } => UndoAction::Delete {
                at: *at,
                text: text.clone(),
            },
            UndoAction::Delete { at, text } => UndoAction::Insert {
                at: *at,
                text: text.clone(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct UndoGroup {
    pub actions: Vec<UndoAction>,
    pub cursor_before: Position,
    pub cursor_after: Position,
}

impl UndoGroup {
    fn new(cursor: Position) -> Self {
        Self {
            actions: Vec::new(),
            cursor_before: cursor,
            cursor_after: cursor,
        }
    }

    fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn apply(&self, buffer: &mut TextBuffer) -> Position {
        for action in &self.actions {
            action.apply(buffer);
        }
        buffer.clamp(self.cursor_after)
    }

    pub fn apply_reverse(&self, buffer: &mut TextBuffer) -> Position {
        for action in self.actions.iter().rev() {
            action.reverse().apply(buffer);
        }
        buffer.clamp(self.cursor_before)
    }
}

/// Undo history with explicit grouping. Everything recorded between
/// `start_group` and `end_group` undoes as one unit; replace-all leans on
/// this to coalesce its whole loop into a single checkpoint.
pub struct UndoManager {
    undo_stack: Vec<UndoGroup>,
    redo_stack: Vec<UndoGroup>,
    current_group: Option<UndoGroup>,
    max_undo_levels: usize,
}

impl UndoManager {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            current_group: None,
            max_undo_levels: 1000,
        }
    }

    pub fn start_group(&mut self, cursor: Position) {
        if let Some(group) = self.current_group.take() {
            if !group.is_empty() {
                self.push_undo_group(group);
            }
        }
        self.current_group = Some(UndoGroup::new(cursor));
    }

    pub fn add_action(&mut self, action: UndoAction) {
        match self.current_group {
            Some(ref mut group) => group.actions.push(action),
            None => {
                let mut group = UndoGroup::new(Position::zero());
                group.actions.push(action);
                self.current_group = Some(group);
            }
        }
    }

    pub fn end_group(&mut self, cursor: Position) {
        if let Some(mut group) = self.current_group.take() {
            if !group.is_empty() {
                group.cursor_after = cursor;
                self.push_undo_group(group);
            }
        }
    }

    fn push_undo_group(&mut self, group: UndoGroup) {
        self.undo_stack.push(group);
        if self.undo_stack.len() > self.max_undo_levels {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    pub fn undo(&mut self) -> Option<UndoGroup> {
        if let Some(group) = self.current_group.take() {
            if !group.is_empty() {
                self.push_undo_group(group);
            }
        }
        let group = self.undo_stack.pop()?;
        self.redo_stack.push(group.clone());
        Some(group)
    }

    pub fn redo(&mut self) -> Option<UndoGroup> {
        let group = self.redo_stack.pop()?;
        self.undo_stack.push(group.clone());
        Some(group)
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}
