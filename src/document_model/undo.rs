use super::document::Document;
use super::line_store::Cursor;
use crate::error::EditError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoKind {
    InsertText,
    RemoveText,
    WrapLine,
    UnwrapLine,
    InsertLine,
    RemoveLine,
}

/// One primitive edit, recorded with enough data to replay it either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRecord {
    pub kind: UndoKind,
    pub line: usize,
    pub column: usize,
    pub length: usize,
    pub text: String,
}

impl UndoRecord {
    pub fn new(kind: UndoKind, line: usize, column: usize, length: usize, text: String) -> Self {
        Self {
            kind,
            line,
            column,
            length,
            text,
        }
    }

    /// Apply the inverse of this record.
    pub fn undo(&self, document: &mut Document) -> Result<(), EditError> {
        match self.kind {
            UndoKind::InsertText => document.edit_remove_text(self.line, self.column, self.length),
            UndoKind::RemoveText => document.edit_insert_text(self.line, self.column, &self.text),
            UndoKind::WrapLine => document.edit_unwrap_line(self.line, self.column),
            UndoKind::UnwrapLine => {
                // `length` is the size of the joined-in line. When it was
                // appended at the end, a plain wrap restores it exactly.
                let merged = document.line_length(self.line);
                if merged == self.column + self.length {
                    document.edit_wrap_line(self.line, self.column)
                } else {
                    let moved = document
                        .line_text(self.line)
                        .map(|s| s.chars().skip(self.column).take(self.length).collect::<String>())
                        .unwrap_or_default();
                    document.edit_remove_text(self.line, self.column, self.length)?;
                    document.edit_insert_line(self.line + 1, &moved)
                }
            }
            UndoKind::InsertLine => document.edit_remove_line(self.line),
            UndoKind::RemoveLine => document.edit_insert_line(self.line, &self.text),
        }
    }

    /// Apply this record again.
    pub fn redo(&self, document: &mut Document) -> Result<(), EditError> {
        match self.kind {
            UndoKind::InsertText => document.edit_insert_text(self.line, self.column, &self.text),
            UndoKind::RemoveText => document.edit_remove_text(self.line, self.column, self.length),
            UndoKind::WrapLine => document.edit_wrap_line(self.line, self.column),
            UndoKind::UnwrapLine => document.edit_unwrap_line(self.line, self.column),
            UndoKind::InsertLine => document.edit_insert_line(self.line, &self.text),
            UndoKind::RemoveLine => document.edit_remove_line(self.line),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UndoGroup {
    pub records: Vec<UndoRecord>,
    pub cursor_before: Option<Cursor>,
    pub cursor_after: Option<Cursor>,
}

impl UndoGroup {
    pub fn new(cursor_before: Option<Cursor>) -> Self {
        Self {
            records: Vec::new(),
            cursor_before,
            cursor_after: cursor_before,
        }
    }

    pub fn add_record(&mut self, record: UndoRecord) {
        self.records.push(record);
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Replay inverses in reverse order.
    pub fn undo(&self, document: &mut Document) {
        for record in self.records.iter().rev() {
            if let Err(err) = record.undo(document) {
                tracing::warn!(?record, %err, "undo record could not be applied");
            }
        }
    }

    /// Replay records in order.
    pub fn redo(&self, document: &mut Document) {
        for record in &self.records {
            if let Err(err) = record.redo(document) {
                tracing::warn!(?record, %err, "redo record could not be applied");
            }
        }
    }
}

/// Undo and redo stacks. A new forward group clears redo; undo does not.
#[derive(Debug, Clone)]
pub struct UndoLog {
    undo_stack: Vec<UndoGroup>,
    redo_stack: Vec<UndoGroup>,
    max_steps: usize,
}

impl UndoLog {
    pub fn new(max_steps: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_steps,
        }
    }

    pub fn push_group(&mut self, group: UndoGroup) {
        if group.is_empty() {
            return;
        }
        self.undo_stack.push(group);
        self.trim();
        self.redo_stack.clear();
    }

    /// Drop the oldest groups beyond the step limit. Zero means unlimited.
    pub fn trim(&mut self) {
        if self.max_steps == 0 {
            return;
        }
        while self.undo_stack.len() > self.max_steps {
            self.undo_stack.remove(0);
        }
    }

    pub fn take_undo(&mut self) -> Option<UndoGroup> {
        self.undo_stack.pop()
    }

    pub fn take_redo(&mut self) -> Option<UndoGroup> {
        self.redo_stack.pop()
    }

    pub fn push_redo(&mut self, group: UndoGroup) {
        self.redo_stack.push(group);
    }

    /// Return a redone group to the undo stack without touching redo.
    pub fn push_undone(&mut self, group: UndoGroup) {
        self.undo_stack.push(group);
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn set_max_steps(&mut self, steps: usize) {
        self.max_steps = steps;
        self.trim();
    }

    pub fn clear_undo(&mut self) {
        self.undo_stack.clear();
    }

    pub fn clear_redo(&mut self) {
        self.redo_stack.clear();
    }
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new(1000)
    }
}
