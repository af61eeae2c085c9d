//! Selection operations on a document.

use super::document::Document;
use super::events::DocumentEvent;
use super::line_store::Cursor;
use super::selection::{Selection, SelectionMode};
use crate::error::EditError;

impl Document {
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn has_selection(&self) -> bool {
        self.selection.has_selection()
    }

    fn selection_touched(&mut self, old: (Cursor, Cursor)) {
        let last = self.last_line();
        let (old_start, old_end) = old;
        let (new_start, new_end) = (self.selection.start(), self.selection.end());
        if old_start != old_end {
            self.tag_views(old_start.line.min(last), old_end.line.min(last));
        }
        if new_start != new_end {
            self.tag_views(new_start.line.min(last), new_end.line.min(last));
        }
        self.notify(DocumentEvent::SelectionChanged);
    }

    fn bounds(&self) -> (Cursor, Cursor) {
        (self.selection.start(), self.selection.end())
    }

    /// Select between two positions in either order.
    pub fn set_selection(&mut self, a: Cursor, b: Cursor) {
        let old = self.bounds();
        let a = self.normalize_cursor(a);
        let b = self.normalize_cursor(b);
        self.selection.set(a, b);
        self.selection_touched(old);
    }

    /// Returns whether anything was selected.
    pub fn clear_selection(&mut self) -> bool {
        let had = self.selection.has_selection();
        let old = self.bounds();
        self.selection.clear();
        if had {
            self.selection_touched(old);
        }
        had
    }

    /// Extend the selection from `from` toward `to` around a fixed anchor.
    pub fn select_to(&mut self, from: Cursor, to: Cursor) {
        let old = self.bounds();
        let from = self.normalize_cursor(from);
        let to = self.normalize_cursor(to);
        self.selection.select_to(from, to);
        self.selection_touched(old);
    }

    /// With `keep_selection` on, grow the current selection to cover the
    /// new range instead of replacing it.
    fn select_range(&mut self, start: Cursor, end: Cursor) {
        if self.config.keep_selection && self.selection.has_selection() {
            let start = start.min(self.selection.start());
            let end = end.max(self.selection.end());
            self.set_selection(start, end);
        } else {
            self.set_selection(start, end);
        }
    }

    pub fn select_all(&mut self) {
        let last = self.last_line();
        let end = Cursor::new(last, self.line_length(last));
        self.set_selection(Cursor::default(), end);
    }

    /// Select the word touching `cursor`. Returns false off a word.
    pub fn select_word(&mut self, cursor: Cursor) -> bool {
        match self.word_bounds(cursor) {
            Some((start, end)) if start < end => {
                self.select_range(Cursor::new(cursor.line, start), Cursor::new(cursor.line, end));
                true
            }
            _ => false,
        }
    }

    /// Select `line` including its line break.
    pub fn select_line(&mut self, line: usize) -> Result<(), EditError> {
        self.check_line(line)?;
        let end = if line < self.last_line() {
            Cursor::new(line + 1, 0)
        } else {
            Cursor::new(line, self.line_length(line))
        };
        self.select_range(Cursor::new(line, 0), end);
        Ok(())
    }

    /// Select `length` characters from `cursor`; a line break counts as one.
    pub fn select_length(&mut self, cursor: Cursor, length: usize) {
        let start = self.normalize_cursor(cursor);
        let mut end = start;
        let mut rest = length;
        loop {
            let room = self.line_length(end.line) - end.column;
            if rest <= room || end.line == self.last_line() {
                end.column += rest.min(room);
                break;
            }
            rest -= room + 1;
            end = Cursor::new(end.line + 1, 0);
        }
        self.select_range(start, end);
    }

    pub fn block_selection_mode(&self) -> bool {
        self.selection.is_block()
    }

    pub fn set_block_selection_mode(&mut self, on: bool) {
        let mode = if on { SelectionMode::Block } else { SelectionMode::Stream };
        if self.selection.mode() == mode {
            return;
        }
        let old = self.bounds();
        self.selection.set_mode(mode);
        self.selection_touched(old);
    }

    pub fn toggle_block_selection_mode(&mut self) {
        self.set_block_selection_mode(!self.selection.is_block());
    }

    /// Selected text; block selections give one row per line.
    pub fn selection_text(&self) -> String {
        if !self.selection.has_selection() {
            return String::new();
        }
        let (start, end) = self.bounds();
        match self.selection.mode() {
            SelectionMode::Stream => self.text_range(start, end),
            SelectionMode::Block => (start.line..=end.line)
                .map(|line| match self.selected_range_for_line(line) {
                    Some((from, to)) => self
                        .text_line(line)
                        .map(|l| l.chars()[from..to].iter().collect())
                        .unwrap_or_default(),
                    None => String::new(),
                })
                .collect::<Vec<String>>()
                .join("\n"),
        }
    }

    /// Delete the selection as one undo step and clear it. View cursors
    /// inside it land on its start. Returns false without a selection.
    pub fn remove_selected_text(&mut self) -> Result<bool, EditError> {
        if !self.selection.has_selection() {
            return Ok(false);
        }
        let (start, end) = self.bounds();
        let block = self.selection.is_block();
        let (left, _) = self.selection.block_columns();

        self.in_session(|doc| {
            let inside: Vec<_> = doc
                .views
                .ids()
                .into_iter()
                .filter(|&id| {
                    doc.views.get(id).is_some_and(|v| {
                        let c = v.cursor_cache();
                        doc.selection.line_col_selected(c.line, c.column) || c == end
                    })
                })
                .collect();

            if block {
                for line in (start.line..=end.line).rev() {
                    if let Some((from, to)) = doc.selected_range_for_line(line) {
                        doc.edit_remove_text(line, from, to - from)?;
                    }
                }
            } else {
                doc.remove_text(start.line, start.column, end.line, end.column)?;
            }

            let target = if block {
                Cursor::new(start.line, left)
            } else {
                start
            };
            let target = doc.normalize_cursor(target);
            for id in inside {
                doc.set_view_cursor_cache(id, target)?;
            }
            Ok(())
        })?;
        self.clear_selection();
        Ok(true)
    }

    pub fn line_col_selected(&self, line: usize, column: usize) -> bool {
        self.selection.line_col_selected(line, column)
    }

    pub fn line_selected(&self, line: usize) -> bool {
        self.selection.line_selected(line)
    }

    pub fn line_end_selected(&self, line: usize) -> bool {
        self.selection.line_end_selected(line)
    }

    pub fn line_has_selected(&self, line: usize) -> bool {
        self.selection.line_has_selected(line)
    }

    /// Selected column span on `line`, clipped to the line's length.
    pub fn selected_range_for_line(&self, line: usize) -> Option<(usize, usize)> {
        self.selection.range_for_line(line, self.line_length(line))
    }
}
