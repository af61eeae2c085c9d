//! Editing operations composed from the primitives. Each runs inside one
//! edit session, so it undoes as a single step.

use super::document::{Document, split_lines};
use super::events::DocumentEvent;
use super::line_store::Cursor;
use super::width::{chars_within, display_width};
use crate::error::EditError;
use crate::view::ViewId;
use tracing::debug;

/// Indentation reaching display column `width`, using tabs where a whole
/// `tab_width` fits.
pub fn indent_string(width: usize, tab_width: Option<usize>) -> String {
    let mut s = String::new();
    let mut rest = width;
    if let Some(tab) = tab_width.filter(|&t| t > 0) {
        while rest >= tab {
            s.push('\t');
            rest -= tab;
        }
    }
    s.extend(std::iter::repeat(' ').take(rest));
    s
}

impl Document {
    /// Run `f` inside a session that is closed even when `f` fails.
    pub(crate) fn in_session<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, EditError>,
    ) -> Result<T, EditError> {
        self.edit_start();
        let result = f(self);
        self.edit_end();
        result
    }

    /// Insert `text` at `(line, column)`; each `\n`, `\r\n` or `\r` splits the line.
    pub fn insert_text(&mut self, line: usize, column: usize, text: &str) -> Result<(), EditError> {
        if text.is_empty() {
            return Ok(());
        }
        self.check_line(line)?;
        self.in_session(|doc| {
            let mut line = line;
            let mut column = column.min(doc.line_length(line));
            let mut segments = split_lines(text).into_iter().peekable();
            while let Some(segment) = segments.next() {
                doc.edit_insert_text(line, column, &segment)?;
                if segments.peek().is_some() {
                    doc.edit_wrap_line(line, column + segment.chars().count())?;
                    line += 1;
                    column = 0;
                }
            }
            Ok(())
        })
    }

    /// Remove the stream range `(start_line, start_col)..(end_line, end_col)`.
    pub fn remove_text(
        &mut self,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Result<(), EditError> {
        let (start, end) = {
            let a = Cursor::new(start_line, start_col);
            let b = Cursor::new(end_line, end_col);
            if a <= b { (a, b) } else { (b, a) }
        };
        self.check_line(start.line)?;
        self.check_line(end.line)?;
        self.in_session(|doc| {
            if start.line == end.line {
                let start_col = start.column.min(doc.line_length(start.line));
                return doc.edit_remove_text(start.line, start_col, end.column.saturating_sub(start_col));
            }
            let start_col = start.column.min(doc.line_length(start.line));
            doc.edit_remove_text(start.line, start_col, doc.line_length(start.line) - start_col)?;
            for _ in start.line + 1..end.line {
                doc.edit_remove_line(start.line + 1)?;
            }
            doc.edit_remove_text(start.line + 1, 0, end.column)?;
            doc.edit_unwrap_line(start.line, start_col)
        })
    }

    pub fn insert_line(&mut self, line: usize, text: &str) -> Result<(), EditError> {
        self.in_session(|doc| doc.edit_insert_line(line, text))
    }

    pub fn remove_line(&mut self, line: usize) -> Result<(), EditError> {
        self.in_session(|doc| doc.edit_remove_line(line))
    }

    /// Replace everything; the insertion is one undo step on a fresh log.
    pub fn set_text(&mut self, text: &str) -> Result<(), EditError> {
        self.clear()?;
        self.insert_text(0, 0, text)
    }

    /// Empty the document and forget marks, undo history and selection.
    pub fn clear(&mut self) -> Result<(), EditError> {
        if self.is_read_only() {
            return Err(EditError::ReadOnly);
        }
        for view in self.views.iter_mut() {
            view.listener_mut().full_invalidate();
        }
        self.lines.clear();
        self.line_ending = self.config.line_ending;
        self.set_modified(false);
        let had_marks = !self.marks.is_empty();
        self.reset_state();
        if had_marks {
            self.notify(DocumentEvent::MarksChanged);
        }
        self.notify(DocumentEvent::UndoChanged);
        Ok(())
    }

    /// Break lines `start..=end` wider than `column` display columns at
    /// their last whitespace before the limit, dropping that whitespace.
    /// Wrapped tails are checked too. Returns false for a zero column or an
    /// empty range.
    pub fn wrap_text(&mut self, start: usize, end: usize, column: usize) -> bool {
        if end < start || column == 0 || start >= self.line_count() {
            return false;
        }
        self.edit_start();
        self.reflow_lines(start, end, column);
        self.edit_end();
        true
    }

    pub(crate) fn reflow_lines(&mut self, start: usize, end: usize, column: usize) {
        if column == 0 {
            return;
        }
        let tab_width = self.config.tab_width;
        let mut end = end;
        let mut line = start;
        while line <= end && line < self.line_count() {
            let chars = self
                .text_line(line)
                .map(|l| l.chars().to_vec())
                .unwrap_or_default();
            if display_width(&chars, tab_width) > column {
                let limit = chars_within(&chars, column, tab_width).min(chars.len() - 1);
                let found = (1..=limit).rev().find(|&z| chars[z].is_whitespace());
                if let Some(z) = found {
                    let wrapped = self
                        .edit_remove_text(line, z, 1)
                        .and_then(|_| self.edit_wrap_line(line, z));
                    match wrapped {
                        Ok(()) => end += 1,
                        Err(err) => tracing::warn!(line, %err, "reflow stopped"),
                    }
                }
            }
            line += 1;
        }
    }

    pub fn word_wrap(&self) -> bool {
        self.config.word_wrap
    }

    pub fn word_wrap_at(&self) -> usize {
        self.config.word_wrap_at
    }

    pub fn set_word_wrap(&mut self, on: bool) {
        let enable = on && !self.config.word_wrap;
        self.config.word_wrap = on;
        if enable {
            self.apply_word_wrap();
        }
    }

    pub fn set_word_wrap_at(&mut self, column: usize) {
        if column == 0 || column == self.config.word_wrap_at {
            return;
        }
        self.config.word_wrap_at = column;
        if self.config.word_wrap {
            self.apply_word_wrap();
        }
    }

    /// Reflow the whole document at the configured column.
    pub fn apply_word_wrap(&mut self) -> bool {
        debug!(column = self.config.word_wrap_at, "reflowing document");
        self.wrap_text(0, self.last_line(), self.config.word_wrap_at)
    }

    fn new_line_at(&mut self, cursor: Cursor) -> Result<Cursor, EditError> {
        let mut c = self.normalize_cursor(cursor);
        if !self.config.auto_indent {
            self.insert_text(c.line, c.column, "\n")?;
            return Ok(Cursor::new(c.line + 1, 0));
        }

        let mut pos = self.text_line(c.line).and_then(|l| l.first_char());
        if let Some(p) = pos {
            c.column = c.column.max(p);
        }
        // indentation comes from the nearest line above with text
        let mut y = c.line;
        while y > 0 && pos.is_none() {
            y -= 1;
            pos = self.text_line(y).and_then(|l| l.first_char());
        }

        self.insert_text(c.line, c.column, "\n")?;
        let mut next = Cursor::new(c.line + 1, 0);
        if let Some(p) = pos.filter(|&p| p > 0) {
            let width = self
                .text_line(y)
                .map_or(0, |l| l.cursor_x(p, self.config.tab_width));
            let tab = (!self.config.space_indent).then_some(self.config.tab_width);
            let indent = indent_string(width, tab);
            self.insert_text(next.line, 0, &indent)?;
            next.column = indent.chars().count();
        }
        Ok(next)
    }

    /// Split the line at the view's cursor, auto-indenting when enabled.
    pub fn new_line(&mut self, view: ViewId) -> Result<(), EditError> {
        self.in_session(|doc| {
            let cursor = doc.view_cursor_cache(view)?;
            let next = doc.new_line_at(cursor)?;
            doc.set_view_cursor_cache(view, next)
        })
    }

    /// Delete the character before `cursor`, joining lines at column 0.
    pub fn backspace(&mut self, cursor: Cursor) -> Result<(), EditError> {
        self.check_line(cursor.line)?;
        let Cursor { line, column } = cursor;
        let column = column.min(self.line_length(line));
        if line == 0 && column == 0 {
            return Ok(());
        }
        if column == 0 {
            let prev_len = self.line_length(line - 1);
            return self.remove_text(line - 1, prev_len, line, 0);
        }

        let mut len = 1;
        if self.config.backspace_indents {
            let pos = self.text_line(line).and_then(|l| l.first_char());
            if pos.is_none_or(|p| p >= column) {
                // only whitespace left of the cursor: back up to the
                // indentation of an earlier, less indented line
                let shallower = (0..line)
                    .rev()
                    .filter_map(|y| self.text_line(y).and_then(|l| l.first_char()))
                    .find(|&p| p < column);
                if let Some(p) = shallower {
                    len = column - p;
                }
            }
        }
        self.remove_text(line, column - len, line, column)
    }

    /// Delete the character at `cursor`, joining the next line at the end.
    pub fn del(&mut self, cursor: Cursor) -> Result<(), EditError> {
        self.check_line(cursor.line)?;
        let len = self.line_length(cursor.line);
        if cursor.column < len {
            self.remove_text(cursor.line, cursor.column, cursor.line, cursor.column + 1)
        } else if cursor.line + 1 < self.line_count() {
            self.remove_text(cursor.line, len, cursor.line + 1, 0)
        } else {
            Ok(())
        }
    }

    /// Swap the characters around `cursor`; at column 0 the first two.
    pub fn transpose(&mut self, cursor: Cursor) -> Result<(), EditError> {
        self.check_line(cursor.line)?;
        let col = cursor.column.saturating_sub(1);
        let Some(line) = self.text_line(cursor.line) else {
            return Ok(());
        };
        let (Some(left), Some(right)) = (line.char_at(col), line.char_at(col + 1)) else {
            return Ok(());
        };
        let swapped: String = [right, left].iter().collect();
        self.in_session(|doc| {
            doc.edit_remove_text(cursor.line, col, 2)?;
            doc.edit_insert_text(cursor.line, col, &swapped)
        })
    }

    /// Typed input at `(line, column)` for `view`. Applies tab
    /// replacement, bracket completion, delete-on-input and overwrite.
    /// Returns false when nothing printable was typed.
    pub fn insert_chars(
        &mut self,
        view: ViewId,
        line: usize,
        column: usize,
        chars: &str,
    ) -> Result<bool, EditError> {
        self.check_line(line)?;
        if !self.views.contains(view) {
            return Err(EditError::UnknownView);
        }
        let tab_width = self.config.tab_width.max(1);
        let prefix_x = self
            .text_line(line)
            .map_or(0, |l| l.cursor_x(column, tab_width));

        let mut buf: Vec<char> = Vec::new();
        let mut advance = 0;
        for ch in chars.chars() {
            if ch == '\t' && self.config.replace_tabs {
                let x = prefix_x + display_width(&buf[..advance], tab_width);
                let spaces = tab_width - x % tab_width;
                for _ in 0..spaces {
                    buf.insert(advance, ' ');
                    advance += 1;
                }
            } else if !ch.is_control() || ch == '\t' {
                buf.insert(advance, ch);
                advance += 1;
                if self.config.auto_brackets {
                    let closer = match ch {
                        '(' => Some(')'),
                        '[' => Some(']'),
                        '{' => Some('}'),
                        _ => None,
                    };
                    if let Some(closer) = closer {
                        buf.insert(advance, closer);
                    }
                }
            }
        }
        if buf.is_empty() {
            return Ok(false);
        }
        let text: String = buf.iter().collect();

        self.in_session(|doc| {
            let (mut line, mut column) = (line, column);
            if doc.config.delete_on_input && doc.has_selection() {
                doc.remove_selected_text()?;
                let cursor = doc.view_cursor_cache(view)?;
                line = cursor.line;
                column = cursor.column;
            }
            if doc.config.overwrite {
                let len = doc.line_length(line);
                let end = (column + buf.len()).min(len);
                if column < end {
                    doc.remove_text(line, column, line, end)?;
                }
            }
            let column = column.min(doc.line_length(line));
            doc.insert_text(line, column, &text)?;
            doc.set_view_cursor_cache(view, Cursor::new(line, column + advance))?;
            Ok(true)
        })
    }

    /// Insert `text` at the view's cursor and leave the cursor after it.
    pub fn paste(&mut self, view: ViewId, text: &str) -> Result<(), EditError> {
        if text.is_empty() {
            return Ok(());
        }
        self.in_session(|doc| {
            let cursor = doc.normalize_cursor(doc.view_cursor_cache(view)?);
            doc.insert_text(cursor.line, cursor.column, text)?;
            let segments = split_lines(text);
            let last = segments.last().map_or(0, |s| s.chars().count());
            let end = if segments.len() == 1 {
                Cursor::new(cursor.line, cursor.column + last)
            } else {
                Cursor::new(cursor.line + segments.len() - 1, last)
            };
            doc.set_view_cursor_cache(view, end)
        })
    }
}
