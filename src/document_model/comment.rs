//! Commenting and uncommenting lines and selections.

use super::document::Document;
use super::line_store::Cursor;
use crate::error::EditError;

/// Comment syntax of the document's language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentMarkers {
    single_line: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

impl CommentMarkers {
    pub fn new(single_line: Option<&str>, start: Option<&str>, end: Option<&str>) -> Self {
        let owned = |s: Option<&str>| s.filter(|s| !s.is_empty()).map(str::to_string);
        Self {
            single_line: owned(single_line),
            start: owned(start),
            end: owned(end),
        }
    }

    pub fn single_line(marker: &str) -> Self {
        Self::new(Some(marker), None, None)
    }

    pub fn block(start: &str, end: &str) -> Self {
        Self::new(None, Some(start), Some(end))
    }

    pub fn line_marker(&self) -> Option<&str> {
        self.single_line.as_deref()
    }

    /// Start and end markers, present only as a pair.
    pub fn block_markers(&self) -> Option<(&str, &str)> {
        match (&self.start, &self.end) {
            (Some(s), Some(e)) => Some((s.as_str(), e.as_str())),
            _ => None,
        }
    }
}

/// Shift `c` left for `len` characters removed at `(line, column)`.
fn after_removal(c: Cursor, line: usize, column: usize, len: usize) -> Cursor {
    if c.line == line && c.column > column {
        Cursor::new(line, c.column.saturating_sub(len).max(column))
    } else {
        c
    }
}

impl Document {
    /// First non-space position at or after `cursor`, crossing lines.
    pub fn next_non_space_pos(&self, cursor: Cursor) -> Option<Cursor> {
        let mut column = cursor.column;
        for line in cursor.line..self.line_count() {
            if let Some(col) = self.text_line(line).and_then(|l| l.next_non_space_char(column)) {
                return Some(Cursor::new(line, col));
            }
            column = 0;
        }
        None
    }

    /// Last non-space position at or before `cursor`; earlier lines are
    /// searched from their end.
    pub fn previous_non_space_pos(&self, cursor: Cursor) -> Option<Cursor> {
        let mut column = Some(cursor.column);
        for line in (0..=cursor.line.min(self.last_line())).rev() {
            let text = self.text_line(line)?;
            let from = column.unwrap_or(usize::MAX);
            if let Some(col) = text.previous_non_space_char(from) {
                return Some(Cursor::new(line, col));
            }
            column = None;
        }
        None
    }

    /// Comment (`change > 0`) or uncomment (`change <= 0`) `line`, or the
    /// selection when there is one. Returns whether the text changed.
    pub fn do_comment(&mut self, line: usize, change: i32) -> Result<bool, EditError> {
        self.check_line(line)?;
        let single = self.comment_markers.line_marker().map(str::to_string);
        let block = self
            .comment_markers
            .block_markers()
            .map(|(s, e)| (s.to_string(), e.to_string()));
        let selected = self.has_selection();

        if change > 0 {
            match (selected, single, block) {
                (false, Some(marker), _) => {
                    self.insert_text(line, 0, &format!("{marker} "))?;
                    Ok(true)
                }
                (false, None, Some((start, end))) => {
                    self.comment_line_with_block(line, &start, &end)?;
                    Ok(true)
                }
                (true, single, Some((start, end)))
                    if single.is_none() || self.selection_is_partial() =>
                {
                    self.comment_selection_with_block(&start, &end)?;
                    Ok(true)
                }
                (true, Some(marker), _) => {
                    self.comment_selected_lines(&marker)?;
                    Ok(true)
                }
                _ => Ok(false),
            }
        } else if selected {
            if let Some(marker) = single {
                if self.uncomment_selected_lines(&marker)? {
                    return Ok(true);
                }
            }
            match block {
                Some((start, end)) => self.uncomment_selection_with_block(&start, &end),
                None => Ok(false),
            }
        } else {
            if let Some(marker) = single {
                if self.uncomment_line(line, &marker)? {
                    return Ok(true);
                }
            }
            match block {
                Some((start, end)) => self.uncomment_line_with_block(line, &start, &end),
                None => Ok(false),
            }
        }
    }

    /// Selection begins after the first line's indentation or stops short
    /// of the last line's end.
    fn selection_is_partial(&self) -> bool {
        let start = self.selection.start();
        let last = self.selection_last_line();
        let end_column = if last < self.selection.end().line {
            self.line_length(last)
        } else {
            self.selection.end().column
        };
        let first = self
            .text_line(start.line)
            .and_then(|l| l.first_char())
            .unwrap_or(0);
        start.column > first || end_column < self.line_length(last)
    }

    /// Last line a selection touches; one ending at column 0 stops above.
    fn selection_last_line(&self) -> usize {
        let start = self.selection.start();
        let end = self.selection.end();
        if end.column == 0 && end.line > start.line {
            end.line - 1
        } else {
            end.line
        }
    }

    fn comment_line_with_block(&mut self, line: usize, start: &str, end: &str) -> Result<(), EditError> {
        self.in_session(|doc| {
            doc.insert_text(line, 0, &format!("{start} "))?;
            let len = doc.line_length(line);
            doc.insert_text(line, len, &format!(" {end}"))
        })
    }

    fn comment_selection_with_block(&mut self, start: &str, end: &str) -> Result<(), EditError> {
        let sel_start = self.selection.start();
        let mut sel_end = self.selection.end();
        if sel_end.column == 0 && sel_end.line > 0 {
            sel_end.line -= 1;
            sel_end.column = self.line_length(sel_end.line);
        }
        self.in_session(|doc| {
            doc.insert_text(sel_end.line, sel_end.column, end)?;
            doc.insert_text(sel_start.line, sel_start.column, start)
        })?;
        let mut column = sel_end.column + end.chars().count();
        if sel_end.line == sel_start.line {
            column += start.chars().count();
        }
        self.set_selection(sel_start, Cursor::new(sel_end.line, column));
        Ok(())
    }

    fn comment_selected_lines(&mut self, marker: &str) -> Result<(), EditError> {
        let first = self.selection.start().line;
        let last = self.selection_last_line();
        let mut sel_end = self.selection.end();
        let mark = format!("{marker} ");
        self.in_session(|doc| {
            for line in (first..=last).rev() {
                doc.insert_text(line, 0, &mark)?;
            }
            Ok(())
        })?;
        if sel_end.line == last {
            sel_end.column += mark.chars().count();
        }
        self.set_selection(Cursor::new(first, 0), sel_end);
        Ok(())
    }

    /// Remove `marker` (with its trailing space when present) at the
    /// line's first non-space character. Returns the removed span.
    fn strip_line_marker(&mut self, line: usize, marker: &str) -> Result<Option<(usize, usize)>, EditError> {
        let Some(text) = self.text_line(line) else {
            return Ok(None);
        };
        let Some(pos) = text.first_char() else {
            return Ok(None);
        };
        let long = format!("{marker} ");
        let len = if text.string_at(pos, &long) {
            long.chars().count()
        } else if text.string_at(pos, marker) {
            marker.chars().count()
        } else {
            return Ok(None);
        };
        self.remove_text(line, pos, line, pos + len)?;
        Ok(Some((pos, len)))
    }

    fn uncomment_line(&mut self, line: usize, marker: &str) -> Result<bool, EditError> {
        Ok(self.strip_line_marker(line, marker)?.is_some())
    }

    fn uncomment_selected_lines(&mut self, marker: &str) -> Result<bool, EditError> {
        let first = self.selection.start().line;
        let last = self.selection_last_line();
        let mut sel_start = self.selection.start();
        let mut sel_end = self.selection.end();
        let removed = self.in_session(|doc| {
            let mut removed = false;
            for line in (first..=last).rev() {
                if let Some((pos, len)) = doc.strip_line_marker(line, marker)? {
                    sel_start = after_removal(sel_start, line, pos, len);
                    sel_end = after_removal(sel_end, line, pos, len);
                    removed = true;
                }
            }
            Ok(removed)
        })?;
        if removed {
            self.set_selection(sel_start, sel_end);
        }
        Ok(removed)
    }

    /// Both markers must sit at the trimmed ends of the line; the forms
    /// padded with a space are tried first.
    fn uncomment_line_with_block(&mut self, line: usize, start: &str, end: &str) -> Result<bool, EditError> {
        let Some(text) = self.text_line(line) else {
            return Ok(false);
        };
        let (Some(first), Some(last)) = (text.first_char(), text.last_char()) else {
            return Ok(false);
        };
        let long_start = format!("{start} ");
        let start_len = [long_start.as_str(), start]
            .into_iter()
            .find(|m| text.string_at(first, m))
            .map(|m| m.chars().count());
        let long_end = format!(" {end}");
        let end_len = [long_end.as_str(), end]
            .into_iter()
            .map(|m| (m, m.chars().count()))
            .find(|&(m, n)| n <= last + 1 && text.string_at(last + 1 - n, m))
            .map(|(_, n)| n);
        let (Some(start_len), Some(end_len)) = (start_len, end_len) else {
            return Ok(false);
        };
        if first + start_len > last + 1 - end_len {
            return Ok(false);
        }
        self.in_session(|doc| {
            doc.remove_text(line, last + 1 - end_len, line, last + 1)?;
            doc.remove_text(line, first, line, first + start_len)
        })?;
        Ok(true)
    }

    fn uncomment_selection_with_block(&mut self, start: &str, end: &str) -> Result<bool, EditError> {
        let sel_start = self.selection.start();
        let sel_end = self.selection.end();
        // position of the last selected character
        let last_selected = if sel_end.column > 0 {
            Some(Cursor::new(sel_end.line, sel_end.column - 1))
        } else if sel_end.line > 0 {
            let line = sel_end.line - 1;
            self.line_length(line).checked_sub(1).map(|col| Cursor::new(line, col))
        } else {
            None
        };

        let first = self.next_non_space_pos(sel_start);
        let last = last_selected.and_then(|c| self.previous_non_space_pos(c));
        let (Some(first), Some(last)) = (first, last) else {
            return Ok(false);
        };
        let start_len = start.chars().count();
        let end_len = end.chars().count();
        let start_ok = self.text_line(first.line).is_some_and(|l| l.string_at(first.column, start));
        let end_ok = last.column + 1 >= end_len
            && self
                .text_line(last.line)
                .is_some_and(|l| l.string_at(last.column + 1 - end_len, end));
        let end_col = last.column + 1 - end_len.min(last.column + 1);
        if !start_ok || !end_ok || (first.line == last.line && first.column + start_len > end_col) {
            return Ok(false);
        }

        self.in_session(|doc| {
            doc.remove_text(last.line, end_col, last.line, last.column + 1)?;
            doc.remove_text(first.line, first.column, first.line, first.column + start_len)
        })?;
        let mut new_end = Cursor::new(last.line, end_col);
        if last.line == first.line {
            new_end.column -= start_len;
        }
        self.set_selection(first, new_end);
        Ok(true)
    }
}
