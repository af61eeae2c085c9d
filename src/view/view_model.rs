/// View Model - what the document knows about an attached view.
/// The view itself stays opaque behind the ViewListener trait; the document
/// only keeps the view's live cursor and the cursor cache it adjusts while
/// an edit session is open.
use crate::document_model::line_store::Cursor;

/// Notification surface a view exposes to the document.
pub trait ViewListener {
    /// Real lines `start..=end` need repainting.
    fn tag_real_lines(&mut self, start: usize, end: usize);

    /// The document moved this view's cursor.
    fn cursor_changed(&mut self, cursor: Cursor);

    /// Everything needs repainting (highlighting or folding changed).
    fn full_invalidate(&mut self) {}

    /// Called once per finished session after tags and cursor updates.
    fn update_view(&mut self) {}
}

/// A view that ignores every notification.
#[derive(Debug, Default)]
pub struct NullView;

impl ViewListener for NullView {
    fn tag_real_lines(&mut self, _start: usize, _end: usize) {}

    fn cursor_changed(&mut self, _cursor: Cursor) {}
}

/// Per-view bookkeeping held by the document.
pub struct ViewState {
    cursor: Cursor,
    cursor_cache: Cursor,
    cursor_cache_changed: bool,
    tag_lines_from: Option<usize>,
    listener: Box<dyn ViewListener>,
}

impl std::fmt::Debug for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewState")
            .field("cursor", &self.cursor)
            .field("cursor_cache", &self.cursor_cache)
            .field("cursor_cache_changed", &self.cursor_cache_changed)
            .field("tag_lines_from", &self.tag_lines_from)
            .finish_non_exhaustive()
    }
}

impl ViewState {
    pub fn new(listener: Box<dyn ViewListener>) -> Self {
        Self {
            cursor: Cursor::default(),
            cursor_cache: Cursor::default(),
            cursor_cache_changed: false,
            tag_lines_from: None,
            listener,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    pub fn cursor_cache(&self) -> Cursor {
        self.cursor_cache
    }

    pub fn cursor_cache_changed(&self) -> bool {
        self.cursor_cache_changed
    }

    pub fn tag_lines_from(&self) -> Option<usize> {
        self.tag_lines_from
    }

    pub fn listener_mut(&mut self) -> &mut dyn ViewListener {
        self.listener.as_mut()
    }

    /// Snapshot the live cursor at the start of an outermost session.
    pub fn arm(&mut self) {
        self.cursor_cache = self.cursor;
        self.cursor_cache_changed = false;
        self.tag_lines_from = None;
    }

    /// Explicitly place the cached cursor; applied when the session closes.
    pub fn set_cursor_cache(&mut self, cursor: Cursor) {
        self.cursor_cache = cursor;
        self.cursor_cache_changed = true;
    }

    /// Lines from `line` on moved, so everything below needs repainting.
    pub fn note_line_shift(&mut self, line: usize) {
        self.tag_lines_from = Some(self.tag_lines_from.map_or(line, |from| from.min(line)));
    }

    fn move_cache(&mut self, line: usize, column: usize) {
        self.cursor_cache = Cursor::new(line, column);
        self.cursor_cache_changed = true;
    }

    pub fn on_insert_text(&mut self, line: usize, column: usize, len: usize) {
        let c = self.cursor_cache;
        if c.line == line && c.column > column {
            self.move_cache(line, c.column + len);
        }
    }

    pub fn on_remove_text(&mut self, line: usize, column: usize, len: usize) {
        let c = self.cursor_cache;
        if c.line == line && c.column > column {
            self.move_cache(line, c.column.saturating_sub(len).max(column));
        }
    }

    pub fn on_wrap_line(&mut self, line: usize, column: usize) {
        self.note_line_shift(line);
        let c = self.cursor_cache;
        if c.line > line {
            self.move_cache(c.line + 1, c.column);
        } else if c.line == line && c.column >= column {
            self.move_cache(line + 1, c.column - column);
        }
    }

    pub fn on_unwrap_line(&mut self, line: usize, column: usize) {
        self.note_line_shift(line);
        let c = self.cursor_cache;
        if c.line == line + 1 {
            self.move_cache(line, column + c.column);
        } else if c.line == line && c.column >= column {
            self.move_cache(line, column);
        } else if c.line > line + 1 {
            self.move_cache(c.line - 1, c.column);
        }
    }

    pub fn on_insert_line(&mut self, line: usize) {
        self.note_line_shift(line);
        let c = self.cursor_cache;
        if c.line >= line {
            self.move_cache(c.line + 1, c.column);
        }
    }

    /// `line_count` is the number of lines after the removal.
    pub fn on_remove_line(&mut self, line: usize, line_count: usize) {
        self.note_line_shift(line);
        let c = self.cursor_cache;
        if c.line == line {
            let target = if line < line_count { line } else { line.saturating_sub(1) };
            self.move_cache(target, 0);
        } else if c.line > line {
            self.move_cache(c.line - 1, c.column);
        }
    }

    /// Close-of-session flush: repaint `tag`, apply an invalidated cursor.
    pub fn finish_session(&mut self, tag: Option<(usize, usize)>, last_line: usize) {
        if let Some((start, end)) = tag {
            self.listener.tag_real_lines(start, end.max(start));
        }
        if self.cursor_cache_changed {
            let mut cursor = self.cursor_cache;
            cursor.line = cursor.line.min(last_line);
            self.cursor = cursor;
            self.listener.cursor_changed(cursor);
        }
        self.listener.update_view();
        self.tag_lines_from = None;
        self.cursor_cache_changed = false;
    }

    /// Drop any session bookkeeping without notifying the view.
    pub fn disarm(&mut self) {
        self.tag_lines_from = None;
        self.cursor_cache_changed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        tags: Vec<(usize, usize)>,
        cursors: Vec<Cursor>,
    }

    struct Spy(Rc<RefCell<Recorder>>);

    impl ViewListener for Spy {
        fn tag_real_lines(&mut self, start: usize, end: usize) {
            self.0.borrow_mut().tags.push((start, end));
        }

        fn cursor_changed(&mut self, cursor: Cursor) {
            self.0.borrow_mut().cursors.push(cursor);
        }
    }

    fn armed_at(line: usize, column: usize) -> ViewState {
        let mut view = ViewState::new(Box::new(NullView));
        view.set_cursor(Cursor::new(line, column));
        view.arm();
        view
    }

    #[test]
    fn test_text_edits_adjust_cursor_on_same_line() {
        let mut view = armed_at(2, 5);
        view.on_insert_text(2, 5, 3);
        assert_eq!(view.cursor_cache(), Cursor::new(2, 5));
        view.on_insert_text(2, 4, 3);
        assert_eq!(view.cursor_cache(), Cursor::new(2, 8));
        view.on_remove_text(2, 6, 10);
        assert_eq!(view.cursor_cache(), Cursor::new(2, 6));
        view.on_remove_text(1, 0, 10);
        assert_eq!(view.cursor_cache(), Cursor::new(2, 6));
    }

    #[test]
    fn test_wrap_and_unwrap_move_cursor_between_lines() {
        let mut view = armed_at(1, 6);
        view.on_wrap_line(1, 4);
        assert_eq!(view.cursor_cache(), Cursor::new(2, 2));
        view.on_unwrap_line(1, 4);
        assert_eq!(view.cursor_cache(), Cursor::new(1, 6));

        let mut below = armed_at(5, 1);
        below.on_wrap_line(1, 0);
        assert_eq!(below.cursor_cache(), Cursor::new(6, 1));
        below.on_unwrap_line(1, 0);
        assert_eq!(below.cursor_cache(), Cursor::new(5, 1));
    }

    #[test]
    fn test_unwrap_collapses_cursor_past_join_column() {
        let mut view = armed_at(0, 7);
        view.on_unwrap_line(0, 3);
        assert_eq!(view.cursor_cache(), Cursor::new(0, 3));
    }

    #[test]
    fn test_line_insert_then_remove_is_self_inverse() {
        let mut view = armed_at(4, 2);
        view.on_insert_line(3);
        assert_eq!(view.cursor_cache(), Cursor::new(5, 2));
        view.on_remove_line(3, 10);
        assert_eq!(view.cursor_cache(), Cursor::new(4, 2));
    }

    #[test]
    fn test_remove_cursor_line_clamps_to_last() {
        let mut view = armed_at(3, 2);
        view.on_remove_line(3, 3);
        assert_eq!(view.cursor_cache(), Cursor::new(2, 0));

        let mut mid = armed_at(1, 2);
        mid.on_remove_line(1, 3);
        assert_eq!(mid.cursor_cache(), Cursor::new(1, 0));
    }

    #[test]
    fn test_finish_session_notifies_once() {
        let rec = Rc::new(RefCell::new(Recorder::default()));
        let mut view = ViewState::new(Box::new(Spy(rec.clone())));
        view.arm();
        view.on_insert_line(0);
        assert_eq!(view.tag_lines_from(), Some(0));
        view.finish_session(Some((0, 4)), 4);
        assert_eq!(rec.borrow().tags, vec![(0, 4)]);
        assert_eq!(rec.borrow().cursors, vec![Cursor::new(1, 0)]);
        assert_eq!(view.cursor(), Cursor::new(1, 0));
        assert!(!view.cursor_cache_changed());
        assert!(view.tag_lines_from().is_none());
    }
}
