use super::line_store::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Stream,
    Block,
}

/// The active selection. `start <= end` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    start: Cursor,
    end: Cursor,
    anchor: Option<Cursor>,
    mode: SelectionMode,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Cursor {
        self.start
    }

    pub fn end(&self) -> Cursor {
        self.end
    }

    pub fn anchor(&self) -> Option<Cursor> {
        self.anchor
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_block(&self) -> bool {
        self.mode == SelectionMode::Block
    }

    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
    }

    pub fn has_selection(&self) -> bool {
        self.start != self.end
    }

    /// Store `a`..`b` with the earlier point as start.
    pub fn set(&mut self, a: Cursor, b: Cursor) {
        if a <= b {
            self.start = a;
            self.end = b;
        } else {
            self.start = b;
            self.end = a;
        }
    }

    pub fn clear(&mut self) {
        self.start = Cursor::default();
        self.end = Cursor::default();
        self.anchor = None;
    }

    /// Extend the selection toward `to`, pivoting around a fixed anchor.
    pub fn select_to(&mut self, from: Cursor, to: Cursor) {
        let anchor = match self.anchor {
            Some(anchor) => anchor,
            None => {
                let anchor = if self.has_selection() && to >= self.end {
                    self.start
                } else {
                    from
                };
                self.anchor = Some(anchor);
                anchor
            }
        };
        self.set(anchor, to);
    }

    /// Lines spanned, with a stream selection ending at column 0 not
    /// counting its last line.
    pub fn line_span(&self) -> (usize, usize) {
        let mut last = self.end.line;
        if self.end.column == 0 && last > self.start.line {
            last -= 1;
        }
        (self.start.line, last)
    }

    /// Column range selected on `line`, given that line's length; `None`
    /// when no character of it is selected.
    pub fn range_for_line(&self, line: usize, line_len: usize) -> Option<(usize, usize)> {
        if !self.has_selection() || line < self.start.line || line > self.end.line {
            return None;
        }
        match self.mode {
            SelectionMode::Stream => {
                let left = if line == self.start.line { self.start.column } else { 0 };
                let right = if line == self.end.line { self.end.column } else { line_len };
                let left = left.min(line_len);
                let right = right.min(line_len);
                (left < right).then_some((left, right))
            }
            SelectionMode::Block => {
                let (left, right) = self.block_columns();
                let left = left.min(line_len);
                let right = right.min(line_len);
                (left < right).then_some((left, right))
            }
        }
    }

    /// Left and right columns of a block selection.
    pub fn block_columns(&self) -> (usize, usize) {
        let left = self.start.column.min(self.end.column);
        let right = self.start.column.max(self.end.column);
        (left, right)
    }

    pub fn line_col_selected(&self, line: usize, col: usize) -> bool {
        let (s, e) = (self.start, self.end);
        match self.mode {
            SelectionMode::Stream => {
                (line > s.line && line < e.line)
                    || (line == s.line && col >= s.column && line < e.line)
                    || (line == e.line && col < e.column && line > s.line)
                    || (line == e.line && line == s.line && col >= s.column && col < e.column)
            }
            SelectionMode::Block => {
                let (left, right) = self.block_columns();
                line >= s.line && line <= e.line && col >= left && col < right
            }
        }
    }

    /// Whole line selected, including its end.
    pub fn line_selected(&self, line: usize) -> bool {
        match self.mode {
            SelectionMode::Stream => {
                (line > self.start.line && line < self.end.line)
                    || (line == self.start.line && line < self.end.line && self.start.column == 0)
            }
            SelectionMode::Block => false,
        }
    }

    pub fn line_end_selected(&self, line: usize) -> bool {
        match self.mode {
            SelectionMode::Stream => line >= self.start.line && line < self.end.line,
            SelectionMode::Block => false,
        }
    }

    pub fn line_has_selected(&self, line: usize) -> bool {
        let (s, e) = (self.start, self.end);
        match self.mode {
            SelectionMode::Stream => {
                (line > s.line && line < e.line)
                    || (line == s.line && line < e.line)
                    || (line == e.line && line > s.line)
                    || (line == e.line && line == s.line && e.column > s.column)
            }
            SelectionMode::Block => {
                let (left, right) = self.block_columns();
                line >= s.line && line <= e.line && right > left
            }
        }
    }
}
