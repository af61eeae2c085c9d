/// Mark type bits. Several types on the same line are OR'd together.
pub mod mark_type {
    pub const BOOKMARK: u32 = 0x01;
    pub const BREAKPOINT_ACTIVE: u32 = 0x02;
    pub const BREAKPOINT_REACHED: u32 = 0x04;
    pub const BREAKPOINT_DISABLED: u32 = 0x08;
    pub const EXECUTION: u32 = 0x10;
    pub const WARNING: u32 = 0x20;
    pub const ERROR: u32 = 0x40;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pub line: usize,
    pub mark_type: u32,
}

/// Line marks, at most one entry per line.
///
/// Every mutating method returns whether anything changed so the caller can
/// decide to emit a marks-changed notification.
#[derive(Debug, Clone)]
pub struct MarkSet {
    marks: Vec<Mark>,
    user_changeable: u32,
}

impl MarkSet {
    pub fn new() -> Self {
        Self {
            marks: Vec::new(),
            user_changeable: mark_type::BOOKMARK,
        }
    }

    pub fn mark(&self, line: usize) -> u32 {
        self.marks
            .iter()
            .find(|m| m.line == line)
            .map_or(0, |m| m.mark_type)
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Replace the type bits on `line`.
    pub fn set(&mut self, line: usize, mark_type: u32) -> bool {
        if mark_type == 0 {
            return self.clear(line);
        }
        match self.marks.iter_mut().find(|m| m.line == line) {
            Some(mark) => mark.mark_type = mark_type,
            None => self.marks.push(Mark { line, mark_type }),
        }
        true
    }

    pub fn add(&mut self, line: usize, mark_type: u32) -> bool {
        let current = self.mark(line);
        self.set(line, current | mark_type)
    }

    /// Clear some type bits; the entry disappears once no bits remain.
    pub fn remove(&mut self, line: usize, mark_type: u32) -> bool {
        let Some(index) = self.marks.iter().position(|m| m.line == line) else {
            return false;
        };
        self.marks[index].mark_type &= !mark_type;
        if self.marks[index].mark_type == 0 {
            self.marks.remove(index);
        }
        true
    }

    pub fn clear(&mut self, line: usize) -> bool {
        let before = self.marks.len();
        self.marks.retain(|m| m.line != line);
        self.marks.len() != before
    }

    /// Remove every mark, returning the lines that carried one.
    pub fn clear_all(&mut self) -> Vec<usize> {
        self.marks.drain(..).map(|m| m.line).collect()
    }

    pub fn user_changeable(&self) -> u32 {
        self.user_changeable
    }

    pub fn set_user_changeable(&mut self, mask: u32) {
        self.user_changeable = mask;
    }

    /// A line was inserted at `line`: marks at or below it move down.
    pub fn line_inserted(&mut self, line: usize) -> bool {
        self.shift_down_from(line)
    }

    /// `line` was wrapped. The new line sits at `line + 1`; marks strictly
    /// below it move down and a mark already at `line + 1` stays put.
    pub fn line_wrapped(&mut self, line: usize) -> bool {
        self.shift_down_from(line + 2)
    }

    /// Line `line + 1` was joined into `line`.
    pub fn line_unwrapped(&mut self, line: usize) -> bool {
        self.remove_and_shift_up(line + 1)
    }

    /// Line `line` was removed: its mark goes, marks below move up.
    pub fn line_removed(&mut self, line: usize) -> bool {
        self.remove_and_shift_up(line)
    }

    fn shift_down_from(&mut self, line: usize) -> bool {
        let mut changed = false;
        for mark in self.marks.iter_mut().filter(|m| m.line >= line) {
            mark.line += 1;
            changed = true;
        }
        changed
    }

    fn remove_and_shift_up(&mut self, line: usize) -> bool {
        let before = self.marks.len();
        self.marks.retain(|m| m.line != line);
        let mut changed = self.marks.len() != before;
        for mark in self.marks.iter_mut().filter(|m| m.line > line) {
            mark.line -= 1;
            changed = true;
        }
        changed
    }
}

impl Default for MarkSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_entry_per_line() {
        let mut marks = MarkSet::new();
        marks.add(3, mark_type::BOOKMARK);
        marks.add(3, mark_type::WARNING);
        assert_eq!(marks.marks().len(), 1);
        assert_eq!(marks.mark(3), mark_type::BOOKMARK | mark_type::WARNING);

        marks.remove(3, mark_type::BOOKMARK);
        assert_eq!(marks.mark(3), mark_type::WARNING);
        marks.remove(3, mark_type::WARNING);
        assert!(marks.is_empty());
    }

    #[test]
    fn test_set_replaces_bits() {
        let mut marks = MarkSet::new();
        marks.set(1, mark_type::ERROR | mark_type::WARNING);
        marks.set(1, mark_type::EXECUTION);
        assert_eq!(marks.mark(1), mark_type::EXECUTION);
        assert!(!marks.clear(2));
        assert!(marks.clear(1));
        assert_eq!(marks.mark(1), 0);
    }

    #[test]
    fn test_line_insert_and_remove_shift() {
        let mut marks = MarkSet::new();
        marks.set(2, mark_type::BOOKMARK);
        marks.set(5, mark_type::ERROR);

        assert!(marks.line_inserted(2));
        assert_eq!(marks.mark(3), mark_type::BOOKMARK);
        assert_eq!(marks.mark(6), mark_type::ERROR);

        assert!(marks.line_removed(2));
        assert_eq!(marks.mark(2), mark_type::BOOKMARK);
        assert_eq!(marks.mark(5), mark_type::ERROR);

        assert!(marks.line_removed(2));
        assert_eq!(marks.mark(2), 0);
        assert_eq!(marks.mark(4), mark_type::ERROR);
    }

    #[test]
    fn test_wrap_leaves_mark_on_new_line() {
        let mut marks = MarkSet::new();
        marks.set(1, mark_type::BOOKMARK);
        marks.set(2, mark_type::WARNING);
        marks.line_wrapped(0);
        assert_eq!(marks.mark(1), mark_type::BOOKMARK);
        assert_eq!(marks.mark(3), mark_type::WARNING);

        marks.line_unwrapped(0);
        assert_eq!(marks.mark(1), 0);
        assert_eq!(marks.mark(2), mark_type::WARNING);
    }
}
