use super::undo::{UndoGroup, UndoRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    InSession { depth: usize },
}

/// Inclusive line interval touched since the outermost `edit_start`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyRange {
    bounds: Option<(usize, usize)>,
}

impl DirtyRange {
    pub fn bounds(&self) -> Option<(usize, usize)> {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    pub fn reset(&mut self) {
        self.bounds = None;
    }

    pub fn tag(&mut self, line: usize) {
        self.bounds = Some(match self.bounds {
            None => (line, line),
            Some((start, end)) => (start.min(line), end.max(line)),
        });
    }

    /// A line was inserted at `line`: bounds at or after it move down.
    pub fn line_inserted(&mut self, line: usize) {
        if let Some((start, end)) = self.bounds.as_mut() {
            if line <= *start {
                *start += 1;
            }
            if line <= *end {
                *end += 1;
            }
        }
    }

    /// A line was removed at `line`: bounds strictly after it move up.
    pub fn line_removed(&mut self, line: usize) {
        if let Some((start, end)) = self.bounds.as_mut() {
            if line < *start {
                *start -= 1;
            }
            if line < *end {
                *end -= 1;
            }
        }
    }
}

/// What the outermost `edit_end` hands back for flushing.
#[derive(Debug)]
pub struct FinishedSession {
    pub dirty: DirtyRange,
    pub group: Option<UndoGroup>,
    pub edits: usize,
    pub marks_changed: bool,
    pub with_undo: bool,
}

/// Nesting counter for edit transactions plus the state it collects.
#[derive(Debug)]
pub struct EditSession {
    state: SessionState,
    with_undo: bool,
    group: Option<UndoGroup>,
    dirty: DirtyRange,
    edits: usize,
    marks_changed: bool,
}

impl EditSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            with_undo: false,
            group: None,
            dirty: DirtyRange::default(),
            edits: 0,
            marks_changed: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != SessionState::Idle
    }

    pub fn depth(&self) -> usize {
        match self.state {
            SessionState::Idle => 0,
            SessionState::InSession { depth } => depth,
        }
    }

    pub fn with_undo(&self) -> bool {
        self.with_undo
    }

    /// Enter a session. Returns true when this call armed a new outermost
    /// session.
    pub fn begin(&mut self, with_undo: bool, group: UndoGroup) -> bool {
        match self.state {
            SessionState::Idle => {
                self.state = SessionState::InSession { depth: 1 };
                self.with_undo = with_undo;
                self.group = with_undo.then_some(group);
                self.dirty.reset();
                self.edits = 0;
                self.marks_changed = false;
                true
            }
            SessionState::InSession { depth } => {
                self.state = SessionState::InSession { depth: depth + 1 };
                false
            }
        }
    }

    /// Leave one nesting level. Returns the collected state once the
    /// outermost level closes; `None` otherwise (or when idle).
    pub fn end(&mut self) -> Option<FinishedSession> {
        match self.state {
            SessionState::Idle => None,
            SessionState::InSession { depth } if depth > 1 => {
                self.state = SessionState::InSession { depth: depth - 1 };
                None
            }
            SessionState::InSession { .. } => {
                self.state = SessionState::Idle;
                Some(FinishedSession {
                    dirty: std::mem::take(&mut self.dirty),
                    group: self.group.take(),
                    edits: std::mem::take(&mut self.edits),
                    marks_changed: std::mem::take(&mut self.marks_changed),
                    with_undo: self.with_undo,
                })
            }
        }
    }

    pub fn record(&mut self, record: UndoRecord) {
        self.edits += 1;
        if let Some(group) = self.group.as_mut() {
            group.add_record(record);
        }
    }

    /// Swap out the in-progress group, leaving `replacement` in its place.
    pub fn replace_group(&mut self, replacement: UndoGroup) -> Option<UndoGroup> {
        if !self.with_undo {
            return None;
        }
        self.group.replace(replacement)
    }

    pub fn edits(&self) -> usize {
        self.edits
    }

    pub fn dirty(&self) -> &DirtyRange {
        &self.dirty
    }

    pub fn dirty_mut(&mut self) -> &mut DirtyRange {
        &mut self.dirty
    }

    pub fn set_marks_changed(&mut self) {
        self.marks_changed = true;
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}
