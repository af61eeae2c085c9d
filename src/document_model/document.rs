use super::comment::CommentMarkers;
use super::events::{DocumentEvent, ListenerId, Listeners};
use super::line_store::{Cursor, LineStore, TextLine};
use super::marks::{Mark, MarkSet};
use super::selection::Selection;
use super::session::{DirtyRange, EditSession};
use super::undo::{UndoGroup, UndoKind, UndoLog, UndoRecord};
use crate::config::DocConfig;
use crate::error::EditError;
use crate::services::{FoldingTree, HighlightScheduler, Highlighter, NoFolding, PlainHighlighter};
use crate::view::{ViewId, ViewListener, ViewRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Unix, // \n (LF)
    Dos,  // \r\n (CRLF)
    Mac,  // \r (CR)
}

impl LineEnding {
    pub fn detect(content: &str) -> Self {
        if content.contains("\r\n") {
            LineEnding::Dos
        } else if content.contains('\r') {
            LineEnding::Mac
        } else {
            LineEnding::Unix
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Unix => "\n",
            LineEnding::Dos => "\r\n",
            LineEnding::Mac => "\r",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LineEnding::Unix => "unix",
            LineEnding::Dos => "dos",
            LineEnding::Mac => "mac",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "unix" => Some(LineEnding::Unix),
            "dos" => Some(LineEnding::Dos),
            "mac" => Some(LineEnding::Mac),
            _ => None,
        }
    }
}

/// Split on `\r\n`, `\r` and `\n`.
pub fn split_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = content.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut current));
            }
            '\n' => lines.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    lines.push(current);
    lines
}

/// A line-oriented text document with transactional editing.
///
/// Every change goes through the six `edit_*` primitives. Each one records
/// its inverse in the current undo group and keeps marks, view cursor
/// caches, the dirty range and the folding tree in step with the text.
/// Primitives nest inside `edit_start`/`edit_end` sessions; only the
/// outermost `edit_end` flushes highlighting, the undo log, views and
/// listeners.
pub struct Document {
    pub(crate) lines: LineStore,
    pub(crate) undo: UndoLog,
    pub(crate) session: EditSession,
    pub(crate) selection: Selection,
    pub(crate) marks: MarkSet,
    pub(crate) views: ViewRegistry,
    pub(crate) config: DocConfig,
    pub(crate) comment_markers: CommentMarkers,
    active_view: Option<ViewId>,
    highlighter: Box<dyn Highlighter>,
    scheduler: HighlightScheduler,
    folding: Box<dyn FoldingTree>,
    listeners: Listeners,
    pending_events: Vec<DocumentEvent>,
    pub(crate) line_ending: LineEnding,
    filename: Option<PathBuf>,
    modified: bool,
    read_only: bool,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("lines", &self.lines.count())
            .field("filename", &self.filename)
            .field("modified", &self.modified)
            .field("line_ending", &self.line_ending)
            .field("session", &self.session.state())
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_config(DocConfig::default())
    }

    pub fn with_config(config: DocConfig) -> Self {
        Self {
            lines: LineStore::new(),
            undo: UndoLog::new(config.undo_steps),
            session: EditSession::new(),
            selection: Selection::new(),
            marks: MarkSet::new(),
            views: ViewRegistry::new(),
            comment_markers: CommentMarkers::default(),
            active_view: None,
            highlighter: Box::new(PlainHighlighter),
            scheduler: HighlightScheduler::new(),
            folding: Box::new(NoFolding),
            listeners: Listeners::new(),
            pending_events: Vec::new(),
            line_ending: config.line_ending,
            filename: None,
            modified: false,
            read_only: false,
            config,
        }
    }

    pub fn from_text(text: &str) -> Self {
        let mut doc = Self::new();
        doc.load_text(text);
        doc
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EditError> {
        let mut doc = Self::new();
        doc.load_file(path)?;
        Ok(doc)
    }

    // ---- configuration and collaborators ----

    pub fn config(&self) -> &DocConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DocConfig) {
        self.undo.set_max_steps(config.undo_steps);
        self.config = config;
    }

    pub fn set_highlighter(&mut self, highlighter: Box<dyn Highlighter>) {
        self.highlighter = highlighter;
        self.rehighlight_all();
    }

    pub fn set_folding(&mut self, folding: Box<dyn FoldingTree>) {
        self.folding = folding;
        self.invalidate_views();
    }

    pub fn comment_markers(&self) -> &CommentMarkers {
        &self.comment_markers
    }

    pub fn set_comment_markers(&mut self, markers: CommentMarkers) {
        self.comment_markers = markers;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        if self.modified != modified {
            self.modified = modified;
            self.notify(DocumentEvent::ModifiedChanged(modified));
        }
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, filename: Option<PathBuf>) {
        self.filename = filename;
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        if self.line_ending != line_ending {
            self.line_ending = line_ending;
            self.set_modified(true);
        }
    }

    // ---- listeners ----

    pub fn subscribe(&mut self, callback: impl FnMut(&DocumentEvent) + 'static) -> ListenerId {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Deliver now, or at the end of the running session.
    pub(crate) fn notify(&mut self, event: DocumentEvent) {
        if self.session.is_active() {
            if !self.pending_events.contains(&event) {
                self.pending_events.push(event);
            }
        } else {
            self.listeners.emit(&event);
        }
    }

    fn flush_pending_events(&mut self) {
        for event in std::mem::take(&mut self.pending_events) {
            self.listeners.emit(&event);
        }
    }

    // ---- views ----

    pub fn attach_view(&mut self, listener: Box<dyn ViewListener>) -> ViewId {
        let id = self.views.attach(listener);
        if self.active_view.is_none() {
            self.active_view = Some(id);
        }
        debug!(?id, "view attached");
        id
    }

    pub fn detach_view(&mut self, id: ViewId) -> bool {
        let removed = self.views.detach(id);
        if removed && self.active_view == Some(id) {
            self.active_view = self.views.ids().first().copied();
        }
        removed
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn active_view(&self) -> Option<ViewId> {
        self.active_view
    }

    pub fn set_active_view(&mut self, id: ViewId) -> bool {
        if self.views.contains(id) {
            self.active_view = Some(id);
            true
        } else {
            false
        }
    }

    pub fn view_cursor(&self, id: ViewId) -> Option<Cursor> {
        self.views.get(id).map(|v| v.cursor())
    }

    /// Move a view's cursor on behalf of the view itself.
    pub fn set_view_cursor(&mut self, id: ViewId, cursor: Cursor) -> Result<(), EditError> {
        let cursor = self.normalize_cursor(cursor);
        let in_session = self.session.is_active();
        let view = self.views.get_mut(id).ok_or(EditError::UnknownView)?;
        view.set_cursor(cursor);
        if in_session {
            view.set_cursor_cache(cursor);
        }
        Ok(())
    }

    /// Place a view's cursor cache; applied when the session closes.
    pub(crate) fn set_view_cursor_cache(&mut self, id: ViewId, cursor: Cursor) -> Result<(), EditError> {
        let view = self.views.get_mut(id).ok_or(EditError::UnknownView)?;
        view.set_cursor_cache(cursor);
        Ok(())
    }

    pub(crate) fn view_cursor_cache(&self, id: ViewId) -> Result<Cursor, EditError> {
        self.views
            .get(id)
            .map(|v| if self.session.is_active() { v.cursor_cache() } else { v.cursor() })
            .ok_or(EditError::UnknownView)
    }

    fn active_cursor(&self) -> Option<Cursor> {
        let view = self.views.get(self.active_view?)?;
        Some(if self.session.is_active() {
            view.cursor_cache()
        } else {
            view.cursor()
        })
    }

    /// The active view's cursor as the running session sees it.
    fn active_cursor_cache(&self) -> Option<Cursor> {
        self.views.get(self.active_view?).map(|v| v.cursor_cache())
    }

    pub(crate) fn tag_views(&mut self, start: usize, end: usize) {
        for view in self.views.iter_mut() {
            view.listener_mut().tag_real_lines(start, end);
        }
    }

    fn invalidate_views(&mut self) {
        for view in self.views.iter_mut() {
            view.listener_mut().full_invalidate();
        }
    }

    // ---- text accessors ----

    pub fn line_count(&self) -> usize {
        self.lines.count()
    }

    pub fn last_line(&self) -> usize {
        self.lines.count() - 1
    }

    pub fn line_text(&self, line: usize) -> Option<String> {
        self.lines.plain_line(line)
    }

    pub fn line_length(&self, line: usize) -> usize {
        self.lines.line(line).map_or(0, TextLine::len)
    }

    pub fn text_line(&self, line: usize) -> Option<&TextLine> {
        self.lines.line(line)
    }

    pub fn lines(&self) -> &LineStore {
        &self.lines
    }

    /// Whole text joined with `\n`.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whole text joined with the document's line ending.
    pub fn text_with_line_ending(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::string)
            .collect::<Vec<_>>()
            .join(self.line_ending.as_str())
    }

    /// Stream text between two positions, `\n` between lines.
    pub fn text_range(&self, start: Cursor, end: Cursor) -> String {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let mut s = String::new();
        for line in start.line..=end.line.min(self.last_line()) {
            let Some(text) = self.lines.line(line) else { break };
            let chars = text.chars();
            let from = if line == start.line { start.column.min(chars.len()) } else { 0 };
            let to = if line == end.line { end.column.min(chars.len()) } else { chars.len() };
            if from < to {
                s.extend(&chars[from..to]);
            }
            if line < end.line {
                s.push('\n');
            }
        }
        s
    }

    /// Character count including one separator per line break.
    pub fn length(&self) -> usize {
        self.lines.iter().map(TextLine::len).sum::<usize>() + self.lines.count() - 1
    }

    pub fn attribute_at(&self, line: usize, column: usize) -> u8 {
        self.lines.line(line).map_or(0, |l| l.attribute_at(column))
    }

    /// Clamp to an existing line and a column within it.
    pub fn normalize_cursor(&self, cursor: Cursor) -> Cursor {
        let line = cursor.line.min(self.last_line());
        Cursor::new(line, cursor.column.min(self.line_length(line)))
    }

    pub fn is_word_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_'
    }

    /// Column span of the word touching `cursor`.
    pub(crate) fn word_bounds(&self, cursor: Cursor) -> Option<(usize, usize)> {
        let line = self.lines.line(cursor.line)?;
        let chars = line.chars();
        let col = cursor.column.min(chars.len());
        let mut start = col;
        let mut end = col;
        while start > 0 && Self::is_word_char(chars[start - 1]) {
            start -= 1;
        }
        while end < chars.len() && Self::is_word_char(chars[end]) {
            end += 1;
        }
        Some((start, end))
    }

    pub fn get_word(&self, cursor: Cursor) -> String {
        match (self.word_bounds(cursor), self.lines.line(cursor.line)) {
            (Some((start, end)), Some(line)) => line.chars()[start..end].iter().collect(),
            _ => String::new(),
        }
    }

    // ---- folding ----

    pub fn visible_line_count(&self) -> usize {
        self.lines.count() - self.folding.hidden_lines_count()
    }

    pub fn real_line(&self, virtual_line: usize) -> usize {
        self.folding.real_line_of(virtual_line)
    }

    pub fn virtual_line(&self, real_line: usize) -> usize {
        self.folding.virtual_line_of(real_line)
    }

    pub fn fold_lines(&mut self, header: usize, last: usize) -> bool {
        if last >= self.lines.count() || !self.folding.fold(header, last) {
            return false;
        }
        self.invalidate_views();
        true
    }

    pub fn unfold_lines(&mut self, header: usize) -> bool {
        if !self.folding.unfold(header) {
            return false;
        }
        self.invalidate_views();
        true
    }

    // ---- edit sessions ----

    pub fn is_editing(&self) -> bool {
        self.session.is_active()
    }

    pub fn edit_start(&mut self) {
        self.edit_start_with(true);
    }

    pub fn edit_start_with(&mut self, with_undo: bool) {
        let group = UndoGroup::new(self.active_cursor());
        if self.session.begin(with_undo, group) {
            debug!(with_undo, "edit session opened");
            self.scheduler.suspend();
            if with_undo {
                self.undo.trim();
            }
            for view in self.views.iter_mut() {
                view.arm();
            }
        }
    }

    pub fn edit_end(&mut self) {
        let mut undo_changed = false;
        if self.session.depth() == 1 {
            undo_changed = self.reflow_on_close();
        }

        let Some(finished) = self.session.end() else {
            return;
        };
        self.scheduler.resume();

        if finished.edits == 0 {
            debug!("edit session closed without edits");
            for view in self.views.iter_mut() {
                view.disarm();
            }
            self.flush_pending_events();
            return;
        }

        if let Some((start, end)) = finished.dirty.bounds() {
            self.update_lines(start, end);
        }

        if let Some(group) = finished.group {
            undo_changed |= self.commit_group(group);
        }

        self.flush_views(&finished.dirty);
        debug!(edits = finished.edits, dirty = ?finished.dirty.bounds(), "edit session closed");

        self.listeners.emit(&DocumentEvent::TextChanged);
        if finished.marks_changed {
            self.listeners.emit(&DocumentEvent::MarksChanged);
        }
        if undo_changed {
            self.listeners.emit(&DocumentEvent::UndoChanged);
        }
        self.set_modified(true);
        self.flush_pending_events();
    }

    /// Word wrap at the close of an outermost session. Returns whether the
    /// caller's group was committed to the undo log.
    fn reflow_on_close(&mut self) -> bool {
        if !self.config.word_wrap || !self.session.with_undo() || self.session.edits() == 0 {
            return false;
        }
        let Some((start, end)) = self.session.dirty().bounds() else {
            return false;
        };
        let fresh = UndoGroup::new(self.active_cursor_cache());
        let committed = match self.session.replace_group(fresh) {
            Some(group) => self.commit_group(group),
            None => false,
        };
        let width = self.config.word_wrap_at;
        self.reflow_lines(start, end, width);
        committed
    }

    fn commit_group(&mut self, mut group: UndoGroup) -> bool {
        if group.is_empty() {
            return false;
        }
        group.cursor_after = self.active_cursor_cache().or(group.cursor_after);
        self.undo.push_group(group);
        true
    }

    fn flush_views(&mut self, dirty: &DirtyRange) {
        let last = self.last_line();
        for view in self.views.iter_mut() {
            let tag = match (view.tag_lines_from(), dirty.bounds()) {
                (Some(from), Some((start, _))) => Some((from.min(start).min(last), last)),
                (Some(from), None) => Some((from.min(last), last)),
                (None, Some((start, end))) => Some((start.min(last), end.min(last))),
                (None, None) => None,
            };
            view.finish_session(tag, last);
        }
    }

    // ---- primitives ----

    fn check_writable(&self) -> Result<(), EditError> {
        if self.read_only {
            return Err(EditError::ReadOnly);
        }
        Ok(())
    }

    pub(crate) fn check_line(&self, line: usize) -> Result<(), EditError> {
        if line >= self.lines.count() {
            return Err(EditError::invalid_line(line, self.lines.count()));
        }
        Ok(())
    }

    pub fn edit_insert_text(&mut self, line: usize, column: usize, text: &str) -> Result<(), EditError> {
        self.check_writable()?;
        self.check_line(line)?;
        if text.is_empty() {
            return Ok(());
        }
        let column = column.min(self.line_length(line));
        let len = text.chars().count();
        trace!(line, column, len, "insert text");

        self.edit_start();
        self.session.record(UndoRecord::new(UndoKind::InsertText, line, column, len, text.to_string()));
        if let Some(l) = self.lines.line_mut(line) {
            l.insert(column, text);
        }
        self.lines.change_line(line);
        self.session.dirty_mut().tag(line);
        for view in self.views.iter_mut() {
            view.on_insert_text(line, column, len);
        }
        self.edit_end();
        Ok(())
    }

    pub fn edit_remove_text(&mut self, line: usize, column: usize, len: usize) -> Result<(), EditError> {
        self.check_writable()?;
        self.check_line(line)?;
        let line_len = self.line_length(line);
        let column = column.min(line_len);
        let len = len.min(line_len - column);
        if len == 0 {
            return Ok(());
        }
        trace!(line, column, len, "remove text");

        self.edit_start();
        let removed = self
            .lines
            .line_mut(line)
            .map(|l| l.remove(column, len))
            .unwrap_or_default();
        self.session.record(UndoRecord::new(UndoKind::RemoveText, line, column, len, removed));
        self.lines.change_line(line);
        self.session.dirty_mut().tag(line);
        for view in self.views.iter_mut() {
            view.on_remove_text(line, column, len);
        }
        self.edit_end();
        Ok(())
    }

    pub fn edit_wrap_line(&mut self, line: usize, column: usize) -> Result<(), EditError> {
        self.check_writable()?;
        self.check_line(line)?;
        let column = column.min(self.line_length(line));
        trace!(line, column, "wrap line");

        self.edit_start();
        self.session.record(UndoRecord::new(UndoKind::WrapLine, line, column, 0, String::new()));
        let tail = self
            .lines
            .line_mut(line)
            .map(|l| l.wrap(column))
            .unwrap_or_default();
        self.lines.insert_line(line + 1, tail);
        self.lines.change_line(line);
        self.lines.change_line(line + 1);

        if self.marks.line_wrapped(line) {
            self.session.set_marks_changed();
        }
        let dirty = self.session.dirty_mut();
        dirty.line_inserted(line + 1);
        dirty.tag(line);
        dirty.tag(line + 1);
        self.folding.line_inserted(line + 1);
        for view in self.views.iter_mut() {
            view.on_wrap_line(line, column);
        }
        self.edit_end();
        Ok(())
    }

    pub fn edit_unwrap_line(&mut self, line: usize, column: usize) -> Result<(), EditError> {
        self.check_writable()?;
        self.check_line(line)?;
        self.check_line(line + 1)?;
        let column = column.min(self.line_length(line));
        trace!(line, column, "unwrap line");

        self.edit_start();
        let Some(next) = self.lines.remove_line(line + 1) else {
            self.edit_end();
            return Err(EditError::invalid_line(line + 1, self.lines.count()));
        };
        self.session.record(UndoRecord::new(UndoKind::UnwrapLine, line, column, next.len(), String::new()));
        if let Some(l) = self.lines.line_mut(line) {
            l.unwrap(column, next);
        }
        self.lines.change_line(line);

        if self.marks.line_unwrapped(line) {
            self.session.set_marks_changed();
        }
        let count = self.lines.count();
        let dirty = self.session.dirty_mut();
        dirty.line_removed(line + 1);
        dirty.tag(line);
        if line + 1 < count {
            dirty.tag(line + 1);
        }
        self.folding.line_removed(line + 1);
        for view in self.views.iter_mut() {
            view.on_unwrap_line(line, column);
        }
        self.edit_end();
        Ok(())
    }

    pub fn edit_insert_line(&mut self, line: usize, text: &str) -> Result<(), EditError> {
        self.check_writable()?;
        if line > self.lines.count() {
            return Err(EditError::invalid_line(line, self.lines.count()));
        }
        trace!(line, "insert line");

        self.edit_start();
        let len = text.chars().count();
        self.session.record(UndoRecord::new(UndoKind::InsertLine, line, 0, len, text.to_string()));
        self.lines.insert_line(line, TextLine::from_str(text));
        self.lines.change_line(line);

        let dirty = self.session.dirty_mut();
        dirty.line_inserted(line);
        dirty.tag(line);
        if self.marks.line_inserted(line) {
            self.session.set_marks_changed();
        }
        self.folding.line_inserted(line);
        for view in self.views.iter_mut() {
            view.on_insert_line(line);
        }
        self.edit_end();
        Ok(())
    }

    pub fn edit_remove_line(&mut self, line: usize) -> Result<(), EditError> {
        self.check_writable()?;
        self.check_line(line)?;
        if self.lines.count() == 1 {
            return Err(EditError::DocumentEmptyGuard);
        }
        trace!(line, "remove line");

        self.edit_start();
        let removed = self.lines.remove_line(line).unwrap_or_default();
        self.session.record(UndoRecord::new(UndoKind::RemoveLine, line, 0, removed.len(), removed.string()));

        let count = self.lines.count();
        let dirty = self.session.dirty_mut();
        dirty.line_removed(line);
        dirty.tag(line.min(count - 1));
        if self.marks.line_removed(line) {
            self.session.set_marks_changed();
        }
        self.folding.line_removed(line);
        for view in self.views.iter_mut() {
            view.on_remove_line(line, count);
        }
        self.edit_end();
        Ok(())
    }

    // ---- undo / redo ----

    /// Refused while a session is open or the document is read-only.
    pub fn undo(&mut self) -> bool {
        if self.read_only || self.session.is_active() {
            return false;
        }
        let Some(group) = self.undo.take_undo() else {
            return false;
        };
        debug!(records = group.len(), "undo");
        self.edit_start_with(false);
        group.undo(self);
        if let (Some(view), Some(cursor)) = (self.active_view, group.cursor_before) {
            let cursor = self.normalize_cursor(cursor);
            let _ = self.set_view_cursor_cache(view, cursor);
        }
        self.edit_end();
        self.undo.push_redo(group);
        self.notify(DocumentEvent::UndoChanged);
        true
    }

    /// Refused while a session is open or the document is read-only.
    pub fn redo(&mut self) -> bool {
        if self.read_only || self.session.is_active() {
            return false;
        }
        let Some(group) = self.undo.take_redo() else {
            return false;
        };
        debug!(records = group.len(), "redo");
        self.edit_start_with(false);
        group.redo(self);
        if let (Some(view), Some(cursor)) = (self.active_view, group.cursor_after) {
            let cursor = self.normalize_cursor(cursor);
            let _ = self.set_view_cursor_cache(view, cursor);
        }
        self.edit_end();
        self.undo.push_undone(group);
        self.notify(DocumentEvent::UndoChanged);
        true
    }

    pub fn undo_count(&self) -> usize {
        self.undo.undo_count()
    }

    pub fn redo_count(&self) -> usize {
        self.undo.redo_count()
    }

    pub fn undo_steps(&self) -> usize {
        self.undo.max_steps()
    }

    pub fn set_undo_steps(&mut self, steps: usize) {
        self.config.undo_steps = steps;
        self.undo.set_max_steps(steps);
        self.notify(DocumentEvent::UndoChanged);
    }

    pub fn clear_undo(&mut self) {
        self.undo.clear_undo();
        self.notify(DocumentEvent::UndoChanged);
    }

    pub fn clear_redo(&mut self) {
        self.undo.clear_redo();
        self.notify(DocumentEvent::UndoChanged);
    }

    // ---- marks ----

    pub fn mark(&self, line: usize) -> u32 {
        self.marks.mark(line)
    }

    pub fn marks(&self) -> &[Mark] {
        self.marks.marks()
    }

    fn marks_touched(&mut self, lines: &[usize]) {
        for &line in lines {
            self.tag_views(line, line);
        }
        self.notify(DocumentEvent::MarksChanged);
    }

    pub fn set_mark(&mut self, line: usize, mark_type: u32) -> Result<(), EditError> {
        self.check_line(line)?;
        if self.marks.set(line, mark_type) {
            self.marks_touched(&[line]);
        }
        Ok(())
    }

    pub fn add_mark(&mut self, line: usize, mark_type: u32) -> Result<(), EditError> {
        self.check_line(line)?;
        if mark_type != 0 && self.marks.add(line, mark_type) {
            self.marks_touched(&[line]);
        }
        Ok(())
    }

    pub fn remove_mark(&mut self, line: usize, mark_type: u32) -> bool {
        let changed = self.marks.remove(line, mark_type);
        if changed {
            self.marks_touched(&[line]);
        }
        changed
    }

    pub fn clear_mark(&mut self, line: usize) -> bool {
        let changed = self.marks.clear(line);
        if changed {
            self.marks_touched(&[line]);
        }
        changed
    }

    pub fn clear_marks(&mut self) {
        let lines = self.marks.clear_all();
        if !lines.is_empty() {
            self.marks_touched(&lines);
        }
    }

    pub fn editable_marks(&self) -> u32 {
        self.marks.user_changeable()
    }

    pub fn set_marks_user_changeable(&mut self, mask: u32) {
        self.marks.set_user_changeable(mask);
    }

    // ---- highlighting ----

    /// Restyle dirty lines `start..=end`.
    fn update_lines(&mut self, start: usize, end: usize) {
        let to = (end + 1).min(self.lines.count());
        if start >= to {
            return;
        }
        if let Some(more) = self.highlighter.update_highlighting(&mut self.lines, start, to, true) {
            if more > to {
                let (from, chunk_end) = self.scheduler.request(to, more);
                self.run_highlight_chunk(from, chunk_end);
            }
        }
    }

    fn run_highlight_chunk(&mut self, from: usize, to: usize) {
        let to = to.min(self.lines.count());
        let more = if from < to {
            self.highlighter.update_highlighting(&mut self.lines, from, to, false)
        } else {
            None
        };
        self.scheduler.complete(to);
        if from < to {
            self.tag_views(from, to - 1);
        }
        if let Some(target) = more {
            if target > to {
                self.scheduler.request(to, target);
            }
        }
    }

    fn rehighlight_all(&mut self) {
        self.scheduler.cancel();
        self.highlighter.invalidate(&mut self.lines);
        let (from, chunk_end) = self.scheduler.request(0, self.lines.count());
        self.run_highlight_chunk(from, chunk_end);
        self.invalidate_views();
    }

    /// Work off one chunk of pending highlighting. Returns whether more
    /// work remains. Does nothing while a session is open.
    pub fn tick_highlighting(&mut self) -> bool {
        if self.session.is_active() {
            return self.scheduler.has_pending();
        }
        let Some((from, to)) = self.scheduler.next_chunk(self.lines.count()) else {
            return false;
        };
        trace!(from, to, "highlight tick");
        self.run_highlight_chunk(from, to);
        self.scheduler.has_pending()
    }

    pub fn highlight_pending(&self) -> bool {
        self.scheduler.has_pending()
    }

    // ---- loading and saving ----

    /// Replace the whole content without recording undo.
    pub fn load_text(&mut self, content: &str) {
        let has_breaks = content.contains(['\n', '\r']);
        self.line_ending = if has_breaks {
            LineEnding::detect(content)
        } else {
            self.config.line_ending
        };
        self.lines = LineStore::from_lines(split_lines(content));
        self.reset_state();
        debug!(lines = self.lines.count(), eol = self.line_ending.name(), "text loaded");
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), EditError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        self.load_text(&content);
        self.filename = Some(path.to_path_buf());
        Ok(())
    }

    /// Everything except the lines goes back to a fresh state.
    pub(crate) fn reset_state(&mut self) {
        self.marks.clear_all();
        self.undo.clear_undo();
        self.undo.clear_redo();
        self.selection.clear();
        self.folding.clear();
        self.modified = false;
        for view in self.views.iter_mut() {
            view.set_cursor(Cursor::default());
            view.listener_mut().cursor_changed(Cursor::default());
        }
        self.rehighlight_all();
    }

    pub fn save(&mut self) -> Result<usize, EditError> {
        let filename = self.filename.clone().ok_or(EditError::NoFileName)?;
        self.save_as(filename)
    }

    pub fn save_as(&mut self, filename: impl Into<PathBuf>) -> Result<usize, EditError> {
        let filename = filename.into();
        let content = self.text_with_line_ending();
        fs::write(&filename, &content)?;
        debug!(path = %filename.display(), bytes = content.len(), "saved");
        self.filename = Some(filename);
        self.set_modified(false);
        Ok(content.len())
    }
}
