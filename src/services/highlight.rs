//! Highlighting collaborator and its cooperative catch-up scheduler.
//!
//! The document tells a [`Highlighter`] which lines changed; the
//! highlighter restyles them and may ask for a follow-up range when the
//! syntax context at the end of the range changed. That follow-up is
//! worked off in bounded chunks by [`HighlightScheduler`].

use crate::document_model::line_store::LineStore;

/// Lines processed right away when a follow-up range is requested.
pub const IMMEDIATE_CHUNK: usize = 100;
/// Lines processed per scheduler tick.
pub const TICK_CHUNK: usize = 1000;

pub trait Highlighter {
    /// Forget all computed styling.
    fn invalidate(&mut self, lines: &mut LineStore);

    /// Restyle lines `from..to`. Returns `Some(end)` when the context change
    /// leaks past `to` and lines up to `end` need restyling as well.
    fn update_highlighting(
        &mut self,
        lines: &mut LineStore,
        from: usize,
        to: usize,
        force_context: bool,
    ) -> Option<usize>;
}

/// No styling at all; every attribute stays 0.
#[derive(Debug, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn invalidate(&mut self, lines: &mut LineStore) {
        for i in 0..lines.count() {
            lines.change_line(i);
        }
    }

    fn update_highlighting(
        &mut self,
        lines: &mut LineStore,
        from: usize,
        to: usize,
        _force_context: bool,
    ) -> Option<usize> {
        for i in from..to.min(lines.count()) {
            if let Some(line) = lines.line_mut(i) {
                let len = line.len();
                line.set_attributes(0, len, 0);
                line.set_highlight_valid(true);
            }
        }
        None
    }
}

pub const ATTR_NORMAL: u8 = 0;
pub const ATTR_KEYWORD: u8 = 1;
pub const ATTR_COMMENT: u8 = 2;

const CTX_BLOCK_COMMENT: u16 = 1;

/// Keyword and block-comment styling. A block comment left open at the end
/// of a line is carried to the next line through the line context.
#[derive(Debug, Clone)]
pub struct KeywordHighlighter {
    keywords: Vec<String>,
    comment_start: String,
    comment_end: String,
}

impl KeywordHighlighter {
    pub fn new(keywords: &[&str], comment_start: &str, comment_end: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            comment_start: comment_start.to_string(),
            comment_end: comment_end.to_string(),
        }
    }

    fn is_keyword(&self, word: &str) -> bool {
        self.keywords.iter().any(|k| k == word)
    }

    /// Style one line and return the context it leaves open.
    fn highlight_line(&self, chars: &[char], in_comment: bool) -> (Vec<u8>, bool) {
        let start: Vec<char> = self.comment_start.chars().collect();
        let end: Vec<char> = self.comment_end.chars().collect();
        let at = |pos: usize, pat: &[char]| !pat.is_empty() && chars[pos..].starts_with(pat);

        let mut attrs = vec![ATTR_NORMAL; chars.len()];
        let mut in_comment = in_comment;
        let mut pos = 0;
        while pos < chars.len() {
            if in_comment {
                if at(pos, &end) {
                    attrs[pos..pos + end.len()].fill(ATTR_COMMENT);
                    pos += end.len();
                    in_comment = false;
                } else {
                    attrs[pos] = ATTR_COMMENT;
                    pos += 1;
                }
            } else if at(pos, &start) {
                attrs[pos..pos + start.len()].fill(ATTR_COMMENT);
                pos += start.len();
                in_comment = true;
            } else if chars[pos].is_alphanumeric() || chars[pos] == '_' {
                let word_end = (pos..chars.len())
                    .find(|&i| !(chars[i].is_alphanumeric() || chars[i] == '_'))
                    .unwrap_or(chars.len());
                let word: String = chars[pos..word_end].iter().collect();
                if self.is_keyword(&word) {
                    attrs[pos..word_end].fill(ATTR_KEYWORD);
                }
                pos = word_end;
            } else {
                pos += 1;
            }
        }
        (attrs, in_comment)
    }
}

impl Highlighter for KeywordHighlighter {
    fn invalidate(&mut self, lines: &mut LineStore) {
        for i in 0..lines.count() {
            lines.change_line(i);
        }
    }

    fn update_highlighting(
        &mut self,
        lines: &mut LineStore,
        from: usize,
        to: usize,
        force_context: bool,
    ) -> Option<usize> {
        let count = lines.count();
        let to = to.min(count);
        if from >= to {
            return None;
        }
        let mut in_comment = from > 0
            && lines
                .line(from - 1)
                .is_some_and(|l| l.context().contains(&CTX_BLOCK_COMMENT));
        let mut context_changed = false;

        for i in from..to {
            let Some(line) = lines.line_mut(i) else { break };
            let (attrs, open) = self.highlight_line(line.chars(), in_comment);
            for (col, attr) in attrs.into_iter().enumerate() {
                line.set_attributes(col, col + 1, attr);
            }
            let new_context = if open { vec![CTX_BLOCK_COMMENT] } else { Vec::new() };
            context_changed = line.context() != new_context.as_slice();
            line.set_context(new_context);
            line.set_highlight_valid(true);
            in_comment = open;
        }

        // A changed trailing context restyles everything after it.
        if (context_changed || force_context) && to < count {
            let next_stale = lines.line(to).is_some_and(|l| !l.is_highlight_valid());
            if context_changed || next_stale {
                return Some(count);
            }
        }
        None
    }
}

/// Pending highlight work `[till, end)`, processed cooperatively.
#[derive(Debug, Default, Clone)]
pub struct HighlightScheduler {
    till: usize,
    end: usize,
    suspended: bool,
}

impl HighlightScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn has_pending(&self) -> bool {
        self.till < self.end
    }

    pub fn pending(&self) -> Option<(usize, usize)> {
        self.has_pending().then_some((self.till, self.end))
    }

    pub fn cancel(&mut self) {
        self.till = 0;
        self.end = 0;
    }

    /// Queue `from..to`. Returns the immediate chunk to process now, which
    /// starts at the lowest pending line.
    pub fn request(&mut self, from: usize, to: usize) -> (usize, usize) {
        if !self.has_pending() {
            self.till = from;
        } else {
            self.till = self.till.min(from);
        }
        self.end = self.end.max(to);
        (self.till, (self.till + IMMEDIATE_CHUNK).min(self.end))
    }

    /// Mark `..to` as done after a chunk was processed.
    pub fn complete(&mut self, to: usize) {
        self.till = self.till.max(to);
        if self.till >= self.end {
            self.cancel();
        }
    }

    /// Next tick's chunk, with the pending range clamped to `line_count`.
    pub fn next_chunk(&mut self, line_count: usize) -> Option<(usize, usize)> {
        if self.suspended {
            return None;
        }
        self.end = self.end.min(line_count);
        if !self.has_pending() {
            self.cancel();
            return None;
        }
        Some((self.till, (self.till + TICK_CHUNK).min(self.end)))
    }
}
