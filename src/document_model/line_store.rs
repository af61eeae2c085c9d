/// Logical position in a document. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor {
    pub line: usize,
    pub column: usize,
}

impl Cursor {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// One line of text with its per-character style attributes.
///
/// `attributes.len() == text.len()` holds after every operation.
#[derive(Debug, Clone, Default)]
pub struct TextLine {
    text: Vec<char>,
    attributes: Vec<u8>,
    context: Vec<u16>,
    highlight_valid: bool,
}

impl TextLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_str(s: &str) -> Self {
        let text: Vec<char> = s.chars().collect();
        let attributes = vec![0; text.len()];
        Self {
            text,
            attributes,
            context: Vec::new(),
            highlight_valid: false,
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.text
    }

    pub fn string(&self) -> String {
        self.text.iter().collect()
    }

    pub fn char_at(&self, column: usize) -> Option<char> {
        self.text.get(column).copied()
    }

    pub fn attributes(&self) -> &[u8] {
        &self.attributes
    }

    pub fn attribute_at(&self, column: usize) -> u8 {
        self.attributes.get(column).copied().unwrap_or(0)
    }

    pub fn set_attributes(&mut self, from: usize, to: usize, attribute: u8) {
        let to = to.min(self.attributes.len());
        if from < to {
            self.attributes[from..to].fill(attribute);
        }
    }

    /// Syntax context left open at the end of this line.
    pub fn context(&self) -> &[u16] {
        &self.context
    }

    pub fn set_context(&mut self, context: Vec<u16>) {
        self.context = context;
    }

    pub fn is_highlight_valid(&self) -> bool {
        self.highlight_valid
    }

    pub fn set_highlight_valid(&mut self, valid: bool) {
        self.highlight_valid = valid;
    }

    /// Insert characters at `column` (clamped to the line end). New
    /// characters get attribute 0.
    pub fn insert(&mut self, column: usize, s: &str) {
        let column = column.min(self.text.len());
        let chars: Vec<char> = s.chars().collect();
        let count = chars.len();
        self.text.splice(column..column, chars);
        self.attributes
            .splice(column..column, std::iter::repeat(0).take(count));
    }

    /// Remove up to `len` characters starting at `column`, returning them.
    pub fn remove(&mut self, column: usize, len: usize) -> String {
        let start = column.min(self.text.len());
        let end = column.saturating_add(len).min(self.text.len());
        self.attributes.drain(start..end);
        self.text.drain(start..end).collect()
    }

    /// Split the line at `column`; the returned line holds the tail.
    pub fn wrap(&mut self, column: usize) -> TextLine {
        let column = column.min(self.text.len());
        let tail_text = self.text.split_off(column);
        let tail_attributes = self.attributes.split_off(column);
        TextLine {
            text: tail_text,
            attributes: tail_attributes,
            context: std::mem::take(&mut self.context),
            highlight_valid: false,
        }
    }

    /// Merge `next` into this line at `column` (clamped to the line end).
    pub fn unwrap(&mut self, column: usize, next: TextLine) {
        let column = column.min(self.text.len());
        self.text.splice(column..column, next.text);
        self.attributes.splice(column..column, next.attributes);
        self.context = next.context;
    }

    pub fn first_char(&self) -> Option<usize> {
        self.next_non_space_char(0)
    }

    pub fn last_char(&self) -> Option<usize> {
        self.text.iter().rposition(|c| !c.is_whitespace())
    }

    pub fn next_non_space_char(&self, from: usize) -> Option<usize> {
        (from..self.text.len()).find(|&i| !self.text[i].is_whitespace())
    }

    pub fn previous_non_space_char(&self, from: usize) -> Option<usize> {
        if self.text.is_empty() {
            return None;
        }
        let from = from.min(self.text.len() - 1);
        (0..=from).rev().find(|&i| !self.text[i].is_whitespace())
    }

    pub fn starts_with(&self, s: &str) -> bool {
        self.string_at(0, s)
    }

    pub fn ends_with(&self, s: &str) -> bool {
        let n = s.chars().count();
        n <= self.text.len() && self.string_at(self.text.len() - n, s)
    }

    /// True if `s` occurs exactly at `column`.
    pub fn string_at(&self, column: usize, s: &str) -> bool {
        let mut pos = column;
        for ch in s.chars() {
            if self.text.get(pos) != Some(&ch) {
                return false;
            }
            pos += 1;
        }
        true
    }

    /// Display column of character index `column`, expanding tabs.
    pub fn cursor_x(&self, column: usize, tab_width: usize) -> usize {
        crate::document_model::width::display_width(&self.text[..column.min(self.text.len())], tab_width)
    }
}

/// Ordered sequence of lines. Mutations never notify anyone; the
/// document's edit session does that.
#[derive(Debug, Clone)]
pub struct LineStore {
    lines: Vec<TextLine>,
}

impl LineStore {
    pub fn new() -> Self {
        Self {
            lines: vec![TextLine::new()],
        }
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lines: Vec<TextLine> = lines
            .into_iter()
            .map(|l| TextLine::from_str(l.as_ref()))
            .collect();
        if lines.is_empty() {
            lines.push(TextLine::new());
        }
        Self { lines }
    }

    pub fn count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> Option<&TextLine> {
        self.lines.get(index)
    }

    pub fn line_mut(&mut self, index: usize) -> Option<&mut TextLine> {
        self.lines.get_mut(index)
    }

    pub fn insert_line(&mut self, index: usize, line: TextLine) -> bool {
        if index > self.lines.len() {
            return false;
        }
        self.lines.insert(index, line);
        true
    }

    pub fn remove_line(&mut self, index: usize) -> Option<TextLine> {
        if index >= self.lines.len() {
            return None;
        }
        Some(self.lines.remove(index))
    }

    /// Mark the derived state (highlighting) of a line stale.
    pub fn change_line(&mut self, index: usize) -> bool {
        match self.lines.get_mut(index) {
            Some(line) => {
                line.highlight_valid = false;
                true
            }
            None => false,
        }
    }

    pub fn plain_line(&self, index: usize) -> Option<String> {
        self.lines.get(index).map(TextLine::string)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.lines.push(TextLine::new());
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextLine> {
        self.lines.iter()
    }
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_has_one_empty_line() {
        let store = LineStore::new();
        assert_eq!(store.count(), 1);
        assert_eq!(store.plain_line(0), Some(String::new()));
    }

    #[test]
    fn test_insert_and_remove_keep_attributes_in_step() {
        let mut line = TextLine::from_str("Hello World");
        line.set_attributes(0, 5, 3);
        line.insert(5, ", big");
        assert_eq!(line.string(), "Hello, big World");
        assert_eq!(line.attributes().len(), line.len());
        assert_eq!(line.attribute_at(4), 3);
        assert_eq!(line.attribute_at(5), 0);

        let removed = line.remove(5, 5);
        assert_eq!(removed, ", big");
        assert_eq!(line.string(), "Hello World");
        assert_eq!(line.attributes().len(), line.len());
    }

    #[test]
    fn test_wrap_and_unwrap() {
        let mut line = TextLine::from_str("abcdef");
        line.set_attributes(3, 6, 7);
        let tail = line.wrap(3);
        assert_eq!(line.string(), "abc");
        assert_eq!(tail.string(), "def");
        assert_eq!(tail.attributes(), &[7, 7, 7]);

        line.unwrap(3, tail);
        assert_eq!(line.string(), "abcdef");
        assert_eq!(line.attribute_at(5), 7);
    }

    #[test]
    fn test_store_bounds() {
        let mut store = LineStore::from_lines(["a", "b"]);
        assert!(store.line(2).is_none());
        assert!(!store.insert_line(3, TextLine::new()));
        assert!(store.insert_line(2, TextLine::from_str("c")));
        assert_eq!(store.count(), 3);
        assert!(store.remove_line(3).is_none());
        assert_eq!(store.remove_line(0).map(|l| l.string()), Some("a".to_string()));
    }

    #[test]
    fn test_non_space_scans() {
        let line = TextLine::from_str("  x y  ");
        assert_eq!(line.first_char(), Some(2));
        assert_eq!(line.last_char(), Some(4));
        assert_eq!(line.previous_non_space_char(6), Some(4));
        assert_eq!(TextLine::from_str("   ").first_char(), None);
        assert!(line.string_at(2, "x y"));
        assert!(TextLine::from_str("a */").ends_with("*/"));
    }
}
