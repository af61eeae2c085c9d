//! Indenting and unindenting lines and selections.

use super::document::Document;
use super::editing::indent_string;
use super::line_store::Cursor;
use crate::error::EditError;
use tracing::trace;

impl Document {
    /// Move the indentation of `line` by `change` tab stops and rewrite it
    /// with tabs or spaces. Whitespace-only lines are emptied. The part of
    /// the old indentation that already matches is left untouched.
    pub fn optimize_leading_space(&mut self, line: usize, change: i32) -> Result<(), EditError> {
        self.check_line(line)?;
        let tab_width = self.config.tab_width.max(1);
        let Some(text) = self.text_line(line) else {
            return Ok(());
        };
        let first_char = text.first_char();
        let upto = first_char.unwrap_or(text.len());

        let space = match first_char {
            None => 0,
            Some(first) => {
                let current = text.cursor_x(first, tab_width) as i64;
                let mut space = (current + i64::from(change) * tab_width as i64).max(0) as usize;
                if !self.config.keep_extra_spaces {
                    let extra = space % tab_width;
                    space -= extra;
                    if extra > 0 && change < 0 {
                        space += tab_width;
                    }
                }
                space
            }
        };

        let tab = (!self.config.space_indent).then_some(tab_width);
        let new_space: Vec<char> = indent_string(space, tab).chars().collect();
        let keep = text
            .chars()
            .iter()
            .zip(&new_space)
            .take(upto)
            .take_while(|(a, b)| a == b)
            .count();
        trace!(line, space, keep, "leading space");

        self.in_session(|doc| {
            if keep < upto {
                doc.remove_text(line, keep, line, upto)?;
            }
            if keep < new_space.len() {
                let tail: String = new_space[keep..].iter().collect();
                doc.insert_text(line, keep, &tail)?;
            }
            Ok(())
        })
    }

    /// Indent (`change > 0`) or unindent `line`, or every line the
    /// selection touches. A selection ending at column 0 leaves that line
    /// alone. With `keep_indent_profile`, an unindent shrinks to what the
    /// least indented selected line allows.
    pub fn do_indent(&mut self, line: usize, change: i32) -> Result<(), EditError> {
        self.check_line(line)?;
        if !self.has_selection() {
            return self.optimize_leading_space(line, change);
        }

        let start = self.selection.start();
        let end = self.selection.end();
        let first = start.line;
        let last = if end.column == 0 && end.line > first { end.line - 1 } else { end.line };
        let touched: Vec<usize> = (first..=last)
            .filter(|&l| self.line_selected(l) || self.line_has_selected(l))
            .collect();

        let mut change = change;
        if self.config.keep_indent_profile && change < 0 {
            let tab_width = self.config.tab_width.max(1);
            let mut allowed = -change;
            for &l in &touched {
                if let Some(text) = self.text_line(l) {
                    if let Some(fc) = text.first_char() {
                        let levels = (text.cursor_x(fc, tab_width) / tab_width) as i32;
                        allowed = allowed.min(levels);
                    }
                }
            }
            change = -allowed;
            if change == 0 {
                return Ok(());
            }
        }

        let before: Vec<usize> = touched.iter().map(|&l| self.line_length(l)).collect();
        self.in_session(|doc| {
            for &l in &touched {
                doc.optimize_leading_space(l, change)?;
            }
            Ok(())
        })?;

        // keep the selection on the same text
        let shift = |doc: &Document, c: Cursor| -> Cursor {
            match touched.iter().position(|&l| l == c.line) {
                Some(i) if c.column > 0 => {
                    let delta = doc.line_length(c.line) as i64 - before[i] as i64;
                    Cursor::new(c.line, (c.column as i64 + delta).max(0) as usize)
                }
                _ => c,
            }
        };
        let new_start = shift(self, start);
        let new_end = shift(self, end);
        self.set_selection(new_start, new_end);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocConfig;

    fn doc_with(lines: &[&str], config: DocConfig) -> Document {
        let mut d = Document::with_config(config);
        d.load_text(&lines.join("\n"));
        d
    }

    fn tabs4() -> DocConfig {
        DocConfig {
            tab_width: 4,
            ..DocConfig::default()
        }
    }

    fn spaces4() -> DocConfig {
        DocConfig {
            tab_width: 4,
            space_indent: true,
            ..DocConfig::default()
        }
    }

    fn all_lines(doc: &Document) -> Vec<String> {
        (0..doc.line_count()).filter_map(|i| doc.line_text(i)).collect()
    }

    #[test]
    fn test_indent_rounds_to_tab_stops() {
        let mut d = doc_with(&["  x"], tabs4());
        d.optimize_leading_space(0, 1).unwrap();
        assert_eq!(all_lines(&d), vec!["\tx"]);
        d.optimize_leading_space(0, 1).unwrap();
        assert_eq!(all_lines(&d), vec!["\t\tx"]);
        d.optimize_leading_space(0, -1).unwrap();
        d.optimize_leading_space(0, -1).unwrap();
        assert_eq!(all_lines(&d), vec!["x"]);
        d.optimize_leading_space(0, -1).unwrap();
        assert_eq!(all_lines(&d), vec!["x"]);
    }

    #[test]
    fn test_space_indent() {
        let mut d = doc_with(&["x", "      y"], spaces4());
        d.optimize_leading_space(0, 1).unwrap();
        d.optimize_leading_space(1, -1).unwrap();
        assert_eq!(all_lines(&d), vec!["    x", "    y"]);
    }

    #[test]
    fn test_keep_extra_spaces() {
        let config = DocConfig {
            keep_extra_spaces: true,
            ..spaces4()
        };
        let mut d = doc_with(&["  x"], config);
        d.optimize_leading_space(0, 1).unwrap();
        assert_eq!(all_lines(&d), vec!["      x"]);
    }

    #[test]
    fn test_whitespace_only_line_is_emptied() {
        let mut d = doc_with(&["   ", "\t"], tabs4());
        d.optimize_leading_space(0, 1).unwrap();
        d.optimize_leading_space(1, -1).unwrap();
        assert_eq!(all_lines(&d), vec!["", ""]);
    }

    #[test]
    fn test_matching_prefix_is_not_rewritten() {
        let mut d = doc_with(&["\tx"], tabs4());
        d.optimize_leading_space(0, 1).unwrap();
        assert_eq!(all_lines(&d), vec!["\t\tx"]);
        d.undo();
        assert_eq!(all_lines(&d), vec!["\tx"]);
    }

    #[test]
    fn test_indent_selection_skips_line_after_column_zero_end() {
        let mut d = doc_with(&["a", "b", "c"], tabs4());
        d.set_selection(Cursor::new(0, 0), Cursor::new(2, 0));
        d.do_indent(0, 1).unwrap();
        assert_eq!(all_lines(&d), vec!["\ta", "\tb", "c"]);
        assert_eq!(d.undo_count(), 1);
        assert_eq!(d.selection().end(), Cursor::new(2, 0));
    }

    #[test]
    fn test_indent_single_line_without_selection() {
        let mut d = doc_with(&["a", "b"], spaces4());
        d.do_indent(1, 1).unwrap();
        assert_eq!(all_lines(&d), vec!["a", "    b"]);
    }

    #[test]
    fn test_keep_indent_profile_blocks_unindent() {
        let config = DocConfig {
            keep_indent_profile: true,
            ..tabs4()
        };
        let mut d = doc_with(&["\ta", "b"], config);
        d.select_all();
        d.do_indent(0, -1).unwrap();
        assert_eq!(all_lines(&d), vec!["\ta", "b"]);

        let mut d = doc_with(&["\ta", "b"], tabs4());
        d.select_all();
        d.do_indent(0, -1).unwrap();
        assert_eq!(all_lines(&d), vec!["a", "b"]);
    }

    #[test]
    fn test_selection_follows_indented_text() {
        let mut d = doc_with(&["abc def"], spaces4());
        d.set_selection(Cursor::new(0, 4), Cursor::new(0, 7));
        d.do_indent(0, 1).unwrap();
        assert_eq!(d.selection_text(), "def");
    }
}
