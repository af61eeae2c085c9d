use super::document::Document;
use super::line_store::LineStore;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Invalid search pattern: {0}")]
    InvalidPattern(String),
    #[error("No search pattern")]
    EmptyPattern,
}

/// Per-line pattern matching. Columns are character offsets.
pub trait LineMatcher {
    /// Forward: first match starting at or after `column`.
    /// Backward: last match starting at or before `column`.
    /// Returns `(column, length)`.
    fn match_in_line(&self, line: &[char], column: usize, backwards: bool) -> Option<(usize, usize)>;
}

/// Literal text, optionally case-insensitive.
#[derive(Debug, Clone)]
pub struct PlainMatcher {
    pattern: Vec<char>,
    case_sensitive: bool,
}

impl PlainMatcher {
    pub fn new(pattern: &str, case_sensitive: bool) -> Result<Self, SearchError> {
        if pattern.is_empty() {
            return Err(SearchError::EmptyPattern);
        }
        Ok(Self {
            pattern: pattern.chars().collect(),
            case_sensitive,
        })
    }

    fn matches_at(&self, line: &[char], pos: usize) -> bool {
        if pos + self.pattern.len() > line.len() {
            return false;
        }
        line[pos..pos + self.pattern.len()]
            .iter()
            .zip(&self.pattern)
            .all(|(a, b)| {
                if self.case_sensitive {
                    a == b
                } else {
                    a.to_lowercase().eq(b.to_lowercase())
                }
            })
    }
}

impl LineMatcher for PlainMatcher {
    fn match_in_line(&self, line: &[char], column: usize, backwards: bool) -> Option<(usize, usize)> {
        let len = self.pattern.len();
        if len > line.len() {
            return None;
        }
        let last_start = line.len() - len;
        let found = if backwards {
            (0..=column.min(last_start)).rev().find(|&p| self.matches_at(line, p))
        } else {
            (column..=last_start).find(|&p| self.matches_at(line, p))
        };
        found.map(|p| (p, len))
    }
}

/// Regular expression matching through the `regex` crate.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str, case_sensitive: bool) -> Result<Self, SearchError> {
        if pattern.is_empty() {
            return Err(SearchError::EmptyPattern);
        }
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| SearchError::InvalidPattern(e.to_string()))?;
        Ok(Self { regex })
    }
}

impl LineMatcher for RegexMatcher {
    fn match_in_line(&self, line: &[char], column: usize, backwards: bool) -> Option<(usize, usize)> {
        let text: String = line.iter().collect();
        // char index of every byte boundary we might report
        let char_of = |byte: usize| text[..byte].chars().count();

        if backwards {
            // walk start positions down so overlapping matches are seen
            let mut byte = 0;
            let mut starts = Vec::with_capacity(line.len() + 1);
            for c in line.iter().take(column.min(line.len())) {
                starts.push(byte);
                byte += c.len_utf8();
            }
            starts.push(byte);
            starts.into_iter().rev().find_map(|at| {
                self.regex
                    .find_at(&text, at)
                    .filter(|m| m.start() == at)
                    .map(|m| {
                        let start = char_of(at);
                        (start, char_of(m.end()) - start)
                    })
            })
        } else {
            if column > line.len() {
                return None;
            }
            let byte_start: usize = line[..column].iter().map(|c| c.len_utf8()).sum();
            self.regex.find_at(&text, byte_start).map(|m| {
                let start = char_of(m.start());
                (start, char_of(m.end()) - start)
            })
        }
    }
}

/// Scan lines from `(start_line, start_col)` until `matcher` reports a hit.
pub fn scan(
    lines: &LineStore,
    start_line: usize,
    start_col: usize,
    matcher: &dyn LineMatcher,
    backwards: bool,
) -> Option<SearchMatch> {
    if start_line >= lines.count() {
        return None;
    }
    let mut col = start_col;
    if backwards {
        for line in (0..=start_line).rev() {
            let text = lines.line(line)?;
            if let Some((column, length)) = matcher.match_in_line(text.chars(), col, true) {
                return Some(SearchMatch { line, column, length });
            }
            if line > 0 {
                col = lines.line(line - 1).map_or(0, |l| l.len());
            }
        }
    } else {
        for line in start_line..lines.count() {
            let text = lines.line(line)?;
            if let Some((column, length)) = matcher.match_in_line(text.chars(), col, false) {
                return Some(SearchMatch { line, column, length });
            }
            col = 0;
        }
    }
    None
}

impl Document {
    /// Find literal `pattern` from `(line, column)`.
    pub fn search_text(
        &self,
        line: usize,
        column: usize,
        pattern: &str,
        case_sensitive: bool,
        backwards: bool,
    ) -> Result<Option<SearchMatch>, SearchError> {
        let matcher = PlainMatcher::new(pattern, case_sensitive)?;
        Ok(scan(&self.lines, line, column, &matcher, backwards))
    }

    /// Find regular expression `pattern` from `(line, column)`.
    pub fn search_regex(
        &self,
        line: usize,
        column: usize,
        pattern: &str,
        case_sensitive: bool,
        backwards: bool,
    ) -> Result<Option<SearchMatch>, SearchError> {
        let matcher = RegexMatcher::new(pattern, case_sensitive)?;
        Ok(scan(&self.lines, line, column, &matcher, backwards))
    }

    /// Every forward match in document order.
    pub fn search_all(&self, matcher: &dyn LineMatcher) -> Vec<SearchMatch> {
        let mut found = Vec::new();
        let (mut line, mut column) = (0, 0);
        while let Some(m) = scan(&self.lines, line, column, matcher, false) {
            found.push(m);
            line = m.line;
            column = m.column + m.length.max(1);
            if column > self.line_length(line) {
                line += 1;
                column = 0;
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_plain_forward_and_backward() {
        let m = PlainMatcher::new("ab", true).unwrap();
        let line = chars("xxabyyab");
        assert_eq!(m.match_in_line(&line, 0, false), Some((2, 2)));
        assert_eq!(m.match_in_line(&line, 3, false), Some((6, 2)));
        assert_eq!(m.match_in_line(&line, 8, true), Some((6, 2)));
        assert_eq!(m.match_in_line(&line, 5, true), Some((2, 2)));
        assert_eq!(m.match_in_line(&line, 1, true), None);
    }

    #[test]
    fn test_plain_case_insensitive() {
        let m = PlainMatcher::new("HeLLo", false).unwrap();
        assert_eq!(m.match_in_line(&chars("say hello"), 0, false), Some((4, 5)));
        let strict = PlainMatcher::new("HeLLo", true).unwrap();
        assert_eq!(strict.match_in_line(&chars("say hello"), 0, false), None);
    }

    #[test]
    fn test_regex_reports_char_columns() {
        let m = RegexMatcher::new("b+", true).unwrap();
        let line = chars("ééabbbc");
        assert_eq!(m.match_in_line(&line, 0, false), Some((3, 3)));
        assert_eq!(m.match_in_line(&line, 6, true), Some((5, 1)));
        assert_eq!(m.match_in_line(&line, 3, true), Some((3, 3)));
        assert_eq!(m.match_in_line(&line, 2, true), None);
    }

    #[test]
    fn test_backward_overlapping_match_agrees() {
        let line = chars("aaa");
        let plain = PlainMatcher::new("aa", true).unwrap();
        let regex = RegexMatcher::new("aa", true).unwrap();
        assert_eq!(plain.match_in_line(&line, 2, true), Some((1, 2)));
        assert_eq!(regex.match_in_line(&line, 2, true), Some((1, 2)));
        assert_eq!(regex.match_in_line(&line, 0, true), Some((0, 2)));
    }

    #[test]
    fn test_invalid_patterns() {
        assert_eq!(PlainMatcher::new("", true).unwrap_err(), SearchError::EmptyPattern);
        assert!(matches!(
            RegexMatcher::new("(", true),
            Err(SearchError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_scan_crosses_lines() {
        let lines = LineStore::from_lines(["one", "two", "three", "two"]);
        let m = PlainMatcher::new("two", true).unwrap();
        assert_eq!(
            scan(&lines, 0, 0, &m, false),
            Some(SearchMatch { line: 1, column: 0, length: 3 })
        );
        assert_eq!(
            scan(&lines, 1, 1, &m, false),
            Some(SearchMatch { line: 3, column: 0, length: 3 })
        );
        assert_eq!(
            scan(&lines, 2, 0, &m, true),
            Some(SearchMatch { line: 1, column: 0, length: 3 })
        );
        assert_eq!(scan(&lines, 9, 0, &m, false), None);
    }

    #[test]
    fn test_document_search_crosses_lines() {
        let d = Document::from_text("alpha\nbeta gamma\nalpha beta");
        assert_eq!(
            d.search_text(0, 1, "alpha", true, false).unwrap(),
            Some(SearchMatch { line: 2, column: 0, length: 5 })
        );
        assert_eq!(
            d.search_text(2, 3, "beta", true, true).unwrap(),
            Some(SearchMatch { line: 1, column: 0, length: 4 })
        );
        assert_eq!(d.search_text(0, 0, "delta", true, false).unwrap(), None);
        assert_eq!(d.search_text(0, 0, "", true, false), Err(SearchError::EmptyPattern));
    }

    #[test]
    fn test_document_regex_search_and_search_all() {
        let d = Document::from_text("a1 b22\nc333");
        assert_eq!(
            d.search_regex(0, 0, "[0-9]{2,}", true, false).unwrap(),
            Some(SearchMatch { line: 0, column: 4, length: 2 })
        );
        assert_eq!(
            d.search_regex(0, 0, "B", false, false).unwrap(),
            Some(SearchMatch { line: 0, column: 3, length: 1 })
        );
        let digits = RegexMatcher::new("[0-9]+", true).unwrap();
        let all: Vec<(usize, usize)> = d.search_all(&digits).iter().map(|m| (m.line, m.column)).collect();
        assert_eq!(all, vec![(0, 1), (0, 4), (1, 1)]);
    }
}
