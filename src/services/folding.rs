//! Folding collaborator: maps visible (virtual) lines to buffer (real) lines.

pub trait FoldingTree {
    fn line_inserted(&mut self, line: usize);
    fn line_removed(&mut self, line: usize);
    fn real_line_of(&self, virtual_line: usize) -> usize;
    fn virtual_line_of(&self, real_line: usize) -> usize;
    fn hidden_lines_count(&self) -> usize;

    /// Collapse `header+1..=last`. Trees without user folds refuse.
    fn fold(&mut self, _header: usize, _last: usize) -> bool {
        false
    }

    fn unfold(&mut self, _header: usize) -> bool {
        false
    }

    /// Forget every fold; the document content was replaced.
    fn clear(&mut self) {}
}

/// Nothing is ever folded.
#[derive(Debug, Default)]
pub struct NoFolding;

impl FoldingTree for NoFolding {
    fn line_inserted(&mut self, _line: usize) {}

    fn line_removed(&mut self, _line: usize) {}

    fn real_line_of(&self, virtual_line: usize) -> usize {
        virtual_line
    }

    fn virtual_line_of(&self, real_line: usize) -> usize {
        real_line
    }

    fn hidden_lines_count(&self) -> usize {
        0
    }
}

/// A collapsed region: the header line stays visible, the lines after it
/// up to and including `last` are hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fold {
    pub header: usize,
    pub last: usize,
}

impl Fold {
    fn hidden(&self) -> usize {
        self.last - self.header
    }
}

/// Collapsed line ranges, kept sorted and disjoint.
#[derive(Debug, Default, Clone)]
pub struct FoldRegions {
    folds: Vec<Fold>,
}

impl FoldRegions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folds(&self) -> &[Fold] {
        &self.folds
    }

    /// Refused when it overlaps an existing fold.
    pub fn add_fold(&mut self, header: usize, last: usize) -> bool {
        if last <= header {
            return false;
        }
        let overlaps = self
            .folds
            .iter()
            .any(|f| header <= f.last && f.header <= last);
        if overlaps {
            return false;
        }
        let pos = self.folds.partition_point(|f| f.header < header);
        self.folds.insert(pos, Fold { header, last });
        true
    }

    pub fn remove_fold(&mut self, header: usize) -> bool {
        let before = self.folds.len();
        self.folds.retain(|f| f.header != header);
        self.folds.len() != before
    }

    pub fn is_hidden(&self, line: usize) -> bool {
        self.folds.iter().any(|f| line > f.header && line <= f.last)
    }
}

impl FoldingTree for FoldRegions {
    fn line_inserted(&mut self, line: usize) {
        for fold in &mut self.folds {
            if line <= fold.header {
                fold.header += 1;
                fold.last += 1;
            } else if line <= fold.last {
                fold.last += 1;
            }
        }
    }

    fn line_removed(&mut self, line: usize) {
        // Removing the header, or the last hidden line, opens the fold.
        self.folds.retain_mut(|fold| {
            if line < fold.header {
                fold.header -= 1;
                fold.last -= 1;
                true
            } else if line == fold.header {
                false
            } else if line <= fold.last {
                fold.last -= 1;
                fold.last > fold.header
            } else {
                true
            }
        });
    }

    fn real_line_of(&self, virtual_line: usize) -> usize {
        let mut real = virtual_line;
        for fold in &self.folds {
            if fold.header < real {
                real += fold.hidden();
            } else {
                break;
            }
        }
        real
    }

    fn virtual_line_of(&self, real_line: usize) -> usize {
        let mut hidden_before = 0;
        for fold in &self.folds {
            if real_line > fold.last {
                hidden_before += fold.hidden();
            } else if real_line > fold.header {
                // Hidden lines map onto their header.
                return fold.header - hidden_before;
            } else {
                break;
            }
        }
        real_line - hidden_before
    }

    fn hidden_lines_count(&self) -> usize {
        self.folds.iter().map(Fold::hidden).sum()
    }

    fn fold(&mut self, header: usize, last: usize) -> bool {
        self.add_fold(header, last)
    }

    fn unfold(&mut self, header: usize) -> bool {
        self.remove_fold(header)
    }

    fn clear(&mut self) {
        self.folds.clear();
    }
}
