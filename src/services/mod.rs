/// Collaborators the document drives: highlighting and folding.
pub mod folding;
pub mod highlight;

pub use folding::{FoldRegions, FoldingTree, NoFolding};
pub use highlight::{HighlightScheduler, Highlighter, KeywordHighlighter, PlainHighlighter};
