/// Document model subsystem - lines, edit sessions and text operations
///
/// A `Document` owns its lines, undo log, marks and selection. All change
/// goes through the edit primitives in `document`; the other modules add
/// operations built on top of them.
pub mod comment;
pub mod document;
pub mod editing;
pub mod events;
pub mod indent;
pub mod line_store;
pub mod marks;
pub mod search;
pub mod selecting;
pub mod selection;
pub mod session;
pub mod undo;
pub mod width;

// Re-export main types for convenience
pub use comment::CommentMarkers;
pub use document::{Document, LineEnding, split_lines};
pub use events::{DocumentEvent, ListenerId};
pub use line_store::{Cursor, LineStore, TextLine};
pub use marks::{Mark, MarkSet, mark_type};
pub use search::{LineMatcher, PlainMatcher, RegexMatcher, SearchError, SearchMatch};
pub use selection::{Selection, SelectionMode};
pub use session::SessionState;
pub use undo::{UndoGroup, UndoKind, UndoRecord};
