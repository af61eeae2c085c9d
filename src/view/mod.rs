/// View subsystem - attached views as seen from the document.
///
/// Views are opaque subscribers; the document addresses them through
/// generational ViewId handles and keeps a cursor cache per view so cursors
/// follow the text across edits.

pub mod registry;
pub mod view_model;

// Re-export public interface
pub use registry::{ViewId, ViewRegistry};
pub use view_model::{NullView, ViewListener, ViewState};
