//! A line-oriented text document engine: transactional edit sessions with
//! undo/redo, marks, selections and views that follow the text.

pub mod config;
pub mod document_model;
pub mod error;
pub mod registry;
pub mod services;
pub mod view;

pub use config::{DocConfig, RcLoader};
pub use document_model::{Cursor, Document, DocumentEvent, LineEnding};
pub use error::{EditError, RegistryError};
pub use registry::{DocumentId, DocumentRegistry};
pub use view::{ViewId, ViewListener};
