use thiserror::Error;

/// Failure reported by a document edit. Every failing edit is a no-op.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("line {line} out of range (document has {count} lines)")]
    InvalidLineIndex { line: usize, count: usize },

    #[error("cannot remove the last remaining line")]
    DocumentEmptyGuard,

    #[error("document is read-only")]
    ReadOnly,

    #[error("view is not attached to this document")]
    UnknownView,

    #[error("no file name set")]
    NoFileName,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditError {
    pub fn invalid_line(line: usize, count: usize) -> Self {
        EditError::InvalidLineIndex { line, count }
    }
}

/// Failure reported by the document registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no such document")]
    UnknownDocument,

    #[error("document has unsaved changes")]
    Unsaved,

    #[error(transparent)]
    Edit(#[from] EditError),
}
