use crate::config::DocConfig;
use crate::document_model::Document;
use crate::error::RegistryError;
use crate::view::{ViewId, ViewListener};
use std::path::Path;
use tracing::{debug, info};

/// Handle to a document owned by a [`DocumentRegistry`]. Ids are never
/// reused, so a handle to a closed document stays invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

/// Owns every open document, in opening order, plus a current one.
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    documents: Vec<(DocumentId, Document)>,
    current: Option<usize>,
    next_id: u64,
    config: DocConfig,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// New documents start from `config`.
    pub fn with_config(config: DocConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    fn push(&mut self, doc: Document) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        self.documents.push((id, doc));
        self.current = Some(self.documents.len() - 1);
        id
    }

    fn index_of(&self, id: DocumentId) -> Option<usize> {
        self.documents.iter().position(|(d, _)| *d == id)
    }

    /// Create an empty, unnamed document and make it current.
    pub fn create(&mut self) -> DocumentId {
        let id = self.push(Document::with_config(self.config.clone()));
        debug!(?id, "document created");
        id
    }

    /// Open `path`; a file that does not exist yet gives an empty
    /// document carrying that name.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<DocumentId, RegistryError> {
        let path = path.as_ref();
        let mut doc = Document::with_config(self.config.clone());
        if path.exists() {
            doc.load_file(path)?;
            info!(path = %path.display(), lines = doc.line_count(), "opened");
        } else {
            doc.set_filename(Some(path.to_path_buf()));
            info!(path = %path.display(), "new file");
        }
        Ok(self.push(doc))
    }

    /// Close a document. Unsaved changes refuse unless `force`.
    pub fn close(&mut self, id: DocumentId, force: bool) -> Result<(), RegistryError> {
        let index = self.index_of(id).ok_or(RegistryError::UnknownDocument)?;
        if !force && self.documents[index].1.is_modified() {
            return Err(RegistryError::Unsaved);
        }
        self.remove_at(index);
        debug!(?id, force, "document closed");
        Ok(())
    }

    fn remove_at(&mut self, index: usize) {
        self.documents.remove(index);
        self.current = match self.current {
            _ if self.documents.is_empty() => None,
            Some(cur) if cur > index => Some(cur - 1),
            Some(cur) => Some(cur.min(self.documents.len() - 1)),
            None => None,
        };
    }

    pub fn attach_view(
        &mut self,
        id: DocumentId,
        listener: Box<dyn ViewListener>,
    ) -> Result<ViewId, RegistryError> {
        let doc = self.get_mut(id).ok_or(RegistryError::UnknownDocument)?;
        Ok(doc.attach_view(listener))
    }

    /// Detach a view. The document is dropped with its last view.
    /// Returns whether the document went away.
    pub fn detach_view(&mut self, id: DocumentId, view: ViewId) -> Result<bool, RegistryError> {
        let index = self.index_of(id).ok_or(RegistryError::UnknownDocument)?;
        let doc = &mut self.documents[index].1;
        if !doc.detach_view(view) {
            return Err(RegistryError::Edit(crate::error::EditError::UnknownView));
        }
        if doc.view_count() == 0 {
            self.remove_at(index);
            debug!(?id, "document dropped with its last view");
            return Ok(true);
        }
        Ok(false)
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|(d, _)| *d == id).map(|(_, doc)| doc)
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.iter_mut().find(|(d, _)| *d == id).map(|(_, doc)| doc)
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn ids(&self) -> Vec<DocumentId> {
        self.documents.iter().map(|(id, _)| *id).collect()
    }

    pub fn current(&self) -> Option<DocumentId> {
        self.current.map(|i| self.documents[i].0)
    }

    pub fn set_current(&mut self, id: DocumentId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.current = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn next_document(&mut self) -> Option<DocumentId> {
        let cur = self.current?;
        self.current = Some((cur + 1) % self.documents.len());
        self.current()
    }

    pub fn prev_document(&mut self) -> Option<DocumentId> {
        let cur = self.current?;
        self.current = Some(if cur == 0 { self.documents.len() - 1 } else { cur - 1 });
        self.current()
    }

    pub fn display_name(&self, id: DocumentId) -> Option<&str> {
        self.get(id).map(|doc| {
            doc.filename()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .unwrap_or("[No Name]")
        })
    }

    /// One line per document: `%` marks the current one, `+` a modified one.
    pub fn list(&self) -> Vec<String> {
        self.documents
            .iter()
            .enumerate()
            .map(|(i, (id, doc))| {
                let indicator = if Some(i) == self.current { "%" } else { " " };
                let modified = if doc.is_modified() { " +" } else { "" };
                let name = self.display_name(*id).unwrap_or("[No Name]");
                format!("{indicator} {}: \"{name}\"{modified}", i + 1)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::NullView;
    use std::fs;

    #[test]
    fn test_create_and_close() {
        let mut reg = DocumentRegistry::new();
        let a = reg.create();
        let b = reg.create();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.current(), Some(b));

        reg.close(b, false).unwrap();
        assert_eq!(reg.current(), Some(a));
        assert!(matches!(reg.close(b, false), Err(RegistryError::UnknownDocument)));
        reg.close(a, false).unwrap();
        assert!(reg.is_empty());
        assert_eq!(reg.current(), None);
    }

    #[test]
    fn test_close_refuses_unsaved() {
        let mut reg = DocumentRegistry::new();
        let id = reg.create();
        reg.get_mut(id).unwrap().insert_text(0, 0, "dirty").unwrap();
        assert!(matches!(reg.close(id, false), Err(RegistryError::Unsaved)));
        assert!(reg.contains(id));
        reg.close(id, true).unwrap();
        assert!(!reg.contains(id));
    }

    #[test]
    fn test_open_existing_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("a.txt");
        fs::write(&existing, "hello\nworld").unwrap();

        let mut reg = DocumentRegistry::new();
        let a = reg.open(&existing).unwrap();
        assert_eq!(reg.get(a).unwrap().line_count(), 2);

        let b = reg.open(dir.path().join("new.txt")).unwrap();
        let doc = reg.get(b).unwrap();
        assert_eq!(doc.line_count(), 1);
        assert_eq!(reg.display_name(b), Some("new.txt"));
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_document_dropped_with_last_view() {
        let mut reg = DocumentRegistry::new();
        let id = reg.create();
        let v1 = reg.attach_view(id, Box::new(NullView)).unwrap();
        let v2 = reg.attach_view(id, Box::new(NullView)).unwrap();
        assert!(!reg.detach_view(id, v1).unwrap());
        assert!(reg.detach_view(id, v1).is_err());
        assert!(reg.detach_view(id, v2).unwrap());
        assert!(!reg.contains(id));
    }

    #[test]
    fn test_cycling_and_listing() {
        let mut reg = DocumentRegistry::new();
        let a = reg.create();
        let b = reg.create();
        reg.get_mut(b).unwrap().set_modified(true);
        assert_eq!(reg.next_document(), Some(a));
        assert_eq!(reg.prev_document(), Some(b));
        assert_eq!(
            reg.list(),
            vec!["  1: \"[No Name]\"".to_string(), "% 2: \"[No Name]\" +".to_string()]
        );
        assert!(reg.set_current(a));
        assert_eq!(reg.current(), Some(a));
    }

    #[test]
    fn test_registry_config_reaches_documents() {
        let config = DocConfig {
            tab_width: 3,
            ..DocConfig::default()
        };
        let mut reg = DocumentRegistry::with_config(config);
        let id = reg.create();
        assert_eq!(reg.get(id).unwrap().config().tab_width, 3);
    }
}
