//! In-memory document storage for testing.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use caffa_core::{
    application::{ApplicationError, ports::DocumentStorage},
    error::CaffaResult,
};

/// Documents kept in a shared map. Clones see the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStorage {
    documents: Arc<RwLock<HashMap<PathBuf, String>>>,
}

impl MemoryDocumentStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths of all stored documents, sorted (testing helper).
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self
            .documents
            .read()
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) -> CaffaResult<()> {
        self.documents
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?
            .clear();
        Ok(())
    }
}

impl DocumentStorage for MemoryDocumentStorage {
    fn read_to_string(&self, path: &Path) -> CaffaResult<String> {
        let documents = self
            .documents
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        documents.get(path).cloned().ok_or_else(|| {
            ApplicationError::DocumentNotFound {
                path: path.to_path_buf(),
            }
            .into()
        })
    }

    fn write(&self, path: &Path, content: &str) -> CaffaResult<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        documents.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.documents
            .read()
            .is_ok_and(|docs| docs.contains_key(path))
    }
}
