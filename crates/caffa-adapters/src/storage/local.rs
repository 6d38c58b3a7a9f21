//! Local document storage using std::fs.

use std::io;
use std::path::Path;

use caffa_core::{
    application::{ApplicationError, ports::DocumentStorage},
    error::{CaffaError, CaffaResult},
};
use tracing::debug;

/// Production storage: documents are plain files.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDocumentStorage;

impl LocalDocumentStorage {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentStorage for LocalDocumentStorage {
    fn read_to_string(&self, path: &Path) -> CaffaResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read document"))
    }

    fn write(&self, path: &Path, content: &str) -> CaffaResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| map_io_error(parent, e, "create directory"))?;
        }
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write document"))?;
        debug!(path = %path.display(), bytes = content.len(), "document written");
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> CaffaError {
    if e.kind() == io::ErrorKind::NotFound {
        return ApplicationError::DocumentNotFound {
            path: path.to_path_buf(),
        }
        .into();
    }
    ApplicationError::StorageError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/doc.json");
        let storage = LocalDocumentStorage::new();

        assert!(!storage.exists(&path));
        storage.write(&path, "{}").unwrap();
        assert!(storage.exists(&path));
        assert_eq!(storage.read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn write_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let storage = LocalDocumentStorage::new();

        storage.write(&path, "first").unwrap();
        storage.write(&path, "second").unwrap();
        assert_eq!(storage.read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalDocumentStorage::new()
            .read_to_string(&dir.path().join("absent.json"))
            .unwrap_err();
        assert!(matches!(
            err,
            CaffaError::Application(ApplicationError::DocumentNotFound { .. })
        ));
    }

    #[test]
    fn directories_do_not_count_as_documents() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!LocalDocumentStorage::new().exists(dir.path()));
    }
}
