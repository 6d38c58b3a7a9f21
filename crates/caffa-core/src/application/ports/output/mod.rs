//! Driven (output) ports - implemented by infrastructure.
//!
//! The `caffa-adapters` crate provides implementations.

use std::path::Path;

use crate::domain::{ObjectArena, ObjectFactory, ObjectId};
use crate::error::CaffaResult;

/// Port for turning object graphs into text and back.
///
/// Implemented by:
/// - `caffa_adapters::serializer::JsonObjectSerializer`
///
/// A serializer only populates fields. Post-read hooks are the caller's
/// business, once the whole graph exists.
#[cfg_attr(test, mockall::automock)]
pub trait ObjectSerializer: Send + Sync {
    /// Serialize `root` and everything it owns.
    fn write_object(&self, arena: &ObjectArena, root: ObjectId) -> CaffaResult<String>;

    /// Build a graph from `text` in `arena`, creating objects with
    /// `factory`, and return the new root.
    fn read_object(
        &self,
        arena: &mut ObjectArena,
        factory: &dyn ObjectFactory,
        text: &str,
    ) -> CaffaResult<ObjectId>;

    /// Format name for messages, e.g. `json`.
    fn format(&self) -> &'static str;
}

/// Port for reading and writing document text.
///
/// Implemented by:
/// - `caffa_adapters::storage::LocalDocumentStorage` (production)
/// - `caffa_adapters::storage::MemoryDocumentStorage` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait DocumentStorage: Send + Sync {
    fn read_to_string(&self, path: &Path) -> CaffaResult<String>;

    /// Write `content`, replacing any existing document at `path`.
    fn write(&self, path: &Path, content: &str) -> CaffaResult<()>;

    fn exists(&self, path: &Path) -> bool;
}
