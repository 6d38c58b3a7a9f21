//! Document Service - object documents on storage.
//!
//! A document is one object graph serialized as text. This service creates
//! roots, edits data fields generically, and moves graphs between an
//! [`ObjectArena`] and a [`DocumentStorage`].

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    application::{
        ApplicationError,
        ports::{DocumentStorage, ObjectSerializer},
    },
    domain::{
        ClassIdentity, DomainError, FieldHandle, Inspector, ObjectArena, ObjectCollector, ObjectFactory,
        ObjectHandle, ObjectId, PortableValue,
    },
    error::CaffaResult,
};

/// Object and field counts of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub objects: usize,
    pub fields: usize,
    /// Object count per class keyword.
    pub classes: BTreeMap<String, usize>,
}

impl Inspector for DocumentSummary {
    fn visit_object(&mut self, object: &dyn ObjectHandle) {
        self.objects += 1;
        *self
            .classes
            .entry(object.class_keyword().to_string())
            .or_default() += 1;
    }

    fn visit_field(&mut self, _field: &dyn FieldHandle) {
        self.fields += 1;
    }
}

/// Loads, saves and copies object documents.
pub struct DocumentService {
    serializer: Box<dyn ObjectSerializer>,
    storage: Box<dyn DocumentStorage>,
    factory: Rc<dyn ObjectFactory>,
}

impl DocumentService {
    pub fn new(
        serializer: Box<dyn ObjectSerializer>,
        storage: Box<dyn DocumentStorage>,
        factory: Rc<dyn ObjectFactory>,
    ) -> Self {
        Self {
            serializer,
            storage,
            factory,
        }
    }

    pub fn factory(&self) -> &dyn ObjectFactory {
        self.factory.as_ref()
    }

    /// Create a new root object of `class_keyword`.
    #[instrument(skip(self, arena))]
    pub fn create(&self, arena: &mut ObjectArena, class_keyword: &str) -> CaffaResult<ObjectId> {
        let id = arena
            .create(self.factory.as_ref(), class_keyword)
            .ok_or_else(|| ApplicationError::UnknownClass {
                keyword: class_keyword.to_string(),
            })?;
        debug!(%id, "object created");
        Ok(id)
    }

    /// Write `value` into the data field `keyword` of `object`, validators
    /// included.
    #[instrument(skip(self, arena, object, value), fields(object = %object))]
    pub fn set_field(
        &self,
        arena: &mut ObjectArena,
        object: ObjectId,
        keyword: &str,
        value: &PortableValue,
    ) -> CaffaResult<()> {
        let handle = arena
            .get_mut(object)
            .ok_or_else(|| DomainError::ObjectNotFound {
                id: object.to_string(),
            })?;
        let class = handle.class_keyword();
        let field = handle
            .find_field_mut(keyword)
            .ok_or_else(|| DomainError::FieldNotFound {
                class: class.to_string(),
                keyword: keyword.to_string(),
            })?;
        let data = field
            .as_data_field_mut()
            .ok_or_else(|| DomainError::WrongFieldKind {
                keyword: keyword.to_string(),
                expected: "data",
            })?;
        data.set_portable_value(value)?;
        Ok(())
    }

    /// Serialize `root` and write it to `path`.
    ///
    /// An existing document is only replaced when `overwrite` is set.
    #[instrument(skip(self, arena, path), fields(path = %path.display()))]
    pub fn save(
        &self,
        arena: &ObjectArena,
        root: ObjectId,
        path: &Path,
        overwrite: bool,
    ) -> CaffaResult<()> {
        if !overwrite && self.storage.exists(path) {
            return Err(ApplicationError::DocumentExists {
                path: path.to_path_buf(),
            }
            .into());
        }
        let text = self.to_text(arena, root)?;
        self.storage.write(path, &text)?;
        info!(bytes = text.len(), "document saved");
        Ok(())
    }

    /// Read the document at `path` into `arena` and return its root.
    #[instrument(skip(self, arena, path), fields(path = %path.display()))]
    pub fn load(&self, arena: &mut ObjectArena, path: &Path) -> CaffaResult<ObjectId> {
        if !self.storage.exists(path) {
            return Err(ApplicationError::DocumentNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }
        let text = self.storage.read_to_string(path)?;
        let root = self.from_text(arena, &text)?;
        info!(%root, "document loaded");
        Ok(root)
    }

    pub fn to_text(&self, arena: &ObjectArena, root: ObjectId) -> CaffaResult<String> {
        self.serializer.write_object(arena, root)
    }

    /// Build a graph from `text` and run the post-read hooks over it once.
    pub fn from_text(&self, arena: &mut ObjectArena, text: &str) -> CaffaResult<ObjectId> {
        let root = self
            .serializer
            .read_object(arena, self.factory.as_ref(), text)?;
        arena.init_after_read(root)?;
        Ok(root)
    }

    /// Copy the graph below `root` through the serializer. Every object in
    /// the copy gets a new UUID.
    #[instrument(skip(self, arena, root), fields(root = %root))]
    pub fn deep_copy(&self, arena: &mut ObjectArena, root: ObjectId) -> CaffaResult<ObjectId> {
        let text = self.to_text(arena, root)?;
        let copy = self
            .serializer
            .read_object(arena, self.factory.as_ref(), &text)?;

        let mut collector = ObjectCollector::new(|_: &dyn ObjectHandle| true);
        arena.accept(copy, &mut collector)?;
        for id in collector.objects() {
            if let Some(object) = arena.get_mut(*id) {
                object.set_uuid(Uuid::new_v4());
            }
        }

        arena.init_after_read(copy)?;
        debug!(%copy, objects = collector.objects().len(), "graph copied");
        Ok(copy)
    }

    /// Counts for the graph below `root`.
    pub fn summarize(&self, arena: &ObjectArena, root: ObjectId) -> CaffaResult<DocumentSummary> {
        let mut summary = DocumentSummary::default();
        arena.accept(root, &mut summary)?;
        Ok(summary)
    }
}
